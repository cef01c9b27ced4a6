//! Output stream mappings and their per-stream options.

use std::fmt;

use crate::engine::codecs::Codec;
use crate::engine::filter_graph::pad_label;
use crate::engine::filters::{join_chain, Filter};

/// Where an output stream comes from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StreamReference {
    /// Stream `stream` of registered input `input`
    Input { input: usize, stream: usize },
    /// Named output pad of a filter graph
    Pad(String),
}

impl StreamReference {
    pub fn input(input: usize, stream: usize) -> Self {
        StreamReference::Input { input, stream }
    }

    pub fn pad(name: impl Into<String>) -> Self {
        StreamReference::Pad(name.into())
    }

    /// Value of the `-map` argument
    pub fn map_target(&self) -> String {
        match self {
            StreamReference::Input { input, stream } => format!("{}:{}", input, stream),
            StreamReference::Pad(name) => pad_label(name),
        }
    }
}

impl fmt::Display for StreamReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.map_target())
    }
}

/// Disposition flags settable per output stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamFlag {
    Default,
    Forced,
    Commentary,
    HearingImpaired,
    VisualImpaired,
    Captions,
    Descriptions,
    Original,
}

impl StreamFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamFlag::Default => "default",
            StreamFlag::Forced => "forced",
            StreamFlag::Commentary => "comment",
            StreamFlag::HearingImpaired => "hearing_impaired",
            StreamFlag::VisualImpaired => "visual_impaired",
            StreamFlag::Captions => "captions",
            StreamFlag::Descriptions => "descriptions",
            StreamFlag::Original => "original",
        }
    }
}

// (ISO 639-1, ISO 639-2/B, ISO 639-3)
const LANGUAGES: &[(&str, &str, &str)] = &[
    ("ar", "ara", "ara"),
    ("cs", "cze", "ces"),
    ("da", "dan", "dan"),
    ("de", "ger", "deu"),
    ("el", "gre", "ell"),
    ("en", "eng", "eng"),
    ("es", "spa", "spa"),
    ("fi", "fin", "fin"),
    ("fr", "fre", "fra"),
    ("he", "heb", "heb"),
    ("hi", "hin", "hin"),
    ("hu", "hun", "hun"),
    ("it", "ita", "ita"),
    ("ja", "jpn", "jpn"),
    ("ko", "kor", "kor"),
    ("nl", "dut", "nld"),
    ("no", "nor", "nor"),
    ("pl", "pol", "pol"),
    ("pt", "por", "por"),
    ("ru", "rus", "rus"),
    ("sv", "swe", "swe"),
    ("tr", "tur", "tur"),
    ("uk", "ukr", "ukr"),
    ("zh", "chi", "zho"),
];

/// Language tag with its known ISO 639 codes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Language {
    part1: Option<String>,
    part2: Option<String>,
    part3: Option<String>,
}

impl Language {
    pub fn new(part1: Option<String>, part2: Option<String>, part3: Option<String>) -> Self {
        Self { part1, part2, part3 }
    }

    /// Language whose code could not be determined
    pub fn undetermined() -> Self {
        Self::default()
    }

    /// Build from a two or three letter code, filling in the other parts
    /// for well-known languages
    pub fn from_code(code: &str) -> Self {
        let code = code.trim().to_ascii_lowercase();
        if !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Self::undetermined();
        }

        let known = LANGUAGES
            .iter()
            .find(|(p1, p2, p3)| *p1 == code || *p2 == code || *p3 == code);
        match (known, code.len()) {
            (Some((p1, p2, p3)), _) => Self::new(
                Some(p1.to_string()),
                Some(p2.to_string()),
                Some(p3.to_string()),
            ),
            (None, 2) => Self::new(Some(code), None, None),
            (None, 3) => Self::new(None, None, Some(code)),
            _ => Self::undetermined(),
        }
    }

    /// Three letter code if known, then the bibliographic code, then the
    /// two letter code, else `und`
    pub fn code(&self) -> &str {
        self.part3
            .as_deref()
            .or(self.part2.as_deref())
            .or(self.part1.as_deref())
            .unwrap_or("und")
    }
}

/// Codec, filters, flags and metadata for one output stream
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamOptions {
    codec: Codec,
    filters: Vec<Filter>,
    dispositions: Vec<(StreamFlag, bool)>,
    language: Option<Language>,
    title: Option<String>,
}

impl StreamOptions {
    /// Stream copy with no filters or metadata
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_codec(mut self, codec: impl Into<Codec>) -> Self {
        self.codec = codec.into();
        self
    }

    #[must_use]
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Set or clear a disposition flag. Setting a flag twice keeps its first
    /// position and the latest value.
    #[must_use]
    pub fn with_flag(mut self, flag: StreamFlag, enabled: bool) -> Self {
        match self.dispositions.iter_mut().find(|(f, _)| *f == flag) {
            Some(entry) => entry.1 = enabled,
            None => self.dispositions.push((flag, enabled)),
        }
        self
    }

    #[must_use]
    pub fn with_language(mut self, language: Language) -> Self {
        self.language = Some(language);
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// Tokens following `-map` for output stream `slot`
    pub fn to_arguments(&self, slot: usize) -> Vec<String> {
        let mut args = self.codec.to_arguments(slot);

        if !self.filters.is_empty() {
            args.push(format!("-filter:{}", slot));
            args.push(join_chain(&self.filters));
        }

        if !self.dispositions.is_empty() {
            let summary: String = self
                .dispositions
                .iter()
                .map(|(flag, enabled)| format!("{}{}", if *enabled { '+' } else { '-' }, flag.as_str()))
                .collect();
            args.push(format!("-disposition:{}", slot));
            args.push(summary);
        }

        if let Some(language) = &self.language {
            args.push(format!("-metadata:s:{}", slot));
            args.push(format!("language={}", language.code()));
        }

        if let Some(title) = &self.title {
            args.push(format!("-metadata:s:{}", slot));
            args.push(format!("title={}", title));
        }

        args
    }
}

/// A source bound to an output slot
#[derive(Debug, Clone, PartialEq)]
pub struct StreamMapping {
    slot: usize,
    reference: StreamReference,
    options: StreamOptions,
}

impl StreamMapping {
    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn reference(&self) -> &StreamReference {
        &self.reference
    }

    pub fn options(&self) -> &StreamOptions {
        &self.options
    }

    pub fn to_arguments(&self) -> Vec<String> {
        let mut args = vec!["-map".to_string(), self.reference.map_target()];
        args.extend(self.options.to_arguments(self.slot));
        args
    }
}

/// Output streams in slot order
#[derive(Debug, Clone, Default)]
pub struct StreamMappingTable {
    mappings: Vec<StreamMapping>,
}

impl StreamMappingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a mapping and return its slot
    pub fn add(&mut self, reference: StreamReference, options: StreamOptions) -> usize {
        let slot = self.mappings.len();
        self.mappings.push(StreamMapping {
            slot,
            reference,
            options,
        });
        slot
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StreamMapping> {
        self.mappings.iter()
    }

    pub fn to_arguments(&self) -> Vec<String> {
        self.mappings
            .iter()
            .flat_map(StreamMapping::to_arguments)
            .collect()
    }
}
