//! Job builder and command serialization.
//!
//! A [`TranscodeBuilder`] collects inputs, filter graphs and stream mappings.
//! [`TranscodeBuilder::build`] freezes it into a [`TranscodeJob`], which
//! renders the argument list in the order ffmpeg requires: global flags,
//! input blocks, filter graphs, stream mappings, output options, output path.

use tracing::debug;

use crate::domain::errors::DomainError;
use crate::domain::model::{MediaAnalysis, StreamKind, TimeSpec, Trim};
use crate::domain::rules::DurationResolver;
use crate::engine::filter_graph::{FilterGraph, GraphInput};
use crate::engine::inputs::{FileInput, InputRegistry, InputSource};
use crate::engine::output::OutputFile;
use crate::engine::streams::{StreamMappingTable, StreamOptions, StreamReference};

/// What ffmpeg does when the output file already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverwritePolicy {
    #[default]
    Overwrite,
    Skip,
}

impl OverwritePolicy {
    fn flag(&self) -> &'static str {
        match self {
            OverwritePolicy::Overwrite => "-y",
            OverwritePolicy::Skip => "-n",
        }
    }
}

/// Mutable job description
#[derive(Debug)]
pub struct TranscodeBuilder {
    overwrite: OverwritePolicy,
    inputs: InputRegistry,
    graphs: Vec<FilterGraph>,
    streams: StreamMappingTable,
    output: OutputFile,
}

impl TranscodeBuilder {
    pub fn new(output: OutputFile) -> Self {
        Self {
            overwrite: OverwritePolicy::default(),
            inputs: InputRegistry::new(),
            graphs: Vec::new(),
            streams: StreamMappingTable::new(),
            output,
        }
    }

    pub fn overwrite(&mut self, policy: OverwritePolicy) -> &mut Self {
        self.overwrite = policy;
        self
    }

    /// Register an input and return its index. Equal inputs share an index.
    pub fn add_input(&mut self, source: impl Into<InputSource>) -> usize {
        self.inputs.add(source)
    }

    pub fn add_filter_graph(&mut self, graph: FilterGraph) -> &mut Self {
        self.graphs.push(graph);
        self
    }

    /// Map a source to the next output slot
    pub fn add_stream(&mut self, reference: StreamReference, options: StreamOptions) -> usize {
        self.streams.add(reference, options)
    }

    /// Map stream `stream` of `input`, registering the input if needed
    pub fn map_stream(
        &mut self,
        input: impl Into<InputSource>,
        stream: usize,
        options: StreamOptions,
    ) -> usize {
        let index = self.inputs.add(input);
        self.streams.add(StreamReference::input(index, stream), options)
    }

    /// Map a filter graph output pad
    pub fn map_pad(&mut self, name: impl Into<String>, options: StreamOptions) -> usize {
        self.streams.add(StreamReference::pad(name), options)
    }

    /// Map every stream of `kind` in the analysed file, reading it with
    /// `trim`. Returns the slots in stream order.
    pub fn map_streams(
        &mut self,
        analysis: &MediaAnalysis,
        kind: StreamKind,
        trim: Trim,
        options: &StreamOptions,
    ) -> Vec<usize> {
        let index = self
            .inputs
            .add(FileInput::from_analysis(analysis).with_trim(trim));
        self.map_streams_from(index, analysis, kind, options)
    }

    /// Map every stream of `kind` listed in `analysis` from an already
    /// registered input. Concat inputs use the analysis of their first file.
    pub fn map_streams_from(
        &mut self,
        input: usize,
        analysis: &MediaAnalysis,
        kind: StreamKind,
        options: &StreamOptions,
    ) -> Vec<usize> {
        analysis
            .stream_indices(kind)
            .into_iter()
            .map(|stream| {
                self.streams
                    .add(StreamReference::input(input, stream), options.clone())
            })
            .collect()
    }

    /// Freeze the description
    pub fn build(self) -> TranscodeJob {
        TranscodeJob {
            overwrite: self.overwrite,
            inputs: self.inputs,
            graphs: self.graphs,
            streams: self.streams,
            output: self.output,
        }
    }
}

/// Frozen job description
#[derive(Debug)]
pub struct TranscodeJob {
    overwrite: OverwritePolicy,
    inputs: InputRegistry,
    graphs: Vec<FilterGraph>,
    streams: StreamMappingTable,
    output: OutputFile,
}

impl TranscodeJob {
    pub fn inputs(&self) -> &InputRegistry {
        &self.inputs
    }

    pub fn filter_graphs(&self) -> &[FilterGraph] {
        &self.graphs
    }

    pub fn streams(&self) -> &StreamMappingTable {
        &self.streams
    }

    pub fn output(&self) -> &OutputFile {
        &self.output
    }

    /// Expected output length, the denominator for progress percentages
    pub fn expected_duration(&self) -> TimeSpec {
        DurationResolver::resolve(self.output.trim(), self.inputs.extents())
    }

    /// Create temporary input resources
    pub fn prepare(&mut self) -> Result<(), DomainError> {
        self.inputs.prepare()
    }

    /// Remove temporary input resources. Never fails.
    pub fn dispose(&mut self) {
        self.inputs.dispose()
    }

    /// Serialize to ffmpeg arguments, program name excluded
    pub fn to_arguments(&self) -> Result<Vec<String>, DomainError> {
        self.check_references()?;

        let mut args: Vec<String> = vec![
            "-nostdin".to_string(),
            self.overwrite.flag().to_string(),
            "-abort_on".to_string(),
            "empty_output".to_string(),
        ];

        args.extend(self.inputs.to_arguments()?);

        for graph in &self.graphs {
            args.push("-filter_complex".to_string());
            args.push(graph.build()?);
        }

        args.extend(self.streams.to_arguments());
        args.extend(self.output.to_arguments());

        debug!("Serialized ffmpeg arguments: {:?}", args);
        Ok(args)
    }

    fn check_references(&self) -> Result<(), DomainError> {
        for mapping in self.streams.iter() {
            match mapping.reference() {
                StreamReference::Input { input, .. } if *input >= self.inputs.len() => {
                    return Err(DomainError::BadArgs(format!(
                        "output stream {} maps input {} but only {} inputs are registered",
                        mapping.slot(),
                        input,
                        self.inputs.len()
                    )));
                }
                StreamReference::Pad(name)
                    if !self
                        .graphs
                        .iter()
                        .any(|graph| graph.outputs().iter().any(|out| out == name)) =>
                {
                    return Err(DomainError::BadArgs(format!(
                        "output stream {} maps pad '{}' which no filter graph produces",
                        mapping.slot(),
                        name
                    )));
                }
                _ => {}
            }
        }
        for (position, graph) in self.graphs.iter().enumerate() {
            for graph_input in graph.inputs() {
                if let GraphInput::Stream { input, stream } = graph_input {
                    if *input >= self.inputs.len() {
                        return Err(DomainError::BadArgs(format!(
                            "filter graph {} reads stream {}:{} but only {} inputs are registered",
                            position,
                            input,
                            stream,
                            self.inputs.len()
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Render a program and its arguments as one shell-style line for logs and
/// dry runs. The process itself always receives the arguments unquoted.
pub fn display_command(program: &str, args: &[String]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .map(shell_quote)
        .collect::<Vec<_>>()
        .join(" ")
}

fn shell_quote(token: &str) -> String {
    let plain = !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=+,@%".contains(c));
    if plain {
        token.to_string()
    } else {
        format!("'{}'", token.replace('\'', "'\\''"))
    }
}
