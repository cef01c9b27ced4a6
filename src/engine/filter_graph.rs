//! `-filter_complex` graph assembly.

use crate::domain::errors::DomainError;
use crate::engine::filters::{join_chain, Filter};

/// Wrap a pad name in brackets, escaping characters the graph parser
/// would otherwise read as syntax
pub fn pad_label(name: &str) -> String {
    let mut label = String::with_capacity(name.len() + 2);
    label.push('[');
    for c in name.chars() {
        if matches!(c, '\\' | '\'' | '[' | ']' | ':') {
            label.push('\\');
        }
        label.push(c);
    }
    label.push(']');
    label
}

/// Input pad of a filter graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphInput {
    /// Output pad of another graph
    Pad(String),
    /// Stream `stream` of registered input `input`
    Stream { input: usize, stream: usize },
}

impl GraphInput {
    fn render(&self) -> String {
        match self {
            GraphInput::Pad(name) => pad_label(name),
            GraphInput::Stream { input, stream } => format!("[{}:{}]", input, stream),
        }
    }
}

/// One filter chain with its input and output pads
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterGraph {
    inputs: Vec<GraphInput>,
    filters: Vec<Filter>,
    outputs: Vec<String>,
}

impl FilterGraph {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_input_pad(mut self, name: impl Into<String>) -> Self {
        self.inputs.push(GraphInput::Pad(name.into()));
        self
    }

    /// Feed stream `stream` of the input registered at `input`
    #[must_use]
    pub fn with_input_stream(mut self, input: usize, stream: usize) -> Self {
        self.inputs.push(GraphInput::Stream { input, stream });
        self
    }

    #[must_use]
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    #[must_use]
    pub fn with_output(mut self, name: impl Into<String>) -> Self {
        self.outputs.push(name.into());
        self
    }

    pub fn inputs(&self) -> &[GraphInput] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[String] {
        &self.outputs
    }

    /// Render the graph as a single argument
    pub fn build(&self) -> Result<String, DomainError> {
        if self.filters.is_empty() {
            return Err(DomainError::BadArgs(
                "a filter graph needs at least one filter".to_string(),
            ));
        }

        let mut graph: String = self.inputs.iter().map(GraphInput::render).collect();
        graph.push_str(&join_chain(&self.filters));
        for output in &self.outputs {
            graph.push_str(&pad_label(output));
        }
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::filters::ScaleResolution;

    #[test]
    fn test_overlay_graph() {
        let graph = FilterGraph::new()
            .with_input_stream(0, 0)
            .with_input_stream(1, 0)
            .with_filter(Filter::overlay())
            .with_output("vout");
        assert_eq!(
            graph.build().unwrap(),
            "[0:0][1:0]overlay=main_w-overlay_w-10:main_h-overlay_h-10[vout]"
        );
    }

    #[test]
    fn test_chain_of_filters_with_named_pads() {
        let graph = FilterGraph::new()
            .with_input_pad("vout")
            .with_filter(Filter::Bwdif)
            .with_filter(Filter::scale_to(ScaleResolution::Sd720x480))
            .with_output("small")
            .with_output("copy");
        assert_eq!(graph.build().unwrap(), "[vout]bwdif,scale=-2:480[small][copy]");
    }

    #[test]
    fn test_pad_names_are_escaped() {
        assert_eq!(pad_label("a]b"), "[a\\]b]");
        assert_eq!(pad_label("x:[y]"), "[x\\:\\[y\\]]");
        assert_eq!(pad_label("it's"), "[it\\'s]");
    }

    #[test]
    fn test_empty_chain_is_rejected() {
        let graph = FilterGraph::new().with_input_stream(0, 0).with_output("out");
        assert!(graph.build().is_err());
    }
}
