//! Configuration for SVG rendering
//!
//! Every drawing layer is written as a `<g>` whose class is the layer name
//! behind the class prefix. With the default `seq-` prefix a document holds,
//! back to front:
//!
//! | Class              | Contents                                  |
//! |--------------------|-------------------------------------------|
//! | `seq-background`   | debug guides                              |
//! | `seq-agent-lines`  | lifelines and highlighted lifeline boxes  |
//! | `seq-blocks`       | block regions, dividers and tag boxes     |
//! | `seq-shapes`       | caps, messages, arrowheads, note boxes    |
//! | `seq-labels`       | title and every text label                |
//!
//! Groups nested inside a layer (the cross cap, for instance) get the same
//! prefix, so one stylesheet rule set can target a whole document.

/// Options for SVG output
#[derive(Debug, Clone, PartialEq)]
pub struct SvgConfig {
    /// Padding added on every side of the drawing bounds in the viewBox
    pub viewbox_padding: f64,

    /// Emit the XML declaration
    pub standalone: bool,

    /// One element per line, indented by nesting depth
    pub pretty_print: bool,

    /// Prepended to every group class; `None` leaves layer names bare
    pub class_prefix: Option<String>,
}

impl Default for SvgConfig {
    fn default() -> Self {
        Self {
            viewbox_padding: 0.0,
            standalone: true,
            pretty_print: true,
            class_prefix: Some("seq-".to_string()),
        }
    }
}

impl SvgConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_viewbox_padding(mut self, padding: f64) -> Self {
        self.viewbox_padding = padding;
        self
    }

    pub fn with_standalone(mut self, standalone: bool) -> Self {
        self.standalone = standalone;
        self
    }

    pub fn with_pretty_print(mut self, pretty: bool) -> Self {
        self.pretty_print = pretty;
        self
    }

    pub fn with_class_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.class_prefix = Some(prefix.into());
        self
    }

    pub fn without_class_prefix(mut self) -> Self {
        self.class_prefix = None;
        self
    }

    /// Class attribute value for a layer or nested group
    pub fn class_name(&self, name: &str) -> String {
        match &self.class_prefix {
            Some(prefix) => format!("{prefix}{name}"),
            None => name.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Layer;

    #[test]
    fn test_default_writes_a_standalone_document() {
        let config = SvgConfig::default();
        assert_eq!(config.viewbox_padding, 0.0);
        assert!(config.standalone);
        assert!(config.pretty_print);
        assert_eq!(config.class_prefix.as_deref(), Some("seq-"));
    }

    #[test]
    fn test_layer_class_names() {
        let config = SvgConfig::default();
        let classes: Vec<String> = Layer::ALL
            .iter()
            .map(|layer| config.class_name(layer.name()))
            .collect();
        assert_eq!(
            classes,
            [
                "seq-background",
                "seq-agent-lines",
                "seq-blocks",
                "seq-shapes",
                "seq-labels"
            ]
        );

        assert_eq!(config.clone().with_class_prefix("my-").class_name("blocks"), "my-blocks");
        assert_eq!(config.without_class_prefix().class_name("blocks"), "blocks");
    }

    #[test]
    fn test_compact_embedded_config() {
        let config = SvgConfig::new()
            .with_viewbox_padding(10.0)
            .with_standalone(false)
            .with_pretty_print(false);

        assert_eq!(config.viewbox_padding, 10.0);
        assert!(!config.standalone);
        assert!(!config.pretty_print);
        assert_eq!(config.class_name("labels"), "seq-labels");
    }
}
