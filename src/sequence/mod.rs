//! Diagram input: declared agents and the ordered stage list
//!
//! Sequences are normally produced by a grammar front-end. They can also be
//! written directly as TOML:
//!
//! ```toml
//! title = "Login"
//!
//! [[agents]]
//! name = "A"
//! label = "Alice"
//!
//! [[stages]]
//! type = "agent-begin"
//! agents = ["A", "B"]
//!
//! [[stages]]
//! type = "connect"
//! agents = ["A", "B"]
//! label = "hello"
//! ```

pub mod stage;

pub use stage::*;

use std::path::Path;

use serde::Deserialize;

use crate::error::DocumentError;

/// A declared agent
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AgentDecl {
    pub name: String,
    /// Display label, defaulting to the name
    #[serde(default)]
    pub label: Option<String>,
}

impl AgentDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: None,
        }
    }

    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}

/// Everything the engine needs to draw one diagram
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Sequence {
    #[serde(default)]
    pub title: Option<String>,
    /// Agents in left-to-right order
    #[serde(default)]
    pub agents: Vec<AgentDecl>,
    #[serde(default)]
    pub stages: Vec<Stage>,
}

impl Sequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a sequence from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, DocumentError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load a sequence from a TOML string
    pub fn from_str(content: &str) -> Result<Self, DocumentError> {
        Ok(toml::from_str(content)?)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_agents<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.agents.extend(names.into_iter().map(AgentDecl::new));
        self
    }

    pub fn with_stage(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_toml_document() {
        let seq = Sequence::from_str(
            r#"
title = "Example"

[[agents]]
name = "A"
label = "Alice"

[[agents]]
name = "B"

[[stages]]
type = "agent-begin"
agents = ["A", "B"]

[[stages]]
type = "connect"
agents = ["A", "B"]
label = "hi"
options = { line = "dash", left = "open" }

[[stages]]
type = "block-end"
"#,
        )
        .expect("Should parse");

        assert_eq!(seq.title.as_deref(), Some("Example"));
        assert_eq!(seq.agents[0].display_label(), "Alice");
        assert_eq!(seq.agents[1].display_label(), "B");
        assert_eq!(seq.stages.len(), 3);
        assert_eq!(
            seq.stages[1],
            Stage::Connect(Connect {
                agents: vec!["A".to_string(), "B".to_string()],
                label: "hi".to_string(),
                options: ConnectOptions {
                    line: LineStyle::Dash,
                    left: ArrowKind::Open,
                    right: ArrowKind::Single,
                },
            })
        );
        assert_eq!(seq.stages[2], Stage::BlockEnd);
    }

    #[test]
    fn test_parallel_nested_stages() {
        let seq = Sequence::from_str(
            r#"
[[stages]]
type = "parallel"

[[stages.stages]]
type = "mark"
name = "here"

[[stages.stages]]
type = "async"
target = "here"
"#,
        )
        .expect("Should parse");

        match &seq.stages[0] {
            Stage::Parallel(p) => assert_eq!(p.stages.len(), 2),
            other => panic!("expected parallel stage, got {:?}", other),
        }
    }

    #[test]
    fn test_note_mode_defaults() {
        let seq = Sequence::from_str(
            r#"
[[stages]]
type = "note-over"
agents = ["A"]
label = "x"
"#,
        )
        .expect("Should parse");
        match &seq.stages[0] {
            Stage::NoteOver(n) => assert_eq!(n.mode, "note"),
            other => panic!("expected note, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_stage_type_is_error() {
        let result = Sequence::from_str(
            r#"
[[stages]]
type = "teleport"
"#,
        );
        assert!(result.is_err());
    }
}
