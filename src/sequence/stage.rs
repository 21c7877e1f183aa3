//! Stage types: the ordered diagram actions consumed by the layout engine

use std::fmt;

use serde::Deserialize;

/// How an agent's lifeline starts or ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapMode {
    /// Labelled box
    #[default]
    Box,
    /// X mark (end caps only; drawn as a bar when used to begin)
    Cross,
    /// Thick horizontal bar
    Bar,
    /// Nothing drawn
    None,
}

/// Line style of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    #[default]
    Solid,
    Dash,
}

/// Arrowhead drawn at one end of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrowKind {
    #[default]
    None,
    /// Filled triangle
    Single,
    /// Two open strokes
    Open,
}

/// Which side of its agent a side note sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    #[default]
    Right,
}

fn default_note_mode() -> String {
    crate::theme::DEFAULT_NOTE_MODE.to_string()
}

fn default_block_mode() -> String {
    crate::theme::DEFAULT_BLOCK_MODE.to_string()
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AgentCaps {
    pub agents: Vec<String>,
    #[serde(default)]
    pub mode: CapMode,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AgentHighlight {
    pub agents: Vec<String>,
    pub highlighted: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConnectOptions {
    #[serde(default)]
    pub line: LineStyle,
    #[serde(default)]
    pub left: ArrowKind,
    #[serde(default = "default_right_arrow")]
    pub right: ArrowKind,
}

fn default_right_arrow() -> ArrowKind {
    ArrowKind::Single
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            line: LineStyle::Solid,
            left: ArrowKind::None,
            right: default_right_arrow(),
        }
    }
}

/// A message from `agents[0]` to `agents[1]`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Connect {
    pub agents: Vec<String>,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub options: ConnectOptions,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Note {
    pub agents: Vec<String>,
    #[serde(default = "default_note_mode")]
    pub mode: String,
    #[serde(default)]
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SideNote {
    pub agents: Vec<String>,
    #[serde(default = "default_note_mode")]
    pub mode: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub side: Side,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BlockBegin {
    #[serde(default = "default_block_mode")]
    pub mode: String,
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub label: String,
    /// Leftmost agent enclosed by the block
    pub left: String,
    /// Rightmost agent enclosed by the block
    pub right: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BlockSplit {
    #[serde(default = "default_block_mode")]
    pub mode: String,
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Mark {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Async {
    #[serde(default)]
    pub target: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LabelPatternStage {
    pub pattern: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Parallel {
    pub stages: Vec<Stage>,
}

/// One diagram action
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Stage {
    AgentBegin(AgentCaps),
    AgentEnd(AgentCaps),
    AgentHighlight(AgentHighlight),
    Connect(Connect),
    NoteOver(Note),
    NoteSide(SideNote),
    NoteBetween(Note),
    BlockBegin(BlockBegin),
    BlockSplit(BlockSplit),
    BlockEnd,
    Mark(Mark),
    Async(Async),
    LabelPattern(LabelPatternStage),
    Parallel(Parallel),
}

/// Stage discriminant, used as the component registry key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StageKind {
    AgentBegin,
    AgentEnd,
    AgentHighlight,
    Connect,
    NoteOver,
    NoteSide,
    NoteBetween,
    BlockBegin,
    BlockSplit,
    BlockEnd,
    Mark,
    Async,
    LabelPattern,
    Parallel,
}

impl StageKind {
    pub const ALL: [StageKind; 14] = [
        StageKind::AgentBegin,
        StageKind::AgentEnd,
        StageKind::AgentHighlight,
        StageKind::Connect,
        StageKind::NoteOver,
        StageKind::NoteSide,
        StageKind::NoteBetween,
        StageKind::BlockBegin,
        StageKind::BlockSplit,
        StageKind::BlockEnd,
        StageKind::Mark,
        StageKind::Async,
        StageKind::LabelPattern,
        StageKind::Parallel,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StageKind::AgentBegin => "agent-begin",
            StageKind::AgentEnd => "agent-end",
            StageKind::AgentHighlight => "agent-highlight",
            StageKind::Connect => "connect",
            StageKind::NoteOver => "note-over",
            StageKind::NoteSide => "note-side",
            StageKind::NoteBetween => "note-between",
            StageKind::BlockBegin => "block-begin",
            StageKind::BlockSplit => "block-split",
            StageKind::BlockEnd => "block-end",
            StageKind::Mark => "mark",
            StageKind::Async => "async",
            StageKind::LabelPattern => "label-pattern",
            StageKind::Parallel => "parallel",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Stage {
    pub fn kind(&self) -> StageKind {
        match self {
            Stage::AgentBegin(_) => StageKind::AgentBegin,
            Stage::AgentEnd(_) => StageKind::AgentEnd,
            Stage::AgentHighlight(_) => StageKind::AgentHighlight,
            Stage::Connect(_) => StageKind::Connect,
            Stage::NoteOver(_) => StageKind::NoteOver,
            Stage::NoteSide(_) => StageKind::NoteSide,
            Stage::NoteBetween(_) => StageKind::NoteBetween,
            Stage::BlockBegin(_) => StageKind::BlockBegin,
            Stage::BlockSplit(_) => StageKind::BlockSplit,
            Stage::BlockEnd => StageKind::BlockEnd,
            Stage::Mark(_) => StageKind::Mark,
            Stage::Async(_) => StageKind::Async,
            Stage::LabelPattern(_) => StageKind::LabelPattern,
            Stage::Parallel(_) => StageKind::Parallel,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names_are_kebab_case() {
        assert_eq!(StageKind::NoteBetween.to_string(), "note-between");
        assert_eq!(Stage::BlockEnd.kind(), StageKind::BlockEnd);
    }
}
