//! Error types for the layout engine

use thiserror::Error;

use crate::sequence::StageKind;

/// Errors that abort a layout
#[derive(Debug, Error)]
pub enum LayoutError {
    /// A block split or end with no open block
    #[error("stage {index}: {kind} without a matching block-begin")]
    UnmatchedBlock { index: usize, kind: StageKind },

    /// A block begun but never ended
    #[error("stage {index}: block-begin is never closed")]
    UnterminatedBlock { index: usize },

    /// No component registered for a stage's kind
    #[error("stage {index}: no component registered for '{kind}'")]
    MissingComponent { index: usize, kind: StageKind },

    /// The theme has no style bundle for a mode, not even the default one
    #[error("stage {index}: theme has no {kind} style for mode '{mode}'")]
    MissingStyle {
        index: usize,
        kind: StageKind,
        mode: String,
    },
}

impl LayoutError {
    /// Create an unmatched block error
    pub fn unmatched(index: usize, kind: StageKind) -> Self {
        Self::UnmatchedBlock { index, kind }
    }

    /// Create an unterminated block error
    pub fn unterminated(index: usize) -> Self {
        Self::UnterminatedBlock { index }
    }

    /// Create a missing component error
    pub fn missing_component(index: usize, kind: StageKind) -> Self {
        Self::MissingComponent { index, kind }
    }

    /// Create a missing style error
    pub fn missing_style(index: usize, kind: StageKind, mode: impl Into<String>) -> Self {
        Self::MissingStyle {
            index,
            kind,
            mode: mode.into(),
        }
    }

    /// Index of the stage that caused the error
    pub fn stage_index(&self) -> usize {
        match self {
            Self::UnmatchedBlock { index, .. }
            | Self::UnterminatedBlock { index }
            | Self::MissingComponent { index, .. }
            | Self::MissingStyle { index, .. } => *index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unmatched_block_display() {
        let err = LayoutError::unmatched(4, StageKind::BlockEnd);
        assert_eq!(
            err.to_string(),
            "stage 4: block-end without a matching block-begin"
        );
        assert_eq!(err.stage_index(), 4);
    }

    #[test]
    fn test_missing_component_display() {
        let err = LayoutError::missing_component(0, StageKind::Connect);
        assert!(err.to_string().contains("'connect'"));
    }

    #[test]
    fn test_missing_style_display() {
        let err = LayoutError::missing_style(2, StageKind::NoteOver, "fancy");
        assert!(err.to_string().contains("mode 'fancy'"));
        assert_eq!(err.stage_index(), 2);
    }
}
