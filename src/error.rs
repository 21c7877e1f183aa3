//! Error types for loading diagram documents

use thiserror::Error;

/// Errors that can occur when reading a sequence document
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Failed to read document: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse document TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::Sequence;

    #[test]
    fn test_parse_error_display() {
        let err = Sequence::from_str("[[stages]]\ntype = 3").unwrap_err();
        assert!(matches!(err, DocumentError::ParseError(_)));
        assert!(err.to_string().starts_with("Failed to parse document TOML"));
    }

    #[test]
    fn test_missing_file() {
        let err = Sequence::from_file(std::path::Path::new("/nonexistent/diagram.toml")).unwrap_err();
        assert!(matches!(err, DocumentError::IoError(_)));
    }
}
