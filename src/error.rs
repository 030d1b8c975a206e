//! Error types for namebook.
//!
//! Errors are strongly typed using thiserror. Most of the pipeline is
//! infallible by construction: malformed records are skipped and ambiguous
//! conflicts are left unresolved. What remains fallible is parsing at the
//! edges, store access, extraction, and artifact I/O.

use std::path::PathBuf;

use thiserror::Error;

use crate::extraction::StorageError;

/// Errors raised while parsing loosely structured input text.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("No JSON {expected} found in input")]
    MissingBody {
        expected: &'static str,
    },

    #[error("Malformed JSON: {message}")]
    MalformedJson {
        message: String,
    },

    #[error("Element {index} is missing required field '{field}'")]
    MissingField {
        index: usize,
        field: &'static str,
    },
}

impl From<serde_json::Error> for ParseError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedJson {
            message: err.to_string(),
        }
    }
}

/// Errors raised by the composite-name parser.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SegmentError {
    #[error("Unclosed '{open}' at character {position}")]
    Unclosed {
        open: char,
        position: usize,
    },

    #[error("Unexpected '{close}' at character {position}")]
    UnexpectedClose {
        close: char,
        position: usize,
    },

    #[error("Name segment is empty")]
    Empty,
}

/// Errors raised by an [`Extractor`](crate::extraction::Extractor).
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Extractor failed: {message}")]
    Failed {
        message: String,
    },

    #[error("Extraction pool is disconnected")]
    Disconnected,

    #[error("Extraction queue is full (capacity {capacity})")]
    QueueFull {
        capacity: usize,
    },
}

impl ExtractionError {
    /// Creates a generic extractor failure.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }
}

/// Top-level error type for namebook.
#[derive(Debug, Error)]
pub enum NamebookError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Name segment error: {0}")]
    Segment(#[from] SegmentError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Artifact error at {path}: {source}")]
    Artifact {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl NamebookError {
    /// Wraps an I/O failure on an artifact file.
    #[must_use]
    pub fn artifact(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Artifact {
            path: path.into(),
            source,
        }
    }

    /// Returns true if this is a parse error.
    #[must_use]
    pub const fn is_parse(&self) -> bool {
        matches!(self, Self::Parse(_))
    }

    /// Returns true if this is a storage error.
    #[must_use]
    pub const fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}

/// Result type alias for namebook operations.
pub type NamebookResult<T> = Result<T, NamebookError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_missing_field() {
        let err = ParseError::MissingField { index: 2, field: "name" };
        let msg = format!("{err}");
        assert!(msg.contains("Element 2"));
        assert!(msg.contains("'name'"));
    }

    #[test]
    fn test_parse_error_from_serde() {
        let serde_err = serde_json::from_str::<Vec<u8>>("[1,").unwrap_err();
        let err: ParseError = serde_err.into();
        assert!(matches!(err, ParseError::MalformedJson { .. }));
    }

    #[test]
    fn test_segment_error_display() {
        let err = SegmentError::Unclosed { open: '《', position: 3 };
        assert!(err.to_string().contains('《'));
        assert!(err.to_string().contains('3'));
    }

    #[test]
    fn test_namebook_error_from_parse() {
        let err: NamebookError = ParseError::MissingBody { expected: "array" }.into();
        assert!(err.is_parse());
        assert!(!err.is_storage());
    }

    #[test]
    fn test_namebook_error_from_storage() {
        let err: NamebookError = StorageError::BackendError("poisoned".to_string()).into();
        assert!(err.is_storage());
        assert!(err.to_string().contains("poisoned"));
    }

    #[test]
    fn test_artifact_error_mentions_path() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = NamebookError::artifact("out/names_raw.json", io);
        assert!(err.to_string().contains("names_raw.json"));
    }
}
