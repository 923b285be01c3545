//! Error types for keyframe file I/O

use thiserror::Error;

/// Errors that can occur while reading or writing keyframe files
#[derive(Error, Debug)]
pub enum IoError {
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("missing header field `{field}`")]
    MissingHeader { field: &'static str },

    #[error("expected {expected} keyframes, found {found}")]
    CountMismatch { expected: usize, found: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IoError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}

impl From<IoError> for camrail_core::Error {
    fn from(err: IoError) -> Self {
        match err {
            IoError::Parse { line, message } => camrail_core::Error::MalformedFile { line, message },
            IoError::MissingHeader { .. } | IoError::CountMismatch { .. } => camrail_core::Error::MalformedFile {
                line: 0,
                message: err.to_string(),
            },
            IoError::Io(e) => camrail_core::Error::Io(e),
        }
    }
}
