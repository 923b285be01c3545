//! Error types for camrail

use thiserror::Error;

/// Main error type for camrail operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("camera path is empty: nothing to {0}")]
    EmptyPath(&'static str),

    #[error("keyframe index {index} out of range (path has {len} keyframes)")]
    OutOfRange { index: usize, len: usize },

    #[error("malformed keyframe file (line {line}): {message}")]
    MalformedFile { line: usize, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Config error: {0}")]
    Config(String),
}

/// Result type alias for camrail operations
pub type Result<T> = std::result::Result<T, Error>;
