//! Keyframe file I/O
//!
//! Reads and writes camera paths in the textual `.kf` format: a small header
//! with the timing parameters followed by one keyframe per line.

pub mod keyframe_file;
pub mod error;

pub use error::*;
pub use keyframe_file::*;
