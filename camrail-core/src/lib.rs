//! Core data structures for camrail
//!
//! This crate provides the fundamental types shared by every camrail crate:
//! camera poses, keyframes, the ordered camera path, scene bounding boxes and
//! the synchronous notification primitive used to observe path changes.

pub mod pose;
pub mod keyframe;
pub mod path;
pub mod bounds;
pub mod traits;
pub mod signal;
pub mod error;

pub use pose::*;
pub use keyframe::*;
pub use path::*;
pub use bounds::*;
pub use traits::*;
pub use signal::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point3, Vector3, UnitQuaternion, Quaternion, Isometry3, Matrix4};
