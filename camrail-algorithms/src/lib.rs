//! Trajectory algorithms for camrail
//!
//! Turns the discrete keyframes of a camera path into a smooth, sampled
//! camera trajectory.

pub mod spline;
pub mod trajectory;

pub use spline::*;
pub use trajectory::*;
