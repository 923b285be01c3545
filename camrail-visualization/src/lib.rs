//! Walk-through and playback for camrail
//!
//! This crate provides the interactive side of camera paths: the walk-through
//! controller that records keyframes from a live camera, the interpolator that
//! turns them into trajectories, and the playback driver that previews or
//! records those trajectories.

pub mod camera;
pub mod clock;
pub mod config;
pub mod encoder;
pub mod interpolator;
pub mod playback;
pub mod surface;
pub mod timer;
pub mod walk_through;

pub use camera::*;
pub use clock::*;
pub use config::*;
pub use encoder::*;
pub use interpolator::*;
pub use playback::*;
pub use surface::*;
pub use walk_through::*;
