//! Rendering collaborator driven by playback

use crate::camera::LiveCamera;
use camrail_core::Result;
use image::RgbaImage;

/// The viewer surface that shows the live camera.
pub trait RenderSurface {
    /// Ask for a redraw at the host's convenience
    fn request_redraw(&mut self);

    /// Redraw immediately from `camera` and capture the result
    fn render_frame(&mut self, camera: &dyn LiveCamera) -> Result<RgbaImage>;
}
