//! Walk-through controller
//!
//! Front-end actions on the camera path go through [`WalkThrough`]: recording
//! keyframes from the live camera, navigating between them, toggling the path
//! display and importing or exporting path files.

use crate::camera::LiveCamera;
use crate::config::WalkThroughConfig;
use crate::interpolator::KeyframeInterpolator;
use camrail_algorithms::Trajectory;
use camrail_core::{
    scene_bounding_box, CameraPath, Drawable, Error, Keyframe, PathChange, Point3f, Pose, Result,
    SubscriptionId, Vector3f,
};
use log::{debug, info, warn};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::ops::RangeInclusive;
use std::path::Path;
use std::sync::Arc;

/// Navigation mode of the walk-through tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WalkStatus {
    /// The tool is inactive; no keyframe can be recorded
    #[default]
    Stopped,
    /// Keyframes capture the camera as it is
    FreeMode,
    /// Keyframes follow a character walking on the ground
    WalkingMode,
}

/// A camera move requested by keyframe navigation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraMove {
    pub index: usize,
    pub pose: Pose,
    /// Glide to the pose instead of snapping
    pub animate: bool,
}

/// Walk-through controller owning the camera path and its interpolator
#[derive(Debug)]
pub struct WalkThrough {
    path: CameraPath,
    interpolator: KeyframeInterpolator,
    status: WalkStatus,
    height_factor: f32,
    third_person_forward_factor: f32,
    character_height_ratio: f32,
    ground_up: Vector3f,
    path_visible: bool,
    tracked_target: Option<Point3f>,
}

impl Default for WalkThrough {
    fn default() -> Self {
        Self {
            path: CameraPath::new(),
            interpolator: KeyframeInterpolator::new(),
            status: WalkStatus::Stopped,
            height_factor: 1.0,
            third_person_forward_factor: 1.0,
            character_height_ratio: 0.1,
            ground_up: Vector3f::z(),
            path_visible: true,
            tracked_target: None,
        }
    }
}

impl WalkThrough {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an active controller from a validated config
    pub fn from_config(config: &WalkThroughConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            interpolator: KeyframeInterpolator::with_params(config.interpolation_params())?,
            status: if config.walking_mode {
                WalkStatus::WalkingMode
            } else {
                WalkStatus::FreeMode
            },
            height_factor: config.height_factor,
            third_person_forward_factor: config.third_person_forward_factor,
            character_height_ratio: config.character_height_ratio,
            path_visible: config.path_visible,
            ..Self::default()
        })
    }

    pub fn path(&self) -> &CameraPath {
        &self.path
    }

    pub fn interpolator(&self) -> &KeyframeInterpolator {
        &self.interpolator
    }

    pub fn interpolator_mut(&mut self) -> &mut KeyframeInterpolator {
        &mut self.interpolator
    }

    /// The trajectory of the current path under the current timing
    pub fn trajectory(&mut self) -> Result<Arc<Trajectory>> {
        self.interpolator.interpolate(&self.path)
    }

    /// Start an interpolation session over the current path
    pub fn start_interpolation(&mut self) -> Result<()> {
        self.interpolator.start_interpolation(&self.path)
    }

    pub fn status(&self) -> WalkStatus {
        self.status
    }

    /// Change the navigation mode. Existing keyframes are kept as they are.
    pub fn set_status(&mut self, status: WalkStatus) {
        if status != self.status {
            debug!("walk-through status: {:?} -> {:?}", self.status, status);
            self.status = status;
        }
    }

    pub fn height_factor(&self) -> f32 {
        self.height_factor
    }

    pub fn set_height_factor(&mut self, factor: f32) -> Result<()> {
        self.height_factor = positive("height factor", factor)?;
        Ok(())
    }

    pub fn third_person_forward_factor(&self) -> f32 {
        self.third_person_forward_factor
    }

    pub fn set_third_person_forward_factor(&mut self, factor: f32) -> Result<()> {
        self.third_person_forward_factor = positive("third person forward factor", factor)?;
        Ok(())
    }

    pub fn character_height_ratio(&self) -> f32 {
        self.character_height_ratio
    }

    pub fn set_character_height_ratio(&mut self, ratio: f32) -> Result<()> {
        self.character_height_ratio = positive("character height ratio", ratio)?;
        Ok(())
    }

    pub fn set_frame_rate(&mut self, frame_rate: u32) -> Result<()> {
        self.interpolator.set_frame_rate(frame_rate)
    }

    pub fn set_interpolation_speed(&mut self, speed: f32) -> Result<()> {
        self.interpolator.set_interpolation_speed(speed)
    }

    /// World up axis; the ground plane is orthogonal to it
    pub fn ground_up(&self) -> Vector3f {
        self.ground_up
    }

    pub fn set_ground_up(&mut self, up: Vector3f) -> Result<()> {
        let up = up
            .try_normalize(f32::EPSILON)
            .ok_or_else(|| Error::InvalidParameter("ground up axis must be non-zero".to_string()))?;
        self.ground_up = up;
        Ok(())
    }

    /// Ground position of the walking character
    pub fn tracked_target(&self) -> Option<Point3f> {
        self.tracked_target
    }

    pub fn set_tracked_target(&mut self, target: Option<Point3f>) {
        self.tracked_target = target;
    }

    /// Height of the character's eyes above the ground for a scene of the given radius
    pub fn character_height(&self, scene_radius: f32) -> f32 {
        self.height_factor * self.character_height_ratio * scene_radius
    }

    /// Third-person camera pose behind a character standing at `target`.
    ///
    /// The eye sits at head height, pulled back along the camera's horizontal
    /// viewing direction, and looks at the character's head.
    pub fn walking_pose(&self, target: Point3f, camera: &dyn LiveCamera) -> Option<Pose> {
        let h = self.character_height(camera.scene_radius());
        let up = self.ground_up;
        let current = camera.pose();

        let horizontal = |v: Vector3f| (v - up * v.dot(&up)).try_normalize(1.0e-6);
        // looking straight down: the screen's up direction points ahead
        let forward_h = horizontal(current.forward()).or_else(|| horizontal(current.up()))?;

        let head = target + up * h;
        let eye = head - forward_h * h * self.third_person_forward_factor;
        Pose::look_at(eye, head, up)
    }

    /// Record a keyframe from the live camera. Returns the new keyframe's index.
    pub fn record_keyframe(&mut self, camera: &dyn LiveCamera) -> Result<usize> {
        let pose = match self.status {
            WalkStatus::Stopped => {
                warn!("cannot add keyframe: the walk-through is not active");
                return Err(Error::InvalidState("walk-through is stopped".to_string()));
            }
            WalkStatus::FreeMode => camera.pose(),
            WalkStatus::WalkingMode => self
                .tracked_target
                .and_then(|target| self.walking_pose(target, camera))
                .unwrap_or_else(|| camera.pose()),
        };
        Ok(self.path.append(pose))
    }

    /// Walk the character to `ground_point`: record the matching keyframe and
    /// put the camera there.
    pub fn walk_to(&mut self, ground_point: Point3f, camera: &mut dyn LiveCamera) -> Result<usize> {
        if self.status != WalkStatus::WalkingMode {
            warn!("walking to a point requires walking mode");
            return Err(Error::InvalidState(format!("cannot walk in {:?}", self.status)));
        }
        self.tracked_target = Some(ground_point);
        let index = self.record_keyframe(camera)?;
        let pose = *self.path.keyframe_at(index)?.pose();
        camera.set_pose(pose);
        Ok(index)
    }

    pub fn delete_last_keyframe(&mut self) -> Option<Keyframe> {
        self.path.delete_last()
    }

    /// Delete every keyframe. Asking for confirmation is up to the caller.
    pub fn delete_path(&mut self) -> usize {
        self.tracked_target = None;
        self.interpolator.rewind();
        self.path.clear()
    }

    pub fn current_keyframe_index(&self) -> Option<usize> {
        self.path.current_index()
    }

    /// Move the cursor to keyframe `index` (clamped) and return the camera move to perform
    pub fn move_to(&mut self, index: usize, animate: bool) -> Option<CameraMove> {
        let index = self.path.move_to(index)?;
        let pose = *self.path.keyframes().get(index)?.pose();
        debug!("moved to keyframe {}", index);
        Some(CameraMove { index, pose, animate })
    }

    /// Step back one keyframe; at rest or at the first keyframe this is the first one
    pub fn previous_keyframe(&mut self, animate: bool) -> Option<CameraMove> {
        let index = self.path.current_index().map_or(0, |i| i.saturating_sub(1));
        self.move_to(index, animate)
    }

    /// Step forward one keyframe; at the last keyframe this stays on it
    pub fn next_keyframe(&mut self, animate: bool) -> Option<CameraMove> {
        let index = self.path.current_index().map_or(0, |i| i + 1);
        self.move_to(index, animate)
    }

    /// Index range for a keyframe slider, `None` when there is nothing to slide over
    pub fn keyframe_range(&self) -> Option<RangeInclusive<usize>> {
        (self.path.len() >= 2).then(|| 0..=self.path.len() - 1)
    }

    pub fn path_visible(&self) -> bool {
        self.path_visible
    }

    /// Show or hide the path and fit the camera's scene sphere.
    ///
    /// Showing grows the scene radius to reach every keyframe; hiding fits the
    /// scene back to the models.
    pub fn set_path_visible(&mut self, visible: bool, camera: &mut dyn LiveCamera, models: &[&dyn Drawable]) {
        self.path_visible = visible;
        if visible {
            self.fit_scene_to_path(camera);
        } else {
            camera.set_scene_bounding_box(&scene_bounding_box(models));
        }
    }

    /// Grow the scene radius until every keyframe lies inside it
    fn fit_scene_to_path(&self, camera: &mut dyn LiveCamera) {
        let center = camera.scene_center();
        let radius = self
            .path
            .positions()
            .map(|p| (p - center).norm())
            .fold(camera.scene_radius(), f32::max);
        if radius > camera.scene_radius() {
            camera.set_scene_radius(radius);
        }
    }

    pub(crate) fn set_path_visible_flag(&mut self, visible: bool) {
        self.path_visible = visible;
    }

    /// Register a "path modified" listener
    pub fn subscribe_path_modified<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&PathChange) + Send + 'static,
    {
        self.path.subscribe(listener)
    }

    pub fn unsubscribe_path_modified(&mut self, id: SubscriptionId) -> bool {
        self.path.unsubscribe(id)
    }

    /// Replace the path and timing with a keyframe file. Returns the number of keyframes.
    ///
    /// Refused while playback runs. When the path is shown, the camera's scene
    /// sphere grows to cover the imported keyframes.
    pub fn import_path<P: AsRef<Path>>(&mut self, file: P, camera: &mut dyn LiveCamera) -> Result<usize> {
        if self.interpolator.is_interpolation_started() {
            warn!("cannot import a camera path during playback");
            return Err(Error::InvalidState("playback is running".to_string()));
        }
        let reader = BufReader::new(File::open(file.as_ref())?);
        self.interpolator.try_read_keyframes(&mut self.path, reader)?;
        self.tracked_target = None;
        if self.path_visible {
            self.fit_scene_to_path(camera);
        }
        info!("{} keyframes loaded", self.path.len());
        Ok(self.path.len())
    }

    /// Write the path and timing to a keyframe file
    pub fn export_path<P: AsRef<Path>>(&self, file: P) -> Result<()> {
        if self.path.is_empty() {
            warn!("nothing can be exported (path is empty)");
            return Err(Error::EmptyPath("export"));
        }
        let writer = BufWriter::new(File::create(file.as_ref())?);
        self.interpolator.try_save_keyframes(&self.path, writer)?;
        info!("keyframes saved to {}", file.as_ref().display());
        Ok(())
    }
}

fn positive(name: &str, value: f32) -> Result<f32> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        warn!("{} must be positive, got {}", name, value);
        Err(Error::InvalidParameter(format!("{} must be positive, got {}", name, value)))
    }
}
