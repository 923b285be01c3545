//! Camera utilities for walk-through playback

use camrail_core::{BoundingBox, Point3f, Pose, Vector3f};
use nalgebra::{Matrix4, Perspective3, Point2, Unit, UnitQuaternion};

/// The live viewer camera that walk-through and playback drive.
///
/// Besides its pose the camera knows the scene sphere it frames, which the
/// walk-through uses to size the character and to keep the path in view.
pub trait LiveCamera {
    /// Current camera pose
    fn pose(&self) -> Pose;

    /// Move the camera to `pose`
    fn set_pose(&mut self, pose: Pose);

    /// Center of the scene sphere
    fn scene_center(&self) -> Point3f;

    /// Radius of the scene sphere
    fn scene_radius(&self) -> f32;

    fn set_scene_radius(&mut self, radius: f32);

    /// Fit the scene sphere to a bounding box
    fn set_scene_bounding_box(&mut self, bbox: &BoundingBox);
}

/// A perspective camera framing a scene sphere
#[derive(Debug, Clone)]
pub struct Camera {
    pub pose: Pose,
    /// World up axis used for orbiting
    pub world_up: Vector3f,
    pub fov: f32,
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
    scene_center: Point3f,
    scene_radius: f32,
}

impl Camera {
    /// Create a new camera
    pub fn new(pose: Pose, fov: f32, aspect_ratio: f32, near: f32, far: f32) -> Self {
        Self {
            pose,
            world_up: Vector3f::z(),
            fov,
            aspect_ratio,
            near,
            far,
            scene_center: Point3f::origin(),
            scene_radius: 1.0,
        }
    }

    /// Create a camera at `eye` looking at `target`
    pub fn looking_at(eye: Point3f, target: Point3f, up: Vector3f) -> Option<Self> {
        let pose = Pose::look_at(eye, target, up)?;
        let mut camera = Self {
            pose,
            world_up: up,
            ..Self::default()
        };
        camera.scene_center = target;
        Some(camera)
    }

    /// Get the view matrix
    pub fn view_matrix(&self) -> Matrix4<f32> {
        self.pose.view_matrix()
    }

    /// Get the projection matrix
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        let perspective = Perspective3::new(self.aspect_ratio, self.fov, self.near, self.far);
        perspective.into_inner()
    }

    /// Project a world point to normalized device coordinates.
    /// Returns `None` for points behind the camera or outside the view volume.
    pub fn project(&self, point: &Point3f) -> Option<Point2<f32>> {
        let clip = self.projection_matrix() * self.view_matrix() * point.to_homogeneous();
        if clip.w <= 0.0 {
            return None;
        }
        let ndc = clip.xyz() / clip.w;
        if ndc.iter().any(|v| v.abs() > 1.0) {
            return None;
        }
        Some(Point2::new(ndc.x, ndc.y))
    }

    /// Move the camera along its viewing direction
    pub fn move_forward(&mut self, distance: f32) {
        self.pose.position += self.pose.forward() * distance;
    }

    /// Rotate the camera around the scene center
    pub fn orbit(&mut self, horizontal: f32, vertical: f32) {
        let yaw = UnitQuaternion::from_axis_angle(&Unit::new_normalize(self.world_up), horizontal);
        let pitch = UnitQuaternion::from_axis_angle(&Unit::new_normalize(self.pose.right()), vertical);
        let rotation = yaw * pitch;

        let offset = self.pose.position - self.scene_center;
        self.pose.position = self.scene_center + rotation * offset;
        self.pose.orientation = rotation * self.pose.orientation;
    }
}

impl LiveCamera for Camera {
    fn pose(&self) -> Pose {
        self.pose
    }

    fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
    }

    fn scene_center(&self) -> Point3f {
        self.scene_center
    }

    fn scene_radius(&self) -> f32 {
        self.scene_radius
    }

    fn set_scene_radius(&mut self, radius: f32) {
        self.scene_radius = radius;
    }

    fn set_scene_bounding_box(&mut self, bbox: &BoundingBox) {
        if bbox.is_valid() {
            self.scene_center = bbox.center();
            self.scene_radius = bbox.radius();
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(
            Pose::new(Point3f::new(0.0, 0.0, 5.0), Default::default()),
            std::f32::consts::FRAC_PI_4,
            16.0 / 9.0,
            0.1,
            100.0,
        )
    }
}
