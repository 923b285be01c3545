//! Camera pose types

use nalgebra::{Isometry3, Matrix4, Point3, Translation3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// A 3D point with floating point coordinates
pub type Point3f = Point3<f32>;

/// A 3D vector with floating point components
pub type Vector3f = Vector3<f32>;

/// A unit quaternion with floating point components
pub type Rotation3f = UnitQuaternion<f32>;

/// Position and orientation of a camera in world space.
///
/// The orientation maps camera-local axes to world axes. The camera looks
/// along its local -Z axis with local +Y as its up direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Point3f,
    pub orientation: Rotation3f,
}

impl Pose {
    /// Create a pose from a position and an orientation
    pub fn new(position: Point3f, orientation: Rotation3f) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// The identity pose: at the origin, looking down -Z
    pub fn identity() -> Self {
        Self::new(Point3f::origin(), Rotation3f::identity())
    }

    /// Create a pose at `eye` looking at `target`.
    ///
    /// Falls back to an alternative up axis when `up` is parallel to the
    /// viewing direction. Returns `None` when `eye` and `target` coincide.
    pub fn look_at(eye: Point3f, target: Point3f, up: Vector3f) -> Option<Self> {
        let backward = eye - target;
        if backward.norm_squared() <= f32::EPSILON {
            return None;
        }

        let up = if backward.cross(&up).norm_squared() <= 1e-10 {
            // up is parallel to the view direction
            if backward.cross(&Vector3f::y()).norm_squared() > 1e-10 {
                Vector3f::y()
            } else {
                Vector3f::x()
            }
        } else {
            up
        };

        let orientation = UnitQuaternion::face_towards(&backward, &up);
        Some(Self::new(eye, orientation))
    }

    /// Viewing direction in world space
    pub fn forward(&self) -> Vector3f {
        self.orientation * -Vector3f::z()
    }

    /// Up direction in world space
    pub fn up(&self) -> Vector3f {
        self.orientation * Vector3f::y()
    }

    /// Right direction in world space
    pub fn right(&self) -> Vector3f {
        self.orientation * Vector3f::x()
    }

    /// Camera-to-world rigid transform
    pub fn to_isometry(&self) -> Isometry3<f32> {
        Isometry3::from_parts(Translation3::from(self.position.coords), self.orientation)
    }

    /// World-to-camera (view) matrix
    pub fn view_matrix(&self) -> Matrix4<f32> {
        self.to_isometry().inverse().to_homogeneous()
    }

    /// Check whether two poses match within the given tolerances
    pub fn approx_eq(&self, other: &Pose, position_eps: f32, angle_eps: f32) -> bool {
        (self.position - other.position).norm() <= position_eps
            && self.orientation.angle_to(&other.orientation) <= angle_eps
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

impl From<Isometry3<f32>> for Pose {
    fn from(isometry: Isometry3<f32>) -> Self {
        Self {
            position: Point3f::from(isometry.translation.vector),
            orientation: isometry.rotation,
        }
    }
}

impl From<Pose> for Isometry3<f32> {
    fn from(pose: Pose) -> Self {
        pose.to_isometry()
    }
}
