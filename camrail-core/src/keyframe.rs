//! Keyframe type

use crate::pose::{Point3f, Pose, Rotation3f};
use serde::{Deserialize, Serialize};

/// A recorded camera pose anchoring a camera path.
///
/// Keyframes are immutable once created; the path replaces or drops them
/// but never edits one in place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pose: Pose,
}

impl Keyframe {
    /// Create a keyframe from a camera pose
    pub fn new(pose: Pose) -> Self {
        Self { pose }
    }

    /// Create a keyframe from a position and an orientation
    pub fn from_parts(position: Point3f, orientation: Rotation3f) -> Self {
        Self::new(Pose::new(position, orientation))
    }

    /// The recorded pose
    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    /// The recorded camera position
    pub fn position(&self) -> Point3f {
        self.pose.position
    }

    /// The recorded camera orientation
    pub fn orientation(&self) -> Rotation3f {
        self.pose.orientation
    }
}

impl From<Pose> for Keyframe {
    fn from(pose: Pose) -> Self {
        Self::new(pose)
    }
}
