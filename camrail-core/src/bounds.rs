//! Axis-aligned scene bounds

use crate::pose::{Point3f, Vector3f};
use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box.
///
/// A freshly created box is empty (min > max) until a point or box is added.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point3f,
    pub max: Point3f,
}

impl BoundingBox {
    /// Create an empty box
    pub fn empty() -> Self {
        Self {
            min: Point3f::new(f32::MAX, f32::MAX, f32::MAX),
            max: Point3f::new(f32::MIN, f32::MIN, f32::MIN),
        }
    }

    /// Create a box from two corners
    pub fn new(min: Point3f, max: Point3f) -> Self {
        Self { min, max }
    }

    /// Smallest box containing all the points
    pub fn from_points<'a, I: IntoIterator<Item = &'a Point3f>>(points: I) -> Self {
        let mut bbox = Self::empty();
        for p in points {
            bbox.add_point(p);
        }
        bbox
    }

    /// Check if the box contains at least one point
    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
    }

    /// Grow the box to contain a point
    pub fn add_point(&mut self, p: &Point3f) {
        self.min = self.min.inf(p);
        self.max = self.max.sup(p);
    }

    /// Grow the box to contain another box
    pub fn add_box(&mut self, other: &BoundingBox) {
        if !other.is_valid() {
            return;
        }
        self.add_point(&other.min);
        self.add_point(&other.max);
    }

    /// Union of two boxes
    pub fn union(mut self, other: &BoundingBox) -> Self {
        self.add_box(other);
        self
    }

    pub fn center(&self) -> Point3f {
        nalgebra::center(&self.min, &self.max)
    }

    pub fn diagonal(&self) -> Vector3f {
        self.max - self.min
    }

    /// Radius of the bounding sphere centered at [`BoundingBox::center`]
    pub fn radius(&self) -> f32 {
        if self.is_valid() {
            self.diagonal().norm() * 0.5
        } else {
            0.0
        }
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::empty()
    }
}
