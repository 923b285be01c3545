//! Core traits for camrail

use crate::{bounds::BoundingBox, pose::Point3f};

/// Trait for drawable objects loaded in a viewer (models, point sets, ...)
pub trait Drawable {
    /// Get the bounding box of the object
    fn bounding_box(&self) -> BoundingBox;

    /// Get the center point of the object
    fn center(&self) -> Point3f {
        self.bounding_box().center()
    }
}

impl Drawable for BoundingBox {
    fn bounding_box(&self) -> BoundingBox {
        *self
    }
}

impl Drawable for Vec<Point3f> {
    fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(self.iter())
    }
}

/// Union of the bounding boxes of a model collection
pub fn scene_bounding_box(models: &[&dyn Drawable]) -> BoundingBox {
    models
        .iter()
        .fold(BoundingBox::empty(), |acc, m| acc.union(&m.bounding_box()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_bounding_box() {
        let cloud = vec![Point3f::new(0.0, 0.0, 0.0), Point3f::new(1.0, 1.0, 1.0)];
        let bbox = BoundingBox::new(Point3f::new(-2.0, 0.0, 0.0), Point3f::new(0.0, 0.5, 3.0));

        let scene = scene_bounding_box(&[&cloud, &bbox]);
        assert_eq!(scene.min, Point3f::new(-2.0, 0.0, 0.0));
        assert_eq!(scene.max, Point3f::new(1.0, 1.0, 3.0));
        assert_eq!(cloud.center(), Point3f::new(0.5, 0.5, 0.5));
    }

    #[test]
    fn test_scene_bounding_box_no_models() {
        assert!(!scene_bounding_box(&[]).is_valid());
    }
}
