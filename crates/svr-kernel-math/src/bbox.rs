//! Axis-aligned bounding boxes.

use crate::Point3;

/// Axis-aligned bounding box in 3D.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb3 {
    /// Minimum corner.
    pub min: Point3,
    /// Maximum corner.
    pub max: Point3,
}

impl Aabb3 {
    /// Create an AABB from min and max corners.
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// Smallest box enclosing a sphere.
    pub fn around_sphere(center: &Point3, radius: f64) -> Self {
        let r = nalgebra::Vector3::repeat(radius);
        Self {
            min: center - r,
            max: center + r,
        }
    }

    /// Test if a point lies inside or on the boundary of the box.
    pub fn contains(&self, p: &Point3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_around_sphere() {
        let b = Aabb3::around_sphere(&Point3::new(1.0, 2.0, 3.0), 2.0);
        assert_eq!(b.min, Point3::new(-1.0, 0.0, 1.0));
        assert_eq!(b.max, Point3::new(3.0, 4.0, 5.0));
    }

    #[test]
    fn test_contains() {
        let b = Aabb3::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        assert!(b.contains(&Point3::new(0.5, 0.5, 0.5)));
        assert!(b.contains(&Point3::new(1.0, 0.0, 1.0)));
        assert!(!b.contains(&Point3::new(1.5, 0.5, 0.5)));
    }
}
