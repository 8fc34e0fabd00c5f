#![warn(missing_docs)]

//! Math types for the spherical voxel traversal kernel.
//!
//! Thin wrappers around nalgebra providing the value types the traversal
//! works with: points, vectors, unit directions, axis-aligned boxes,
//! angle normalization, and tolerance constants.

use nalgebra::{Unit, Vector2, Vector3};

mod bbox;

pub use bbox::Aabb3;

/// A full turn in radians.
pub const TAU: f64 = std::f64::consts::TAU;

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A unit (normalized) direction vector in 3D space.
pub type Dir3 = Unit<Vector3<f64>>;

/// A vector in 2D space.
pub type Vec2 = Vector2<f64>;

/// Map an angle in radians onto `[0, 2π)`.
#[inline]
pub fn normalize_angle(angle: f64) -> f64 {
    let a = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if a >= TAU {
        0.0
    } else {
        a
    }
}

/// Signed area of the parallelogram spanned by `a` and `b` (the z component
/// of their 3D cross product).
#[inline]
pub fn cross2(a: &Vec2, b: &Vec2) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Tolerance constants for traversal comparisons.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tolerance {
    /// Relative tolerance under which two ray parameters count as the same
    /// instant.
    pub time: f64,
    /// Relative tolerance under which a projected ray is treated as running
    /// through, or parallel to, a rotation axis.
    pub axis: f64,
    /// Angular tolerance in radians.
    pub angular: f64,
}

impl Tolerance {
    /// Default tolerances (1e-12 relative time and axis, 1e-9 rad angular).
    pub const DEFAULT: Self = Self {
        time: 1e-12,
        axis: 1e-12,
        angular: 1e-9,
    };

    /// Check if two ray parameters are the same instant.
    ///
    /// The comparison is relative to the larger magnitude, with an absolute
    /// floor of `time` near zero.
    pub fn times_equal(&self, a: f64, b: f64) -> bool {
        (a - b).abs() <= self.time * a.abs().max(b.abs()).max(1.0)
    }

    /// Check if a 2D cross product is negligible relative to the lengths of
    /// its operands.
    pub fn is_axis_degenerate(&self, cross: f64, len_a: f64, len_b: f64) -> bool {
        cross.abs() <= self.axis * len_a * len_b
    }

    /// Check if two angles are effectively equal (in radians).
    pub fn angles_equal(&self, a: f64, b: f64) -> bool {
        (a - b).abs() < self.angular
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}
