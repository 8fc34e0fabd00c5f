//! Ray-half-plane intersection (closed-form).
//!
//! Angular section boundaries are half-planes bounded by a rotation axis
//! through the sphere center. Projecting the ray onto the coordinate plane
//! perpendicular to that axis turns each boundary into a half-line from the
//! origin, and the crossing into a 2D line-line intersection.

use svr_kernel_math::{cross2, Point3, Vec2, Vec3};

use crate::Ray;

/// Coordinate plane an angle is measured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AngularPlane {
    /// Angle `atan2(y, x)`, rotation about the z axis.
    Xy,
    /// Angle `atan2(z, x)`, rotation about the y axis.
    Xz,
}

impl AngularPlane {
    /// Drop the component along this plane's rotation axis.
    #[inline]
    pub fn project(&self, v: &Vec3) -> Vec2 {
        match self {
            AngularPlane::Xy => Vec2::new(v.x, v.y),
            AngularPlane::Xz => Vec2::new(v.x, v.z),
        }
    }
}

/// A ray projected onto an [`AngularPlane`], relative to the sphere center.
///
/// The projected direction is not normalized; it shares the ray's parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedRay {
    /// Projected ray origin, relative to the projected center.
    pub origin: Vec2,
    /// Projected ray direction.
    pub direction: Vec2,
}

impl ProjectedRay {
    /// Project `ray` onto `plane` around `center`.
    pub fn new(ray: &Ray, center: &Point3, plane: AngularPlane) -> Self {
        Self {
            origin: plane.project(&(ray.origin - center)),
            direction: plane.project(ray.direction.as_ref()),
        }
    }

    /// Projected position at ray parameter `t`.
    #[inline]
    pub fn at(&self, t: f64) -> Vec2 {
        self.origin + t * self.direction
    }

    /// Signed sweep rate of the line around the axis.
    ///
    /// Positive when the angle increases along the ray, negative when it
    /// decreases, and zero when the projected line runs through the axis.
    /// The sign is the same at every point of the line.
    #[inline]
    pub fn sweep(&self) -> f64 {
        cross2(&self.origin, &self.direction)
    }

    /// Ray parameter of the projected point closest to the axis.
    ///
    /// Meaningless when the projected direction is zero.
    #[inline]
    pub fn t_closest(&self) -> f64 {
        -self.origin.dot(&self.direction) / self.direction.norm_squared()
    }
}

/// Intersect a projected ray with the boundary half-line pointing along the
/// unit vector `boundary`.
///
/// Returns `None` if the projected line is parallel to the boundary or meets
/// its line on the opposite side of the axis.
pub fn intersect_half_plane(ray: &ProjectedRay, boundary: &Vec2) -> Option<f64> {
    let denom = cross2(boundary, &ray.direction);

    // Projected ray is parallel to the boundary
    if denom == 0.0 {
        return None;
    }

    let t = -cross2(boundary, &ray.origin) / denom;
    if !t.is_finite() {
        return None;
    }

    // The line through the axis is crossed twice per turn; only the half
    // the boundary points along counts.
    if ray.at(t).dot(boundary) <= 0.0 {
        return None;
    }

    Some(t)
}
