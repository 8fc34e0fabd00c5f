//! Ray-sphere intersection (quadratic equation).

use svr_kernel_math::Point3;

use crate::Ray;

/// Which root of the ray-shell quadratic to take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Leg {
    /// Distance to the center is decreasing (the smaller root).
    Inbound,
    /// Distance to the center is increasing (the larger root).
    Outbound,
}

/// Closest-approach geometry of a ray's line relative to a sphere center.
///
/// Every concentric shell crossing is solved from these two numbers, so they
/// are computed once per traversal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadialProfile {
    /// Ray parameter of the point closest to the center.
    pub t_closest: f64,
    /// Squared distance from the center to the ray's line.
    pub perp_sq: f64,
}

impl RadialProfile {
    /// Compute the profile of `ray` relative to `center`.
    pub fn new(ray: &Ray, center: &Point3) -> Self {
        let to_center = center - ray.origin;
        let d = ray.direction.as_ref();
        let t_closest = to_center.dot(d);
        // Taking the rejection directly avoids the cancellation in
        // |oc|^2 - (oc.d)^2 for far-away origins.
        let perp = to_center - t_closest * d;
        Self {
            t_closest,
            perp_sq: perp.norm_squared(),
        }
    }

    /// Squared distance from the center at ray parameter `t`.
    #[inline]
    pub fn distance_sq_at(&self, t: f64) -> f64 {
        let dt = t - self.t_closest;
        self.perp_sq + dt * dt
    }

    /// Ray parameter where the line crosses the shell of squared radius
    /// `radius_sq` on the given leg.
    ///
    /// Returns `None` if the line misses the shell or only touches it.
    #[inline]
    pub fn shell_crossing(&self, radius_sq: f64, leg: Leg) -> Option<f64> {
        // Quadratic: |oc + t*d|^2 = r^2 with |d| = 1 has roots
        // t_closest -/+ sqrt(r^2 - perp^2).
        let half_chord_sq = radius_sq - self.perp_sq;
        if half_chord_sq <= 0.0 {
            return None;
        }
        let half_chord = half_chord_sq.sqrt();
        Some(match leg {
            Leg::Inbound => self.t_closest - half_chord,
            Leg::Outbound => self.t_closest + half_chord,
        })
    }
}

/// Ray parameters at which a ray's line enters and leaves a sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereInterval {
    /// Entry parameter (may be negative when the origin is inside).
    pub t_entry: f64,
    /// Exit parameter.
    pub t_exit: f64,
}

/// Intersect a ray's line with a sphere.
///
/// Unlike a surface hit test this keeps roots behind the origin, since the
/// caller clips against its own time window. Tangent lines count as misses:
/// they spend zero time inside the sphere.
pub fn intersect_sphere(ray: &Ray, center: &Point3, radius: f64) -> Option<SphereInterval> {
    let profile = RadialProfile::new(ray, center);
    let radius_sq = radius * radius;
    let t_entry = profile.shell_crossing(radius_sq, Leg::Inbound)?;
    let t_exit = profile.shell_crossing(radius_sq, Leg::Outbound)?;
    Some(SphereInterval { t_entry, t_exit })
}
