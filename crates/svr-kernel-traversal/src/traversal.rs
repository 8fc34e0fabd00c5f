//! Ray traversal through a spherical voxel grid.
//!
//! # Algorithm
//!
//! The ray is clipped to the sphere and to the caller's time window, then
//! each of the three index families is tracked by its own axis state:
//!
//! - the radial axis walks inward shell by shell until the line can no
//!   longer reach the next inner shell, then outward; the switch happens
//!   once, at the closest approach to the center;
//! - each angular axis sweeps monotonically in one direction, fixed by the
//!   sign of the projected ray's sweep rate about its rotation axis.
//!
//! Every iteration asks each axis for the ray parameter of its next boundary
//! crossing, emits the current voxel, and advances every axis whose crossing
//! is the earliest. Axes that cross at the same instant advance together, so
//! grid corners do not produce zero-length voxels.
//!
//! # Degenerate rays
//!
//! A projected ray with no length (the ray is parallel to the rotation axis)
//! never changes that angle. A projected ray through the axis keeps its angle
//! until the axis crossing and then jumps straight to the sector holding its
//! direction of travel. This jump is the only angular transition that can
//! skip sectors, and it happens at most once per angular axis.

use svr_kernel_math::Tolerance;

use crate::grid::AngularSections;
use crate::intersect::{
    intersect_half_plane, intersect_sphere, AngularPlane, Leg, ProjectedRay, RadialProfile,
    SphereInterval,
};
use crate::{Ray, SphericalVoxel, SphericalVoxelGrid, TraversalSettings};

/// Voxels hit by `ray` from its origin up to `max_t`, with default settings.
///
/// `max_t` is unitized against the sphere exit: the ray is walked over
/// `[0, max_t * t_exit]`, where `t_exit` is the parameter at which it leaves
/// the sphere. `1.0` walks to the exit, larger values are clipped to it and
/// values `<= 0` produce no voxels.
///
/// # Example
///
/// ```
/// use svr_kernel_traversal::{walk_spherical_volume, Ray, SphereBound, SphericalVoxelGrid};
/// use svr_kernel_math::{Point3, Vec3, TAU};
///
/// let grid = SphericalVoxelGrid::new(
///     SphereBound::new(0.0, 0.0, 0.0),
///     SphereBound::new(10.0, TAU, TAU),
///     4,
///     8,
///     8,
///     Point3::origin(),
/// )
/// .unwrap();
/// let ray = Ray::new(Point3::new(-15.0, 0.5, 0.5), Vec3::new(1.0, 0.0, 0.0));
/// let voxels = walk_spherical_volume(&ray, &grid, 1.0);
/// assert_eq!(voxels.first().unwrap().radial, 1);
/// assert_eq!(voxels.last().unwrap().radial, 1);
/// ```
pub fn walk_spherical_volume(
    ray: &Ray,
    grid: &SphericalVoxelGrid,
    max_t: f64,
) -> Vec<SphericalVoxel> {
    walk_spherical_volume_with(ray, grid, max_t, &TraversalSettings::default())
}

/// [`walk_spherical_volume`] with explicit settings.
///
/// Settings that fail [`TraversalSettings::validate`] produce no voxels.
pub fn walk_spherical_volume_with(
    ray: &Ray,
    grid: &SphericalVoxelGrid,
    max_t: f64,
    settings: &TraversalSettings,
) -> Vec<SphericalVoxel> {
    if !(max_t > 0.0) {
        tracing::trace!(max_t, "non-positive time limit");
        return Vec::new();
    }
    let Some(hit) = intersect_sphere(ray, grid.sphere_center(), grid.sphere_max_radius()) else {
        tracing::trace!("ray misses sphere");
        return Vec::new();
    };
    if hit.t_exit <= 0.0 {
        tracing::trace!("sphere lies behind ray origin");
        return Vec::new();
    }
    let t_end = (max_t * hit.t_exit).min(hit.t_exit);
    traverse(ray, grid, hit, 0.0, t_end, settings)
}

/// Voxels hit by `ray` between the ray parameters `t_begin` and `t_end`,
/// with default settings.
///
/// For grids built with [`SphericalVoxelGrid::from_box`] the window is also
/// clipped to the bounding box, which only admits `t >= 0`.
pub fn spherical_coordinate_voxel_traversal(
    ray: &Ray,
    grid: &SphericalVoxelGrid,
    t_begin: f64,
    t_end: f64,
) -> Vec<SphericalVoxel> {
    spherical_coordinate_voxel_traversal_with(
        ray,
        grid,
        t_begin,
        t_end,
        &TraversalSettings::default(),
    )
}

/// [`spherical_coordinate_voxel_traversal`] with explicit settings.
///
/// Settings that fail [`TraversalSettings::validate`] produce no voxels.
pub fn spherical_coordinate_voxel_traversal_with(
    ray: &Ray,
    grid: &SphericalVoxelGrid,
    t_begin: f64,
    t_end: f64,
    settings: &TraversalSettings,
) -> Vec<SphericalVoxel> {
    if t_begin.is_nan() || t_end.is_nan() {
        return Vec::new();
    }
    let (mut t_begin, mut t_end) = (t_begin, t_end);
    if let Some(bbox) = grid.bounding_box() {
        let Some((box_entry, box_exit)) = ray.intersect_aabb(bbox) else {
            tracing::trace!("ray misses bounding box");
            return Vec::new();
        };
        t_begin = t_begin.max(box_entry);
        t_end = t_end.min(box_exit);
    }
    let Some(hit) = intersect_sphere(ray, grid.sphere_center(), grid.sphere_max_radius()) else {
        tracing::trace!("ray misses sphere");
        return Vec::new();
    };
    traverse(ray, grid, hit, t_begin, t_end, settings)
}

/// Shared stepping loop over `[t_begin, t_end]` clipped to `hit`.
#[tracing::instrument(level = "trace", skip_all)]
fn traverse(
    ray: &Ray,
    grid: &SphericalVoxelGrid,
    hit: SphereInterval,
    t_begin: f64,
    t_end: f64,
    settings: &TraversalSettings,
) -> Vec<SphericalVoxel> {
    if let Err(err) = settings.validate() {
        tracing::warn!(%err, "rejecting traversal with invalid settings");
        return Vec::new();
    }

    let t_start = hit.t_entry.max(t_begin);
    let t_stop = hit.t_exit.min(t_end);
    if !(t_start < t_stop) {
        tracing::trace!(t_start, t_stop, "time window misses sphere");
        return Vec::new();
    }

    let tol = &settings.tolerance;
    let center = grid.sphere_center();
    let entering = hit.t_entry >= t_begin;

    let mut radial = RadialAxis::new(ray, grid, t_start, entering);
    let mut polar = AngularAxis::new(
        ProjectedRay::new(ray, center, AngularPlane::Xy),
        grid.polar_sections(),
        t_start,
        tol,
    );
    let mut azimuthal = AngularAxis::new(
        ProjectedRay::new(ray, center, AngularPlane::Xz),
        grid.azimuthal_sections(),
        t_start,
        tol,
    );

    // An origin on a boundary belongs to the section it moves into.
    radial.settle(t_start, tol);
    polar.settle(t_start, tol);
    azimuthal.settle(t_start, tol);

    let mut voxels = Vec::new();
    let limit = settings.step_limit(grid);
    for _ in 0..limit {
        let current = SphericalVoxel::new(radial.shell, polar.section, azimuthal.section);
        let radial_next = radial.next_crossing();
        let polar_next = polar.next_crossing();
        let azimuthal_next = azimuthal.next_crossing();

        let t_next = [
            radial_next.map(|(t, _)| t),
            polar_next.map(|(t, _)| t),
            azimuthal_next.map(|(t, _)| t),
        ]
        .into_iter()
        .flatten()
        .fold(f64::INFINITY, f64::min);

        push_voxel(&mut voxels, current);
        if !(t_next < t_stop) {
            return voxels;
        }

        if let Some((t, leg)) = radial_next {
            if tol.times_equal(t, t_next) {
                radial.advance(leg);
            }
        }
        if let Some((t, section)) = polar_next {
            if tol.times_equal(t, t_next) {
                polar.advance(section);
            }
        }
        if let Some((t, section)) = azimuthal_next {
            if tol.times_equal(t, t_next) {
                azimuthal.advance(section);
            }
        }
    }

    tracing::warn!(
        steps = limit,
        "traversal reached its step limit; returning a partial voxel sequence"
    );
    push_voxel(
        &mut voxels,
        SphericalVoxel::new(radial.shell, polar.section, azimuthal.section),
    );
    voxels
}

fn push_voxel(voxels: &mut Vec<SphericalVoxel>, voxel: SphericalVoxel) {
    if voxels.last() != Some(&voxel) {
        voxels.push(voxel);
    }
}

/// Radial shell tracking.
#[derive(Debug, Clone, Copy)]
struct RadialAxis<'a> {
    grid: &'a SphericalVoxelGrid,
    profile: RadialProfile,
    shell: usize,
    leg: Leg,
}

impl<'a> RadialAxis<'a> {
    fn new(ray: &Ray, grid: &'a SphericalVoxelGrid, t_start: f64, entering: bool) -> Self {
        let profile = RadialProfile::new(ray, grid.sphere_center());
        // Entering through the surface always lands in the outermost shell,
        // whatever rounding says about the entry point.
        let shell = if entering {
            1
        } else {
            grid.radial_section(profile.distance_sq_at(t_start).sqrt())
        };
        let leg = if t_start < profile.t_closest {
            Leg::Inbound
        } else {
            Leg::Outbound
        };
        Self {
            grid,
            profile,
            shell,
            leg,
        }
    }

    fn next_crossing(&self) -> Option<(f64, Leg)> {
        if self.leg == Leg::Inbound && self.shell < self.grid.num_radial_sections() {
            let inner_sq = self.grid.shell_inner_radius_sq(self.shell);
            if let Some(t) = self.profile.shell_crossing(inner_sq, Leg::Inbound) {
                return Some((t, Leg::Inbound));
            }
        }
        // The line turns around inside this shell, or is already leaving.
        // Shell 1 is only left through the sphere surface.
        if self.shell == 1 {
            return None;
        }
        let outer_sq = self.grid.shell_outer_radius_sq(self.shell);
        self.profile
            .shell_crossing(outer_sq, Leg::Outbound)
            .map(|t| (t, Leg::Outbound))
    }

    /// Skip crossings at or before `t_start`.
    fn settle(&mut self, t_start: f64, tol: &Tolerance) {
        for _ in 0..2 * self.grid.num_radial_sections() {
            match self.next_crossing() {
                Some((t, leg)) if t <= t_start || tol.times_equal(t, t_start) => self.advance(leg),
                _ => return,
            }
        }
    }

    fn advance(&mut self, leg: Leg) {
        match leg {
            Leg::Inbound => self.shell += 1,
            Leg::Outbound => {
                self.shell -= 1;
                self.leg = Leg::Outbound;
            }
        }
    }
}

/// How an angle evolves along the ray.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Sweep {
    Increasing,
    Decreasing,
    /// Constant for the rest of the traversal.
    Fixed,
    /// Constant until the projected ray crosses the axis at `t_axis`, then
    /// constant again in sector `after`.
    ThroughAxis { t_axis: f64, after: usize },
}

/// Polar or azimuthal sector tracking.
#[derive(Debug, Clone, Copy)]
struct AngularAxis<'a> {
    sections: AngularSections<'a>,
    ray: ProjectedRay,
    section: usize,
    sweep: Sweep,
}

impl<'a> AngularAxis<'a> {
    fn new(ray: ProjectedRay, sections: AngularSections<'a>, t_start: f64, tol: &Tolerance) -> Self {
        let dir_len = ray.direction.norm();
        let locate_now = || sections.locate_direction(&ray.at(t_start));

        let (sweep, section) = if dir_len <= tol.axis {
            // Parallel to the rotation axis. On the axis itself atan2 gives
            // angle 0, which is as good as any.
            (Sweep::Fixed, locate_now())
        } else {
            let rate = ray.sweep();
            if tol.is_axis_degenerate(rate, ray.origin.norm(), dir_len) {
                let t_axis = ray.t_closest();
                let after = sections.locate_direction(&ray.direction);
                if t_axis > t_start {
                    let before = sections.locate_direction(&-ray.direction);
                    (Sweep::ThroughAxis { t_axis, after }, before)
                } else {
                    (Sweep::Fixed, after)
                }
            } else if rate > 0.0 {
                (Sweep::Increasing, locate_now())
            } else {
                (Sweep::Decreasing, locate_now())
            }
        };

        // A single sector has no boundary to cross.
        let sweep = if sections.count() == 1 {
            Sweep::Fixed
        } else {
            sweep
        };

        Self {
            sections,
            ray,
            section,
            sweep,
        }
    }

    fn next_crossing(&self) -> Option<(f64, usize)> {
        let n = self.sections.count();
        match self.sweep {
            Sweep::Fixed => None,
            Sweep::ThroughAxis { t_axis, after } => Some((t_axis, after)),
            Sweep::Increasing => {
                let boundary = self.section + 1;
                intersect_half_plane(&self.ray, self.sections.direction(boundary))
                    .map(|t| (t, boundary % n))
            }
            Sweep::Decreasing => {
                let boundary = self.section;
                intersect_half_plane(&self.ray, self.sections.direction(boundary))
                    .map(|t| (t, (boundary + n - 1) % n))
            }
        }
    }

    /// Skip crossings at or before `t_start`.
    fn settle(&mut self, t_start: f64, tol: &Tolerance) {
        for _ in 0..self.sections.count() {
            match self.next_crossing() {
                Some((t, section)) if t <= t_start || tol.times_equal(t, t_start) => {
                    self.advance(section)
                }
                _ => return,
            }
        }
    }

    fn advance(&mut self, section: usize) {
        self.section = section;
        if let Sweep::ThroughAxis { .. } = self.sweep {
            self.sweep = Sweep::Fixed;
        }
    }
}
