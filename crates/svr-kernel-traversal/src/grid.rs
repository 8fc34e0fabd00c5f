//! Spherical voxel grid.
//!
//! A sphere is split into concentric radial shells, polar sectors about the
//! z axis and azimuthal sectors about the y axis. Every boundary the
//! traversal can cross is computed once here so that any number of rays can
//! walk the same grid without recomputation.

use svr_kernel_math::{normalize_angle, Aabb3, Point3, Tolerance, Vec2, TAU};

use crate::error::{Axis, GridError, Result};
use crate::SphericalVoxel;

/// Bounds of the spherical domain in sphere-local units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SphereBound {
    /// Distance from the sphere center.
    pub radial: f64,
    /// Angle about the z axis, in radians.
    pub polar: f64,
    /// Angle about the y axis, in radians.
    pub azimuthal: f64,
}

impl SphereBound {
    /// Create a bound.
    pub const fn new(radial: f64, polar: f64, azimuthal: f64) -> Self {
        Self {
            radial,
            polar,
            azimuthal,
        }
    }
}

/// Equal-width sectors of one angular axis, borrowed from a grid.
#[derive(Debug, Clone, Copy)]
pub(crate) struct AngularSections<'a> {
    start: f64,
    delta: f64,
    /// Unit boundary directions; the last one closes the circle onto the first.
    directions: &'a [Vec2],
}

impl<'a> AngularSections<'a> {
    pub(crate) fn count(&self) -> usize {
        self.directions.len() - 1
    }

    pub(crate) fn direction(&self, boundary: usize) -> &'a Vec2 {
        &self.directions[boundary]
    }

    /// Sector containing `angle`.
    pub(crate) fn locate(&self, angle: f64) -> usize {
        let offset = normalize_angle(angle - self.start);
        // NaN saturates to 0
        let k = (offset / self.delta).floor() as usize;
        k.min(self.count() - 1)
    }

    /// Sector containing the direction of `v`.
    pub(crate) fn locate_direction(&self, v: &Vec2) -> usize {
        self.locate(v.y.atan2(v.x))
    }
}

/// Immutable description of a spherical voxel partition.
///
/// Radial shells are numbered from 1 (outermost) to `num_radial_sections`
/// (innermost). Anything inside the minimum radial bound belongs to the
/// innermost shell.
#[derive(Debug, Clone)]
pub struct SphericalVoxelGrid {
    min_bound: SphereBound,
    max_bound: SphereBound,
    num_radial_sections: usize,
    num_polar_sections: usize,
    num_azimuthal_sections: usize,
    sphere_center: Point3,
    bounding_box: Option<Aabb3>,
    delta_radius: f64,
    delta_polar: f64,
    delta_azimuthal: f64,
    radial_boundaries: Vec<f64>,
    radial_boundaries_sq: Vec<f64>,
    polar_boundaries: Vec<f64>,
    azimuthal_boundaries: Vec<f64>,
    polar_directions: Vec<Vec2>,
    azimuthal_directions: Vec<Vec2>,
}

impl SphericalVoxelGrid {
    /// Build a grid from explicit spherical bounds.
    ///
    /// The sphere max radius is `max_bound.radial`. Both angular ranges must
    /// cover a full turn, but may start at any angle.
    pub fn new(
        min_bound: SphereBound,
        max_bound: SphereBound,
        num_radial_sections: usize,
        num_polar_sections: usize,
        num_azimuthal_sections: usize,
        sphere_center: Point3,
    ) -> Result<Self> {
        check_sections(num_radial_sections, num_polar_sections, num_azimuthal_sections)?;
        check_radius(max_bound.radial)?;
        if min_bound.radial < 0.0 {
            return Err(GridError::NegativeRadius(min_bound.radial));
        }
        check_interval(Axis::Radial, min_bound.radial, max_bound.radial)?;
        check_interval(Axis::Polar, min_bound.polar, max_bound.polar)?;
        check_interval(Axis::Azimuthal, min_bound.azimuthal, max_bound.azimuthal)?;
        check_full_turn(Axis::Polar, min_bound.polar, max_bound.polar)?;
        check_full_turn(Axis::Azimuthal, min_bound.azimuthal, max_bound.azimuthal)?;

        Ok(Self::build(
            min_bound,
            max_bound,
            [num_radial_sections, num_polar_sections, num_azimuthal_sections],
            sphere_center,
            None,
        ))
    }

    /// Build a grid for a sphere of `sphere_max_radius` inside the box
    /// `[min_bound, max_bound]`.
    ///
    /// The spherical bounds are normalized to radial `[0, radius]` and full
    /// turns on both angles. Traversals through this grid are clipped to the
    /// box as well as to the sphere.
    pub fn from_box(
        min_bound: Point3,
        max_bound: Point3,
        num_radial_sections: usize,
        num_polar_sections: usize,
        num_azimuthal_sections: usize,
        sphere_center: Point3,
        sphere_max_radius: f64,
    ) -> Result<Self> {
        check_sections(num_radial_sections, num_polar_sections, num_azimuthal_sections)?;
        check_radius(sphere_max_radius)?;
        check_interval(Axis::X, min_bound.x, max_bound.x)?;
        check_interval(Axis::Y, min_bound.y, max_bound.y)?;
        check_interval(Axis::Z, min_bound.z, max_bound.z)?;

        let bbox = Aabb3::new(min_bound, max_bound);
        let sphere_box = Aabb3::around_sphere(&sphere_center, sphere_max_radius);
        if !(bbox.contains(&sphere_box.min) && bbox.contains(&sphere_box.max)) {
            tracing::debug!("sphere extends beyond its bounding box; traversals are clipped to the box");
        }

        Ok(Self::build(
            SphereBound::new(0.0, 0.0, 0.0),
            SphereBound::new(sphere_max_radius, TAU, TAU),
            [num_radial_sections, num_polar_sections, num_azimuthal_sections],
            sphere_center,
            Some(bbox),
        ))
    }

    fn build(
        min_bound: SphereBound,
        max_bound: SphereBound,
        [num_radial, num_polar, num_azimuthal]: [usize; 3],
        sphere_center: Point3,
        bounding_box: Option<Aabb3>,
    ) -> Self {
        let radial_boundaries = boundaries(min_bound.radial, max_bound.radial, num_radial);
        let radial_boundaries_sq = radial_boundaries.iter().map(|r| r * r).collect();
        let polar_boundaries = boundaries(min_bound.polar, max_bound.polar, num_polar);
        let azimuthal_boundaries =
            boundaries(min_bound.azimuthal, max_bound.azimuthal, num_azimuthal);
        let polar_directions = unit_directions(&polar_boundaries);
        let azimuthal_directions = unit_directions(&azimuthal_boundaries);

        tracing::debug!(
            radial = num_radial,
            polar = num_polar,
            azimuthal = num_azimuthal,
            radius = max_bound.radial,
            bounded = bounding_box.is_some(),
            "built spherical voxel grid"
        );

        Self {
            min_bound,
            max_bound,
            num_radial_sections: num_radial,
            num_polar_sections: num_polar,
            num_azimuthal_sections: num_azimuthal,
            sphere_center,
            bounding_box,
            delta_radius: (max_bound.radial - min_bound.radial) / num_radial as f64,
            delta_polar: (max_bound.polar - min_bound.polar) / num_polar as f64,
            delta_azimuthal: (max_bound.azimuthal - min_bound.azimuthal) / num_azimuthal as f64,
            radial_boundaries,
            radial_boundaries_sq,
            polar_boundaries,
            azimuthal_boundaries,
            polar_directions,
            azimuthal_directions,
        }
    }

    /// Number of radial shells.
    pub fn num_radial_sections(&self) -> usize {
        self.num_radial_sections
    }

    /// Number of polar sectors.
    pub fn num_polar_sections(&self) -> usize {
        self.num_polar_sections
    }

    /// Number of azimuthal sectors.
    pub fn num_azimuthal_sections(&self) -> usize {
        self.num_azimuthal_sections
    }

    /// Sphere center.
    pub fn sphere_center(&self) -> &Point3 {
        &self.sphere_center
    }

    /// Outer radius of the sphere.
    pub fn sphere_max_radius(&self) -> f64 {
        self.max_bound.radial
    }

    /// Lower spherical bound.
    pub fn min_bound(&self) -> &SphereBound {
        &self.min_bound
    }

    /// Upper spherical bound.
    pub fn max_bound(&self) -> &SphereBound {
        &self.max_bound
    }

    /// Enclosing box, for grids built with [`SphericalVoxelGrid::from_box`].
    pub fn bounding_box(&self) -> Option<&Aabb3> {
        self.bounding_box.as_ref()
    }

    /// Thickness of one radial shell.
    pub fn delta_radius(&self) -> f64 {
        self.delta_radius
    }

    /// Width of one polar sector in radians.
    pub fn delta_polar(&self) -> f64 {
        self.delta_polar
    }

    /// Width of one azimuthal sector in radians.
    pub fn delta_azimuthal(&self) -> f64 {
        self.delta_azimuthal
    }

    /// Shell radii in increasing order, `num_radial_sections + 1` values.
    pub fn radial_boundaries(&self) -> &[f64] {
        &self.radial_boundaries
    }

    /// Polar boundary angles in increasing order, `num_polar_sections + 1`
    /// values.
    pub fn polar_boundaries(&self) -> &[f64] {
        &self.polar_boundaries
    }

    /// Azimuthal boundary angles in increasing order,
    /// `num_azimuthal_sections + 1` values.
    pub fn azimuthal_boundaries(&self) -> &[f64] {
        &self.azimuthal_boundaries
    }

    /// Radius of boundary `index`, counting up from the innermost.
    pub fn radial_boundary(&self, index: usize) -> Option<f64> {
        self.radial_boundaries.get(index).copied()
    }

    /// Angle of polar boundary `index`.
    pub fn polar_boundary(&self, index: usize) -> Option<f64> {
        self.polar_boundaries.get(index).copied()
    }

    /// Angle of azimuthal boundary `index`.
    pub fn azimuthal_boundary(&self, index: usize) -> Option<f64> {
        self.azimuthal_boundaries.get(index).copied()
    }

    /// Radial shell containing points at `distance` from the center,
    /// clamped to `1..=num_radial_sections`.
    pub fn radial_section(&self, distance: f64) -> usize {
        let k = ((distance - self.min_bound.radial) / self.delta_radius).floor();
        let k = if k > 0.0 { k as usize } else { 0 };
        self.num_radial_sections - k.min(self.num_radial_sections - 1)
    }

    /// Polar sector containing `angle` (radians about the z axis).
    pub fn polar_section(&self, angle: f64) -> usize {
        self.polar_sections().locate(angle)
    }

    /// Azimuthal sector containing `angle` (radians about the y axis).
    pub fn azimuthal_section(&self, angle: f64) -> usize {
        self.azimuthal_sections().locate(angle)
    }

    /// Voxel containing `point`, or `None` outside the sphere.
    ///
    /// Points on the polar axis report the sector containing angle 0.
    pub fn voxel_at(&self, point: &Point3) -> Option<SphericalVoxel> {
        let offset = point - self.sphere_center;
        let distance = offset.norm();
        if !(distance <= self.sphere_max_radius()) {
            return None;
        }
        Some(SphericalVoxel::new(
            self.radial_section(distance),
            self.polar_section(offset.y.atan2(offset.x)),
            self.azimuthal_section(offset.z.atan2(offset.x)),
        ))
    }

    /// Squared outer radius of radial shell `shell`.
    pub(crate) fn shell_outer_radius_sq(&self, shell: usize) -> f64 {
        self.radial_boundaries_sq[self.num_radial_sections + 1 - shell]
    }

    /// Squared inner radius of radial shell `shell`.
    pub(crate) fn shell_inner_radius_sq(&self, shell: usize) -> f64 {
        self.radial_boundaries_sq[self.num_radial_sections - shell]
    }

    pub(crate) fn polar_sections(&self) -> AngularSections<'_> {
        AngularSections {
            start: self.min_bound.polar,
            delta: self.delta_polar,
            directions: &self.polar_directions,
        }
    }

    pub(crate) fn azimuthal_sections(&self) -> AngularSections<'_> {
        AngularSections {
            start: self.min_bound.azimuthal,
            delta: self.delta_azimuthal,
            directions: &self.azimuthal_directions,
        }
    }
}

fn check_sections(radial: usize, polar: usize, azimuthal: usize) -> Result<()> {
    for (axis, count) in [
        (Axis::Radial, radial),
        (Axis::Polar, polar),
        (Axis::Azimuthal, azimuthal),
    ] {
        if count == 0 {
            return Err(GridError::ZeroSections { axis });
        }
    }
    Ok(())
}

fn check_radius(radius: f64) -> Result<()> {
    if radius.is_finite() && radius > 0.0 {
        Ok(())
    } else {
        Err(GridError::InvalidRadius(radius))
    }
}

fn check_interval(axis: Axis, min: f64, max: f64) -> Result<()> {
    if min.is_finite() && max.is_finite() && min < max {
        Ok(())
    } else {
        Err(GridError::InvertedBounds { axis, min, max })
    }
}

fn check_full_turn(axis: Axis, min: f64, max: f64) -> Result<()> {
    let span = max - min;
    if Tolerance::DEFAULT.angles_equal(span, TAU) {
        Ok(())
    } else {
        Err(GridError::PartialAngularSpan { axis, span })
    }
}

/// `count + 1` evenly spaced values from `min` to exactly `max`.
fn boundaries(min: f64, max: f64, count: usize) -> Vec<f64> {
    let delta = (max - min) / count as f64;
    let mut values: Vec<f64> = (0..count).map(|k| min + k as f64 * delta).collect();
    values.push(max);
    values
}

fn unit_directions(angles: &[f64]) -> Vec<Vec2> {
    let mut directions: Vec<Vec2> = angles
        .iter()
        .map(|a| {
            let (s, c) = a.sin_cos();
            Vec2::new(c, s)
        })
        .collect();
    // The closing boundary is the same half-plane as the first one.
    if let Some(&first) = directions.first() {
        if let Some(last) = directions.last_mut() {
            *last = first;
        }
    }
    directions
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn full_grid(radial: usize, polar: usize, azimuthal: usize, radius: f64) -> SphericalVoxelGrid {
        SphericalVoxelGrid::new(
            SphereBound::new(0.0, 0.0, 0.0),
            SphereBound::new(radius, TAU, TAU),
            radial,
            polar,
            azimuthal,
            Point3::origin(),
        )
        .unwrap()
    }

    #[test]
    fn test_grid_dimensions() {
        let grid = full_grid(4, 8, 16, 10.0);
        assert_eq!(grid.num_radial_sections(), 4);
        assert_eq!(grid.num_polar_sections(), 8);
        assert_eq!(grid.num_azimuthal_sections(), 16);
        assert_relative_eq!(grid.sphere_max_radius(), 10.0);
        assert_relative_eq!(grid.delta_radius(), 2.5);
        assert_relative_eq!(grid.delta_polar(), TAU / 8.0);
        assert_relative_eq!(grid.delta_azimuthal(), TAU / 16.0);
        assert!(grid.bounding_box().is_none());
    }

    #[test]
    fn test_boundaries_strictly_increasing() {
        let grid = full_grid(5, 7, 9, 3.0);
        for seq in [
            grid.radial_boundaries(),
            grid.polar_boundaries(),
            grid.azimuthal_boundaries(),
        ] {
            assert!(seq.windows(2).all(|w| w[0] < w[1]));
        }
        assert_eq!(grid.radial_boundaries().len(), 6);
        assert_eq!(grid.polar_boundaries().len(), 8);
        assert_eq!(grid.azimuthal_boundaries().len(), 10);
        assert_eq!(grid.radial_boundary(5), Some(3.0));
        assert_eq!(grid.polar_boundary(7), Some(TAU));
        assert_eq!(grid.azimuthal_boundary(10), None);
    }

    #[test]
    fn test_shell_radii() {
        let grid = full_grid(4, 1, 1, 8.0);
        // Shell 1 is outermost: [6, 8]
        assert_relative_eq!(grid.shell_outer_radius_sq(1), 64.0);
        assert_relative_eq!(grid.shell_inner_radius_sq(1), 36.0);
        // Shell 4 is innermost: [0, 2]
        assert_relative_eq!(grid.shell_outer_radius_sq(4), 4.0);
        assert_relative_eq!(grid.shell_inner_radius_sq(4), 0.0);
    }

    #[test]
    fn test_radial_section() {
        let grid = full_grid(4, 1, 1, 8.0);
        assert_eq!(grid.radial_section(7.9), 1);
        assert_eq!(grid.radial_section(8.0), 1);
        assert_eq!(grid.radial_section(12.0), 1);
        assert_eq!(grid.radial_section(5.0), 2);
        assert_eq!(grid.radial_section(0.5), 4);
        assert_eq!(grid.radial_section(0.0), 4);
    }

    #[test]
    fn test_angular_sections_wrap() {
        let grid = full_grid(1, 4, 4, 1.0);
        assert_eq!(grid.polar_section(0.1), 0);
        assert_eq!(grid.polar_section(PI / 2.0 + 0.1), 1);
        assert_eq!(grid.polar_section(-0.1), 3);
        assert_eq!(grid.polar_section(TAU + 0.1), 0);
        assert_eq!(grid.azimuthal_section(PI + 0.1), 2);
    }

    #[test]
    fn test_rotated_angular_start() {
        let grid = SphericalVoxelGrid::new(
            SphereBound::new(0.0, PI / 4.0, 0.0),
            SphereBound::new(1.0, PI / 4.0 + TAU, TAU),
            1,
            4,
            1,
            Point3::origin(),
        )
        .unwrap();
        assert_eq!(grid.polar_section(0.0), 3);
        assert_eq!(grid.polar_section(PI / 2.0), 0);
    }

    #[test]
    fn test_closing_direction_matches_first() {
        let grid = full_grid(1, 6, 6, 1.0);
        let sections = grid.polar_sections();
        assert_eq!(sections.count(), 6);
        assert_eq!(sections.direction(0), sections.direction(6));
    }

    #[test]
    fn test_voxel_at() {
        let grid = full_grid(2, 4, 4, 2.0);
        // Outer shell, first quadrant in both planes
        let v = grid.voxel_at(&Point3::new(1.2, 0.3, 0.4)).unwrap();
        assert_eq!(v, SphericalVoxel::new(1, 0, 0));
        // Inner shell, y < 0 and z > 0 with x < 0
        let v = grid.voxel_at(&Point3::new(-0.5, -0.1, 0.2)).unwrap();
        assert_eq!(v, SphericalVoxel::new(2, 2, 1));
        assert!(grid.voxel_at(&Point3::new(3.0, 0.0, 0.0)).is_none());
    }

    #[test]
    fn test_from_box() {
        let grid = SphericalVoxelGrid::from_box(
            Point3::new(-2.0, -2.0, -2.0),
            Point3::new(2.0, 2.0, 2.0),
            4,
            4,
            4,
            Point3::origin(),
            1.0,
        )
        .unwrap();
        assert_eq!(*grid.min_bound(), SphereBound::new(0.0, 0.0, 0.0));
        assert_eq!(*grid.max_bound(), SphereBound::new(1.0, TAU, TAU));
        assert!(grid.bounding_box().is_some());
    }

    #[test]
    fn test_zero_sections_rejected() {
        let err = SphericalVoxelGrid::new(
            SphereBound::new(0.0, 0.0, 0.0),
            SphereBound::new(1.0, TAU, TAU),
            0,
            4,
            4,
            Point3::origin(),
        )
        .unwrap_err();
        assert_eq!(err, GridError::ZeroSections { axis: Axis::Radial });

        let err = SphericalVoxelGrid::from_box(
            Point3::new(-1.0, -1.0, -1.0),
            Point3::new(1.0, 1.0, 1.0),
            2,
            2,
            0,
            Point3::origin(),
            1.0,
        )
        .unwrap_err();
        assert_eq!(err, GridError::ZeroSections { axis: Axis::Azimuthal });
    }

    #[test]
    fn test_invalid_radius_rejected() {
        let bigger = Point3::new(1.0, 1.0, 1.0);
        let smaller = Point3::new(-1.0, -1.0, -1.0);
        for radius in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err =
                SphericalVoxelGrid::from_box(smaller, bigger, 1, 1, 1, Point3::origin(), radius)
                    .unwrap_err();
            assert!(matches!(err, GridError::InvalidRadius(_)));
        }
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let err = SphericalVoxelGrid::new(
            SphereBound::new(0.0, TAU, 0.0),
            SphereBound::new(1.0, 0.0, TAU),
            1,
            1,
            1,
            Point3::origin(),
        )
        .unwrap_err();
        assert!(matches!(err, GridError::InvertedBounds { axis: Axis::Polar, .. }));

        let err = SphericalVoxelGrid::new(
            SphereBound::new(2.0, 0.0, 0.0),
            SphereBound::new(1.0, TAU, TAU),
            1,
            1,
            1,
            Point3::origin(),
        )
        .unwrap_err();
        assert!(matches!(err, GridError::InvertedBounds { axis: Axis::Radial, .. }));

        let err = SphericalVoxelGrid::from_box(
            Point3::new(-1.0, 1.0, -1.0),
            Point3::new(1.0, 1.0, 1.0),
            1,
            1,
            1,
            Point3::origin(),
            1.0,
        )
        .unwrap_err();
        assert!(matches!(err, GridError::InvertedBounds { axis: Axis::Y, .. }));
    }

    #[test]
    fn test_negative_radius_rejected() {
        let err = SphericalVoxelGrid::new(
            SphereBound::new(-1.0, 0.0, 0.0),
            SphereBound::new(1.0, TAU, TAU),
            1,
            1,
            1,
            Point3::origin(),
        )
        .unwrap_err();
        assert_eq!(err, GridError::NegativeRadius(-1.0));
    }

    #[test]
    fn test_partial_angular_span_rejected() {
        let err = SphericalVoxelGrid::new(
            SphereBound::new(0.0, 0.0, 0.0),
            SphereBound::new(1.0, TAU, PI),
            1,
            1,
            1,
            Point3::origin(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            GridError::PartialAngularSpan { axis: Axis::Azimuthal, .. }
        ));
    }

    #[test]
    fn test_error_messages() {
        let err = GridError::ZeroSections { axis: Axis::Polar };
        assert_eq!(err.to_string(), "polar section count must be at least 1");
        let err = GridError::InvalidRadius(-2.0);
        assert_eq!(err.to_string(), "sphere max radius must be positive, got -2");
    }

    #[test]
    fn test_grid_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SphericalVoxelGrid>();
    }
}
