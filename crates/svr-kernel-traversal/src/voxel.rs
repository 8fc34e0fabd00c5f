//! Spherical voxel index.

use std::fmt;

/// One cell of a [`SphericalVoxelGrid`](crate::SphericalVoxelGrid).
///
/// `radial` is 1-indexed from the outside in: 1 is the shell touching the
/// sphere surface and `num_radial_sections` the innermost one. `polar` and
/// `azimuthal` are 0-indexed sectors that wrap modulo their section counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SphericalVoxel {
    /// Radial shell, `1..=num_radial_sections`.
    pub radial: usize,
    /// Polar sector, `0..num_polar_sections`.
    pub polar: usize,
    /// Azimuthal sector, `0..num_azimuthal_sections`.
    pub azimuthal: usize,
}

impl SphericalVoxel {
    /// Create a voxel index.
    pub const fn new(radial: usize, polar: usize, azimuthal: usize) -> Self {
        Self {
            radial,
            polar,
            azimuthal,
        }
    }
}

impl fmt::Display for SphericalVoxel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}, {}, {}}}", self.radial, self.polar, self.azimuthal)
    }
}
