//! Traversal configuration.

use svr_kernel_math::Tolerance;

use crate::error::{GridError, Result};
use crate::SphericalVoxelGrid;

/// Traversal parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TraversalSettings {
    /// Comparison tolerances for crossing times and axis degeneracy.
    pub tolerance: Tolerance,
    /// Upper bound on voxel transitions per ray. `None` derives the bound
    /// from the grid's section counts.
    pub max_steps: Option<usize>,
}

impl Default for TraversalSettings {
    fn default() -> Self {
        Self {
            tolerance: Tolerance::DEFAULT,
            max_steps: None,
        }
    }
}

impl TraversalSettings {
    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        let tol = &self.tolerance;
        for (name, value) in [("time", tol.time), ("axis", tol.axis), ("angular", tol.angular)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(GridError::InvalidSettings(format!(
                    "{name} tolerance must be positive, got {value}"
                )));
            }
        }
        if self.max_steps == Some(0) {
            return Err(GridError::InvalidSettings(
                "max_steps must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Transition budget for one ray through `grid`.
    ///
    /// A line crosses each inner shell at most twice and sweeps less than
    /// half a turn around each angular axis, so the derived bound is never
    /// reached by a well-conditioned ray.
    pub fn step_limit(&self, grid: &SphericalVoxelGrid) -> usize {
        self.max_steps.unwrap_or_else(|| {
            2 * grid.num_radial_sections()
                + grid.num_polar_sections()
                + grid.num_azimuthal_sections()
                + 8
        })
    }
}
