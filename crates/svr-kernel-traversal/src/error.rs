//! Error types for grid construction.

use std::fmt;

use thiserror::Error;

/// Coordinate axis named in an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Distance from the sphere center.
    Radial,
    /// Angle about the z axis.
    Polar,
    /// Angle about the y axis.
    Azimuthal,
    /// Cartesian x (bounding box).
    X,
    /// Cartesian y (bounding box).
    Y,
    /// Cartesian z (bounding box).
    Z,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Axis::Radial => "radial",
            Axis::Polar => "polar",
            Axis::Azimuthal => "azimuthal",
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while building a grid or validating settings.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum GridError {
    /// An axis has no sections.
    #[error("{axis} section count must be at least 1")]
    ZeroSections {
        /// The axis with zero sections.
        axis: Axis,
    },

    /// The sphere max radius is not a positive finite number.
    #[error("sphere max radius must be positive, got {0}")]
    InvalidRadius(f64),

    /// The minimum radial bound is below zero.
    #[error("minimum radial bound must be non-negative, got {0}")]
    NegativeRadius(f64),

    /// A minimum bound is not strictly below its maximum.
    #[error("{axis} bounds are inverted or degenerate: min {min}, max {max}")]
    InvertedBounds {
        /// The offending axis.
        axis: Axis,
        /// Minimum bound.
        min: f64,
        /// Maximum bound.
        max: f64,
    },

    /// An angular range does not cover the full circle.
    #[error("{axis} bounds must span a full turn, got {span} rad")]
    PartialAngularSpan {
        /// The offending axis.
        axis: Axis,
        /// Span of the range in radians.
        span: f64,
    },

    /// Invalid traversal settings.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}

/// Result type for grid operations.
pub type Result<T> = std::result::Result<T, GridError>;
