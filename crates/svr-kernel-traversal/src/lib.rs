#![warn(missing_docs)]

//! Ray traversal of spherical voxel grids.
//!
//! A sphere is partitioned into radial shells, polar sectors and azimuthal
//! sectors. Given a ray, this crate returns the ordered list of voxels the
//! ray passes through, in the order it enters them.
//!
//! # Architecture
//!
//! - [`SphericalVoxelGrid`] - Immutable grid with precomputed boundaries
//! - [`Ray`] - Ray representation with origin and direction
//! - [`intersect`] - Ray-sphere and ray-half-plane boundary crossings
//! - [`walk_spherical_volume`] - Traversal from the ray origin
//! - [`spherical_coordinate_voxel_traversal`] - Traversal over a time window
//!
//! # Example
//!
//! ```
//! use svr_kernel_traversal::{
//!     walk_spherical_volume, Point3, Ray, SphereBound, SphericalVoxelGrid, Vec3,
//! };
//! use std::f64::consts::TAU;
//!
//! let grid = SphericalVoxelGrid::new(
//!     SphereBound::new(0.0, 0.0, 0.0),
//!     SphereBound::new(1.0, TAU, TAU),
//!     8,
//!     16,
//!     16,
//!     Point3::origin(),
//! )
//! .unwrap();
//!
//! let ray = Ray::new(Point3::new(-2.0, 0.1, 0.1), Vec3::new(1.0, 0.0, 0.0));
//! for voxel in walk_spherical_volume(&ray, &grid, 1.0) {
//!     println!("{voxel}");
//! }
//! ```
//!
//! Grids are `Send + Sync` and traversal never mutates them, so one grid
//! can serve any number of threads.

mod error;
mod grid;
pub mod intersect;
mod ray;
mod settings;
mod traversal;
mod voxel;

pub use error::{Axis, GridError, Result};
pub use grid::{SphereBound, SphericalVoxelGrid};
pub use ray::Ray;
pub use settings::TraversalSettings;
pub use traversal::{
    spherical_coordinate_voxel_traversal, spherical_coordinate_voxel_traversal_with,
    walk_spherical_volume, walk_spherical_volume_with,
};
pub use voxel::SphericalVoxel;

pub use svr_kernel_math::{Aabb3, Dir3, Point3, Tolerance, Vec3};
