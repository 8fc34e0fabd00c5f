//! Ray-boundary intersection algorithms.
//!
//! Radial boundaries are concentric spheres, solved in closed form from the
//! ray's closest approach to the center. Polar and azimuthal boundaries are
//! half-planes bounded by a rotation axis, solved as 2D line crossings in the
//! plane perpendicular to that axis.

mod plane;
mod sphere;

pub use plane::{intersect_half_plane, AngularPlane, ProjectedRay};
pub use sphere::{intersect_sphere, Leg, RadialProfile, SphereInterval};
