//! Geometry utilities: homogeneous transforms, basis extraction, angle math.

pub mod angles;
pub mod transform;

pub use angles::{
    angle_between, angle_between_about, perpendicular_component, project_onto_plane, signed_angle,
};
pub use transform::Transform;
