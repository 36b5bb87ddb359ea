//! Basis-vector extraction and constructors for 4x4 homogeneous transforms.
//!
//! A `Transform` stores position + orientation (+ optional scale/shear) of an
//! entity in world space. The first three columns of the upper-left 3x3 block
//! are taken as the right/up/forward basis; orthonormality is NOT enforced
//! here, so every extraction normalizes at the point of use.

use nalgebra::{Matrix4, Rotation3, UnitQuaternion, Vector3};

/// 4x4 homogeneous world transform.
pub type Transform = Matrix4<f64>;

/// World-frame unit axes.
pub const WORLD_RIGHT: Vector3<f64> = Vector3::new(1.0, 0.0, 0.0);
pub const WORLD_LEFT: Vector3<f64> = Vector3::new(-1.0, 0.0, 0.0);
pub const WORLD_UP: Vector3<f64> = Vector3::new(0.0, 1.0, 0.0);
pub const WORLD_DOWN: Vector3<f64> = Vector3::new(0.0, -1.0, 0.0);
pub const WORLD_FORWARD: Vector3<f64> = Vector3::new(0.0, 0.0, 1.0);
pub const WORLD_BACK: Vector3<f64> = Vector3::new(0.0, 0.0, -1.0);

/// Translation component (fourth column).
#[inline]
pub fn translation(t: &Transform) -> Vector3<f64> {
    Vector3::new(t[(0, 3)], t[(1, 3)], t[(2, 3)])
}

/// Nearest pure rotation to the upper-left 3x3 block.
pub fn rotation(t: &Transform) -> UnitQuaternion<f64> {
    let basis = t.fixed_view::<3, 3>(0, 0).into_owned();
    UnitQuaternion::from_matrix(&basis)
}

#[inline]
fn basis_column(t: &Transform, col: usize) -> Vector3<f64> {
    Vector3::new(t[(0, col)], t[(1, col)], t[(2, col)]).normalize()
}

/// Normalized first basis column (+X).
#[inline]
pub fn unit_right(t: &Transform) -> Vector3<f64> {
    basis_column(t, 0)
}

#[inline]
pub fn unit_left(t: &Transform) -> Vector3<f64> {
    -unit_right(t)
}

/// Normalized second basis column (+Y).
#[inline]
pub fn unit_up(t: &Transform) -> Vector3<f64> {
    basis_column(t, 1)
}

#[inline]
pub fn unit_down(t: &Transform) -> Vector3<f64> {
    -unit_up(t)
}

/// Normalized third basis column (+Z).
#[inline]
pub fn unit_forward(t: &Transform) -> Vector3<f64> {
    basis_column(t, 2)
}

#[inline]
pub fn unit_back(t: &Transform) -> Vector3<f64> {
    -unit_forward(t)
}

/// Pure translation transform.
pub fn translation_transform(t: Vector3<f64>) -> Transform {
    let mut m = Matrix4::identity();
    m[(0, 3)] = t.x;
    m[(1, 3)] = t.y;
    m[(2, 3)] = t.z;
    m
}

/// Pure scale transform (per-axis factors on the diagonal).
pub fn scale_transform(scale: Vector3<f64>) -> Transform {
    Matrix4::new_nonuniform_scaling(&scale)
}

/// Shear transform; each argument is the contribution of one source axis to
/// another (e.g. `yx` shears X by Y).
#[rustfmt::skip]
pub fn shear_transform(xy: f64, xz: f64, yz: f64, yx: f64, zx: f64, zy: f64) -> Transform {
    Matrix4::new(
        1.0, xy,  xz,  0.0,
        yx,  1.0, yz,  0.0,
        zx,  zy,  1.0, 0.0,
        0.0, 0.0, 0.0, 1.0,
    )
}

/// Rotation about world X by `radians`.
pub fn rotation_x(radians: f64) -> Transform {
    Rotation3::from_axis_angle(&Vector3::x_axis(), radians).to_homogeneous()
}

/// Rotation about world Y by `radians`.
pub fn rotation_y(radians: f64) -> Transform {
    Rotation3::from_axis_angle(&Vector3::y_axis(), radians).to_homogeneous()
}

/// Rotation about world Z by `radians`.
pub fn rotation_z(radians: f64) -> Transform {
    Rotation3::from_axis_angle(&Vector3::z_axis(), radians).to_homogeneous()
}

/// Euler-composed rotation: X, then Y, then Z factors multiplied left to right.
pub fn rotation_xyz(radians: Vector3<f64>) -> Transform {
    rotation_x(radians.x) * rotation_y(radians.y) * rotation_z(radians.z)
}

/// Homogeneous form of a quaternion rotation.
pub fn rotation_transform(q: &UnitQuaternion<f64>) -> Transform {
    q.to_homogeneous()
}
