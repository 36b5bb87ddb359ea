//! Angle and projection primitives over 3D vectors.
//!
//! Stateless helpers shared by the angle/position trackers and the pose
//! composer. Zero-length inputs normalize to NaN and the NaN propagates to
//! the returned angle; callers treat a NaN angle as a dropped sample.

use nalgebra::Vector3;

/// Unsigned angle in radians between two vectors.
///
/// The normalized dot product is clamped to `[-1, 1]` so exactly parallel
/// vectors do not trip `acos` on floating-point noise. NaN from a
/// zero-length input survives the clamp.
pub fn angle_between(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    a.normalize().dot(&b.normalize()).clamp(-1.0, 1.0).acos()
}

/// Projection of `v` onto the plane with normal `plane_normal`.
///
/// Subtracts the component of `v` along the normal; the normal need not be
/// unit length.
pub fn project_onto_plane(v: &Vector3<f64>, plane_normal: &Vector3<f64>) -> Vector3<f64> {
    let along_normal = (v.dot(plane_normal) / plane_normal.norm_squared()) * plane_normal;
    v - along_normal
}

/// Component of `hypotenuse` perpendicular to the unit direction `axis`.
///
/// The shortest vector from the line spanned by `axis` to the tip of
/// `hypotenuse`.
pub fn perpendicular_component(hypotenuse: &Vector3<f64>, axis: &Vector3<f64>) -> Vector3<f64> {
    hypotenuse - hypotenuse.dot(axis) * axis
}

/// Signed angle from `a` to `b`, with `reference` deciding the sign.
///
/// The magnitude is `angle_between(a, b)`; the angle is negated when
/// `reference · (a × b)` is positive.
pub fn signed_angle(a: &Vector3<f64>, b: &Vector3<f64>, reference: &Vector3<f64>) -> f64 {
    let angle = angle_between(a, b);
    if reference.dot(&a.cross(b)) > 0.0 {
        -angle
    } else {
        angle
    }
}

/// Signed angle between the planes spanned by (`a`, `axis`) and (`b`, `axis`).
///
/// Measures between the plane normals; negated when `axis · (b × a)` is
/// positive.
pub fn angle_between_about(a: &Vector3<f64>, b: &Vector3<f64>, axis: &Vector3<f64>) -> f64 {
    let n = a.cross(axis);
    let n_prime = b.cross(axis);
    let angle = angle_between(&n, &n_prime);

    if b.cross(a).dot(axis) > 0.0 {
        -angle
    } else {
        angle
    }
}
