//! Signed per-axis angles and smoothed angular velocity of a tracking node
//! relative to a surface-aligned transform.

use std::f64::consts::PI;

use nalgebra::Vector3;
use tracing::debug;

use crate::geometry::angles::{angle_between, perpendicular_component};
use crate::geometry::transform::{
    translation, unit_forward, unit_left, unit_right, unit_up,
};
use crate::geometry::Transform;
use crate::scene::{resolve_visible, NodeId, SceneGraph};
use crate::smoothing::DeltaWindow;

/// Plane-normal jump (radians) beyond which the windows are cleared when a
/// new aligned transform is assigned. Keeps a floor-to-wall surface
/// reassignment from reading as a velocity spike.
const NORMAL_JUMP_THRESHOLD: f64 = 10.0 * PI / 180.0;

/// Decomposes the tracking node's offset from an aligned surface transform
/// into signed per-axis angles, and smooths their rates of change.
///
/// The pose composer assigns `reference_transform` (the corrected surface)
/// and `aligned_transform` (surface composed with the alignment rotation)
/// every tick, then calls [`update_at`]. Angular velocities stay zero until
/// the per-axis and time windows are simultaneously full.
///
/// [`update_at`]: AngleTracker::update_at
#[derive(Debug)]
pub struct AngleTracker {
    tracking_node: Option<NodeId>,
    reference_transform: Option<Transform>,
    aligned_transform: Option<Transform>,
    angles: Vector3<f64>,
    dw_x: DeltaWindow,
    dw_y: DeltaWindow,
    dw_z: DeltaWindow,
    dt: DeltaWindow,
}

impl AngleTracker {
    pub fn new() -> Self {
        Self {
            tracking_node: None,
            reference_transform: None,
            aligned_transform: None,
            angles: Vector3::zeros(),
            dw_x: DeltaWindow::new(),
            dw_y: DeltaWindow::new(),
            dw_z: DeltaWindow::new(),
            dt: DeltaWindow::new(),
        }
    }

    pub fn set_tracking_node(&mut self, node: Option<NodeId>) {
        self.tracking_node = node;
    }

    pub fn tracking_node(&self) -> Option<NodeId> {
        self.tracking_node
    }

    pub fn set_reference_transform(&mut self, transform: Option<Transform>) {
        self.reference_transform = transform;
    }

    pub fn reference_transform(&self) -> Option<&Transform> {
        self.reference_transform.as_ref()
    }

    /// Assign the aligned transform, resetting first when its plane normal
    /// jumps by more than 10 degrees.
    ///
    /// The compare-reset-store sequence is atomic: a discontinuous surface
    /// reassignment (floor to wall) clears the windows before the new value
    /// is accepted, so the jump never animates.
    pub fn set_aligned_transform(&mut self, transform: Option<Transform>) {
        if let (Some(current), Some(new)) = (&self.aligned_transform, &transform) {
            let jump = angle_between(&plane_normal(current), &plane_normal(new));
            if jump > NORMAL_JUMP_THRESHOLD {
                self.reset();
            }
        }
        self.aligned_transform = transform;
    }

    pub fn aligned_transform(&self) -> Option<&Transform> {
        self.aligned_transform.as_ref()
    }

    /// Current signed pitch-like angle (radians), as of the last update.
    pub fn angle_x(&self) -> f64 {
        self.angles.x
    }

    /// Current signed yaw-like angle (radians), as of the last update.
    pub fn angle_y(&self) -> f64 {
        self.angles.y
    }

    /// Roll-like angle; fixed at zero (extraction not implemented).
    pub fn angle_z(&self) -> f64 {
        self.angles.z
    }

    /// Smoothed angular velocity about X (radians/second).
    pub fn angular_velocity_x(&self) -> f64 {
        self.dw_x.mean_rate(&self.dt)
    }

    /// Smoothed angular velocity about Y (radians/second).
    pub fn angular_velocity_y(&self) -> f64 {
        self.dw_y.mean_rate(&self.dt)
    }

    /// Smoothed angular velocity about Z (radians/second).
    pub fn angular_velocity_z(&self) -> f64 {
        self.dw_z.mean_rate(&self.dt)
    }

    /// Record one frame.
    ///
    /// A missing or hidden tracking node, or an unset aligned transform,
    /// resets the tracker. A NaN angle (degenerate geometry) drops the whole
    /// tick so a single bad sample cannot poison the running averages.
    pub fn update_at<S: SceneGraph>(&mut self, scene: &S, time: f64) {
        let Some(tracking) = self.tracking_node.and_then(|n| resolve_visible(scene, n)) else {
            self.reset();
            return;
        };
        let Some(aligned) = self.aligned_transform else {
            self.reset();
            return;
        };

        let next_x = angle_for_x(&tracking, &aligned);
        let next_y = angle_for_y(&tracking, &aligned);
        let next_z = angle_for_z(&tracking, &aligned);
        if next_x.is_nan() || next_y.is_nan() || next_z.is_nan() {
            debug!(next_x, next_y, next_z, "dropping NaN angle sample");
            return;
        }

        self.dw_x.push_wrapped(next_x);
        self.dw_y.push_wrapped(next_y);
        self.dw_z.push_wrapped(next_z);
        self.dt.push(time);

        self.angles = Vector3::new(next_x, next_y, next_z);
    }

    /// Return to the freshly constructed state. The node handle and assigned
    /// transforms are kept.
    pub fn reset(&mut self) {
        self.angles = Vector3::zeros();
        self.dw_x.reset();
        self.dw_y.reset();
        self.dw_z.reset();
        self.dt.reset();
    }
}

impl Default for AngleTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Plane normal of a surface transform (forward cross right).
fn plane_normal(t: &Transform) -> Vector3<f64> {
    unit_forward(t).cross(&unit_right(t))
}

/// Pitch-like angle: how far the tracking node's offset tips out of the
/// plane perpendicular to the aligned forward axis.
///
/// `hyp` runs from the aligned origin to the tracking node; `opp` is its
/// component perpendicular to the aligned forward axis. Negated when the
/// removed component points along the tracking node's up vector.
fn angle_for_x(tracking: &Transform, aligned: &Transform) -> f64 {
    let hyp = translation(tracking) - translation(aligned);
    let opp = perpendicular_component(&hyp, &unit_forward(aligned));
    let angle = angle_between(&hyp, &opp);

    let orientation = hyp - opp;
    if orientation.dot(&unit_up(tracking)) > 0.0 {
        -angle
    } else {
        angle
    }
}

/// Yaw-like angle: same construction against the aligned left axis.
///
/// The sign convention is intentionally the mirror of `angle_for_x` (the
/// angle is negated on the non-positive branch of the dot test), and the
/// extraction is known to misbehave for non-aligned transforms. Both
/// behaviors are kept as-is.
fn angle_for_y(tracking: &Transform, aligned: &Transform) -> f64 {
    let hyp = translation(tracking) - translation(aligned);
    let opp = perpendicular_component(&hyp, &unit_left(aligned));
    let angle = angle_between(&hyp, &opp);

    let orientation = hyp - opp;
    if orientation.dot(&unit_right(tracking)) > 0.0 {
        angle
    } else {
        -angle
    }
}

/// Roll-like angle: not extracted, always zero.
fn angle_for_z(_tracking: &Transform, _aligned: &Transform) -> f64 {
    0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::transform::{rotation_x, translation_transform};
    use crate::scene::ScriptedScene;
    use crate::smoothing::WINDOW_CAPACITY;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

    const DT: f64 = 0.1;

    /// Tracker observing a fresh node, aligned to the identity transform.
    fn tracker_with_node(scene: &mut ScriptedScene) -> (AngleTracker, NodeId) {
        let node = scene.add_node(Transform::identity());
        let mut tracker = AngleTracker::new();
        tracker.set_tracking_node(Some(node));
        tracker.set_aligned_transform(Some(Transform::identity()));
        (tracker, node)
    }

    /// Place the tracking node one meter from the aligned origin, raised
    /// `elevation` radians above the aligned forward axis. The extracted
    /// angle X is the complement, `PI/2 - elevation`.
    fn place_at_elevation(scene: &mut ScriptedScene, node: NodeId, elevation: f64) {
        let position = Vector3::new(0.0, elevation.sin(), elevation.cos());
        scene.set_node_transform(node, translation_transform(position));
    }

    #[test]
    fn test_angle_x_magnitude_at_45_degrees() {
        // node one meter out, 45 deg above the forward axis; the offset tips
        // 45 deg out of the plane perpendicular to forward
        let aligned = Transform::identity();
        let tracking = translation_transform(Vector3::new(
            0.0,
            FRAC_PI_4.sin(),
            FRAC_PI_4.cos(),
        ));

        let angle = angle_for_x(&tracking, &aligned);
        assert_relative_eq!(angle.abs(), FRAC_PI_4, epsilon = 1e-9);
        // removed component is along +Z, orthogonal to the node's up: the
        // dot test is not positive, so the angle keeps its positive sign
        assert!(angle > 0.0);
    }

    #[test]
    fn test_angle_x_sign_follows_node_up() {
        let aligned = Transform::identity();
        let position = translation_transform(Vector3::new(0.0, FRAC_PI_4.sin(), FRAC_PI_4.cos()));

        // pitching the node forward tips its up vector toward +Z, the
        // direction of the removed component, turning the dot test positive
        let pitched_forward = angle_for_x(&(position * rotation_x(0.5)), &aligned);
        let pitched_back = angle_for_x(&(position * rotation_x(-0.5)), &aligned);
        assert!(pitched_forward < 0.0);
        assert!(pitched_back > 0.0);
        assert_relative_eq!(pitched_forward, -pitched_back, epsilon = 1e-9);
    }

    #[test]
    fn test_angle_y_against_left_axis() {
        let aligned = Transform::identity();
        // node swung 45 deg toward the aligned transform's right, level with it
        let tracking = translation_transform(Vector3::new(
            FRAC_PI_4.sin(),
            0.0,
            FRAC_PI_4.cos(),
        ));

        let angle = angle_for_y(&tracking, &aligned);
        assert_relative_eq!(angle.abs(), FRAC_PI_4, epsilon = 1e-9);
        // removed component is along -left = +right = node's right vector
        assert!(angle > 0.0);
    }

    #[test]
    fn test_angle_z_is_stubbed_to_zero() {
        let tracking = translation_transform(Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(angle_for_z(&tracking, &Transform::identity()), 0.0);
    }

    #[test]
    fn test_degenerate_geometry_is_nan() {
        // tracking node exactly at the aligned origin: zero-length hyp
        let angle = angle_for_x(&Transform::identity(), &Transform::identity());
        assert!(angle.is_nan());
    }

    #[test]
    fn test_nan_sample_skips_update() {
        let mut scene = ScriptedScene::new();
        let (mut tracker, node) = tracker_with_node(&mut scene);

        for i in 0..WINDOW_CAPACITY {
            place_at_elevation(&mut scene, node, 0.05 * i as f64 + 0.1);
            tracker.update_at(&scene, i as f64 * DT);
        }

        // coincident points produce NaN angles; the tick must be dropped
        scene.set_node_transform(node, Transform::identity());
        tracker.update_at(&scene, WINDOW_CAPACITY as f64 * DT);
        assert_eq!(tracker.angular_velocity_x(), 0.0);

        // one more good sample fills the windows as if the NaN tick never happened
        place_at_elevation(&mut scene, node, 0.05 * WINDOW_CAPACITY as f64 + 0.1);
        tracker.update_at(&scene, (WINDOW_CAPACITY + 1) as f64 * DT);
        assert!(tracker.angular_velocity_x().abs() > 0.0);
    }

    #[test]
    fn test_angular_velocity_of_steady_sweep() {
        let mut scene = ScriptedScene::new();
        let (mut tracker, node) = tracker_with_node(&mut scene);

        // elevation decreasing 0.05 rad per 0.1 s tick; the extracted angle
        // is PI/2 - elevation, so it increases 0.05 rad per tick
        for i in 0..=WINDOW_CAPACITY + 1 {
            place_at_elevation(&mut scene, node, 1.0 - 0.05 * i as f64);
            tracker.update_at(&scene, i as f64 * DT);
        }

        assert_relative_eq!(tracker.angular_velocity_x(), 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_stationary_node_velocity_converges_to_zero() {
        let mut scene = ScriptedScene::new();
        let (mut tracker, node) = tracker_with_node(&mut scene);

        place_at_elevation(&mut scene, node, 0.5);
        for i in 0..=WINDOW_CAPACITY + 1 {
            tracker.update_at(&scene, i as f64 * DT);
        }

        assert_relative_eq!(tracker.angular_velocity_x(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(tracker.angular_velocity_y(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(tracker.angular_velocity_z(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_hidden_node_resets() {
        let mut scene = ScriptedScene::new();
        let (mut tracker, node) = tracker_with_node(&mut scene);

        for i in 0..=WINDOW_CAPACITY + 1 {
            place_at_elevation(&mut scene, node, 1.0 - 0.05 * i as f64);
            tracker.update_at(&scene, i as f64 * DT);
        }
        assert!(tracker.angular_velocity_x().abs() > 0.0);
        assert!(tracker.angle_x().abs() > 0.0);

        scene.set_hidden(node, true);
        tracker.update_at(&scene, 10.0);
        assert_eq!(tracker.angular_velocity_x(), 0.0);
        assert_eq!(tracker.angle_x(), 0.0);
    }

    #[test]
    fn test_unset_aligned_transform_resets() {
        let mut scene = ScriptedScene::new();
        let (mut tracker, node) = tracker_with_node(&mut scene);

        for i in 0..=WINDOW_CAPACITY + 1 {
            place_at_elevation(&mut scene, node, 1.0 - 0.05 * i as f64);
            tracker.update_at(&scene, i as f64 * DT);
        }
        assert!(tracker.angular_velocity_x().abs() > 0.0);

        tracker.set_aligned_transform(None);
        tracker.update_at(&scene, 10.0);
        assert_eq!(tracker.angular_velocity_x(), 0.0);
    }

    #[test]
    fn test_small_normal_change_keeps_windows() {
        let mut scene = ScriptedScene::new();
        let (mut tracker, node) = tracker_with_node(&mut scene);

        for i in 0..=WINDOW_CAPACITY + 1 {
            place_at_elevation(&mut scene, node, 1.0 - 0.05 * i as f64);
            tracker.update_at(&scene, i as f64 * DT);
        }
        assert!(tracker.angular_velocity_x().abs() > 0.0);

        // 5 deg tilt: under the threshold, windows survive
        tracker.set_aligned_transform(Some(rotation_x(5.0_f64.to_radians())));
        assert!(tracker.angular_velocity_x().abs() > 0.0);
    }

    #[test]
    fn test_large_normal_jump_resets_windows() {
        let mut scene = ScriptedScene::new();
        let (mut tracker, node) = tracker_with_node(&mut scene);

        for i in 0..=WINDOW_CAPACITY + 1 {
            place_at_elevation(&mut scene, node, 1.0 - 0.05 * i as f64);
            tracker.update_at(&scene, i as f64 * DT);
        }
        assert!(tracker.angular_velocity_x().abs() > 0.0);

        // floor-to-wall: 90 deg normal jump clears everything first
        tracker.set_aligned_transform(Some(rotation_x(FRAC_PI_2)));
        assert_eq!(tracker.angular_velocity_x(), 0.0);
        assert!(tracker.aligned_transform().is_some());
    }

    #[test]
    fn test_reset_matches_fresh_tracker() {
        let mut scene = ScriptedScene::new();
        let (mut tracker, node) = tracker_with_node(&mut scene);

        for i in 0..=WINDOW_CAPACITY + 1 {
            place_at_elevation(&mut scene, node, 1.0 - 0.05 * i as f64);
            tracker.update_at(&scene, i as f64 * DT);
        }
        tracker.reset();

        assert_eq!(tracker.angle_x(), 0.0);
        assert_eq!(tracker.angular_velocity_x(), 0.0);
        assert_eq!(tracker.angular_velocity_y(), 0.0);
        assert_eq!(tracker.angular_velocity_z(), 0.0);
        // handle and transforms survive a reset
        assert!(tracker.tracking_node().is_some());
        assert!(tracker.aligned_transform().is_some());
    }
}
