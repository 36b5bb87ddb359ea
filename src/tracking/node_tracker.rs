//! Per-frame pose composition for a node following detected surfaces.

use std::f64::consts::PI;

use nalgebra::{UnitQuaternion, Vector3};
use tracing::warn;

use crate::geometry::angles::{project_onto_plane, signed_angle};
use crate::geometry::transform::{
    rotation, rotation_y, scale_transform, translation, translation_transform, unit_back,
    unit_forward, unit_right, unit_up, WORLD_UP,
};
use crate::geometry::Transform;
use crate::scene::{NodeId, RayCaster, SceneGraph, SurfaceAlignment, SurfaceKind};
use crate::tracking::{AngleTracker, PositionTracker};

/// Resting scale of the animated axes; velocity scales up to double it.
const SCALE_BASE: f64 = 0.75;

/// Drives one tracked node to follow the surface behind a tracking node.
///
/// Each frame tick: ray-cast backward from the tracking node, correct the
/// hit surface for the ceiling case, compute the rotation aligning the
/// surface with the tracking node, update the angle tracker, then compose
/// scale/rotation animation effects with the alignment and surface
/// transforms and write the result onto the tracked node.
///
/// All effects degrade to identity while the velocity windows warm up, and
/// every failure (missing node, no surface hit) degrades to hiding the
/// tracked node for the tick.
#[derive(Debug)]
pub struct NodeTracker {
    tracked_node: Option<NodeId>,
    tracking_node: Option<NodeId>,

    /// Master switch; when false the tracked node is held hidden.
    pub enabled: bool,
    /// Rotate the tracked node so its back axis lines up with the tracking
    /// node's projected up vector.
    pub align_with_tracking: bool,
    /// Squash/stretch the tracked node with angular velocity.
    pub scale_effect: bool,
    /// Tilt the tracked node with angular velocity.
    pub rotation_effect: bool,
    /// Tilt the tracked node with its own linear velocity. Off by default.
    pub pan_rotation_effect: bool,

    position_tracker: PositionTracker,
    angle_tracker: AngleTracker,

    /// Base transform the per-tick composition starts from.
    pub initial_transform: Transform,
    adjusted_plane_transform: Transform,
    plane_rotation_transform: Transform,
    rotation_adjusted_plane_transform: Transform,
}

impl NodeTracker {
    pub fn new() -> Self {
        Self {
            tracked_node: None,
            tracking_node: None,
            enabled: true,
            align_with_tracking: true,
            scale_effect: true,
            rotation_effect: true,
            pan_rotation_effect: false,
            position_tracker: PositionTracker::new(),
            angle_tracker: AngleTracker::new(),
            initial_transform: Transform::identity(),
            adjusted_plane_transform: Transform::identity(),
            plane_rotation_transform: Transform::identity(),
            rotation_adjusted_plane_transform: Transform::identity(),
        }
    }

    /// Set the node whose pose this tracker writes. Also observed by the
    /// position tracker.
    pub fn set_tracked_node(&mut self, node: Option<NodeId>) {
        self.tracked_node = node;
        self.position_tracker.set_node(node);
    }

    pub fn tracked_node(&self) -> Option<NodeId> {
        self.tracked_node
    }

    /// Set the moving reference node (e.g. the camera) whose motion drives
    /// the effects.
    pub fn set_tracking_node(&mut self, node: Option<NodeId>) {
        self.tracking_node = node;
        self.angle_tracker.set_tracking_node(node);
    }

    pub fn tracking_node(&self) -> Option<NodeId> {
        self.tracking_node
    }

    pub fn position_tracker(&self) -> &PositionTracker {
        &self.position_tracker
    }

    pub fn angle_tracker(&self) -> &AngleTracker {
        &self.angle_tracker
    }

    /// Run one frame tick at `time` (monotonic seconds).
    pub fn update_at<S, R>(&mut self, scene: &mut S, rays: &R, time: f64)
    where
        S: SceneGraph,
        R: RayCaster,
    {
        let surface_acquired = self.acquire_surface(scene, rays);

        self.angle_tracker.update_at(scene, time);

        if surface_acquired {
            let pose = self.compose_pose();
            if let Some(tracked) = self.tracked_node {
                scene.set_node_transform(tracked, pose);
            }
        }

        self.position_tracker.update_at(scene, time);
    }

    /// Ray-cast for a plane behind the tracking node and refresh the working
    /// transforms. Returns false when there is nothing to follow this tick;
    /// the tracked node is then hidden.
    fn acquire_surface<S, R>(&mut self, scene: &mut S, rays: &R) -> bool
    where
        S: SceneGraph,
        R: RayCaster,
    {
        let (Some(tracked), Some(tracking)) = (self.tracked_node, self.tracking_node) else {
            return false;
        };

        if !self.enabled {
            scene.set_hidden(tracked, true);
            return false;
        }
        scene.set_hidden(tracked, false);

        let Some(tracking_transform) = scene.node_transform(tracking) else {
            return false;
        };

        let origin = translation(&tracking_transform);
        let hits = rays.cast(origin, unit_back(&tracking_transform));
        if hits.is_empty() {
            scene.set_hidden(tracked, true);
            return false;
        }

        let Some(hit) = hits.iter().find(|h| h.kind == SurfaceKind::Plane) else {
            scene.set_hidden(tracked, true);
            return false;
        };

        self.adjusted_plane_transform =
            corrected_surface_transform(&hit.world_transform, hit.alignment);
        self.plane_rotation_transform =
            alignment_rotation(&self.adjusted_plane_transform, &tracking_transform);
        self.rotation_adjusted_plane_transform =
            self.adjusted_plane_transform * self.plane_rotation_transform;

        self.angle_tracker
            .set_reference_transform(Some(self.adjusted_plane_transform));
        self.angle_tracker
            .set_aligned_transform(Some(self.rotation_adjusted_plane_transform));

        true
    }

    /// Compose the final world transform for the tracked node from the
    /// working transforms and the current velocity signals.
    fn compose_pose(&self) -> Transform {
        let mut pose = self.initial_transform;

        if self.scale_effect {
            pose = self.scale_effect_transform() * pose;
        }
        if self.rotation_effect {
            pose = self.rotation_effect_transform() * pose;
        }
        if self.pan_rotation_effect {
            pose = self.pan_rotation_transform() * pose;
        }
        if self.align_with_tracking {
            pose = self.plane_rotation_transform * pose;
        }

        self.adjusted_plane_transform * pose
    }

    /// Squash/stretch from angular velocity: X and Z grow from the resting
    /// scale toward double as |velocity| approaches pi rad/s; Y stays 1.
    fn scale_effect_transform(&self) -> Transform {
        if self.tracking_node.is_none() {
            return Transform::identity();
        }

        let wx = self.angle_tracker.angular_velocity_x();
        let wz = self.angle_tracker.angular_velocity_y();
        let scale_x = SCALE_BASE + SCALE_BASE * (wx.abs().clamp(0.0, PI) / PI);
        let scale_z = SCALE_BASE + SCALE_BASE * (wz.abs().clamp(0.0, PI) / PI);

        scale_transform(Vector3::new(scale_x, 1.0, scale_z))
    }

    /// Tilt from angular velocity: clamped X velocity rotates about local X,
    /// negated clamped Y velocity about local Z.
    fn rotation_effect_transform(&self) -> Transform {
        if self.tracking_node.is_none() {
            return Transform::identity();
        }

        let rx = self.angle_tracker.angular_velocity_x().clamp(-PI, PI) / PI;
        let rz = -(self.angle_tracker.angular_velocity_y().clamp(-PI, PI) / PI);

        let rotation = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), rx)
            * UnitQuaternion::from_axis_angle(&Vector3::z_axis(), rz);
        rotation.to_homogeneous()
    }

    /// Tilt from the tracked node's own linear velocity.
    fn pan_rotation_transform(&self) -> Transform {
        if self.position_tracker.node().is_none() {
            return Transform::identity();
        }

        let v = self.position_tracker.velocity();
        let about_x = v.y.clamp(-2.0, 2.0) / 9.0;
        let about_z = v.x.clamp(-2.0, 2.0) / 4.5;

        let rotation = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), about_x)
            * UnitQuaternion::from_axis_angle(&Vector3::z_axis(), about_z);
        rotation.to_homogeneous()
    }
}

impl Default for NodeTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Correct a hit surface transform for the ceiling case.
///
/// A horizontal surface whose up vector opposes world up (the tracking node
/// is pointing at a ceiling) keeps its position but is flipped a half turn
/// about its own right axis, turning its up vector back toward world up so
/// the composed pose reads upright either way. Vertical surfaces pass
/// through; unrecognized alignments are logged and passed through.
pub fn corrected_surface_transform(surface: &Transform, alignment: SurfaceAlignment) -> Transform {
    match alignment {
        SurfaceAlignment::Horizontal => {
            if WORLD_UP.dot(&unit_up(surface)) > 0.0 {
                *surface
            } else {
                let position = translation_transform(translation(surface));
                let flipped =
                    rotation(surface) * UnitQuaternion::from_axis_angle(&Vector3::x_axis(), PI);
                position * flipped.to_homogeneous()
            }
        }
        SurfaceAlignment::Vertical => *surface,
        SurfaceAlignment::Unknown => {
            warn!("unrecognized surface alignment, passing transform through");
            *surface
        }
    }
}

/// Rotation about the surface's own Y axis lining up its back vector with
/// the tracking node's up vector projected onto the surface plane. The sign
/// reference is the tracking node's forward vector.
pub fn alignment_rotation(surface: &Transform, tracking: &Transform) -> Transform {
    let plane_normal = unit_forward(surface).cross(&unit_right(surface));
    let projected = project_onto_plane(&unit_up(tracking), &plane_normal);
    let angle = signed_angle(&projected, &unit_back(surface), &unit_forward(tracking));
    rotation_y(angle)
}
