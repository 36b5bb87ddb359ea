//! Smoothed linear velocity of an observed scene node.

use nalgebra::Vector3;
use tracing::debug;

use crate::geometry::transform::{translation, unit_forward, unit_right, unit_up};
use crate::scene::{resolve_visible, NodeId, SceneGraph};
use crate::smoothing::DeltaWindow;

/// Tracks one node's world translation and exposes its smoothed velocity.
///
/// Velocity is the gated mean rate over the x/y/z delta windows; it reads as
/// zero until all four windows (including the shared time window) are full,
/// and the tracker resets itself whenever the node is missing or hidden.
#[derive(Debug, Default)]
pub struct PositionTracker {
    node: Option<NodeId>,
    dx: DeltaWindow,
    dy: DeltaWindow,
    dz: DeltaWindow,
    dt: DeltaWindow,
}

impl PositionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swap the observed node. Window contents are kept; an invalid handle
    /// resets them on the next update.
    pub fn set_node(&mut self, node: Option<NodeId>) {
        self.node = node;
    }

    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    /// Current world translation of the observed node, zero if unresolvable.
    pub fn position<S: SceneGraph>(&self, scene: &S) -> Vector3<f64> {
        self.node
            .and_then(|n| scene.node_transform(n))
            .map(|t| translation(&t))
            .unwrap_or_else(Vector3::zeros)
    }

    /// Record one frame. Missing or hidden node resets all windows; a NaN
    /// translation component drops the sample without touching any window.
    pub fn update_at<S: SceneGraph>(&mut self, scene: &S, time: f64) {
        let Some(transform) = self.node.and_then(|n| resolve_visible(scene, n)) else {
            self.reset();
            return;
        };

        let p = translation(&transform);
        if p.x.is_nan() || p.y.is_nan() || p.z.is_nan() {
            debug!(x = p.x, y = p.y, z = p.z, "dropping NaN position sample");
            return;
        }

        self.dx.push(p.x);
        self.dy.push(p.y);
        self.dz.push(p.z);
        self.dt.push(time);
    }

    /// Smoothed world-frame velocity; zero until every window is full.
    pub fn velocity(&self) -> Vector3<f64> {
        if self.node.is_none() {
            return Vector3::zeros();
        }
        if !(self.dx.is_full() && self.dy.is_full() && self.dz.is_full() && self.dt.is_full()) {
            return Vector3::zeros();
        }
        let dt = self.dt.sum();
        Vector3::new(self.dx.sum() / dt, self.dy.sum() / dt, self.dz.sum() / dt)
    }

    /// World velocity re-expressed in the node's own right/up/forward basis.
    ///
    /// A change of basis via dot products, not a rotation of the vector.
    pub fn local_velocity<S: SceneGraph>(&self, scene: &S) -> Vector3<f64> {
        let Some(transform) = self.node.and_then(|n| scene.node_transform(n)) else {
            return Vector3::zeros();
        };

        let v = self.velocity();
        Vector3::new(
            v.dot(&unit_right(&transform)),
            v.dot(&unit_up(&transform)),
            v.dot(&unit_forward(&transform)),
        )
    }

    /// Return to the freshly constructed state.
    pub fn reset(&mut self) {
        self.dx.reset();
        self.dy.reset();
        self.dz.reset();
        self.dt.reset();
    }
}
