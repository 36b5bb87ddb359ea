//! Host-runtime interface: scene nodes and surface ray casting.
//!
//! The trackers never own scene-node lifetime. They hold opaque [`NodeId`]
//! handles and resolve them through the host's [`SceneGraph`] every tick, so
//! a node disappearing or hiding between frames is an ordinary, recoverable
//! condition.

pub mod script;

pub use script::ScriptedScene;

use nalgebra::Vector3;

use crate::geometry::Transform;

/// Opaque handle to a host scene node.
///
/// Lightweight copyable identifier instead of a shared reference, so the
/// host keeps exclusive ownership of node lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u64);

impl NodeId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node{}", self.0)
    }
}

/// Surface alignment reported by the host's plane detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceAlignment {
    Horizontal,
    Vertical,
    /// Alignment the host could not classify; passed through unmodified.
    Unknown,
}

/// Kind of surface behind a ray-cast hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceKind {
    /// A detected plane; the only kind the pose composer tracks.
    Plane,
    Other,
}

/// One candidate surface returned by a ray cast.
#[derive(Debug, Clone)]
pub struct RayHit {
    pub world_transform: Transform,
    pub alignment: SurfaceAlignment,
    pub kind: SurfaceKind,
}

/// Queryable scene graph exposed by the host runtime.
pub trait SceneGraph {
    /// Current world transform of `node`, or `None` if the node is gone.
    fn node_transform(&self, node: NodeId) -> Option<Transform>;

    fn is_hidden(&self, node: NodeId) -> bool;

    fn set_hidden(&mut self, node: NodeId, hidden: bool);

    fn set_node_transform(&mut self, node: NodeId, transform: Transform);
}

/// Ray casting against the host's detected surfaces.
pub trait RayCaster {
    /// Candidate hits along `direction` from `origin`, nearest first.
    fn cast(&self, origin: Vector3<f64>, direction: Vector3<f64>) -> Vec<RayHit>;
}

/// Resolve a node's transform only if the node exists and is visible.
pub fn resolve_visible<S: SceneGraph + ?Sized>(scene: &S, node: NodeId) -> Option<Transform> {
    if scene.is_hidden(node) {
        return None;
    }
    scene.node_transform(node)
}
