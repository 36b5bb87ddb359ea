//! In-memory scene for driving the trackers without a host runtime.

use std::collections::HashMap;

use nalgebra::Vector3;

use crate::geometry::Transform;

use super::{NodeId, RayCaster, RayHit, SceneGraph};

#[derive(Debug, Clone)]
struct NodeState {
    transform: Transform,
    hidden: bool,
}

/// Scriptable [`SceneGraph`] + [`RayCaster`] backed by a node table and a
/// canned hit list.
///
/// Stands in for the host runtime in the demo binary and in end-to-end
/// tests: the script moves nodes and swaps the hit list between ticks, the
/// trackers observe the result.
#[derive(Debug, Default)]
pub struct ScriptedScene {
    nodes: HashMap<NodeId, NodeState>,
    hits: Vec<RayHit>,
    next_id: u64,
}

impl ScriptedScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a visible node, returning its handle.
    pub fn add_node(&mut self, transform: Transform) -> NodeId {
        let id = NodeId::new(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            NodeState {
                transform,
                hidden: false,
            },
        );
        id
    }

    /// Remove a node entirely; subsequent lookups return `None`.
    pub fn remove_node(&mut self, node: NodeId) {
        self.nodes.remove(&node);
    }

    /// Replace the hit list returned by every subsequent cast.
    pub fn set_hits(&mut self, hits: Vec<RayHit>) {
        self.hits = hits;
    }

    pub fn clear_hits(&mut self) {
        self.hits.clear();
    }
}

impl SceneGraph for ScriptedScene {
    fn node_transform(&self, node: NodeId) -> Option<Transform> {
        self.nodes.get(&node).map(|n| n.transform)
    }

    fn is_hidden(&self, node: NodeId) -> bool {
        self.nodes.get(&node).map(|n| n.hidden).unwrap_or(true)
    }

    fn set_hidden(&mut self, node: NodeId, hidden: bool) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.hidden = hidden;
        }
    }

    fn set_node_transform(&mut self, node: NodeId, transform: Transform) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.transform = transform;
        }
    }
}

impl RayCaster for ScriptedScene {
    fn cast(&self, _origin: Vector3<f64>, _direction: Vector3<f64>) -> Vec<RayHit> {
        self.hits.clone()
    }
}
