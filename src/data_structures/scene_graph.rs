//! Engine scene graph.
//!
//! Scene nodes live in an arena owned by the [`crate::context::Context`] and
//! are addressed by [`NodeId`]. Slots of removed nodes are reused, but a
//! handle to a removed node stays invalid instead of silently pointing at a
//! newer node.

use log::warn;

use crate::{
    context::ChangeBatch,
    data_structures::arena::{Arena, ArenaIndex},
};

/// Handle of a node in a [`SceneGraph`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(ArenaIndex);

/// A node of the engine's scene graph: a named container for fields and
/// graphics with ordered children.
#[derive(Clone, Debug)]
pub struct SceneNode {
    name: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl SceneNode {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

#[derive(Debug, Default)]
pub struct SceneGraph {
    nodes: Arena<SceneNode>,
    changes: ChangeBatch,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a detached, unnamed node that can serve as the root of a
    /// region hierarchy.
    pub fn create_root(&mut self) -> NodeId {
        self.insert(SceneNode {
            name: None,
            parent: None,
            children: Vec::new(),
        })
    }

    /// Creates a named child below `parent`. Returns `None` when `parent` is
    /// not part of the graph.
    pub fn create_child(&mut self, parent: NodeId, name: &str) -> Option<NodeId> {
        if !self.contains(parent) {
            warn!("cannot create child '{}' below removed node {:?}", name, parent);
            return None;
        }
        let child = self.insert(SceneNode {
            name: Some(name.to_string()),
            parent: Some(parent),
            children: Vec::new(),
        });
        if let Some(node) = self.nodes.get_mut(parent.0) {
            node.children.push(child);
        }
        Some(child)
    }

    pub fn rename(&mut self, id: NodeId, name: &str) -> bool {
        match self.nodes.get_mut(id.0) {
            Some(node) => {
                node.name = Some(name.to_string());
                self.changes.changed();
                true
            }
            _ => false,
        }
    }

    /// Removes `id` and all of its descendants and detaches it from its
    /// parent. Returns the number of nodes removed.
    pub fn remove_subtree(&mut self, id: NodeId) -> usize {
        let Some(node) = self.nodes.remove(id.0) else {
            return 0;
        };
        if let Some(parent) = node.parent.and_then(|p| self.nodes.get_mut(p.0)) {
            parent.children.retain(|child| *child != id);
        }
        let mut removed = 1;
        let mut pending = node.children;
        while let Some(child) = pending.pop() {
            if let Some(child_node) = self.nodes.remove(child.0) {
                removed += 1;
                pending.extend(child_node.children);
            }
        }
        self.changes.changed();
        removed
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains(id.0)
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.0)
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Number of node slots allocated, including free ones.
    pub fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn begin_hierarchical_change(&mut self) {
        self.changes.begin();
    }

    pub fn end_hierarchical_change(&mut self) {
        self.changes.end();
    }

    pub fn change_notifications(&self) -> u64 {
        self.changes.notifications()
    }

    fn insert(&mut self, node: SceneNode) -> NodeId {
        let id = NodeId(self.nodes.insert(node));
        self.changes.changed();
        id
    }
}
