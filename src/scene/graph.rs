//! Scene graph: hierarchy of positioned drawing nodes.
//!
//! Generators hand back one node per generated structure (chunk, tile,
//! plant). Each frame, `flatten()` walks the tree and produces the visible
//! drawings in paint order (parents before children, siblings in insertion
//! order) with resolved world transforms.

use std::collections::HashMap;

use crate::core::types::{DAffine2, DVec2};

use super::flatten::FlatDrawEntry;
use super::node::{LocalTransform, NodeContent, SceneNode, SceneNodeId};

/// Hierarchy of nodes under a single root group.
pub struct SceneGraph {
    nodes: HashMap<SceneNodeId, SceneNode>,
    root: SceneNodeId,
    next_id: u64,
    dirty: bool,
}

impl SceneGraph {
    /// Create a new scene graph with a root Group node.
    pub fn new() -> Self {
        let root_id = SceneNodeId(0);
        let root_node = SceneNode::new(root_id, "root", NodeContent::Group);

        let mut nodes = HashMap::new();
        nodes.insert(root_id, root_node);

        Self {
            nodes,
            root: root_id,
            next_id: 1,
            dirty: true,
        }
    }

    /// Get the root node ID.
    pub fn root(&self) -> SceneNodeId {
        self.root
    }

    /// Allocate a fresh node ID.
    fn alloc_id(&mut self) -> SceneNodeId {
        let id = SceneNodeId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Add a child node under `parent`. Returns the new node's ID.
    pub fn add_child(
        &mut self,
        parent: SceneNodeId,
        name: impl Into<String>,
        content: NodeContent,
    ) -> SceneNodeId {
        let id = self.alloc_id();
        let mut node = SceneNode::new(id, name, content);
        node.parent = Some(parent);

        self.nodes.insert(id, node);

        // Register as child of parent
        if let Some(parent_node) = self.nodes.get_mut(&parent) {
            parent_node.children.push(id);
        }

        self.dirty = true;
        id
    }

    /// Remove a node and its entire subtree, releasing their content.
    /// Cannot remove the root. Removing an absent node is a no-op.
    pub fn remove(&mut self, id: SceneNodeId) {
        if id == self.root {
            return;
        }

        // Collect subtree IDs (BFS)
        let mut to_remove = vec![id];
        let mut i = 0;
        while i < to_remove.len() {
            let current = to_remove[i];
            if let Some(node) = self.nodes.get(&current) {
                to_remove.extend_from_slice(&node.children);
            }
            i += 1;
        }

        // Detach from parent
        if let Some(parent_id) = self.nodes.get(&id).and_then(|n| n.parent) {
            if let Some(parent) = self.nodes.get_mut(&parent_id) {
                parent.children.retain(|c| *c != id);
            }
        }

        for nid in to_remove {
            self.nodes.remove(&nid);
        }

        self.dirty = true;
    }

    /// Move a node to a new parent. Cannot reparent the root, and a node
    /// cannot move under itself or one of its descendants. Returns false if
    /// nothing moved.
    pub fn reparent(&mut self, id: SceneNodeId, new_parent: SceneNodeId) -> bool {
        if id == self.root
            || !self.nodes.contains_key(&id)
            || !self.nodes.contains_key(&new_parent)
            || self.is_in_subtree(new_parent, id)
        {
            return false;
        }

        // Detach from old parent
        if let Some(old_parent_id) = self.nodes.get(&id).and_then(|n| n.parent) {
            if let Some(old_parent) = self.nodes.get_mut(&old_parent_id) {
                old_parent.children.retain(|c| *c != id);
            }
        }

        // Attach to new parent
        if let Some(new_parent_node) = self.nodes.get_mut(&new_parent) {
            new_parent_node.children.push(id);
        }
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent = Some(new_parent);
        }

        self.dirty = true;
        true
    }

    /// True if `id` is `ancestor` or lies below it.
    fn is_in_subtree(&self, id: SceneNodeId, ancestor: SceneNodeId) -> bool {
        let mut current = Some(id);
        while let Some(node_id) = current {
            if node_id == ancestor {
                return true;
            }
            current = self.nodes.get(&node_id).and_then(|n| n.parent);
        }
        false
    }

    /// Set the local transform of a node.
    pub fn set_transform(&mut self, id: SceneNodeId, transform: LocalTransform) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.local_transform = transform;
            self.dirty = true;
        }
    }

    pub fn set_position(&mut self, id: SceneNodeId, position: DVec2) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.local_transform.position = position;
            self.dirty = true;
        }
    }

    pub fn position(&self, id: SceneNodeId) -> Option<DVec2> {
        self.nodes.get(&id).map(|n| n.local_transform.position)
    }

    pub fn set_rotation(&mut self, id: SceneNodeId, rotation: f64) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.local_transform.rotation = rotation;
            self.dirty = true;
        }
    }

    pub fn rotation(&self, id: SceneNodeId) -> Option<f64> {
        self.nodes.get(&id).map(|n| n.local_transform.rotation)
    }

    pub fn set_scale(&mut self, id: SceneNodeId, scale: DVec2) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.local_transform.scale = scale;
            self.dirty = true;
        }
    }

    pub fn scale(&self, id: SceneNodeId) -> Option<DVec2> {
        self.nodes.get(&id).map(|n| n.local_transform.scale)
    }

    /// Set the visibility of a node.
    pub fn set_visible(&mut self, id: SceneNodeId, visible: bool) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.visible = visible;
            self.dirty = true;
        }
    }

    /// Get an immutable reference to a node.
    pub fn get(&self, id: SceneNodeId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: SceneNodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Iterate over the children of a node.
    pub fn children(&self, id: SceneNodeId) -> impl Iterator<Item = SceneNodeId> + '_ {
        self.nodes
            .get(&id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
            .iter()
            .copied()
    }

    /// Total number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Walk the tree and collect all visible drawings. World transforms are
    /// recomputed only if the graph changed since the last call.
    pub fn flatten(&mut self) -> Vec<FlatDrawEntry<'_>> {
        if self.dirty {
            self.propagate_transforms(self.root, DAffine2::IDENTITY);
            self.dirty = false;
        }

        let this: &Self = self;
        let mut out = Vec::new();
        this.collect_visible(this.root, &mut out);
        out
    }

    /// Recursively propagate world transforms.
    fn propagate_transforms(&mut self, node_id: SceneNodeId, parent_world: DAffine2) {
        let (local, children) = {
            let node = match self.nodes.get(&node_id) {
                Some(n) => n,
                None => return,
            };
            (node.local_transform.to_affine(), node.children.clone())
        };

        let world = parent_world * local;

        if let Some(node) = self.nodes.get_mut(&node_id) {
            node.world_transform = world;
        }

        for child_id in children {
            self.propagate_transforms(child_id, world);
        }
    }

    /// Recursively collect visible drawings.
    fn collect_visible<'a>(&'a self, node_id: SceneNodeId, out: &mut Vec<FlatDrawEntry<'a>>) {
        let node = match self.nodes.get(&node_id) {
            Some(n) => n,
            None => return,
        };

        if !node.visible {
            return;
        }

        if let NodeContent::Drawing(drawing) = &node.content {
            out.push(FlatDrawEntry {
                node: node.id,
                transform: node.world_transform,
                drawing,
            });
        }

        for &child_id in &node.children {
            self.collect_visible(child_id, out);
        }
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{Color, DrawList, RenderSink};

    fn drawing() -> NodeContent {
        let mut list = DrawList::new();
        list.begin_fill(Color::WHITE, 1.0);
        list.circle(DVec2::ZERO, 1.0);
        list.end_fill();
        NodeContent::Drawing(list)
    }

    #[test]
    fn test_new_scene_graph() {
        let graph = SceneGraph::new();
        assert_eq!(graph.node_count(), 1); // root only
        assert_eq!(graph.get(graph.root()).unwrap().name, "root");
    }

    #[test]
    fn test_add_child() {
        let mut graph = SceneGraph::new();
        let root = graph.root();

        let child = graph.add_child(root, "terrain", NodeContent::Group);

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.get(child).unwrap().parent, Some(root));
        assert!(graph.children(root).any(|c| c == child));
    }

    #[test]
    fn test_remove_subtree() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let a = graph.add_child(root, "a", NodeContent::Group);
        let b = graph.add_child(a, "b", drawing());
        let _c = graph.add_child(b, "c", drawing());
        let d = graph.add_child(root, "d", NodeContent::Group);

        graph.remove(a);
        assert_eq!(graph.node_count(), 2);
        assert!(!graph.contains(b));
        assert!(graph.contains(d));
        assert_eq!(graph.children(root).collect::<Vec<_>>(), vec![d]);

        // Second removal is a no-op
        graph.remove(a);
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn test_cannot_remove_root() {
        let mut graph = SceneGraph::new();
        graph.remove(graph.root());
        assert_eq!(graph.node_count(), 1);
    }

    #[test]
    fn test_reparent() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let a = graph.add_child(root, "a", NodeContent::Group);
        let b = graph.add_child(root, "b", NodeContent::Group);
        let c = graph.add_child(a, "c", NodeContent::Group);

        assert!(graph.reparent(c, b));
        assert_eq!(graph.get(c).unwrap().parent, Some(b));
        assert_eq!(graph.children(a).count(), 0);
        assert_eq!(graph.children(b).collect::<Vec<_>>(), vec![c]);
    }

    #[test]
    fn test_transform_accessors() {
        let mut graph = SceneGraph::new();
        let n = graph.add_child(graph.root(), "n", NodeContent::Group);
        graph.set_position(n, DVec2::new(3.0, 4.0));
        graph.set_rotation(n, 0.25);
        graph.set_scale(n, DVec2::splat(2.0));
        assert_eq!(graph.position(n), Some(DVec2::new(3.0, 4.0)));
        assert_eq!(graph.rotation(n), Some(0.25));
        assert_eq!(graph.scale(n), Some(DVec2::splat(2.0)));
        assert_eq!(graph.position(SceneNodeId(999)), None);
    }

    #[test]
    fn test_flatten_propagates_transforms() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let group = graph.add_child(root, "group", NodeContent::Group);
        graph.set_position(group, DVec2::new(10.0, 0.0));
        let leaf = graph.add_child(group, "leaf", drawing());
        graph.set_position(leaf, DVec2::new(0.0, 5.0));

        let entries = graph.flatten();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].node, leaf);
        let p = entries[0].transform.transform_point2(DVec2::ZERO);
        assert!((p - DVec2::new(10.0, 5.0)).length() < 1e-12);
        assert!(!graph.dirty);
    }

    #[test]
    fn test_flatten_reuses_clean_transforms() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let leaf = graph.add_child(root, "leaf", drawing());
        graph.set_position(leaf, DVec2::new(2.0, 0.0));
        graph.flatten();

        // Nothing changed: cached transforms are reused as-is
        let again = graph.flatten();
        assert_eq!(again[0].transform.translation, DVec2::new(2.0, 0.0));

        graph.set_position(leaf, DVec2::new(7.0, 1.0));
        assert!(graph.dirty);
        let moved = graph.flatten();
        assert_eq!(moved[0].transform.translation, DVec2::new(7.0, 1.0));
    }

    #[test]
    fn test_reparent_rejects_cycles() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let a = graph.add_child(root, "a", NodeContent::Group);
        let b = graph.add_child(a, "b", NodeContent::Group);
        let c = graph.add_child(b, "c", drawing());

        assert!(!graph.reparent(a, c));
        assert!(!graph.reparent(a, a));
        assert!(!graph.reparent(SceneNodeId(999), root));
        assert_eq!(graph.get(a).unwrap().parent, Some(root));
        assert_eq!(graph.children(c).count(), 0);

        // The subtree is still a tree and removes cleanly
        graph.remove(a);
        assert_eq!(graph.node_count(), 1);
    }

    #[test]
    fn test_flatten_skips_hidden_subtrees() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let group = graph.add_child(root, "group", NodeContent::Group);
        graph.add_child(group, "a", drawing());
        let b = graph.add_child(root, "b", drawing());

        graph.set_visible(group, false);
        let entries = graph.flatten();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].node, b);
    }

    #[test]
    fn test_flatten_paint_order() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let back = graph.add_child(root, "back", drawing());
        let front = graph.add_child(root, "front", drawing());
        let ids: Vec<_> = graph.flatten().iter().map(|e| e.node).collect();
        assert_eq!(ids, vec![back, front]);
    }
}
