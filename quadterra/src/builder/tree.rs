//! Arena holding the built pyramid.

use std::collections::{BTreeMap, HashMap};

use slotmap::SlotMap;

use super::tile::{ChildState, TileNode};
use crate::key::TileKey;

slotmap::new_key_type! {
    pub struct NodeId;
}

/// Single-owner tree of [`TileNode`]s.
///
/// Nodes reference their parent and children by [`NodeId`]; the tree also
/// indexes nodes by key so the renderer can resolve a child request by
/// name.
#[derive(Debug, Default)]
pub struct TileTree {
    nodes: SlotMap<NodeId, TileNode>,
    roots: Vec<NodeId>,
    by_key: HashMap<TileKey, NodeId>,
}

impl TileTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert_root(&mut self, node: TileNode) -> NodeId {
        let id = self.insert(node);
        self.roots.push(id);
        id
    }

    /// Attach `children` to `parent` and mark it expanded.
    pub(crate) fn attach_children(&mut self, parent: NodeId, children: Vec<TileNode>) -> Vec<NodeId> {
        let ids: Vec<NodeId> = children
            .into_iter()
            .map(|mut child| {
                child.parent = Some(parent);
                self.insert(child)
            })
            .collect();
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.extend(ids.iter().copied());
            node.state = ChildState::Expanded;
        }
        ids
    }

    fn insert(&mut self, node: TileNode) -> NodeId {
        let key = node.key;
        let id = self.nodes.insert(node);
        self.by_key.insert(key, id);
        id
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn get(&self, id: NodeId) -> Option<&TileNode> {
        self.nodes.get(id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut TileNode> {
        self.nodes.get_mut(id)
    }

    /// Node built for `key`, if any.
    pub fn find(&self, key: &TileKey) -> Option<NodeId> {
        self.by_key.get(key).copied()
    }

    /// Resolve a renderer request name (see [`TileNode::request_name`]).
    pub fn find_by_request(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|(_, node)| node.request_name() == name)
            .map(|(id, _)| id)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &TileNode)> {
        self.nodes.iter()
    }

    /// Number of nodes per level.
    pub fn level_counts(&self) -> BTreeMap<u32, usize> {
        let mut counts = BTreeMap::new();
        for node in self.nodes.values() {
            *counts.entry(node.key.level()).or_insert(0) += 1;
        }
        counts
    }

    /// Deepest level present, or `None` for an empty tree.
    pub fn max_level(&self) -> Option<u32> {
        self.nodes.values().map(|node| node.key.level()).max()
    }
}
