//! Sibling edge normalisation.
//!
//! Adjacent tiles sample their heightfields independently, so posts on a
//! shared edge can disagree (especially after interpolation from
//! different ancestors). This pass averages each shared edge into both
//! tiles and clears their `edges_dirty` flags.

use super::tree::{NodeId, TileTree};
use crate::source::HeightField;

/// How two siblings touch. The first node is west of (or north of) the
/// second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SharedEdge {
    Vertical,
    Horizontal,
}

/// Reconcile the edges shared by the children of `parent`.
///
/// Returns the number of shared edges averaged: 4 for a full quadrant
/// set (0|1, 2|3, 0/2, 1/3), 1 for the two-child plate-carrée root.
pub fn normalize_edges(tree: &mut TileTree, parent: NodeId) -> usize {
    let siblings = tree.children(parent).to_vec();
    reconcile(tree, &siblings)
}

/// Reconcile the edges shared by the root tiles.
pub fn normalize_roots(tree: &mut TileTree) -> usize {
    let roots = tree.roots().to_vec();
    reconcile(tree, &roots)
}

/// Run [`normalize_roots`] and [`normalize_edges`] for every expanded node.
pub fn normalize_tree(tree: &mut TileTree) -> usize {
    let parents: Vec<NodeId> = tree
        .iter()
        .filter(|(_, node)| !node.children.is_empty())
        .map(|(id, _)| id)
        .collect();
    let mut edges = normalize_roots(tree);
    for parent in parents {
        edges += normalize_edges(tree, parent);
    }
    edges
}

fn reconcile(tree: &mut TileTree, siblings: &[NodeId]) -> usize {
    let mut edges = 0;
    for (i, &a) in siblings.iter().enumerate() {
        for &b in &siblings[i + 1..] {
            let Some((first, second, edge)) = classify(tree, a, b) else {
                continue;
            };
            if average(tree, first, second, edge) {
                edges += 1;
            }
        }
    }
    for &id in siblings {
        if let Some(node) = tree.get_mut(id) {
            node.tile.edges_dirty = false;
        }
    }
    edges
}

fn classify(tree: &TileTree, a: NodeId, b: NodeId) -> Option<(NodeId, NodeId, SharedEdge)> {
    let ka = tree.get(a)?.key;
    let kb = tree.get(b)?.key;
    if ka.level() != kb.level() {
        return None;
    }
    // Rows count from the north, so a smaller y is the northern tile.
    match (ka.x().abs_diff(kb.x()), ka.y().abs_diff(kb.y())) {
        (1, 0) if ka.x() < kb.x() => Some((a, b, SharedEdge::Vertical)),
        (1, 0) => Some((b, a, SharedEdge::Vertical)),
        (0, 1) if ka.y() < kb.y() => Some((a, b, SharedEdge::Horizontal)),
        (0, 1) => Some((b, a, SharedEdge::Horizontal)),
        _ => None,
    }
}

fn average(tree: &mut TileTree, first: NodeId, second: NodeId, edge: SharedEdge) -> bool {
    let (Some(a), Some(b)) = (tree.get(first), tree.get(second)) else {
        return false;
    };
    let a = a.tile.elevation.heightfield.clone();
    let b = b.tile.elevation.heightfield.clone();

    let (new_a, new_b) = match edge {
        SharedEdge::Vertical => (
            blend_column(&a, a.columns() - 1, |t| b.sample(0.0, t)),
            blend_column(&b, 0, |t| a.sample(1.0, t)),
        ),
        SharedEdge::Horizontal => (
            blend_row(&a, a.rows() - 1, |t| b.sample(t, 0.0)),
            blend_row(&b, 0, |t| a.sample(t, 1.0)),
        ),
    };

    if let Some(node) = tree.get_mut(first) {
        node.tile.elevation.heightfield = new_a;
    }
    if let Some(node) = tree.get_mut(second) {
        node.tile.elevation.heightfield = new_b;
    }
    true
}

fn blend_column(hf: &HeightField, col: u32, other: impl Fn(f64) -> f32) -> HeightField {
    let mut out = hf.clone();
    let last = (hf.rows() - 1) as f64;
    for row in 0..hf.rows() {
        let t = row as f64 / last;
        out.set(col, row, (hf.get(col, row) + other(t)) / 2.0);
    }
    out
}

fn blend_row(hf: &HeightField, row: u32, other: impl Fn(f64) -> f32) -> HeightField {
    let mut out = hf.clone();
    let last = (hf.columns() - 1) as f64;
    for col in 0..hf.columns() {
        let t = col as f64 / last;
        out.set(col, row, (hf.get(col, row) + other(t)) / 2.0);
    }
    out
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::assembler::QuadrantAssembler;
    use crate::builder::QuadtreeBuilder;
    use crate::config::TerrainSettings;
    use crate::key::{Extent, Profile};
    use crate::log::NoOpLogger;
    use crate::source::MemorySource;

    const GRID: Extent = Extent::new(0.0, 0.0, 1000.0, 1000.0);

    /// Projected root split into four flat children at 100, 200, 300, 400.
    fn stepped_tree() -> (TileTree, NodeId) {
        let profile = Profile::Projected(GRID);
        let root = profile.root_keys()[0];
        let mut source = MemorySource::new("dem").with_heightfield(root, HeightField::flat(5, 5, 0.0));
        for quadrant in 0..4u8 {
            let elevation = 100.0 * (quadrant as f32 + 1.0);
            source = source.with_heightfield(
                root.subkey(quadrant).unwrap(),
                HeightField::flat(5, 5, elevation),
            );
        }
        let assembler = QuadrantAssembler::new(profile, TerrainSettings::default(), Arc::new(NoOpLogger))
            .with_heightfield_source(Arc::new(source));
        let builder = QuadtreeBuilder::new(Arc::new(assembler));

        let mut tree = builder.build_roots();
        let root_id = tree.roots()[0];
        assert!(builder.add_children(&mut tree, root_id));
        (tree, root_id)
    }

    fn heights(tree: &TileTree, parent: NodeId, index: usize) -> HeightField {
        let id = tree.children(parent)[index];
        tree.get(id).unwrap().tile.elevation.heightfield.clone()
    }

    #[test]
    fn test_shared_edges_are_averaged() {
        let (mut tree, root) = stepped_tree();

        assert_eq!(normalize_edges(&mut tree, root), 4);

        let nw = heights(&tree, root, 0);
        let ne = heights(&tree, root, 1);
        let sw = heights(&tree, root, 2);

        // 0|1 vertical edge, away from the corner post.
        assert_eq!(nw.get(4, 1), 150.0);
        assert_eq!(ne.get(0, 1), 150.0);
        // 0/2 horizontal edge.
        assert_eq!(nw.get(1, 4), 200.0);
        assert_eq!(sw.get(1, 0), 200.0);
        // Interior posts are untouched.
        assert_eq!(nw.get(2, 2), 100.0);
        assert_eq!(ne.get(2, 2), 200.0);
    }

    #[test]
    fn test_normalisation_clears_dirty_flags() {
        let (mut tree, root) = stepped_tree();
        assert!(tree
            .children(root)
            .iter()
            .all(|id| tree.get(*id).unwrap().tile.edges_dirty));

        normalize_edges(&mut tree, root);

        assert!(tree
            .children(root)
            .iter()
            .all(|id| !tree.get(*id).unwrap().tile.edges_dirty));
        // The parent's own edges are a matter for its siblings.
        assert!(tree.get(root).unwrap().tile.edges_dirty);
    }

    #[test]
    fn test_matching_edges_are_stable() {
        let (mut tree, root) = stepped_tree();
        normalize_edges(&mut tree, root);
        let once = heights(&tree, root, 3);

        normalize_edges(&mut tree, root);

        let twice = heights(&tree, root, 3);
        assert_eq!(once.get(0, 2), twice.get(0, 2));
        assert_eq!(once.get(2, 0), twice.get(2, 0));
    }

    #[test]
    fn test_normalize_tree_includes_roots() {
        let (mut tree, _) = stepped_tree();
        // One projected root: no root pairs, four child edges.
        assert_eq!(normalize_tree(&mut tree), 4);
        assert!(tree.iter().all(|(_, node)| !node.tile.edges_dirty));
    }
}
