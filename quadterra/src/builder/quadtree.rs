//! Recursive, data-driven subdivision.

use std::sync::Arc;

use super::coordinate::{coordinate_system, CoordinateSystem};
use super::edges::normalize_tree;
use super::locator::{CoordinateSystemType, Locator};
use super::tile::{ChildState, ColorLayer, ElevationLayer, TerrainTile, TileNode};
use super::tree::{NodeId, TileTree};
use crate::assembler::{QuadrantAssembler, TilePayload};
use crate::key::{Profile, TileKey};
use crate::log::Logger;
use crate::{log_debug, log_info, log_warn};

/// Turns assembled payloads into tree nodes and grows the tree wherever
/// data exists.
///
/// Subdivision is all-or-nothing per parent: when any required child
/// cannot be built the parent becomes a [`ChildState::Leaf`] and none of
/// its children are attached. The pyramid therefore stops exactly where
/// data coverage runs out.
pub struct QuadtreeBuilder {
    assembler: Arc<QuadrantAssembler>,
    srs: Option<String>,
    logger: Arc<dyn Logger>,
}

impl QuadtreeBuilder {
    pub fn new(assembler: Arc<QuadrantAssembler>) -> Self {
        let logger = Arc::clone(assembler.logger());
        Self {
            assembler,
            srs: None,
            logger,
        }
    }

    /// Spatial reference declared for projected profiles.
    pub fn with_srs(mut self, srs: impl Into<String>) -> Self {
        self.srs = Some(srs.into());
        self
    }

    pub fn profile(&self) -> Profile {
        self.assembler.profile()
    }

    pub fn assembler(&self) -> &Arc<QuadrantAssembler> {
        &self.assembler
    }

    pub fn coordinate_system(&self) -> CoordinateSystem {
        coordinate_system(self.profile(), self.srs.as_deref())
    }

    /// Build the node for `key`, or `None` when the quadrant has no data.
    ///
    /// The node is detached (no parent) and its children are deferred.
    pub fn build_quadrant(&self, key: &TileKey) -> Option<TileNode> {
        let payload = self.assembler.assemble(key)?;
        self.wrap(payload)
    }

    fn wrap(&self, payload: TilePayload) -> Option<TileNode> {
        let key = payload.key;
        let extent = match key.geo_extents() {
            Ok(extent) => extent,
            Err(e) => {
                log_warn!(self.logger, "Cannot place {}: {}", key, e);
                return None;
            }
        };
        let settings = self.assembler.settings();
        let cs_type = match self.profile() {
            Profile::Projected(_) => CoordinateSystemType::Projected,
            _ => CoordinateSystemType::Geographic,
        };
        let locator = Locator::new(extent, cs_type);

        let center = extent.center();
        let radius = (center.0 - extent.xmin).hypot(center.1 - extent.ymin);

        let heightfield = payload.heightfield;
        let elevation = ElevationLayer {
            locator,
            origin: (extent.xmin, extent.ymin),
            x_interval: extent.width() / (heightfield.columns() - 1) as f64,
            y_interval: extent.height() / (heightfield.rows() - 1) as f64,
            skirt_height: radius * settings.skirt_ratio,
            heightfield,
        };

        // Imagery is already cropped to this key; Mercator pixels still
        // need the warp to land on a geographic tile.
        let mercator = self.profile() == Profile::Mercator;
        let color_layers = payload
            .image_layers
            .into_iter()
            .map(|layer| {
                let mut layer_locator = locator;
                if mercator {
                    layer_locator = layer_locator.with_mercator();
                }
                ColorLayer {
                    image: layer.image,
                    locator: layer_locator,
                    origin_key: layer.origin_key,
                    source_index: layer.source_index,
                }
            })
            .collect();

        Some(TileNode {
            key,
            tile: TerrainTile {
                tile_id: key.tile_id(),
                locator,
                elevation,
                color_layers,
                requires_normals: true,
                edges_dirty: true,
            },
            center,
            radius,
            min_range: radius * settings.min_tile_range_factor,
            max_range: settings.max_range,
            parent: None,
            children: Vec::new(),
            state: ChildState::Deferred,
        })
    }

    /// Build a tree holding every root quadrant that has data.
    pub fn build_roots(&self) -> TileTree {
        let mut tree = TileTree::new();
        for key in self.profile().root_keys() {
            match self.build_quadrant(&key) {
                Some(node) => {
                    tree.insert_root(node);
                }
                None => log_debug!(self.logger, "No data for root {}", key),
            }
        }
        tree
    }

    /// Materialise the children of `parent`.
    ///
    /// Attempts every required quadrant (two for the plate-carrée root,
    /// four otherwise) and attaches them only if all succeeded. Returns
    /// whether the node now has children.
    pub fn add_children(&self, tree: &mut TileTree, parent: NodeId) -> bool {
        let Some(node) = tree.get(parent) else {
            return false;
        };
        match node.state {
            ChildState::Expanded => return true,
            ChildState::Leaf => return false,
            ChildState::Deferred => {}
        }
        let key = node.key;
        let count = self.profile().quadrant_count(key.level());

        let children: Vec<Option<TileNode>> = (0..count as u8)
            .map(|quadrant| match key.subkey(quadrant) {
                Ok(child) => self.build_quadrant(&child),
                Err(e) => {
                    log_debug!(self.logger, "No quadrant {} under {}: {}", quadrant, key, e);
                    None
                }
            })
            .collect();

        if children.iter().any(Option::is_none) {
            log_debug!(
                self.logger,
                "Couldn't create all {} quadrants for {}; time to stop subdividing",
                count,
                key
            );
            if let Some(node) = tree.get_mut(parent) {
                node.state = ChildState::Leaf;
            }
            return false;
        }

        tree.attach_children(parent, children.into_iter().flatten().collect());
        true
    }

    /// Expand the subtree under `node` down to `max_level`.
    ///
    /// Returns the number of nodes added.
    pub fn expand(&self, tree: &mut TileTree, node: NodeId, max_level: u32) -> usize {
        let mut added = 0;
        let mut pending = vec![node];
        while let Some(id) = pending.pop() {
            let Some(current) = tree.get(id) else {
                continue;
            };
            if current.key.level() >= max_level {
                continue;
            }
            if current.state == ChildState::Deferred && self.add_children(tree, id) {
                added += tree.children(id).len();
            }
            pending.extend(tree.children(id).iter().copied());
        }
        added
    }

    /// Build the roots, expand them to `max_level` and normalise every
    /// shared edge.
    pub fn build(&self, max_level: u32) -> TileTree {
        let mut tree = self.build_roots();
        let roots = tree.roots().to_vec();
        for root in roots {
            self.expand(&mut tree, root, max_level);
        }
        let edges = normalize_tree(&mut tree);
        log_info!(
            self.logger,
            "Built {} tile(s) to level {} ({} shared edge(s) normalised)",
            tree.len(),
            max_level,
            edges
        );
        tree
    }
}
