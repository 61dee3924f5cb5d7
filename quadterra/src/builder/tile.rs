//! Renderable tile and tree node types.

use image::RgbaImage;

use super::locator::Locator;
use super::tree::NodeId;
use crate::key::TileKey;
use crate::source::HeightField;

/// Elevation grid placed in the world.
#[derive(Debug, Clone, PartialEq)]
pub struct ElevationLayer {
    pub heightfield: HeightField,
    pub locator: Locator,
    /// South-west corner of the grid.
    pub origin: (f64, f64),
    /// Distance between adjacent posts along x.
    pub x_interval: f64,
    /// Distance between adjacent posts along y.
    pub y_interval: f64,
    /// Depth of the skirt hung below the tile edges.
    pub skirt_height: f64,
}

/// One draped image.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorLayer {
    pub image: RgbaImage,
    pub locator: Locator,
    pub origin_key: TileKey,
    pub source_index: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TerrainTile {
    pub tile_id: u64,
    pub locator: Locator,
    pub elevation: ElevationLayer,
    pub color_layers: Vec<ColorLayer>,
    pub requires_normals: bool,
    /// Set while the shared edges with siblings have not been reconciled.
    pub edges_dirty: bool,
}

/// Whether a node's children have been materialised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildState {
    /// Children may be requested once the viewer is within `min_range`.
    Deferred,
    Expanded,
    /// Subdivision was attempted and stopped here.
    Leaf,
}

/// A tile in the built pyramid.
///
/// The tile content is shown between `min_range` and `max_range`; closer
/// than `min_range` the renderer asks for the deferred children instead.
#[derive(Debug, Clone, PartialEq)]
pub struct TileNode {
    pub key: TileKey,
    pub tile: TerrainTile,
    pub center: (f64, f64),
    pub radius: f64,
    pub min_range: f64,
    pub max_range: f64,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub state: ChildState,
}

impl TileNode {
    /// Name the renderer uses to request this node's children.
    pub fn request_name(&self) -> String {
        format!("{}.tile", self.key)
    }

    /// True when a viewer at `distance` should trigger the child request.
    pub fn wants_children(&self, distance: f64) -> bool {
        self.state == ChildState::Deferred && distance < self.min_range
    }

    /// True when the node's own content is drawn at `distance`.
    ///
    /// Expanded nodes hand over to their children inside `min_range`.
    pub fn shows_content(&self, distance: f64) -> bool {
        if distance > self.max_range {
            return false;
        }
        distance >= self.min_range || self.state != ChildState::Expanded
    }

    pub fn is_leaf(&self) -> bool {
        self.state == ChildState::Leaf
    }
}
