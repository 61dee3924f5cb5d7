//! Pyramid construction.
//!
//! [`QuadtreeBuilder`] wraps assembled payloads into [`TileNode`]s held in
//! a [`TileTree`] arena and subdivides wherever every child quadrant has
//! data. Each node carries the distance thresholds a renderer uses to
//! decide when to request its children.
//!
//! ```
//! use std::sync::Arc;
//! use image::Rgba;
//! use quadterra::assembler::QuadrantAssembler;
//! use quadterra::builder::QuadtreeBuilder;
//! use quadterra::config::TerrainSettings;
//! use quadterra::key::Profile;
//! use quadterra::log::NoOpLogger;
//! use quadterra::source::MemorySource;
//!
//! let imagery = MemorySource::new("ortho").with_uniform_image(Rgba([0, 90, 0, 255]), 16);
//! let assembler = QuadrantAssembler::new(Profile::Mercator, TerrainSettings::default(), Arc::new(NoOpLogger))
//!     .with_image_source(Arc::new(imagery));
//! let builder = QuadtreeBuilder::new(Arc::new(assembler));
//!
//! let tree = builder.build(2);
//! assert_eq!(tree.len(), 1 + 4 + 16);
//! ```

mod coordinate;
mod edges;
mod locator;
mod quadtree;
mod tile;
mod tree;

pub use coordinate::{coordinate_system, CoordinateSystem, EQUIRECTANGULAR_PROJ4};
pub use edges::{normalize_edges, normalize_roots, normalize_tree};
pub use locator::{CoordinateSystemType, Locator};
pub use quadtree::QuadtreeBuilder;
pub use tile::{ChildState, ColorLayer, ElevationLayer, TerrainTile, TileNode};
pub use tree::{NodeId, TileTree};
