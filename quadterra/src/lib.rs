//! Quadterra - on-demand quadtree terrain pyramids
//!
//! This library turns heterogeneous imagery and elevation sources into a
//! sparse quadtree of renderable terrain tiles, and persists the source
//! fragments it produces in a disk tile store addressed by stable keys.
//!
//! # Overview
//!
//! - [`key`]: tile key algebra (profiles, subdivision, extents, canonical
//!   strings)
//! - [`source`]: imagery and elevation sources, including a store-backed
//!   caching decorator
//! - [`store`]: disk tile store with bucketed, TMS and quadkey layouts
//! - [`assembler`]: per-key compositing with ancestor interpolation
//! - [`builder`]: data-driven subdivision into a [`builder::TileTree`]
//! - [`seed`]: parallel cache seeding
//! - [`config`]: INI configuration
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
//! let imagery = MemorySource::new("ortho").with_uniform_image(Rgba([30, 80, 30, 255]), 8);
//! let assembler = QuadrantAssembler::new(Profile::Geodetic, TerrainSettings::default(), Arc::new(NoOpLogger))
//!     .with_image_source(Arc::new(imagery));
//!
//! let tree = QuadtreeBuilder::new(Arc::new(assembler)).build(1);
//! assert_eq!(tree.roots().len(), 2);
//! assert_eq!(tree.len(), 2 + 8);
//! ```

pub mod assembler;
pub mod builder;
pub mod config;
pub mod key;
pub mod log;
pub mod logging;
pub mod seed;
pub mod source;
pub mod store;

/// Version of the Quadterra library and CLI.
///
/// Defined once in the workspace `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
