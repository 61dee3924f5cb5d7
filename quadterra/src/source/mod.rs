//! Raster and elevation sources.
//!
//! A [`TileSource`] produces an image and/or a heightfield for a
//! [`TileKey`](crate::key::TileKey) inside its declared level range.
//! "No data" is an ordinary answer (`None`), not an error.
//!
//! Provided implementations:
//! - [`MemorySource`] - explicit per-key content plus an optional uniform
//!   fill over a coverage extent
//! - [`DirectorySource`] - a local `<level>/<x>/<y>.<ext>` pyramid
//! - [`CachingSource`] - decorator that consults a
//!   [`TileStore`](crate::store::TileStore) before the inner source

mod caching;
mod directory;
mod heightfield;
mod memory;
mod types;

pub use caching::CachingSource;
pub use directory::{DirectorySource, RowConvention, SourceContent};
pub use heightfield::HeightField;
pub use memory::MemorySource;
pub use types::{SourceError, TileSource};
