//! Disk tile store.
//!
//! Persists [`TileFragment`]s by `(TileKey, SourceId)` under one of three
//! layouts (see [`AddressScheme`]). Stores are plain key-value: nothing is
//! evicted or invalidated. I/O failures degrade to misses and skipped
//! writes.
//!
//! ```
//! use std::sync::Arc;
//! use quadterra::key::Profile;
//! use quadterra::log::NoOpLogger;
//! use quadterra::store::{create_store, SourceId, StoreConfig, StoreKind, TileStore};
//!
//! let store = create_store(
//!     &StoreConfig::new(StoreKind::Tms { invert_y: true }, "/var/cache/tiles"),
//!     Arc::new(NoOpLogger),
//! );
//! let key = Profile::Mercator.root_keys()[0];
//! let path = store.address_of(&key, &SourceId::image("osm")).unwrap();
//! assert_eq!(path, std::path::Path::new("/var/cache/tiles/osm/0/0/0.png"));
//! ```

mod address;
mod config;
mod disk;
mod factory;
mod fragment;
mod stats;
mod r#trait;
mod types;

pub use address::{bucketed_path, quadkey_path, tms_path, AddressScheme};
pub use config::{StoreConfig, StoreKind};
pub(crate) use config::parse_kind;
pub use disk::DiskTileStore;
pub use factory::create_store;
pub use fragment::TileFragment;
pub use r#trait::{NoOpStore, TileStore};
pub use stats::{StoreCounters, StoreStats};
pub use types::{
    FragmentKind, SourceId, StoreError, FALLBACK_EXTENSION, HEIGHTFIELD_EXTENSION,
};
