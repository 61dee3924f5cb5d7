//! Store trait definition.

use std::path::PathBuf;

use super::fragment::TileFragment;
use super::stats::StoreStats;
use super::types::{SourceId, StoreError};
use crate::key::TileKey;

/// Key-value persistence of tile fragments, addressed by
/// `(TileKey, SourceId)`.
///
/// Stores never evict. Implementations must tolerate concurrent calls for
/// different keys; concurrent `put`s for the same key are idempotent.
pub trait TileStore: Send + Sync {
    /// Deterministic location of `(key, source)`, or `None` when this
    /// store does not persist it.
    fn address_of(&self, key: &TileKey, source: &SourceId) -> Option<PathBuf>;

    fn exists(&self, key: &TileKey, source: &SourceId) -> bool;

    /// Stored fragment, or `None` on a miss. Read failures are misses.
    fn get(&self, key: &TileKey, source: &SourceId) -> Option<TileFragment>;

    /// Persist `fragment`. An `Err` means the write was skipped; it never
    /// invalidates previously stored data.
    fn put(&self, key: &TileKey, source: &SourceId, fragment: &TileFragment)
        -> Result<(), StoreError>;

    fn stats(&self) -> StoreStats;

    /// Short human-readable description for logs.
    fn describe(&self) -> String;
}

/// Store for the "disabled cache" configuration: always misses, never
/// persists.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpStore;

impl TileStore for NoOpStore {
    fn address_of(&self, _key: &TileKey, _source: &SourceId) -> Option<PathBuf> {
        None
    }

    fn exists(&self, _key: &TileKey, _source: &SourceId) -> bool {
        false
    }

    fn get(&self, _key: &TileKey, _source: &SourceId) -> Option<TileFragment> {
        None
    }

    fn put(
        &self,
        _key: &TileKey,
        _source: &SourceId,
        _fragment: &TileFragment,
    ) -> Result<(), StoreError> {
        Ok(())
    }

    fn stats(&self) -> StoreStats {
        StoreStats::default()
    }

    fn describe(&self) -> String {
        "disabled".to_string()
    }
}
