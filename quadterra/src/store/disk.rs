//! Disk-backed tile store.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::address::AddressScheme;
use super::fragment::TileFragment;
use super::stats::{StoreCounters, StoreStats};
use super::types::{describe, SourceId, StoreError};
use super::TileStore;
use crate::key::TileKey;
use crate::log::Logger;
use crate::{log_debug, log_warn};

/// Sequence for temporary file names within this process.
static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// Persistent store writing one file per `(key, source)`.
///
/// Writes go to a temporary file beside the target and are renamed into
/// place, so readers never see a partial file and two writers racing on
/// the same key both leave a complete, identical file.
pub struct DiskTileStore {
    root: PathBuf,
    scheme: AddressScheme,
    format: Option<String>,
    counters: StoreCounters,
    logger: Arc<dyn Logger>,
}

impl DiskTileStore {
    /// Create a store under `root`. Nothing is touched on disk until the
    /// first write.
    pub fn new(
        root: impl Into<PathBuf>,
        scheme: AddressScheme,
        format: Option<String>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            root: root.into(),
            scheme,
            format,
            counters: StoreCounters::new(),
            logger,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn scheme(&self) -> AddressScheme {
        self.scheme
    }

    pub fn format(&self) -> Option<&str> {
        self.format.as_deref()
    }

    fn resolve(&self, key: &TileKey, source: &SourceId) -> Result<PathBuf, StoreError> {
        let extension = source.resolve_extension(self.format.as_deref());
        Ok(self.scheme.path(&self.root, &source.name, key, extension)?)
    }

    fn write_atomically(&self, path: &Path, data: &[u8]) -> Result<(), StoreError> {
        let dir = path.parent().unwrap_or(&self.root);
        if let Err(source) = fs::create_dir_all(dir) {
            return Err(StoreError::CreateDir {
                path: dir.to_path_buf(),
                source,
            });
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let temp = dir.join(format!(
            ".{}.{}.{}.tmp",
            file_name,
            std::process::id(),
            TEMP_SEQ.fetch_add(1, Ordering::Relaxed)
        ));

        let io_err = |source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        };
        fs::write(&temp, data).map_err(io_err)?;
        if let Err(e) = fs::rename(&temp, path) {
            let _ = fs::remove_file(&temp);
            return Err(io_err(e));
        }
        Ok(())
    }
}

impl TileStore for DiskTileStore {
    fn address_of(&self, key: &TileKey, source: &SourceId) -> Option<PathBuf> {
        self.resolve(key, source).ok()
    }

    fn exists(&self, key: &TileKey, source: &SourceId) -> bool {
        self.address_of(key, source)
            .map(|path| path.is_file())
            .unwrap_or(false)
    }

    fn get(&self, key: &TileKey, source: &SourceId) -> Option<TileFragment> {
        let path = match self.resolve(key, source) {
            Ok(path) => path,
            Err(e) => {
                log_debug!(self.logger, "Cache skip {}: {}", describe(key, source), e);
                self.counters.record_miss();
                return None;
            }
        };

        let data = match fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                self.counters.record_miss();
                return None;
            }
            Err(e) => {
                log_warn!(self.logger, "Cache read failed for {}: {}", path.display(), e);
                self.counters.record_read_failure();
                return None;
            }
        };

        match TileFragment::decode(&data) {
            Ok(fragment) if fragment.kind() == source.kind => {
                log_debug!(self.logger, "Cache hit {}", describe(key, source));
                self.counters.record_hit();
                Some(fragment)
            }
            Ok(fragment) => {
                let e = StoreError::KindMismatch {
                    source_id: source.to_string(),
                    expected: source.kind,
                    found: fragment.kind(),
                };
                log_warn!(self.logger, "Cache entry {} ignored: {}", path.display(), e);
                self.counters.record_read_failure();
                None
            }
            Err(e) => {
                log_warn!(self.logger, "Cache entry {} ignored: {}", path.display(), e);
                self.counters.record_read_failure();
                None
            }
        }
    }

    fn put(
        &self,
        key: &TileKey,
        source: &SourceId,
        fragment: &TileFragment,
    ) -> Result<(), StoreError> {
        let result = self.resolve(key, source).and_then(|path| {
            let extension = source.resolve_extension(self.format.as_deref());
            let data = fragment.encode(extension)?;
            self.write_atomically(&path, &data)
        });

        match &result {
            Ok(()) => {
                self.counters.record_write();
                log_debug!(self.logger, "Cached {}", describe(key, source));
            }
            Err(e) => {
                self.counters.record_write_failure();
                log_warn!(self.logger, "Cache write skipped for {}: {}", describe(key, source), e);
            }
        }
        result
    }

    fn stats(&self) -> StoreStats {
        self.counters.snapshot()
    }

    fn describe(&self) -> String {
        format!("{} cache at {}", self.scheme.name(), self.root.display())
    }
}
