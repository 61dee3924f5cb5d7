//! Core types for the tile store.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::key::{KeyError, TileKey};
use crate::source::TileSource;

/// Extension always used for heightfield fragments.
pub const HEIGHTFIELD_EXTENSION: &str = "qthf";

/// Extension used when neither the store nor the source names a format.
pub const FALLBACK_EXTENSION: &str = "png";

/// Kind of payload a fragment holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FragmentKind {
    Image,
    HeightField,
}

/// Identity of a source within a store: its name, the extension it
/// declares, and which kind of fragment is being addressed.
///
/// Images and heightfields of the same source are addressed separately,
/// so one source may cache both without collisions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceId {
    pub name: String,
    pub extension: Option<String>,
    pub kind: FragmentKind,
}

impl SourceId {
    /// Image layer of the source called `name`.
    pub fn image(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extension: None,
            kind: FragmentKind::Image,
        }
    }

    /// Heightfield layer of the source called `name`.
    pub fn heightfield(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extension: None,
            kind: FragmentKind::HeightField,
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = Some(extension.into());
        self
    }

    /// Identity of `source` for fragments of `kind`.
    pub fn of(source: &dyn TileSource, kind: FragmentKind) -> Self {
        Self {
            name: source.name().to_string(),
            extension: source.extension().map(str::to_string),
            kind,
        }
    }

    /// File extension for this identity under a store `format`.
    ///
    /// Heightfields always use [`HEIGHTFIELD_EXTENSION`]. For images an
    /// explicit store format wins over the source's extension, which wins
    /// over [`FALLBACK_EXTENSION`].
    pub fn resolve_extension<'a>(&'a self, format: Option<&'a str>) -> &'a str {
        match self.kind {
            FragmentKind::HeightField => HEIGHTFIELD_EXTENSION,
            FragmentKind::Image => format
                .filter(|f| !f.is_empty())
                .or(self.extension.as_deref().filter(|e| !e.is_empty()))
                .unwrap_or(FALLBACK_EXTENSION),
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            FragmentKind::Image => write!(f, "{}", self.name),
            FragmentKind::HeightField => write!(f, "{} (elevation)", self.name),
        }
    }
}

/// Store errors.
///
/// None of these abort a build: callers degrade to a cache miss or a
/// skipped write.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot create cache directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cache I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode fragment: {0}")]
    Encode(#[from] image::ImageError),

    #[error("failed to decode fragment: {0}")]
    Decode(String),

    #[error("fragment for {source_id} is a {found:?}, expected {expected:?}")]
    KindMismatch {
        source_id: String,
        expected: FragmentKind,
        found: FragmentKind,
    },

    #[error("key cannot be addressed: {0}")]
    Unaddressable(#[from] KeyError),

    #[error("store is disabled")]
    Disabled,
}

/// Key plus source identity, used in log lines.
pub(crate) fn describe(key: &TileKey, source: &SourceId) -> String {
    format!("{} [{}]", key, source)
}
