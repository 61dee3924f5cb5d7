//! Typed store configuration.

use std::collections::HashMap;
use std::path::PathBuf;

use super::address::AddressScheme;
use crate::config::ConfigError;

/// Which store to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    /// Bucketed layout (`type = tilecache` or empty).
    TileCache,
    /// Flat-hierarchical layout (`type = tms`).
    Tms { invert_y: bool },
    /// Opaque-key layout (`type = quadkey`).
    QuadKey,
    /// Caching disabled (`type = none`).
    None,
}

impl StoreKind {
    /// Address scheme for the persistent kinds.
    pub fn scheme(&self) -> Option<AddressScheme> {
        match self {
            StoreKind::TileCache => Some(AddressScheme::Bucketed),
            StoreKind::Tms { invert_y } => Some(AddressScheme::Tms {
                invert_y: *invert_y,
            }),
            StoreKind::QuadKey => Some(AddressScheme::QuadKey),
            StoreKind::None => None,
        }
    }
}

/// Validated store configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub kind: StoreKind,
    /// Root directory. Required for every kind except `None`; a missing
    /// path is reported when the store is created, not here.
    pub path: Option<PathBuf>,
    /// File extension override for image fragments.
    pub format: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::disabled()
    }
}

impl StoreConfig {
    pub fn disabled() -> Self {
        Self {
            kind: StoreKind::None,
            path: None,
            format: None,
        }
    }

    pub fn new(kind: StoreKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            path: Some(path.into()),
            format: None,
        }
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Build from a property bag with keys `type`, `path`, `format` and
    /// `tms_type`.
    ///
    /// `type` must be one of `tms`, `tilecache`, `quadkey`, `none` or
    /// empty (tilecache). `tms_type = google` selects north-origin rows;
    /// any other value keeps the TMS convention.
    pub fn from_properties(props: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |name: &str| {
            props
                .get(name)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
        };

        let kind_value = get("type").unwrap_or("").to_lowercase();
        let kind = parse_kind(&kind_value, get("tms_type"))?;

        Ok(Self {
            kind,
            path: get("path").map(PathBuf::from),
            format: get("format").map(|f| f.trim_start_matches('.').to_lowercase()),
        })
    }
}

/// Map a `type` value (and `tms_type`) to a [`StoreKind`].
pub(crate) fn parse_kind(value: &str, tms_type: Option<&str>) -> Result<StoreKind, ConfigError> {
    match value {
        "" | "tilecache" | "disk" => Ok(StoreKind::TileCache),
        "tms" => Ok(StoreKind::Tms {
            invert_y: tms_type
                .map(|t| t.eq_ignore_ascii_case("google"))
                .unwrap_or(false),
        }),
        "quadkey" => Ok(StoreKind::QuadKey),
        "none" => Ok(StoreKind::None),
        other => Err(ConfigError::InvalidValue {
            section: "cache".to_string(),
            key: "type".to_string(),
            value: other.to_string(),
            reason: "must be one of: tms, tilecache, quadkey, none".to_string(),
        }),
    }
}
