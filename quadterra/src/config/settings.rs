//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.

use std::path::PathBuf;
use std::sync::Arc;

use super::file::ConfigError;
use crate::key::{Extent, Profile, ProfileKind};
use crate::log::Logger;
use crate::source::{DirectorySource, RowConvention, SourceContent, SourceError};
use crate::store::StoreConfig;

/// Complete configuration loaded from an INI file.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub profile: ProfileSettings,
    pub cache: StoreConfig,
    pub terrain: TerrainSettings,
    /// Image and elevation sources in file order.
    pub sources: Vec<SourceSettings>,
}

impl ConfigFile {
    pub fn image_sources(&self) -> impl Iterator<Item = &SourceSettings> {
        self.sources.iter().filter(|s| s.kind == SourceKind::Image)
    }

    pub fn elevation_sources(&self) -> impl Iterator<Item = &SourceSettings> {
        self.sources
            .iter()
            .filter(|s| s.kind == SourceKind::Elevation)
    }
}

/// Geometry constants used by the builder and assembler.
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainSettings {
    pub min_tile_range_factor: f64,
    pub skirt_ratio: f64,
    pub meters_per_degree: f64,
    pub default_heightfield_size: u32,
    pub max_range: f64,
}

/// `[profile]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileSettings {
    pub profile: ProfileKind,
    /// Spatial reference string declared for projected profiles.
    pub srs: Option<String>,
    /// Native extent, required for projected profiles.
    pub extent: Option<Extent>,
}

impl ProfileSettings {
    /// Resolve to a concrete [`Profile`].
    pub fn to_profile(&self) -> Result<Profile, ConfigError> {
        match self.profile {
            ProfileKind::Geodetic => Ok(Profile::Geodetic),
            ProfileKind::Mercator => Ok(Profile::Mercator),
            ProfileKind::PlateCarre => Ok(Profile::PlateCarre),
            ProfileKind::Projected => match self.extent {
                Some(extent) if extent.is_valid() => Ok(Profile::Projected(extent)),
                Some(extent) => Err(ConfigError::InvalidValue {
                    section: "profile".to_string(),
                    key: "extent".to_string(),
                    value: extent.to_string(),
                    reason: "must have positive width and height".to_string(),
                }),
                None => Err(ConfigError::Missing {
                    section: "profile".to_string(),
                    key: "extent".to_string(),
                }),
            },
        }
    }
}

/// Whether a source feeds image layers or the heightfield.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Image,
    Elevation,
}

/// `[image.<name>]` or `[elevation.<name>]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceSettings {
    pub name: String,
    pub kind: SourceKind,
    /// Root of the `<level>/<x>/<y>.<ext>` pyramid.
    pub path: PathBuf,
    pub extension: String,
    pub min_level: u32,
    pub max_level: u32,
    pub rows: RowConvention,
    /// Elevation only: metres per heightmap unit.
    pub scale: f32,
    /// Elevation only: metres added after scaling.
    pub offset: f32,
}

impl SourceSettings {
    /// Open the directory pyramid this section describes.
    pub fn open(&self, logger: Arc<dyn Logger>) -> Result<DirectorySource, SourceError> {
        let content = match self.kind {
            SourceKind::Image => SourceContent::Imagery,
            SourceKind::Elevation => SourceContent::Elevation {
                scale: self.scale,
                offset: self.offset,
            },
        };
        DirectorySource::new(&self.name, &self.path, content, logger)?
            .with_extension(&self.extension)
            .with_rows(self.rows)
            .with_levels(self.min_level, self.max_level)
    }
}
