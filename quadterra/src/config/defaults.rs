//! Default values for all configuration settings.
//!
//! The terrain constants affect tile geometry and seam appearance and
//! are kept at their established values.

use super::settings::*;
use crate::key::ProfileKind;
use crate::store::StoreConfig;

// =============================================================================
// Terrain
// =============================================================================

/// Multiplier applied to a tile's radius to get its child activation range.
pub const DEFAULT_MIN_TILE_RANGE_FACTOR: f64 = 5.0;

/// Skirt height as a fraction of the tile radius.
pub const DEFAULT_SKIRT_RATIO: f64 = 0.02;

/// Metres per degree used to bring elevations into geographic units.
pub const DEFAULT_METERS_PER_DEGREE: f64 = 111_319.0;

/// Side length of the flat heightfield synthesised when no elevation
/// source is configured.
pub const DEFAULT_HEIGHTFIELD_SIZE: u32 = 8;

/// Upper visibility range of every tile.
pub const DEFAULT_MAX_RANGE: f64 = 1e10;

// =============================================================================
// Sources
// =============================================================================

pub const DEFAULT_SOURCE_EXTENSION: &str = "png";

pub const DEFAULT_ELEVATION_SCALE: f32 = 1.0;

pub const DEFAULT_ELEVATION_OFFSET: f32 = 0.0;

// =============================================================================
// Profile
// =============================================================================

pub const DEFAULT_PROFILE: ProfileKind = ProfileKind::Geodetic;

impl Default for TerrainSettings {
    fn default() -> Self {
        Self {
            min_tile_range_factor: DEFAULT_MIN_TILE_RANGE_FACTOR,
            skirt_ratio: DEFAULT_SKIRT_RATIO,
            meters_per_degree: DEFAULT_METERS_PER_DEGREE,
            default_heightfield_size: DEFAULT_HEIGHTFIELD_SIZE,
            max_range: DEFAULT_MAX_RANGE,
        }
    }
}

impl Default for ProfileSettings {
    fn default() -> Self {
        Self {
            profile: DEFAULT_PROFILE,
            srs: None,
            extent: None,
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            profile: ProfileSettings::default(),
            cache: StoreConfig::disabled(),
            terrain: TerrainSettings::default(),
            sources: Vec::new(),
        }
    }
}
