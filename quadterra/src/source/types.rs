//! Source trait and errors.

use std::path::PathBuf;

use image::RgbaImage;
use thiserror::Error;

use super::HeightField;
use crate::key::{TileKey, MAX_LEVEL};

/// Producer of imagery and elevation for tile keys.
///
/// Sources are shared read-only across builds (and across threads when
/// seeding), so implementations must be `Send + Sync`.
pub trait TileSource: Send + Sync {
    /// Identity used for cache addressing and logging.
    fn name(&self) -> &str;

    /// File extension the source natively produces, if any.
    fn extension(&self) -> Option<&str> {
        None
    }

    fn min_level(&self) -> u32 {
        0
    }

    fn max_level(&self) -> u32 {
        MAX_LEVEL
    }

    /// True when `level` lies in `[min_level, max_level]`.
    fn in_range(&self, level: u32) -> bool {
        level >= self.min_level() && level <= self.max_level()
    }

    /// Image for `key`, or `None` when the source has no data there.
    fn create_image(&self, key: &TileKey) -> Option<RgbaImage>;

    /// Heightfield for `key` in metres, or `None` when absent.
    fn create_heightfield(&self, key: &TileKey) -> Option<HeightField>;
}

/// Errors raised while constructing or reading a source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("source root {0} is not a directory")]
    NotADirectory(PathBuf),

    #[error("invalid level range {min}..={max}")]
    InvalidLevelRange { min: u32, max: u32 },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("invalid heightfield: {0}")]
    InvalidHeightField(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::Profile;

    struct Ranged;

    impl TileSource for Ranged {
        fn name(&self) -> &str {
            "ranged"
        }

        fn min_level(&self) -> u32 {
            2
        }

        fn max_level(&self) -> u32 {
            4
        }

        fn create_image(&self, _key: &TileKey) -> Option<RgbaImage> {
            None
        }

        fn create_heightfield(&self, _key: &TileKey) -> Option<HeightField> {
            None
        }
    }

    #[test]
    fn test_in_range_is_inclusive() {
        let source = Ranged;
        assert!(!source.in_range(1));
        assert!(source.in_range(2));
        assert!(source.in_range(4));
        assert!(!source.in_range(5));
    }

    #[test]
    fn test_default_extension_is_none() {
        let source = Ranged;
        assert_eq!(source.extension(), None);
        assert!(source
            .create_image(&Profile::Mercator.root_keys()[0])
            .is_none());
    }
}
