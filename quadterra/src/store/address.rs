//! Cache path construction.
//!
//! Three deterministic layouts, all rooted at `<root>/<source>`:
//!
//! ```text
//! bucketed  <root>/<source>/<LL>/<xxx>/<xxx>/<xxx>/<yyy>/<yyy>/<yyy>.<ext>
//! tms       <root>/<source>/<level>/<x>/<y>.<ext>
//! quadkey   <root>/<source>/<canonical key>.<ext>
//! ```

use std::path::{Path, PathBuf};

use crate::key::{KeyError, TileKey};

/// Directory layout used by a disk store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressScheme {
    /// Level plus X and Y split into millions/thousands/units groups.
    Bucketed,
    /// `level/x/y`. With `invert_y` rows are counted from the north
    /// (Google style) instead of the TMS south origin.
    Tms { invert_y: bool },
    /// Canonical key string as the file name.
    QuadKey,
}

impl AddressScheme {
    /// Full path of `key` for `source` under `root`.
    pub fn path(
        &self,
        root: &Path,
        source: &str,
        key: &TileKey,
        extension: &str,
    ) -> Result<PathBuf, KeyError> {
        match self {
            AddressScheme::Bucketed => bucketed_path(root, source, key, extension),
            AddressScheme::Tms { invert_y } => tms_path(root, source, key, extension, *invert_y),
            AddressScheme::QuadKey => Ok(quadkey_path(root, source, key, extension)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AddressScheme::Bucketed => "tilecache",
            AddressScheme::Tms { .. } => "tms",
            AddressScheme::QuadKey => "quadkey",
        }
    }
}

/// Row of `key` counted from the south edge of the valid area.
fn south_up_row(key: &TileKey) -> Result<u32, KeyError> {
    let rows = key.map_size_tiles();
    if key.y() >= rows {
        return Err(KeyError::OutsideProfile(key.to_string()));
    }
    Ok(rows - key.y() - 1)
}

/// Split `value` into its millions, thousands and units groups.
fn groups(value: u32) -> [String; 3] {
    [
        format!("{:03}", value / 1_000_000),
        format!("{:03}", (value / 1_000) % 1_000),
        format!("{:03}", value % 1_000),
    ]
}

/// Bucketed layout.
///
/// No directory below `<LL>` holds more than 1000 entries regardless of
/// pyramid depth.
///
/// ```
/// use std::path::{Path, PathBuf};
/// use quadterra::key::{Profile, TileKey};
/// use quadterra::store::bucketed_path;
///
/// let key = TileKey::new(Profile::Mercator, 3, 5, 1).unwrap();
/// let path = bucketed_path(Path::new("/cache"), "ortho", &key, "png").unwrap();
/// assert_eq!(path, PathBuf::from("/cache/ortho/03/000/000/005/000/000/006.png"));
/// ```
pub fn bucketed_path(
    root: &Path,
    source: &str,
    key: &TileKey,
    extension: &str,
) -> Result<PathBuf, KeyError> {
    let y = south_up_row(key)?;
    let [x1, x2, x3] = groups(key.x());
    let [y1, y2, y3] = groups(y);

    Ok(root
        .join(source)
        .join(format!("{:02}", key.level()))
        .join(x1)
        .join(x2)
        .join(x3)
        .join(y1)
        .join(y2)
        .join(format!("{}.{}", y3, extension)))
}

/// Flat-hierarchical (TMS) layout.
///
/// Plate-carrée levels are shifted down by one, so its root lands at
/// level `-1` and its two hemispheres at level `0`.
pub fn tms_path(
    root: &Path,
    source: &str,
    key: &TileKey,
    extension: &str,
    invert_y: bool,
) -> Result<PathBuf, KeyError> {
    let y = if invert_y {
        if key.y() >= key.map_size_tiles() {
            return Err(KeyError::OutsideProfile(key.to_string()));
        }
        key.y()
    } else {
        south_up_row(key)?
    };
    let level = key.profile().addressing_level(key.level());

    Ok(root
        .join(source)
        .join(level.to_string())
        .join(key.x().to_string())
        .join(format!("{}.{}", y, extension)))
}

/// Opaque-key layout.
pub fn quadkey_path(root: &Path, source: &str, key: &TileKey, extension: &str) -> PathBuf {
    root.join(source).join(format!("{}.{}", key, extension))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::{Extent, Profile, MAX_LEVEL};
    use proptest::prelude::*;

    fn root() -> PathBuf {
        PathBuf::from("/cache")
    }

    #[test]
    fn test_bucketed_path_is_bit_exact() {
        let key = TileKey::new(Profile::Mercator, 21, 1_234_567, 2_000_000).unwrap();
        // 2^21 - 2_000_000 - 1 = 97_151
        let path = bucketed_path(&root(), "ortho", &key, "jpg").unwrap();
        assert_eq!(
            path,
            PathBuf::from("/cache/ortho/21/001/234/567/000/097/151.jpg")
        );
    }

    #[test]
    fn test_bucketed_level_is_two_digits() {
        let key = Profile::Geodetic.root_keys()[1];
        let path = bucketed_path(&root(), "dem", &key, "qthf").unwrap();
        assert_eq!(
            path,
            PathBuf::from("/cache/dem/00/000/000/001/000/000/000.qthf")
        );
    }

    #[test]
    fn test_tms_path_row_conventions() {
        let key = TileKey::new(Profile::Mercator, 3, 2, 1).unwrap();

        let standard = tms_path(&root(), "osm", &key, "png", false).unwrap();
        let google = tms_path(&root(), "osm", &key, "png", true).unwrap();

        assert_eq!(standard, PathBuf::from("/cache/osm/3/2/6.png"));
        assert_eq!(google, PathBuf::from("/cache/osm/3/2/1.png"));
    }

    #[test]
    fn test_tms_plate_carre_level_offset() {
        let root_key = Profile::PlateCarre.root_keys()[0];
        assert_eq!(
            tms_path(&root(), "wms", &root_key, "png", false).unwrap(),
            PathBuf::from("/cache/wms/-1/0/0.png")
        );

        let east = root_key.subkey(1).unwrap();
        assert_eq!(
            tms_path(&root(), "wms", &east, "png", false).unwrap(),
            PathBuf::from("/cache/wms/0/1/0.png")
        );

        // Same position in the geodetic profile uses level 0 too.
        let geodetic_east = Profile::Geodetic.root_keys()[1];
        assert_eq!(
            tms_path(&root(), "wms", &geodetic_east, "png", false).unwrap(),
            PathBuf::from("/cache/wms/0/1/0.png")
        );
    }

    #[test]
    fn test_off_globe_keys_are_unaddressable() {
        let south = Profile::PlateCarre.root_keys()[0].subkey(2).unwrap();
        assert!(bucketed_path(&root(), "s", &south, "png").is_err());
        assert!(tms_path(&root(), "s", &south, "png", true).is_err());
        // The opaque layout can still name it.
        assert_eq!(
            quadkey_path(&root(), "s", &south, "png"),
            PathBuf::from("/cache/s/c02.png")
        );
    }

    #[test]
    fn test_quadkey_path() {
        let key = TileKey::new(Profile::Geodetic, 2, 5, 1).unwrap();
        assert_eq!(
            quadkey_path(&root(), "ortho", &key, "png"),
            PathBuf::from("/cache/ortho/g103.png")
        );
    }

    #[test]
    fn test_scheme_dispatch() {
        let key = TileKey::new(Profile::Mercator, 1, 0, 0).unwrap();
        for scheme in [
            AddressScheme::Bucketed,
            AddressScheme::Tms { invert_y: false },
            AddressScheme::QuadKey,
        ] {
            let path = scheme.path(&root(), "s", &key, "png").unwrap();
            assert!(path.starts_with("/cache/s"));
            assert_eq!(path.extension().unwrap(), "png");
        }
    }

    fn arb_key() -> impl Strategy<Value = TileKey> {
        let local = Extent::new(0.0, 0.0, 1000.0, 1000.0);
        (0usize..4, 0u32..=MAX_LEVEL, any::<u32>(), any::<u32>()).prop_map(
            move |(p, level, rx, ry)| {
                let profile = [
                    Profile::Geodetic,
                    Profile::Mercator,
                    Profile::PlateCarre,
                    Profile::Projected(local),
                ][p];
                let x = rx % profile.grid_columns(level);
                let y = ry % profile.map_size_tiles(level);
                TileKey::new(profile, level, x, y).unwrap()
            },
        )
    }

    proptest! {
        #[test]
        fn addresses_are_pure(key in arb_key(), invert_y in any::<bool>()) {
            for scheme in [
                AddressScheme::Bucketed,
                AddressScheme::Tms { invert_y },
                AddressScheme::QuadKey,
            ] {
                let a = scheme.path(&root(), "src", &key, "png").unwrap();
                let b = scheme.path(&root(), "src", &key, "png").unwrap();
                prop_assert_eq!(a, b);
            }
        }

        #[test]
        fn bucketed_fan_out_is_bounded(key in arb_key()) {
            let path = bucketed_path(&root(), "src", &key, "png").unwrap();
            let rel = path.strip_prefix("/cache/src").unwrap();
            let segments: Vec<String> = rel
                .with_extension("")
                .iter()
                .map(|s| s.to_string_lossy().into_owned())
                .collect();

            prop_assert_eq!(segments.len(), 7);
            prop_assert_eq!(segments[0].len(), 2);
            for group in &segments[1..] {
                prop_assert_eq!(group.len(), 3);
                prop_assert!(group.parse::<u32>().unwrap() < 1000);
            }
        }

        #[test]
        fn google_rows_only_change_y(key in arb_key()) {
            let standard = tms_path(&root(), "src", &key, "png", false).unwrap();
            let google = tms_path(&root(), "src", &key, "png", true).unwrap();
            prop_assert_eq!(standard.parent(), google.parent());

            let flipped = key.map_size_tiles() - key.y() - 1;
            prop_assert_eq!(
                standard.file_stem().unwrap().to_string_lossy().into_owned(),
                flipped.to_string()
            );
        }
    }
}
