//! Tile key algebra.
//!
//! A [`TileKey`] addresses one quadrant of the pyramid under a
//! [`Profile`]. Keys produce their children, their ancestors, their
//! geographic extents and a canonical string form used by the opaque-key
//! cache layout.
//!
//! ```
//! use quadterra::key::{Profile, TileKey};
//!
//! let root = Profile::Geodetic.root_keys()[0];
//! let child = root.subkey(3).unwrap();
//! assert_eq!(child.to_string(), "g03");
//! assert_eq!(child.parent(), Some(root));
//! ```

mod types;


pub use types::{
    Ancestors, Extent, KeyError, Profile, ProfileKind, TileKey, MAX_LEVEL, MERCATOR_HALF_WORLD,
    MERCATOR_MAX_LAT,
};

use std::f64::consts::PI;

/// Key at `level` containing the point `(x, y)`.
///
/// `x`/`y` are longitude/latitude in degrees for the global profiles and
/// native units for projected profiles. Points on the far east or south
/// edge resolve to the last column or row.
pub fn key_for_point(profile: Profile, level: u32, x: f64, y: f64) -> Result<TileKey, KeyError> {
    let cols = profile.grid_columns(level.min(MAX_LEVEL)) as f64;
    let rows = profile.grid_rows(level.min(MAX_LEVEL)) as f64;

    let (u, v) = match profile {
        Profile::Mercator => {
            if !(-MERCATOR_MAX_LAT..=MERCATOR_MAX_LAT).contains(&y) {
                return Err(KeyError::Malformed(format!(
                    "latitude {} outside the Mercator range",
                    y
                )));
            }
            let lat_rad = y * PI / 180.0;
            ((x + 180.0) / 360.0, (1.0 - lat_rad.tan().asinh() / PI) / 2.0)
        }
        _ => {
            let root = profile.root_extent();
            (
                (x - root.xmin) / root.width(),
                (root.ymax - y) / root.height(),
            )
        }
    };

    if !(0.0..=1.0).contains(&u) || !(0.0..=1.0).contains(&v) {
        return Err(KeyError::Malformed(format!(
            "point ({}, {}) outside the {} profile",
            x, y, profile
        )));
    }

    let col = ((u * cols) as u32).min(cols as u32 - 1);
    let row = ((v * rows) as u32).min(rows as u32 - 1);
    TileKey::new(profile, level, col, row)
}
