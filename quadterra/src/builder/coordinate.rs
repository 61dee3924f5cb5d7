//! Spatial reference declared for a built pyramid.

use std::fmt;

use crate::key::Profile;

/// Equirectangular projection used for every global profile.
pub const EQUIRECTANGULAR_PROJ4: &str = "+proj=eqc +lat_ts=0 +lon_0=0 +x_0=0 +y_0=0";

/// Spatial reference handed to the renderer alongside the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinateSystem {
    pub definition: String,
    /// Encoding of `definition`, when known.
    pub format: Option<String>,
}

impl fmt::Display for CoordinateSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.format {
            Some(format) => write!(f, "{} ({})", self.definition, format),
            None => f.write_str(&self.definition),
        }
    }
}

/// Coordinate system for `profile`.
///
/// Global profiles always declare the fixed equirectangular PROJ.4
/// string. Projected profiles pass the configured `srs` through
/// unchanged (empty when none was configured).
pub fn coordinate_system(profile: Profile, srs: Option<&str>) -> CoordinateSystem {
    match profile {
        Profile::Projected(_) => CoordinateSystem {
            definition: srs.unwrap_or_default().to_string(),
            format: None,
        },
        Profile::Geodetic | Profile::Mercator | Profile::PlateCarre => CoordinateSystem {
            definition: EQUIRECTANGULAR_PROJ4.to_string(),
            format: Some("PROJ4".to_string()),
        },
    }
}
