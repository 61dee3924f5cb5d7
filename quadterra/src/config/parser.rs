//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This is the single place where INI key names are mapped to struct
//! fields.

use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;

use ini::{Ini, Properties};

use super::defaults::*;
use super::file::ConfigError;
use super::settings::{ConfigFile, SourceKind, SourceSettings};
use crate::key::{Extent, ProfileKind, MAX_LEVEL};
use crate::source::RowConvention;
use crate::store::StoreConfig;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in
/// the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigError> {
    let mut config = ConfigFile::default();

    // [profile] section
    if let Some(section) = ini.section(Some("profile")) {
        if let Some(v) = section.get("type") {
            config.profile.profile =
                ProfileKind::from_str(v).map_err(|_| ConfigError::InvalidValue {
                    section: "profile".to_string(),
                    key: "type".to_string(),
                    value: v.to_string(),
                    reason: "must be one of: geodetic, mercator, plate-carre, projected"
                        .to_string(),
                })?;
        }
        if let Some(v) = non_empty(section.get("srs")) {
            config.profile.srs = Some(v.to_string());
        }
        if let Some(v) = non_empty(section.get("extent")) {
            config.profile.extent = Some(parse_extent(v)?);
        }
    }
    // Validates projected profiles up front.
    config.profile.to_profile()?;

    // [cache] section
    if let Some(section) = ini.section(Some("cache")) {
        let props: HashMap<String, String> = section
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let mut cache = StoreConfig::from_properties(&props)?;
        cache.path = cache
            .path
            .map(|p| expand_tilde(&p.to_string_lossy()));
        config.cache = cache;
    }

    // [terrain] section
    if let Some(section) = ini.section(Some("terrain")) {
        let terrain = &mut config.terrain;
        if let Some(v) = section.get("min_tile_range_factor") {
            terrain.min_tile_range_factor = parse_positive(v, "terrain", "min_tile_range_factor")?;
        }
        if let Some(v) = section.get("skirt_ratio") {
            terrain.skirt_ratio = parse_finite(v, "terrain", "skirt_ratio")?;
            if terrain.skirt_ratio < 0.0 {
                return Err(invalid("terrain", "skirt_ratio", v, "must not be negative"));
            }
        }
        if let Some(v) = section.get("meters_per_degree") {
            terrain.meters_per_degree = parse_positive(v, "terrain", "meters_per_degree")?;
        }
        if let Some(v) = section.get("heightfield_size") {
            terrain.default_heightfield_size = parse_number(v, "terrain", "heightfield_size")?;
            if terrain.default_heightfield_size < 2 {
                return Err(invalid("terrain", "heightfield_size", v, "must be at least 2"));
            }
        }
        if let Some(v) = section.get("max_range") {
            terrain.max_range = parse_positive(v, "terrain", "max_range")?;
        }
    }

    // [image.<name>] and [elevation.<name>] sections
    for (name, section) in ini.iter() {
        let Some(name) = name else { continue };
        let (kind, source_name) = if let Some(n) = name.strip_prefix("image.") {
            (SourceKind::Image, n)
        } else if let Some(n) = name.strip_prefix("elevation.") {
            (SourceKind::Elevation, n)
        } else {
            continue;
        };
        config
            .sources
            .push(parse_source(name, kind, source_name, section)?);
    }

    Ok(config)
}

fn parse_source(
    section_name: &str,
    kind: SourceKind,
    name: &str,
    section: &Properties,
) -> Result<SourceSettings, ConfigError> {
    if name.is_empty() {
        return Err(invalid(section_name, "name", name, "source sections need a name"));
    }

    let path = non_empty(section.get("path"))
        .map(expand_tilde)
        .ok_or_else(|| ConfigError::Missing {
            section: section_name.to_string(),
            key: "path".to_string(),
        })?;

    let mut source = SourceSettings {
        name: name.to_string(),
        kind,
        path,
        extension: DEFAULT_SOURCE_EXTENSION.to_string(),
        min_level: 0,
        max_level: MAX_LEVEL,
        rows: RowConvention::Tms,
        scale: DEFAULT_ELEVATION_SCALE,
        offset: DEFAULT_ELEVATION_OFFSET,
    };

    if let Some(v) = non_empty(section.get("extension")) {
        source.extension = v.trim_start_matches('.').to_lowercase();
    }
    if let Some(v) = section.get("min_level") {
        source.min_level = parse_number(v, section_name, "min_level")?;
    }
    if let Some(v) = section.get("max_level") {
        source.max_level = parse_number(v, section_name, "max_level")?;
    }
    if source.max_level > MAX_LEVEL || source.min_level > source.max_level {
        return Err(invalid(
            section_name,
            "max_level",
            &source.max_level.to_string(),
            &format!("levels must satisfy min_level <= max_level <= {}", MAX_LEVEL),
        ));
    }
    if let Some(v) = section.get("rows") {
        source.rows = match v.trim().to_lowercase().as_str() {
            "tms" => RowConvention::Tms,
            "xyz" | "google" => RowConvention::Xyz,
            _ => return Err(invalid(section_name, "rows", v, "must be 'tms' or 'xyz'")),
        };
    }
    if let Some(v) = section.get("scale") {
        source.scale = parse_finite(v, section_name, "scale")? as f32;
    }
    if let Some(v) = section.get("offset") {
        source.offset = parse_finite(v, section_name, "offset")? as f32;
    }

    Ok(source)
}

/// Parse `xmin, ymin, xmax, ymax`.
fn parse_extent(v: &str) -> Result<Extent, ConfigError> {
    let parts: Vec<f64> = v
        .split(',')
        .map(|p| p.trim().parse::<f64>().ok().filter(|n| n.is_finite()))
        .collect::<Option<_>>()
        .ok_or_else(|| invalid("profile", "extent", v, "expected four finite numbers"))?;
    match parts.as_slice() {
        &[xmin, ymin, xmax, ymax] => Ok(Extent::new(xmin, ymin, xmax, ymax)),
        _ => Err(invalid("profile", "extent", v, "expected xmin, ymin, xmax, ymax")),
    }
}

fn parse_number<T: FromStr>(v: &str, section: &str, key: &str) -> Result<T, ConfigError> {
    v.trim()
        .parse()
        .map_err(|_| invalid(section, key, v, "must be a number"))
}

fn parse_finite(v: &str, section: &str, key: &str) -> Result<f64, ConfigError> {
    let value: f64 = parse_number(v, section, key)?;
    if !value.is_finite() {
        return Err(invalid(section, key, v, "must be a finite number"));
    }
    Ok(value)
}

fn parse_positive(v: &str, section: &str, key: &str) -> Result<f64, ConfigError> {
    let value = parse_finite(v, section, key)?;
    if value <= 0.0 {
        return Err(invalid(section, key, v, "must be a positive number"));
    }
    Ok(value)
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn non_empty(v: Option<&str>) -> Option<&str> {
    v.map(str::trim).filter(|v| !v.is_empty())
}

/// Expand a leading `~/` to the home directory.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
