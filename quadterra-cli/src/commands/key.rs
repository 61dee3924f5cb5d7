//! `key`: describe a tile key.

use clap::Args;
use quadterra::key::TileKey;

use super::common::{format_extent, load_config, parse_key, GlobalArgs};
use crate::error::CliError;

#[derive(Debug, Args)]
pub struct KeyArgs {
    /// Canonical key, e.g. g0312 or m02
    pub key: String,
}

pub fn run(args: KeyArgs, global: &GlobalArgs) -> Result<(), CliError> {
    let config = load_config(global)?;
    let key = parse_key(&args.key, &config)?;
    print!("{}", describe(&key));
    Ok(())
}

/// Multi-line description of `key`.
pub fn describe(key: &TileKey) -> String {
    let profile = key.profile();
    let mut lines = vec![
        format!("Key:          {}", key),
        format!("Profile:      {}", profile.kind()),
        format!(
            "Level:        {} (addressed as {})",
            key.level(),
            profile.addressing_level(key.level())
        ),
        format!("Column/row:   {}, {}", key.x(), key.y()),
        format!("Tile id:      {:#018x}", key.tile_id()),
        format!("Native:       {}", format_extent(&key.native_extents())),
    ];
    match key.geo_extents() {
        Ok(extent) => lines.push(format!("Geographic:   {}", format_extent(&extent))),
        Err(e) => lines.push(format!("Geographic:   outside the profile ({})", e)),
    }
    if let Some(parent) = key.parent() {
        lines.push(format!("Parent:       {}", parent));
    }
    let children: Vec<String> = (0..profile.quadrant_count(key.level()) as u8)
        .filter_map(|quadrant| key.subkey(quadrant).ok())
        .map(|child| child.to_string())
        .collect();
    if !children.is_empty() {
        lines.push(format!("Children:     {}", children.join(" ")));
    }

    let mut text = lines.join("\n");
    text.push('\n');
    text
}
