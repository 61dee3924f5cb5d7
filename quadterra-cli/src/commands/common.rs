//! Common types and utilities shared across CLI commands.

use std::path::PathBuf;

use clap::Args;
use quadterra::config::ConfigFile;
use quadterra::key::{Extent, KeyError, Profile, TileKey};

use crate::error::CliError;

/// Options accepted by every subcommand.
#[derive(Debug, Clone, Default, Args)]
pub struct GlobalArgs {
    /// Configuration file (default: ~/.quadterra/config.ini)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory for the log file (default: ~/.quadterra/logs)
    #[arg(long, global = true, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Only write logs to the log file, not the terminal
    #[arg(long, global = true)]
    pub quiet: bool,
}

/// Load the configuration named on the command line, or the default one.
///
/// A missing default file means built-in defaults; a missing file given
/// with `--config` is an error.
pub fn load_config(global: &GlobalArgs) -> Result<ConfigFile, CliError> {
    match &global.config {
        Some(path) if !path.exists() => Err(CliError::Usage(format!(
            "Configuration file '{}' does not exist",
            path.display()
        ))),
        Some(path) => Ok(ConfigFile::load_from(path)?),
        None => Ok(ConfigFile::load()?),
    }
}

/// Parse a canonical key string.
///
/// Projected keys (`p...`) need the configured profile extent.
pub fn parse_key(input: &str, config: &ConfigFile) -> Result<TileKey, CliError> {
    let invalid = |error: KeyError| CliError::InvalidKey {
        input: input.to_string(),
        error,
    };
    if input.starts_with('p') {
        let profile = config.profile.to_profile()?;
        let Profile::Projected(extent) = profile else {
            return Err(CliError::Usage(format!(
                "Key '{}' is projected but the configured profile is {}",
                input, profile
            )));
        };
        return TileKey::parse_projected(input, extent).map_err(invalid);
    }
    input.parse::<TileKey>().map_err(invalid)
}

pub fn format_extent(extent: &Extent) -> String {
    format!(
        "({:.6}, {:.6}) - ({:.6}, {:.6})",
        extent.xmin, extent.ymin, extent.xmax, extent.ymax
    )
}
