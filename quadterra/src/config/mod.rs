//! Configuration.
//!
//! Typed settings loaded from an INI file:
//!
//! ```text
//! [profile]             type, srs, extent
//! [cache]               type, path, format, tms_type
//! [terrain]             min_tile_range_factor, skirt_ratio, meters_per_degree,
//!                       heightfield_size, max_range
//! [image.<name>]        path, extension, min_level, max_level, rows
//! [elevation.<name>]    same as image, plus scale and offset
//! ```
//!
//! # Example
//!
//! ```
//! use quadterra::config::ConfigFile;
//!
//! let config = ConfigFile::from_ini_str("[terrain]\nskirt_ratio = 0.05\n").unwrap();
//! assert_eq!(config.terrain.skirt_ratio, 0.05);
//! assert_eq!(config.terrain.min_tile_range_factor, 5.0);
//! ```

mod defaults;
mod file;
mod parser;
mod settings;

pub use defaults::*;
pub use file::{config_directory, config_file_path, ConfigError};
pub use settings::{
    ConfigFile, ProfileSettings, SourceKind, SourceSettings, TerrainSettings,
};
