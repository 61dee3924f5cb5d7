//! CLI error handling with user-friendly messages.
//!
//! Every failure a command can hit maps to one variant with its own exit
//! code, so scripts can tell a bad key from a broken configuration.

use std::fmt;
use std::process;

use quadterra::config::ConfigError;
use quadterra::key::KeyError;
use quadterra::source::SourceError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Bad arguments that clap could not catch
    Usage(String),
    /// A key string that does not parse
    InvalidKey { input: String, error: KeyError },
    /// Configuration file could not be loaded or is invalid
    Config(ConfigError),
    /// A configured source could not be opened
    Source { name: String, error: SourceError },
    /// Failed to initialize logging
    LoggingInit(String),
    /// No root quadrant had any data
    NothingBuilt,
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) | CliError::InvalidKey { .. } => 2,
            CliError::Config(_) => 3,
            CliError::Source { .. } => 4,
            CliError::LoggingInit(_) => 5,
            CliError::NothingBuilt => 6,
        }
    }

    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::InvalidKey { .. } => {
                eprintln!();
                eprintln!("Keys are written as a profile tag followed by quadrant digits:");
                eprintln!("  g = geodetic, m = mercator, c = plate-carree, p = projected");
                eprintln!("  e.g. g0 (western geodetic root), m0312, c01");
            }
            CliError::NothingBuilt => {
                eprintln!();
                eprintln!("Check that the configured sources cover the profile's extent");
                eprintln!("and that their level ranges include level 0.");
            }
            _ => {}
        }

        process::exit(self.exit_code())
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{}", msg),
            CliError::InvalidKey { input, error } => {
                write!(f, "Invalid tile key '{}': {}", input, error)
            }
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::Source { name, error } => {
                write!(f, "Cannot open source '{}': {}", name, error)
            }
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::NothingBuilt => write!(f, "No root tile has any data; nothing was built"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::InvalidKey { error, .. } => Some(error),
            CliError::Config(e) => Some(e),
            CliError::Source { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e)
    }
}
