//! Subscriber setup for the `tracing` backend.
//!
//! Installs two layers on a global registry:
//! - a file layer writing `<log_dir>/<log_file>` through a non-blocking
//!   appender (the file is truncated at session start)
//! - a compact stdout layer, unless `console` is false
//!
//! The filter comes from `RUST_LOG` and defaults to `info`.

use std::fs;
use std::io;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Keeps the file writer alive; dropping it flushes and closes the log.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

/// Initialise logging to `log_dir/log_file` and optionally stdout.
///
/// Fails if the directory cannot be created or the log file cannot be
/// truncated. A global subscriber can only be installed once per process;
/// later calls return an error of kind `AlreadyExists`.
pub fn init_logging(log_dir: &Path, log_file: &str, console: bool) -> io::Result<LoggingGuard> {
    prepare_log_file(log_dir, log_file)?;

    let file_appender = tracing_appender::rolling::never(log_dir, log_file);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .with_target(true);

    let stdout_layer = console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(io::stdout)
            .with_target(false)
            .compact()
    });

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::AlreadyExists, e.to_string()))?;

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

/// Create the log directory and truncate the log file.
fn prepare_log_file(log_dir: &Path, log_file: &str) -> io::Result<()> {
    fs::create_dir_all(log_dir)?;
    fs::write(log_dir.join(log_file), "")
}

/// Default log directory (`~/.quadterra/logs`, or `./logs` without a home).
pub fn default_log_dir() -> std::path::PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".quadterra").join("logs"))
        .unwrap_or_else(|| std::path::PathBuf::from("logs"))
}

pub fn default_log_file() -> &'static str {
    "quadterra.log"
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_paths() {
        assert_eq!(default_log_file(), "quadterra.log");
        assert!(default_log_dir().ends_with("logs"));
    }

    #[test]
    fn test_prepare_creates_nested_directory() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("deep").join("logs");

        prepare_log_file(&dir, "run.log").unwrap();

        assert!(dir.join("run.log").exists());
    }

    #[test]
    fn test_prepare_truncates_previous_session() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("run.log"), "old session").unwrap();

        prepare_log_file(temp.path(), "run.log").unwrap();

        assert_eq!(fs::read_to_string(temp.path().join("run.log")).unwrap(), "");
    }

    #[test]
    fn test_prepare_fails_when_directory_is_a_file() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("blocker");
        fs::write(&blocker, "file").unwrap();

        assert!(prepare_log_file(&blocker.join("logs"), "run.log").is_err());
    }
}
