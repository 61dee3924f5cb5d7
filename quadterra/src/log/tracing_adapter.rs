//! Adapter from [`Logger`] to the `tracing` crate.

use crate::log::{LogLevel, Logger};
use std::fmt::Arguments;

/// Forwards every message to the matching `tracing` macro.
///
/// Output only appears once a subscriber is installed, normally through
/// [`crate::logging::init_logging`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl TracingLogger {
    pub fn new() -> Self {
        Self
    }
}

impl Logger for TracingLogger {
    fn log(&self, level: LogLevel, args: Arguments<'_>) {
        match level {
            LogLevel::Trace => tracing::trace!(target: "quadterra", "{}", args),
            LogLevel::Debug => tracing::debug!(target: "quadterra", "{}", args),
            LogLevel::Info => tracing::info!(target: "quadterra", "{}", args),
            LogLevel::Warn => tracing::warn!(target: "quadterra", "{}", args),
            LogLevel::Error => tracing::error!(target: "quadterra", "{}", args),
        }
    }
}
