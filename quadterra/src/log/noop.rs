//! Silent logger.

use crate::log::{LogLevel, Logger};
use std::fmt::Arguments;

/// Discards every message. The default logger for tests and benchmarks.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpLogger;

impl Logger for NoOpLogger {
    #[inline]
    fn log(&self, _level: LogLevel, _args: Arguments<'_>) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_logger_as_trait_object() {
        let logger: Box<dyn Logger> = Box::new(NoOpLogger);
        logger.warn(format_args!("discarded"));
        logger.error(format_args!("discarded"));
    }
}
