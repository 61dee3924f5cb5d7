//! Logging facade.
//!
//! Pyramid components log through an `Arc<dyn Logger>` rather than calling
//! `tracing` directly, so tests can run silently ([`NoOpLogger`]) or
//! inspect what was reported ([`MemoryLogger`]).
//!
//! - [`TracingLogger`] forwards to the `tracing` crate (see
//!   [`crate::logging::init_logging`] for the subscriber setup)
//! - [`NoOpLogger`] discards everything
//! - [`MemoryLogger`] keeps records in memory
//!
//! ```
//! use quadterra::log::{Logger, NoOpLogger};
//! use quadterra::log_debug;
//! use std::sync::Arc;
//!
//! let logger: Arc<dyn Logger> = Arc::new(NoOpLogger);
//! log_debug!(logger, "assembling {}", "g0");
//! ```

mod memory;
mod noop;
mod tracing_adapter;
mod r#trait;

pub use memory::{LogRecord, MemoryLogger};
pub use noop::NoOpLogger;
pub use r#trait::{LogLevel, Logger};
pub use tracing_adapter::TracingLogger;
