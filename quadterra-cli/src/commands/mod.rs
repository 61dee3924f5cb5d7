//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! # Command Modules
//!
//! - [`key`] - Describe a tile key
//! - [`path`] - Show a key's cache path under each addressing scheme
//! - [`build`] - Build the pyramid and summarise it
//! - [`seed`] - Fill the tile store in parallel

pub mod build;
pub mod common;
pub mod key;
pub mod path;
pub mod seed;
