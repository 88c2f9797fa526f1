//! Command implementations for the kiln CLI.
//!
//! - [`config`] - print the assembled bundler configuration
//! - [`entrypoints`] - write `entrypoints.json` after a build
//!
//! Each command provides an `execute` function taking its parsed arguments.

pub mod config;
pub mod entrypoints;
pub(crate) mod utils;

pub use config::execute as config_execute;
pub use entrypoints::execute as entrypoints_execute;
