//! kiln CLI.
//!
//! Reads a TOML build description, replays it onto a
//! [`BuildState`](kiln_config::BuildState) and either prints the assembled
//! bundler configuration or writes `entrypoints.json` from a bundler stats
//! file. All of the actual work happens in `kiln-config` and `kiln-bundler`.
//!
//! - [`cli`] - argument definitions
//! - [`commands`] - `config` and `entrypoints` subcommands
//! - [`description`] - the TOML build description
//! - [`error`] - CLI errors and their rendering
//! - [`logger`] - tracing subscriber setup

pub mod cli;
pub mod commands;
pub mod description;
pub mod error;
pub mod logger;

pub use error::{CliError, Result};
