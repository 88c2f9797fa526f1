//! Errors raised by the `kiln` commands.
//!
//! Library errors from `kiln-config` and `kiln-bundler` convert in with `?`;
//! [`cli_error_to_miette`] turns whatever reaches `main` into a report.

use std::path::PathBuf;

use kiln_config::ConfigError;
use thiserror::Error;

mod report;

pub use report::{cli_error_to_miette, suggest};

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Build description not found: {}", .0.display())]
    DescriptionNotFound(PathBuf),

    #[error("Invalid build description {}: {message}", .path.display())]
    InvalidDescription { path: PathBuf, message: String },

    #[error("Unknown key \"{key}\" in {}", .path.display())]
    UnknownKey {
        path: PathBuf,
        key: String,
        valid: &'static [&'static str],
    },

    /// Rejected by a build state mutator.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Assembly or manifest failure.
    #[error(transparent)]
    Bundler(#[from] kiln_bundler::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = CliError> = std::result::Result<T, E>;
