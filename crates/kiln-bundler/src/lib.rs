#![cfg_attr(docsrs, feature(doc_cfg))]

//! # kiln-bundler
//!
//! Assembles a [`BuildState`](kiln_config::BuildState) into the configuration
//! object a module bundler consumes, and writes the entry points manifest
//! once the bundler has emitted its files.
//!
//! ## Quick Start
//!
//! ```
//! use kiln_bundler::BuildStateExt;
//! use kiln_config::{BuildState, RuntimeContext};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut state = BuildState::new(RuntimeContext::default());
//! state
//!     .set_output_path("/srv/app/public/build")
//!     .set_public_path("/build")
//!     .add_entry("main", "./assets/main.js")?
//!     .disable_single_runtime_chunk();
//!
//! let config = state.get_config()?;
//! assert_eq!(config.output.filename, "[name].js");
//! assert_eq!(config.output.public_path, "/build/");
//! # Ok(()) }
//! ```
//!
//! ## Entry points manifest
//!
//! ```no_run
//! use kiln_bundler::{AssetReport, BuildStateExt};
//! # use kiln_config::BuildState;
//!
//! # fn example(state: &BuildState, stats_json: &str) -> kiln_bundler::Result<()> {
//! let config = state.get_config()?;
//! let report = AssetReport::from_json_str(stats_json)?;
//! let manifest = config.entry_points_plugin().after_emit(&report)?;
//! println!("{} entries", manifest.entrypoints.len());
//! # Ok(()) }
//! ```

pub mod config;
pub mod dev_server;
pub mod entrypoints;
pub mod manifest;
pub mod optimization;
pub mod output;
pub mod plugins;
pub mod public_path;
pub mod rules;
pub mod validator;

// Logging utilities (optional, enabled with "logging" feature)
#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub mod logging;

#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub use logging::{LogLevel, init_logging, init_logging_from_env};

pub use config::{AssembledConfig, BuildStateExt, Mode, ModuleConfig, ResolveConfig, assemble};
pub use entrypoints::{
    AssetReport, ENTRYPOINTS_FILENAME, EntryManifest, EntryPointsOptions, EntryPointsPlugin,
    ReportedAsset, ReportedEntry,
};
pub use manifest::{ManifestFile, ManifestFilter};
pub use output::OutputConfig;
pub use plugins::PluginRegistry;
pub use public_path::resolve_public_path;

use kiln_config::ConfigError;

/// Error types for kiln-bundler operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// `set_output_path()` was never called.
    #[error("Missing output path: call set_output_path() to choose where files are written")]
    MissingOutputPath,

    /// `set_public_path()` was never called.
    #[error("Missing public path: call set_public_path() to choose the URL the output directory is served from")]
    MissingPublicPath,

    /// Nothing to build.
    #[error(
        "No entries found: call add_entry(), add_entries(), add_style_entry(), copy_files() or add_plugin() at least once"
    )]
    NoEntries,

    /// Runtime chunk policy was left unset.
    #[error(
        "Runtime chunk policy not set: call either enable_single_runtime_chunk() or disable_single_runtime_chunk()"
    )]
    RuntimeChunkUnset,

    /// Manifest keys cannot be derived from a full URL public path.
    #[error(
        "Cannot determine how to prefix the keys in the build manifest: the public path \"{public_path}\" is a full URL"
    )]
    ManifestKeyPrefixRequired { public_path: String },

    /// The dev server document root could not be derived from the output path.
    /// `setting` names what was checked: the manifest key prefix or the public path.
    #[error(
        "Unable to determine the dev server content base: {setting} \"{value}\" is not a suffix of the output path \"{output_path}\""
    )]
    DevServerContentBase {
        setting: &'static str,
        value: String,
        output_path: String,
    },

    /// A path in the asset report resolves outside the output directory.
    #[error("Invalid output path: {0}")]
    InvalidOutputPath(String),

    /// Configuration error raised while building up the state.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for kiln-bundler operations.
pub type Result<T> = std::result::Result<T, Error>;

impl miette::Diagnostic for Error {
    fn code(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        Some(Box::new(match self {
            Error::MissingOutputPath => "KILN_MISSING_OUTPUT_PATH",
            Error::MissingPublicPath => "KILN_MISSING_PUBLIC_PATH",
            Error::NoEntries => "KILN_NO_ENTRIES",
            Error::RuntimeChunkUnset => "KILN_RUNTIME_CHUNK_UNSET",
            Error::ManifestKeyPrefixRequired { .. } => "KILN_MANIFEST_KEY_PREFIX_REQUIRED",
            Error::DevServerContentBase { .. } => "KILN_DEV_SERVER_CONTENT_BASE",
            Error::InvalidOutputPath(_) => "KILN_INVALID_OUTPUT_PATH",
            Error::Config(_) => "KILN_CONFIG",
            Error::Io(_) => "KILN_IO",
            Error::Json(_) => "KILN_JSON",
        }))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(miette::Severity::Error)
    }

    fn help(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        match self {
            Error::MissingOutputPath => Some(Box::new(
                "Set `output_path` in the build description, e.g. output_path = \"public/build\"",
            )),
            Error::MissingPublicPath => Some(Box::new(
                "Set `public_path` in the build description, e.g. public_path = \"/build\"",
            )),
            Error::RuntimeChunkUnset => Some(Box::new(
                "A single runtime chunk is recommended when several entries are loaded on the same page",
            )),
            Error::ManifestKeyPrefixRequired { .. } => Some(Box::new(
                "Call set_manifest_key_prefix() to choose the prefix of the manifest keys, e.g. \"build/\"",
            )),
            Error::DevServerContentBase { .. } => Some(Box::new(
                "With the dev server, the public path (or manifest key prefix) must be the tail of the output path, e.g. output \"/srv/app/public/build\" with public path \"/build\"",
            )),
            Error::Config(err) => err.method().map(|method| -> Box<dyn std::fmt::Display> {
                Box::new(format!("Check the arguments passed to {method}()"))
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use miette::Diagnostic;

    #[test]
    fn assembly_errors_have_codes_and_help() {
        let err = Error::MissingOutputPath;
        assert_eq!(err.code().unwrap().to_string(), "KILN_MISSING_OUTPUT_PATH");
        assert!(err.help().unwrap().to_string().contains("output_path"));
        assert!(err.to_string().contains("set_output_path()"));
    }

    #[test]
    fn config_errors_point_at_the_method() {
        let err = Error::from(ConfigError::InvalidArgument {
            method: "enable_build_cache",
            message: "at least one build dependency is required".to_string(),
        });
        assert_eq!(
            err.help().unwrap().to_string(),
            "Check the arguments passed to enable_build_cache()"
        );
    }
}
