//! Error types raised while building up a [`BuildState`](crate::BuildState).
//!
//! Every variant is raised synchronously by the mutator that received the bad
//! input and names that mutator, so a mistake surfaces at the call site rather
//! than when the configuration is assembled.

use thiserror::Error;

use crate::entry::EntryKind;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "{method}: duplicate entry name \"{name}\", it was already registered with {existing}"
    )]
    DuplicateEntry {
        method: &'static str,
        name: String,
        existing: EntryKind,
    },

    #[error("{method}: invalid option \"{key}\", valid options are: {}", .valid.join(", "))]
    UnknownOption {
        method: &'static str,
        key: String,
        valid: &'static [&'static str],
    },

    #[error("{method}: options must be an object, got {found}")]
    NotAnObject {
        method: &'static str,
        found: &'static str,
    },

    #[error("{method}: invalid options: {message}")]
    InvalidOptions {
        method: &'static str,
        message: String,
    },

    #[error("{method} cannot be used together with {conflicting}, choose one of the two")]
    ConflictingFeatures {
        method: &'static str,
        conflicting: &'static str,
    },

    #[error("{method}: {message}")]
    InvalidArgument {
        method: &'static str,
        message: String,
    },

    #[error("add_cache_group(\"{name}\"): {message}")]
    InvalidCacheGroup { name: String, message: String },

    #[error(
        "enable_integrity_hashes: unsupported hash algorithm \"{algorithm}\", supported algorithms are: {}",
        .supported.join(", ")
    )]
    UnsupportedHashAlgorithm {
        algorithm: String,
        supported: &'static [&'static str],
    },

    #[error("configure_loader_rule: unknown rule \"{name}\", valid rules are: {}", .valid.join(", "))]
    UnknownRule {
        name: String,
        valid: &'static [&'static str],
    },

    #[error("failed to load runtime context: {0}")]
    Runtime(#[from] Box<figment::Error>),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    /// The fluent-API method that raised this error, when there is one.
    pub fn method(&self) -> Option<&'static str> {
        match self {
            ConfigError::DuplicateEntry { method, .. }
            | ConfigError::UnknownOption { method, .. }
            | ConfigError::NotAnObject { method, .. }
            | ConfigError::InvalidOptions { method, .. }
            | ConfigError::ConflictingFeatures { method, .. }
            | ConfigError::InvalidArgument { method, .. } => Some(*method),
            ConfigError::InvalidCacheGroup { .. } => Some("add_cache_group"),
            ConfigError::UnsupportedHashAlgorithm { .. } => Some("enable_integrity_hashes"),
            ConfigError::UnknownRule { .. } => Some("configure_loader_rule"),
            ConfigError::Runtime(_) | ConfigError::Io(_) => None,
        }
    }

    pub(crate) fn invalid_argument(method: &'static str, message: impl Into<String>) -> Self {
        ConfigError::InvalidArgument {
            method,
            message: message.into(),
        }
    }
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::Runtime(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_option_lists_valid_keys() {
        let err = ConfigError::UnknownOption {
            method: "configure_image_rule",
            key: "maxsize".to_string(),
            valid: &["enabled", "filename", "maxSize", "type"],
        };
        let message = err.to_string();
        assert!(message.contains("configure_image_rule"));
        assert!(message.contains("\"maxsize\""));
        assert!(message.contains("enabled, filename, maxSize, type"));
        assert_eq!(err.method(), Some("configure_image_rule"));
    }

    #[test]
    fn duplicate_entry_names_prior_registration() {
        let err = ConfigError::DuplicateEntry {
            method: "add_style_entry",
            name: "app".to_string(),
            existing: EntryKind::Script,
        };
        assert!(err.to_string().contains("add_entry()"));
    }
}
