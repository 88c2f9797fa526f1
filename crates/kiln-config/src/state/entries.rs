//! Entries, output/public paths and copied files.

use std::path::Path;

use path_clean::PathClean;
use serde_json::Value;

use super::BuildState;
use crate::copy::CopyFilesConfig;
use crate::entry::{COPY_FILES_ENTRY, EntryKind, EntrySource};
use crate::error::{ConfigError, Result};
use crate::options::{json_kind, validate_keys};
use crate::paths;

impl BuildState {
    /// Absolute directory the bundle is written to. Relative paths resolve
    /// against the runtime context directory.
    pub fn set_output_path(&mut self, path: impl AsRef<Path>) -> &mut Self {
        let path = path.as_ref();
        let resolved = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.runtime.context.join(path)
        };
        self.output_path = Some(resolved.clean());
        self
    }

    /// Public URL prefix of the output directory, stored with exactly one trailing slash.
    pub fn set_public_path(&mut self, path: &str) -> &mut Self {
        let (normalized, suspicious) = paths::normalize_public_path(path);
        if suspicious {
            tracing::warn!(
                public_path = path,
                "set_public_path: the public path should usually start with \"/\" or be a full URL; \
                 relative public paths are rarely intended"
            );
        }
        self.public_path = Some(normalized);
        self
    }

    /// Prefix of the keys written to the build manifest. A blank prefix means no prefix.
    pub fn set_manifest_key_prefix(&mut self, prefix: &str) -> &mut Self {
        let (normalized, leading_slash) = paths::normalize_manifest_key_prefix(prefix);
        if leading_slash {
            tracing::warn!(
                manifest_key_prefix = prefix,
                "set_manifest_key_prefix: manifest keys conventionally have no leading \"/\""
            );
        }
        self.manifest_key_prefix = Some(normalized);
        self
    }

    pub fn add_entry(&mut self, name: &str, source: impl Into<EntrySource>) -> Result<&mut Self> {
        let source = source.into();
        self.check_new_entry("add_entry", name, &source)?;
        self.entries.insert(name.to_string(), source);
        Ok(self)
    }

    /// Registers several script entries at once.
    ///
    /// Either every entry is added or none is: all names are checked before
    /// the first insert.
    pub fn add_entries<I, K, S>(&mut self, entries: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = (K, S)>,
        K: Into<String>,
        S: Into<EntrySource>,
    {
        let entries: Vec<(String, EntrySource)> = entries
            .into_iter()
            .map(|(name, source)| (name.into(), source.into()))
            .collect();

        for (i, (name, source)) in entries.iter().enumerate() {
            self.check_new_entry("add_entries", name, source)?;
            if entries[..i].iter().any(|(prior, _)| prior == name) {
                return Err(ConfigError::DuplicateEntry {
                    method: "add_entries",
                    name: name.clone(),
                    existing: EntryKind::Script,
                });
            }
        }

        self.entries.extend(entries);
        Ok(self)
    }

    /// Entry that only contains stylesheets; its generated script is discarded.
    pub fn add_style_entry(
        &mut self,
        name: &str,
        source: impl Into<EntrySource>,
    ) -> Result<&mut Self> {
        let source = source.into();
        self.check_new_entry("add_style_entry", name, &source)?;
        self.style_entries.insert(name.to_string(), source);
        Ok(self)
    }

    fn check_new_entry(&self, method: &'static str, name: &str, source: &EntrySource) -> Result<()> {
        if name.trim().is_empty() {
            return Err(ConfigError::invalid_argument(method, "entry name cannot be empty"));
        }
        if name == COPY_FILES_ENTRY {
            return Err(ConfigError::invalid_argument(
                method,
                format!("\"{COPY_FILES_ENTRY}\" is reserved and cannot be used as an entry name"),
            ));
        }
        if source.is_empty() {
            return Err(ConfigError::invalid_argument(
                method,
                format!("entry \"{name}\" needs at least one non-empty source path"),
            ));
        }

        let existing = if self.entries.contains_key(name) {
            Some(EntryKind::Script)
        } else if self.style_entries.contains_key(name) {
            Some(EntryKind::Style)
        } else {
            None
        };

        match existing {
            Some(existing) => Err(ConfigError::DuplicateEntry {
                method,
                name: name.to_string(),
                existing,
            }),
            None => Ok(()),
        }
    }

    /// Copies files into the build. Accepts one options object or a list of them.
    pub fn copy_files(&mut self, configs: Value) -> Result<&mut Self> {
        const METHOD: &str = "copy_files";

        let configs = match configs {
            Value::Array(list) => list,
            Value::Object(_) => vec![configs],
            other => {
                return Err(ConfigError::NotAnObject {
                    method: METHOD,
                    found: json_kind(&other),
                });
            }
        };

        let mut parsed = Vec::with_capacity(configs.len());
        for config in configs {
            if !config.is_object() {
                return Err(ConfigError::NotAnObject {
                    method: METHOD,
                    found: json_kind(&config),
                });
            }
            validate_keys(METHOD, &config, CopyFilesConfig::KEYS)?;

            let has_from = config
                .get("from")
                .and_then(Value::as_str)
                .is_some_and(|from| !from.trim().is_empty());
            if !has_from {
                return Err(ConfigError::invalid_argument(
                    METHOD,
                    "the \"from\" option is required and must be a non-empty string",
                ));
            }

            let config: CopyFilesConfig =
                serde_json::from_value(config).map_err(|err| ConfigError::InvalidOptions {
                    method: METHOD,
                    message: err.to_string(),
                })?;
            if let Err(err) = regex::Regex::new(&config.pattern) {
                return Err(ConfigError::invalid_argument(
                    METHOD,
                    format!("invalid \"pattern\": {err}"),
                ));
            }
            parsed.push(config);
        }

        self.copy_configs.extend(parsed);
        Ok(self)
    }
}
