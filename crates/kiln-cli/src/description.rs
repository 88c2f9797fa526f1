//! The build description file (`kiln.toml`).
//!
//! Every top-level key maps onto one `BuildState` mutator. Option tables are
//! handed over as JSON objects with their keys untouched, so the mutators do
//! the validating and their error messages name the offending option.
//!
//! ```toml
//! output_path = "public/build"
//! public_path = "/build"
//! single_runtime_chunk = true
//! versioning = "production"
//!
//! [entries]
//! app = "./assets/app.js"
//!
//! [sass]
//! resolveUrlLoader = false
//! ```
//!
//! The `[runtime]` table is read separately by
//! [`RuntimeContext::load`](kiln_config::RuntimeContext::load).

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use kiln_config::{BuildState, ConfigError, EntrySource, Environment, PluginDescriptor, keep};
use serde::Deserialize;
use serde::de::IgnoredAny;
use serde_json::{Map, Value};

use crate::error::{CliError, Result};

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildDescription {
    pub output_path: Option<PathBuf>,
    pub public_path: Option<String>,
    pub manifest_key_prefix: Option<String>,

    pub entries: IndexMap<String, EntrySource>,
    pub style_entries: IndexMap<String, EntrySource>,
    pub copy_files: Vec<Value>,

    pub single_runtime_chunk: Option<bool>,
    pub split_entry_chunks: bool,
    pub versioning: Option<Toggle>,
    pub source_maps: Option<Toggle>,
    pub cleanup_output: bool,
    pub css_extraction: Option<bool>,
    pub build_notifications: bool,
    pub filenames: Option<Value>,

    pub images: Option<Value>,
    pub fonts: Option<Value>,
    pub babel: Option<Value>,

    pub cache_groups: IndexMap<String, Value>,
    /// Dependency group name to the files that invalidate the persistent cache.
    pub build_cache: Option<IndexMap<String, Vec<String>>>,

    pub aliases: IndexMap<String, String>,
    pub externals: Vec<Value>,
    pub provide: IndexMap<String, String>,
    pub provide_jquery: bool,
    pub integrity: Option<Integrity>,

    pub sass: Option<Feature>,
    pub less: bool,
    pub stylus: bool,
    pub postcss: bool,
    pub svelte: bool,
    pub vue: Option<Feature>,
    pub handlebars: bool,
    pub typescript: bool,
    pub forked_type_checks: bool,
    pub babel_typescript: Option<Feature>,
    pub react: Option<Feature>,
    pub preact: Option<Feature>,

    /// Raw module rules appended after the built-in ones.
    pub loaders: Vec<Value>,
    pub plugins: Vec<PluginEntry>,

    #[serde(rename = "runtime")]
    _runtime: Option<IgnoredAny>,
}

/// `true`/`false`, or the one environment the feature is enabled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Toggle {
    Always(bool),
    Only(Environment),
}

impl Toggle {
    pub fn resolve(self, environment: Environment) -> bool {
        match self {
            Toggle::Always(enabled) => enabled,
            Toggle::Only(only) => only == environment,
        }
    }
}

/// A pipeline switched on with `true` or configured with an options table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Feature {
    Enabled(bool),
    Options(Map<String, Value>),
}

impl Feature {
    /// Options to enable the pipeline with, `None` when it is switched off.
    pub fn options(&self) -> Option<Value> {
        match self {
            Feature::Enabled(false) => None,
            Feature::Enabled(true) => Some(Value::Object(Map::new())),
            Feature::Options(options) => Some(Value::Object(options.clone())),
        }
    }
}

/// `true` for the default algorithm, or an explicit list such as `["sha384", "sha512"]`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Integrity {
    Enabled(bool),
    Algorithms(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PluginEntry {
    pub name: String,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub options: Option<Value>,
}

impl BuildDescription {
    /// Top-level keys accepted in a build description.
    pub const KEYS: &'static [&'static str] = &[
        "aliases",
        "babel",
        "babel_typescript",
        "build_cache",
        "build_notifications",
        "cache_groups",
        "cleanup_output",
        "copy_files",
        "css_extraction",
        "entries",
        "externals",
        "filenames",
        "fonts",
        "forked_type_checks",
        "handlebars",
        "images",
        "integrity",
        "less",
        "loaders",
        "manifest_key_prefix",
        "output_path",
        "plugins",
        "postcss",
        "preact",
        "provide",
        "provide_jquery",
        "public_path",
        "react",
        "runtime",
        "sass",
        "single_runtime_chunk",
        "source_maps",
        "split_entry_chunks",
        "style_entries",
        "stylus",
        "svelte",
        "typescript",
        "versioning",
        "vue",
    ];

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(CliError::DescriptionNotFound(path.to_path_buf()));
            }
            Err(err) => return Err(err.into()),
        };
        Self::from_toml_str(&text, path)
    }

    /// Parses a description. `path` is only used in error messages.
    pub fn from_toml_str(text: &str, path: &Path) -> Result<Self> {
        let invalid = |err: toml::de::Error| CliError::InvalidDescription {
            path: path.to_path_buf(),
            message: err.to_string(),
        };

        // Unknown keys are reported before the typed parse so the error can
        // carry a suggestion.
        let table: toml::Table = toml::from_str(text).map_err(invalid)?;
        if let Some(key) = table.keys().find(|key| !Self::KEYS.contains(&key.as_str())) {
            return Err(CliError::UnknownKey {
                path: path.to_path_buf(),
                key: key.clone(),
                valid: Self::KEYS,
            });
        }

        toml::from_str(text).map_err(invalid)
    }

    /// Replays the description onto `state`, in the order a build script would.
    pub fn apply_to(&self, state: &mut BuildState) -> std::result::Result<(), ConfigError> {
        let environment = state.runtime().environment;

        if let Some(output_path) = &self.output_path {
            state.set_output_path(output_path);
        }
        if let Some(public_path) = &self.public_path {
            state.set_public_path(public_path);
        }
        if let Some(prefix) = &self.manifest_key_prefix {
            state.set_manifest_key_prefix(prefix);
        }

        for (name, source) in &self.entries {
            state.add_entry(name, source.clone())?;
        }
        for (name, source) in &self.style_entries {
            state.add_style_entry(name, source.clone())?;
        }
        if !self.copy_files.is_empty() {
            state.copy_files(Value::Array(self.copy_files.clone()))?;
        }

        match self.single_runtime_chunk {
            Some(true) => {
                state.enable_single_runtime_chunk();
            }
            Some(false) => {
                state.disable_single_runtime_chunk();
            }
            None => {}
        }
        if self.split_entry_chunks {
            state.split_entry_chunks();
        }
        if let Some(versioning) = self.versioning {
            state.enable_versioning(versioning.resolve(environment));
        }
        if let Some(source_maps) = self.source_maps {
            state.enable_source_maps(source_maps.resolve(environment));
        }
        if self.cleanup_output {
            state.cleanup_output_before_build(keep);
        }
        if let Some(enabled) = self.css_extraction {
            state.disable_css_extraction(!enabled);
        }
        if self.build_notifications {
            state.enable_build_notifications(true, keep);
        }
        if let Some(filenames) = &self.filenames {
            state.configure_filenames(filenames.clone())?;
        }

        if let Some(images) = &self.images {
            state.configure_image_rule(images.clone(), keep)?;
        }
        if let Some(fonts) = &self.fonts {
            state.configure_font_rule(fonts.clone(), keep)?;
        }

        for (name, options) in &self.cache_groups {
            state.add_cache_group(name, options.clone())?;
        }
        if let Some(dependencies) = &self.build_cache {
            state.enable_build_cache(dependencies.clone(), keep)?;
        }

        state
            .add_aliases(self.aliases.clone())
            .add_externals(self.externals.clone())
            .auto_provide_variables(self.provide.clone());
        if self.provide_jquery {
            state.auto_provide_jquery();
        }
        match &self.integrity {
            Some(Integrity::Enabled(enabled)) => {
                state.enable_integrity_hashes(*enabled, Vec::<String>::new())?;
            }
            Some(Integrity::Algorithms(algorithms)) => {
                state.enable_integrity_hashes(true, algorithms)?;
            }
            None => {}
        }

        self.apply_pipelines(state)?;

        if let Some(babel) = &self.babel {
            state.configure_babel(keep, babel.clone())?;
        }

        for rule in &self.loaders {
            state.add_loader(rule.clone());
        }
        for entry in &self.plugins {
            let plugin = match &entry.options {
                Some(options) => PluginDescriptor::with_options(&entry.name, options.clone()),
                None => PluginDescriptor::new(&entry.name),
            };
            state.add_plugin(plugin, entry.priority);
        }

        Ok(())
    }

    fn apply_pipelines(&self, state: &mut BuildState) -> std::result::Result<(), ConfigError> {
        if let Some(options) = self.sass.as_ref().and_then(Feature::options) {
            state.enable_sass_loader(keep, options)?;
        }
        if self.less {
            state.enable_less_loader(keep);
        }
        if self.stylus {
            state.enable_stylus_loader(keep);
        }
        if self.postcss {
            state.enable_postcss_loader(keep);
        }
        if self.svelte {
            state.enable_svelte();
        }
        if let Some(options) = self.vue.as_ref().and_then(Feature::options) {
            state.enable_vue_loader(keep, options)?;
        }
        if self.handlebars {
            state.enable_handlebars_loader(keep);
        }
        if self.typescript {
            state.enable_typescript_loader(keep)?;
        }
        if self.forked_type_checks {
            state.enable_forked_type_script_types_checking(keep)?;
        }
        if let Some(options) = self.babel_typescript.as_ref().and_then(Feature::options) {
            state.enable_babel_typescript_preset(options)?;
        }
        if let Some(options) = self.react.as_ref().and_then(Feature::options) {
            state.enable_react_preset(options)?;
        }
        if let Some(options) = self.preact.as_ref().and_then(Feature::options) {
            state.enable_preact_preset(options)?;
        }
        Ok(())
    }
}
