//! Top-level assembly: [`BuildState`] in, [`AssembledConfig`] out.
//!
//! Assembly never mutates the state; every call produces a fresh config.

use std::path::PathBuf;

use indexmap::IndexMap;
use kiln_config::{BuildState, COPY_FILES_ENTRY, EntrySource, PluginDescriptor};
use serde::Serialize;
use serde_json::{Value, json};

use crate::Result;
use crate::dev_server::build_dev_server;
use crate::entrypoints::{EntryPointsOptions, EntryPointsPlugin};
use crate::optimization::build_optimization;
use crate::output::{OutputConfig, build_output};
use crate::plugins::build_plugins;
use crate::rules::{COPY_FILES_MODULE, build_rules};
use crate::validator::validate;

/// File extensions the bundler tries, in order, for extension-less imports.
pub const RESOLVE_EXTENSIONS: &[&str] = &[
    ".wasm", ".mjs", ".js", ".json", ".jsx", ".vue", ".ts", ".tsx", ".svelte",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Production,
    Development,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleConfig {
    pub rules: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolveConfig {
    pub extensions: Vec<String>,
    pub alias: IndexMap<String, String>,
}

/// The bundler configuration, in the bundler's own (camelCase) schema.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssembledConfig {
    pub context: PathBuf,
    pub entry: IndexMap<String, EntrySource>,
    pub mode: Mode,
    pub output: OutputConfig,
    pub module: ModuleConfig,
    pub plugins: Vec<PluginDescriptor>,
    pub optimization: Value,
    pub resolve: ResolveConfig,
    pub externals: Vec<Value>,
    /// A devtool name, or `false`.
    pub devtool: Value,
    pub performance: Value,
    pub stats: Value,
    pub watch_options: Value,
    /// Present only when the build cache was enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dev_server: Option<Value>,
    #[serde(skip)]
    entry_points: EntryPointsOptions,
}

impl AssembledConfig {
    /// The post-build step writing `entrypoints.json` for this build.
    pub fn entry_points_plugin(&self) -> EntryPointsPlugin {
        EntryPointsPlugin::new(self.entry_points.clone())
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Validates `state`, then assembles it.
pub fn assemble(state: &BuildState) -> Result<AssembledConfig> {
    validate(state)?;

    let entry_points = EntryPointsOptions::from_state(state);
    let config = AssembledConfig {
        context: state.runtime().context.clone(),
        entry: build_entry(state),
        mode: if state.is_production() {
            Mode::Production
        } else {
            Mode::Development
        },
        output: build_output(state),
        module: ModuleConfig {
            rules: build_rules(state),
        },
        plugins: build_plugins(state, &entry_points),
        optimization: build_optimization(state),
        resolve: build_resolve(state),
        externals: state.externals().to_vec(),
        devtool: build_devtool(state),
        performance: json!({ "hints": false }),
        stats: build_stats(state),
        watch_options: state
            .callbacks()
            .watch
            .apply(json!({ "ignored": "**/node_modules" })),
        cache: build_cache(state),
        dev_server: if state.is_dev_server() {
            Some(build_dev_server(state)?)
        } else {
            None
        },
        entry_points,
    };

    tracing::debug!(
        mode = ?config.mode,
        entries = config.entry.len(),
        rules = config.module.rules.len(),
        plugins = config.plugins.len(),
        public_path = %config.output.public_path,
        "assembled bundler config"
    );
    Ok(config)
}

/// `get_config()` on the build state itself.
pub trait BuildStateExt {
    fn get_config(&self) -> Result<AssembledConfig>;
}

impl BuildStateExt for BuildState {
    fn get_config(&self) -> Result<AssembledConfig> {
        assemble(self)
    }
}

/// Script entries, then style entries, then the synthetic copy-files entry.
fn build_entry(state: &BuildState) -> IndexMap<String, EntrySource> {
    let mut entry: IndexMap<String, EntrySource> = state
        .entries()
        .iter()
        .chain(state.style_entries())
        .map(|(name, source)| (name.clone(), source.clone()))
        .collect();
    if !state.copy_configs().is_empty() {
        entry.insert(
            COPY_FILES_ENTRY.to_string(),
            EntrySource::from(COPY_FILES_MODULE),
        );
    }
    entry
}

fn build_resolve(state: &BuildState) -> ResolveConfig {
    let mut alias = IndexMap::new();
    let pipelines = state.pipelines();

    if let Some(vue) = &pipelines.vue {
        match vue.options.runtime_compiler_build {
            Some(false) => {}
            runtime_compiler_build => {
                if runtime_compiler_build.is_none() {
                    tracing::info!(
                        "the Vue runtime compiler build is used; pass runtimeCompilerBuild: false \
                         to enable_vue_loader() if every template is precompiled"
                    );
                }
                let target = if vue.options.version == Some(2) {
                    "vue/dist/vue.esm.js"
                } else {
                    "vue/dist/vue.esm-bundler.js"
                };
                alias.insert("vue$".to_string(), target.to_string());
            }
        }
    }

    if let Some(preact) = &pipelines.preact {
        if preact.preact_compat {
            alias.insert("react".to_string(), "preact/compat".to_string());
            alias.insert("react-dom".to_string(), "preact/compat".to_string());
        }
    }

    // Caller aliases win.
    alias.extend(
        state
            .aliases()
            .iter()
            .map(|(key, target)| (key.clone(), target.clone())),
    );

    ResolveConfig {
        extensions: RESOLVE_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
        alias,
    }
}

fn build_devtool(state: &BuildState) -> Value {
    match (state.use_source_maps(), state.is_production()) {
        (false, _) => Value::Bool(false),
        (true, true) => json!("source-map"),
        (true, false) => json!("inline-source-map"),
    }
}

/// Terse stats unless machine-readable or profiling output was requested.
fn build_stats(state: &BuildState) -> Value {
    let runtime = state.runtime();
    if runtime.output_json || runtime.profile {
        return json!({});
    }
    json!({
        "hash": false,
        "version": false,
        "timings": false,
        "assets": false,
        "chunks": false,
        "modules": false,
        "reasons": false,
        "children": false,
        "source": false,
        "errors": false,
        "errorDetails": false,
        "warnings": false,
        "publicPath": false,
        "builtAt": false,
    })
}

fn build_cache(state: &BuildState) -> Option<Value> {
    let cache = state.build_cache()?;
    Some(cache.callback.apply(json!({
        "type": "filesystem",
        "buildDependencies": cache.build_dependencies,
    })))
}
