use kiln_config::{BuildState, COPY_FILES_ENTRY, PluginDescriptor};
use serde_json::{Map, Value, json};

use super::registry::{DEFAULT_PRIORITY, PluginRegistry};
use crate::entrypoints::EntryPointsOptions;
use crate::manifest::{ManifestFilter, manifest_base_path};
use crate::output::css_filename;

/// Names of the built-in plugin descriptors.
pub mod names {
    pub const MINI_CSS_EXTRACT: &str = "mini-css-extract";
    pub const DELETE_UNUSED_ENTRIES: &str = "delete-unused-entries";
    pub const ENTRY_POINTS: &str = "entry-points";
    pub const ASSETS_MANIFEST: &str = "assets-manifest";
    pub const PROVIDE: &str = "provide";
    pub const CLEAN: &str = "clean";
    pub const DEFINE: &str = "define";
    pub const NOTIFIER: &str = "notifier";
    pub const VUE_LOADER: &str = "vue-loader";
    pub const FORK_TS_CHECKER: &str = "fork-ts-checker";
    pub const FRIENDLY_ERRORS: &str = "friendly-errors";
    pub const ASSET_OUTPUT_DISPLAY: &str = "asset-output-display";
}

/// Every plugin of the build, in final order.
///
/// `entry_points` carries the already-resolved public path so the manifest
/// and the generated code agree on asset URLs.
pub fn build_plugins(state: &BuildState, entry_points: &EntryPointsOptions) -> Vec<PluginDescriptor> {
    let mut registry = PluginRegistry::new();
    let callbacks = state.callbacks();

    if state.css_extraction_enabled() {
        let filename = css_filename(state);
        let options = callbacks.mini_css_extract_plugin.apply(json!({
            "filename": filename,
            "chunkFilename": filename,
        }));
        registry.add(
            PluginDescriptor::with_options(names::MINI_CSS_EXTRACT, options),
            DEFAULT_PRIORITY,
        );
    }

    let mut unused_entries: Vec<String> = state.style_entries().keys().cloned().collect();
    if !state.copy_configs().is_empty() {
        unused_entries.push(COPY_FILES_ENTRY.to_string());
    }
    registry.add(
        PluginDescriptor::with_options(
            names::DELETE_UNUSED_ENTRIES,
            json!({ "entries": unused_entries }),
        ),
        DEFAULT_PRIORITY,
    );

    registry.add(
        PluginDescriptor::with_options(names::ENTRY_POINTS, json!(entry_points)),
        DEFAULT_PRIORITY,
    );

    let manifest_options = callbacks.manifest_plugin.apply(json!({
        "fileName": "manifest.json",
        "publicPath": entry_points.public_path,
        "writeToFileEmit": true,
        "basePath": manifest_base_path(state),
        "filter": ManifestFilter::from_state(state),
    }));
    registry.add(
        PluginDescriptor::with_options(names::ASSETS_MANIFEST, manifest_options),
        DEFAULT_PRIORITY,
    );

    if !state.provided_variables().is_empty() {
        let variables: Map<String, Value> = state
            .provided_variables()
            .iter()
            .map(|(name, module)| (name.clone(), Value::String(module.clone())))
            .collect();
        registry.add(
            PluginDescriptor::with_options(names::PROVIDE, Value::Object(variables)),
            DEFAULT_PRIORITY,
        );
    }

    if let Some(callback) = state.cleanup_output() {
        let options = callback.apply(json!({
            "cleanOnceBeforeBuildPatterns": ["**/*"],
            "verbose": false,
            "dry": false,
        }));
        registry.add(
            PluginDescriptor::with_options(names::CLEAN, options),
            DEFAULT_PRIORITY,
        );
    }

    let node_env = if state.is_production() {
        "\"production\""
    } else {
        "\"development\""
    };
    let definitions = callbacks
        .define_plugin
        .apply(json!({ "process.env.NODE_ENV": node_env }));
    registry.add(
        PluginDescriptor::with_options(names::DEFINE, definitions),
        DEFAULT_PRIORITY,
    );

    if let Some(callback) = state.build_notifications() {
        let options = callback.apply(json!({ "title": "kiln" }));
        registry.add(
            PluginDescriptor::with_options(names::NOTIFIER, options),
            DEFAULT_PRIORITY,
        );
    }

    let pipelines = state.pipelines();
    if pipelines.vue.is_some() {
        registry.add(PluginDescriptor::new(names::VUE_LOADER), DEFAULT_PRIORITY);
    }
    if let Some(callback) = &pipelines.forked_type_check {
        registry.add(
            PluginDescriptor::with_options(names::FORK_TS_CHECKER, callback.apply(json!({}))),
            DEFAULT_PRIORITY,
        );
    }

    // Console formatting only makes sense for humans.
    if !state.runtime().output_json {
        let options = callbacks.friendly_errors_plugin.apply(json!({
            "clearConsole": false,
            "additionalTransformers": [],
            "additionalFormatters": [],
        }));
        registry.add(
            PluginDescriptor::with_options(names::FRIENDLY_ERRORS, options),
            DEFAULT_PRIORITY,
        );

        let output_path = state
            .output_path()
            .map(|path| {
                path.strip_prefix(&state.runtime().context)
                    .unwrap_or(path)
                    .to_string_lossy()
                    .into_owned()
            })
            .unwrap_or_default();
        registry.add(
            PluginDescriptor::with_options(
                names::ASSET_OUTPUT_DISPLAY,
                json!({ "outputPath": output_path }),
            ),
            DEFAULT_PRIORITY,
        );
    }

    registry.extend_registered(state.plugins());
    registry.into_ordered()
}
