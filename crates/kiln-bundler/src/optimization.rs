//! The `optimization` block: chunk splitting, runtime chunk and minimizers.

use kiln_config::{BuildState, PluginDescriptor};
use serde_json::{Map, Value, json};

pub const TERSER: &str = "terser";
pub const CSS_MINIMIZER: &str = "css-minimizer";

/// Default split-chunk policy, caller cache groups merged in, then the
/// `configure_split_chunks()` callback.
pub fn build_split_chunks(state: &BuildState) -> Value {
    let chunks = if state.splits_entry_chunks() {
        "all"
    } else {
        "async"
    };
    let mut split_chunks = json!({ "chunks": chunks });

    if !state.cache_groups().is_empty() {
        let mut groups = Map::new();
        for (name, group) in state.cache_groups() {
            let mut entry = Map::new();
            entry.insert("name".to_string(), json!(name));
            entry.insert("test".to_string(), json!(group.test));
            entry.insert("chunks".to_string(), json!("all"));
            entry.insert("enforce".to_string(), json!(true));
            // Caller keys override the defaults one by one.
            for (key, value) in &group.options {
                entry.insert(key.clone(), value.clone());
            }
            groups.insert(name.clone(), Value::Object(entry));
        }
        split_chunks["cacheGroups"] = Value::Object(groups);
    }

    state.callbacks().split_chunks.apply(split_chunks)
}

fn minimizers(state: &BuildState) -> Vec<PluginDescriptor> {
    let callbacks = state.callbacks();
    vec![
        PluginDescriptor::with_options(
            TERSER,
            callbacks
                .terser_plugin
                .apply(json!({ "extractComments": false })),
        ),
        PluginDescriptor::with_options(CSS_MINIMIZER, callbacks.css_minimizer_plugin.apply(json!({}))),
    ]
}

pub fn build_optimization(state: &BuildState) -> Value {
    let mut optimization = json!({ "splitChunks": build_split_chunks(state) });

    if state.single_runtime_chunk() == Some(true) {
        optimization["runtimeChunk"] = json!("single");
    }

    if state.is_production() {
        optimization["minimize"] = json!(true);
        optimization["minimizer"] = json!(minimizers(state));
    } else {
        optimization["moduleIds"] = json!("named");
        optimization["chunkIds"] = json!("named");
    }

    optimization
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_config::RuntimeContext;

    #[test]
    fn async_chunks_unless_entries_split() {
        let mut state = BuildState::new(RuntimeContext::default());
        assert_eq!(build_split_chunks(&state)["chunks"], "async");
        state.split_entry_chunks();
        assert_eq!(build_split_chunks(&state)["chunks"], "all");
    }

    #[test]
    fn cache_groups_merge_over_defaults() {
        let mut state = BuildState::new(RuntimeContext::default());
        state
            .add_cache_group("vendor", json!({ "node_modules": ["react"], "enforce": false }))
            .unwrap()
            .add_cache_group("styles", json!({ "test": "\\.css$", "priority": 5 }))
            .unwrap();

        let split = build_split_chunks(&state);
        let vendor = &split["cacheGroups"]["vendor"];
        assert_eq!(vendor["name"], "vendor");
        assert_eq!(vendor["chunks"], "all");
        assert_eq!(vendor["enforce"], false);
        assert!(vendor["test"].as_str().unwrap().contains("node_modules"));

        let styles = &split["cacheGroups"]["styles"];
        assert_eq!(styles["test"], "\\.css$");
        assert_eq!(styles["priority"], 5);
        assert_eq!(styles["enforce"], true);
    }

    #[test]
    fn split_chunks_callback_replaces_result() {
        let mut state = BuildState::new(RuntimeContext::default());
        state.configure_split_chunks(|_| json!({ "chunks": "initial" }));
        assert_eq!(build_split_chunks(&state), json!({ "chunks": "initial" }));
    }

    #[test]
    fn production_minimizes() {
        let mut state = BuildState::new(RuntimeContext::production());
        state
            .enable_single_runtime_chunk()
            .configure_terser_plugin(|mut options| {
                options["parallel"] = json!(4);
                options
            });

        let optimization = build_optimization(&state);
        assert_eq!(optimization["runtimeChunk"], "single");
        assert_eq!(optimization["minimize"], true);
        assert_eq!(optimization["minimizer"][0]["name"], TERSER);
        assert_eq!(optimization["minimizer"][0]["options"]["parallel"], 4);
        assert_eq!(optimization["minimizer"][1]["name"], CSS_MINIMIZER);
        assert!(optimization.get("moduleIds").is_none());
    }

    #[test]
    fn development_names_modules() {
        let mut state = BuildState::new(RuntimeContext::default());
        state.disable_single_runtime_chunk();
        let optimization = build_optimization(&state);
        assert!(optimization.get("runtimeChunk").is_none());
        assert_eq!(optimization["moduleIds"], "named");
        assert_eq!(optimization["chunkIds"], "named");
        assert!(optimization.get("minimizer").is_none());
    }
}
