//! Output policy: versioning, filenames, chunk splitting, caching and resolution.

use serde_json::Value;

use super::{BuildCache, BuildState};
use crate::cache_group::CacheGroup;
use crate::callback::OptionsCallback;
use crate::error::{ConfigError, Result};
use crate::options::{FilenameOptions, parse_options};

impl BuildState {
    /// Content-hashed output filenames.
    pub fn enable_versioning(&mut self, enabled: bool) -> &mut Self {
        self.use_versioning = enabled;
        self
    }

    pub fn enable_source_maps(&mut self, enabled: bool) -> &mut Self {
        self.use_source_maps = enabled;
        self
    }

    /// Overrides the default `js`, `css` and `assets` filename templates.
    pub fn configure_filenames(&mut self, options: Value) -> Result<&mut Self> {
        let filenames: FilenameOptions =
            parse_options("configure_filenames", options, FilenameOptions::KEYS)?;
        self.filenames = filenames;
        Ok(self)
    }

    /// Empties the output directory before each build.
    pub fn cleanup_output_before_build(
        &mut self,
        callback: impl Fn(Value) -> Value + Send + Sync + 'static,
    ) -> &mut Self {
        self.cleanup_output = Some(OptionsCallback::new(callback));
        self
    }

    pub fn enable_single_runtime_chunk(&mut self) -> &mut Self {
        self.single_runtime_chunk = Some(true);
        self
    }

    pub fn disable_single_runtime_chunk(&mut self) -> &mut Self {
        self.single_runtime_chunk = Some(false);
        self
    }

    /// Splits every entry into shared chunks instead of only async imports.
    pub fn split_entry_chunks(&mut self) -> &mut Self {
        self.split_entry_chunks = true;
        self
    }

    pub fn configure_split_chunks(
        &mut self,
        callback: impl Fn(Value) -> Value + Send + Sync + 'static,
    ) -> &mut Self {
        self.callbacks.split_chunks = OptionsCallback::new(callback);
        self
    }

    /// Registers a named cache group.
    ///
    /// `options` must carry exactly one of `test` (a regular expression) or
    /// `node_modules` (a list of package names); every other key is passed
    /// through to the split-chunks group as is.
    pub fn add_cache_group(&mut self, name: &str, options: Value) -> Result<&mut Self> {
        if name.trim().is_empty() {
            return Err(ConfigError::InvalidCacheGroup {
                name: name.to_string(),
                message: "the cache group name cannot be empty".to_string(),
            });
        }
        let group = CacheGroup::from_options(name, options)?;
        self.cache_groups.insert(name.to_string(), group);
        Ok(self)
    }

    /// Enables the persistent filesystem cache.
    ///
    /// `build_dependencies` maps a dependency group to the files whose change
    /// invalidates the cache; at least one group with one file is required.
    pub fn enable_build_cache<I, K, V, P>(
        &mut self,
        build_dependencies: I,
        callback: impl Fn(Value) -> Value + Send + Sync + 'static,
    ) -> Result<&mut Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: IntoIterator<Item = P>,
        P: Into<String>,
    {
        let build_dependencies: indexmap::IndexMap<String, Vec<String>> = build_dependencies
            .into_iter()
            .map(|(group, files)| (group.into(), files.into_iter().map(Into::into).collect()))
            .collect();

        if build_dependencies.values().all(Vec::is_empty) {
            return Err(ConfigError::invalid_argument(
                "enable_build_cache",
                "at least one build dependency is required, usually the build description file",
            ));
        }

        self.build_cache = Some(BuildCache {
            build_dependencies,
            callback: OptionsCallback::new(callback),
        });
        Ok(self)
    }

    /// Module aliases, later calls override earlier ones key by key.
    pub fn add_aliases<I, K, V>(&mut self, aliases: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.aliases
            .extend(aliases.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Modules left out of the bundle. Each item is passed through unchanged.
    pub fn add_externals<I>(&mut self, externals: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.externals.extend(externals.into_iter().map(Into::into));
        self
    }

    pub fn configure_dev_server_options(
        &mut self,
        callback: impl Fn(Value) -> Value + Send + Sync + 'static,
    ) -> &mut Self {
        self.callbacks.dev_server = OptionsCallback::new(callback);
        self
    }

    pub fn configure_watch_options(
        &mut self,
        callback: impl Fn(Value) -> Value + Send + Sync + 'static,
    ) -> &mut Self {
        self.callbacks.watch = OptionsCallback::new(callback);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callback::keep;
    use crate::runtime::RuntimeContext;
    use serde_json::json;

    #[test]
    fn runtime_chunk_is_tri_state() {
        let mut state = BuildState::new(RuntimeContext::default());
        assert_eq!(state.single_runtime_chunk(), None);
        state.enable_single_runtime_chunk();
        assert_eq!(state.single_runtime_chunk(), Some(true));
        state.disable_single_runtime_chunk();
        assert_eq!(state.single_runtime_chunk(), Some(false));
    }

    #[test]
    fn filenames_whitelist() {
        let mut state = BuildState::new(RuntimeContext::default());
        state
            .configure_filenames(json!({ "js": "[name].[chunkhash].js" }))
            .unwrap();
        assert_eq!(state.filenames().js.as_deref(), Some("[name].[chunkhash].js"));
        assert!(state.filenames().css.is_none());

        let err = state
            .configure_filenames(json!({ "images": "x" }))
            .unwrap_err();
        assert!(err.to_string().contains("js, css, assets"));
    }

    #[test]
    fn cache_group_registration() {
        let mut state = BuildState::new(RuntimeContext::default());
        state
            .add_cache_group("vendor", json!({ "node_modules": ["react", "lodash"] }))
            .unwrap();
        let group = &state.cache_groups()["vendor"];
        assert!(group.test.matches("/app/node_modules/react/index.js"));
        assert!(!group.test.matches("/app/node_modules/other/index.js"));

        assert!(state.add_cache_group("", json!({ "test": "x" })).is_err());
        assert!(state.add_cache_group("bad", json!({})).is_err());
    }

    #[test]
    fn build_cache_requires_a_dependency() {
        let mut state = BuildState::new(RuntimeContext::default());
        let none: Vec<(&str, Vec<&str>)> = vec![];
        assert!(state.enable_build_cache(none, keep).is_err());
        assert!(
            state
                .enable_build_cache([("config", Vec::<&str>::new())], keep)
                .is_err()
        );
        assert!(state.build_cache().is_none());

        state
            .enable_build_cache([("config", vec!["kiln.toml"])], keep)
            .unwrap();
        let cache = state.build_cache().unwrap();
        assert_eq!(cache.build_dependencies["config"], ["kiln.toml"]);
    }

    #[test]
    fn aliases_and_externals_accumulate() {
        let mut state = BuildState::new(RuntimeContext::default());
        state
            .add_aliases([("@", "./assets"), ("~", "./node_modules")])
            .add_aliases([("@", "./src")])
            .add_externals([json!({ "jquery": "jQuery" })])
            .add_externals(["react"]);
        assert_eq!(state.aliases()["@"], "./src");
        assert_eq!(state.aliases().len(), 2);
        assert_eq!(state.externals(), &[json!({ "jquery": "jQuery" }), json!("react")]);
    }
}
