//! Caller plugins and options of the built-in plugins.

use serde_json::Value;

use super::BuildState;
use crate::callback::OptionsCallback;
use crate::error::Result;
use crate::integrity::HashAlgorithm;
use crate::plugin::{PluginDescriptor, RegisteredPlugin};

impl BuildState {
    /// Adds a caller plugin. Higher priorities run first; equal priorities
    /// keep their registration order. Use `0` when order doesn't matter.
    pub fn add_plugin(&mut self, plugin: PluginDescriptor, priority: i32) -> &mut Self {
        let insertion_order = self.plugins.len();
        self.plugins.push(RegisteredPlugin {
            plugin,
            priority,
            insertion_order,
        });
        self
    }

    /// Free identifiers that resolve to a module, e.g. `$` to `jquery`.
    pub fn auto_provide_variables<I, K, V>(&mut self, variables: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.provided_variables
            .extend(variables.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn auto_provide_jquery(&mut self) -> &mut Self {
        self.auto_provide_variables([
            ("$", "jquery"),
            ("jQuery", "jquery"),
            ("window.jQuery", "jquery"),
        ])
    }

    pub fn configure_define_plugin(
        &mut self,
        callback: impl Fn(Value) -> Value + Send + Sync + 'static,
    ) -> &mut Self {
        self.callbacks.define_plugin = OptionsCallback::new(callback);
        self
    }

    pub fn enable_build_notifications(
        &mut self,
        enabled: bool,
        callback: impl Fn(Value) -> Value + Send + Sync + 'static,
    ) -> &mut Self {
        self.build_notifications = enabled.then(|| OptionsCallback::new(callback));
        self
    }

    pub fn configure_manifest_plugin(
        &mut self,
        callback: impl Fn(Value) -> Value + Send + Sync + 'static,
    ) -> &mut Self {
        self.callbacks.manifest_plugin = OptionsCallback::new(callback);
        self
    }

    pub fn configure_terser_plugin(
        &mut self,
        callback: impl Fn(Value) -> Value + Send + Sync + 'static,
    ) -> &mut Self {
        self.callbacks.terser_plugin = OptionsCallback::new(callback);
        self
    }

    pub fn configure_css_minimizer_plugin(
        &mut self,
        callback: impl Fn(Value) -> Value + Send + Sync + 'static,
    ) -> &mut Self {
        self.callbacks.css_minimizer_plugin = OptionsCallback::new(callback);
        self
    }

    pub fn configure_friendly_errors_plugin(
        &mut self,
        callback: impl Fn(Value) -> Value + Send + Sync + 'static,
    ) -> &mut Self {
        self.callbacks.friendly_errors_plugin = OptionsCallback::new(callback);
        self
    }

    /// Adds subresource integrity digests to `entrypoints.json`.
    ///
    /// An empty algorithm list means `sha384`. Unknown algorithms are rejected
    /// here rather than when the manifest is written.
    pub fn enable_integrity_hashes<I, S>(&mut self, enabled: bool, algorithms: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if !enabled {
            self.integrity_algorithms.clear();
            return Ok(self);
        }

        let mut parsed: Vec<HashAlgorithm> = Vec::new();
        for algorithm in algorithms {
            let algorithm: HashAlgorithm = algorithm.as_ref().parse()?;
            if !parsed.contains(&algorithm) {
                parsed.push(algorithm);
            }
        }
        if parsed.is_empty() {
            parsed.push(HashAlgorithm::default());
        }

        self.integrity_algorithms = parsed;
        Ok(self)
    }
}
