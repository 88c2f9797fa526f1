//! Module rules, loader options and optional transform pipelines.

use serde_json::Value;

use super::{AssetRule, BuildState, RuleName, SassPipeline, VuePipeline};
use crate::callback::OptionsCallback;
use crate::error::{ConfigError, Result};
use crate::options::{
    AssetRuleOptions, BabelOptions, PreactOptions, REACT_PRESET_KEYS, SassOptions,
    TYPESCRIPT_PRESET_KEYS, VueOptions, parse_options, preset_options, validate_keys,
};

fn parse_asset_rule(method: &'static str, options: Value) -> Result<AssetRuleOptions> {
    let options: AssetRuleOptions = parse_options(method, options, AssetRuleOptions::KEYS)?;
    if options.max_size.is_some() && !options.kind.supports_size_threshold() {
        return Err(ConfigError::invalid_argument(
            method,
            format!(
                "\"maxSize\" is only supported when \"type\" is \"asset\", got \"{}\"",
                options.kind.as_str()
            ),
        ));
    }
    Ok(options)
}

impl BuildState {
    pub fn configure_image_rule(
        &mut self,
        options: Value,
        callback: impl Fn(Value) -> Value + Send + Sync + 'static,
    ) -> Result<&mut Self> {
        let options = parse_asset_rule("configure_image_rule", options)?;
        self.image_rule = AssetRule {
            options,
            callback: OptionsCallback::new(callback),
        };
        Ok(self)
    }

    pub fn configure_font_rule(
        &mut self,
        options: Value,
        callback: impl Fn(Value) -> Value + Send + Sync + 'static,
    ) -> Result<&mut Self> {
        let options = parse_asset_rule("configure_font_rule", options)?;
        self.font_rule = AssetRule {
            options,
            callback: OptionsCallback::new(callback),
        };
        Ok(self)
    }

    /// Callback applied to one built-in rule after it has been generated.
    pub fn configure_loader_rule(
        &mut self,
        name: &str,
        callback: impl Fn(Value) -> Value + Send + Sync + 'static,
    ) -> Result<&mut Self> {
        let rule: RuleName = name.parse()?;
        self.rule_callbacks
            .insert(rule, OptionsCallback::new(callback));
        Ok(self)
    }

    /// Raw module rule appended after every built-in rule, unchanged.
    pub fn add_loader(&mut self, rule: Value) -> &mut Self {
        self.loaders.push(rule);
        self
    }

    pub fn add_rule(&mut self, rule: Value) -> &mut Self {
        self.add_loader(rule)
    }

    /// Configures the script transpiler.
    ///
    /// When an external babel configuration file exists the callback and the
    /// preset options (`useBuiltIns`, `corejs`) are ignored with a warning;
    /// `exclude` and `includeNodeModules` still apply because they shape the
    /// rule rather than the transpiler.
    pub fn configure_babel(
        &mut self,
        callback: impl Fn(Value) -> Value + Send + Sync + 'static,
        options: Value,
    ) -> Result<&mut Self> {
        const METHOD: &str = "configure_babel";

        validate_keys(METHOD, &options, BabelOptions::KEYS)?;
        if options.get("exclude").is_some() && options.get("includeNodeModules").is_some() {
            return Err(ConfigError::invalid_argument(
                METHOD,
                "\"includeNodeModules\" and \"exclude\" cannot be used together",
            ));
        }

        let mut parsed: BabelOptions = parse_options(METHOD, options.clone(), BabelOptions::KEYS)?;
        if let Some(pattern) = &parsed.exclude {
            if let Err(err) = regex::Regex::new(pattern) {
                return Err(ConfigError::invalid_argument(
                    METHOD,
                    format!("invalid \"exclude\" pattern: {err}"),
                ));
            }
        }

        if self.runtime.babel_config_file_exists {
            tracing::warn!(
                "configure_babel: the callback will not be used because an external babel \
                 configuration file already exists"
            );
            for key in ["useBuiltIns", "corejs"] {
                if options.get(key).is_some() {
                    tracing::warn!(
                        option = key,
                        "configure_babel: option ignored because an external babel \
                         configuration file already exists"
                    );
                }
            }
            parsed.use_built_ins = self.babel.options.use_built_ins;
            parsed.corejs = self.babel.options.corejs.take();
        }

        self.babel.options = parsed;
        self.babel.callback = OptionsCallback::new(callback);
        Ok(self)
    }

    pub fn configure_babel_preset_env(
        &mut self,
        callback: impl Fn(Value) -> Value + Send + Sync + 'static,
    ) -> &mut Self {
        if self.runtime.babel_config_file_exists {
            tracing::warn!(
                "configure_babel_preset_env: the callback will not be used because an external \
                 babel configuration file already exists"
            );
        }
        self.babel.preset_env_callback = OptionsCallback::new(callback);
        self
    }

    pub fn configure_css_loader(
        &mut self,
        callback: impl Fn(Value) -> Value + Send + Sync + 'static,
    ) -> &mut Self {
        self.callbacks.css_loader = OptionsCallback::new(callback);
        self
    }

    /// Options of the style-injecting loader used when CSS extraction is disabled.
    pub fn configure_style_loader(
        &mut self,
        callback: impl Fn(Value) -> Value + Send + Sync + 'static,
    ) -> &mut Self {
        self.callbacks.style_loader = OptionsCallback::new(callback);
        self
    }

    pub fn configure_mini_css_extract_plugin(
        &mut self,
        loader_callback: impl Fn(Value) -> Value + Send + Sync + 'static,
        plugin_callback: impl Fn(Value) -> Value + Send + Sync + 'static,
    ) -> &mut Self {
        self.callbacks.mini_css_extract_loader = OptionsCallback::new(loader_callback);
        self.callbacks.mini_css_extract_plugin = OptionsCallback::new(plugin_callback);
        self
    }

    /// Injects styles at runtime instead of extracting `.css` files.
    pub fn disable_css_extraction(&mut self, disabled: bool) -> &mut Self {
        self.css_extraction = !disabled;
        self
    }

    pub fn enable_sass_loader(
        &mut self,
        callback: impl Fn(Value) -> Value + Send + Sync + 'static,
        options: Value,
    ) -> Result<&mut Self> {
        let options: SassOptions = parse_options("enable_sass_loader", options, SassOptions::KEYS)?;
        self.pipelines.sass = Some(SassPipeline {
            options,
            callback: OptionsCallback::new(callback),
        });
        Ok(self)
    }

    pub fn enable_less_loader(
        &mut self,
        callback: impl Fn(Value) -> Value + Send + Sync + 'static,
    ) -> &mut Self {
        self.pipelines.less = Some(OptionsCallback::new(callback));
        self
    }

    pub fn enable_stylus_loader(
        &mut self,
        callback: impl Fn(Value) -> Value + Send + Sync + 'static,
    ) -> &mut Self {
        self.pipelines.stylus = Some(OptionsCallback::new(callback));
        self
    }

    pub fn enable_postcss_loader(
        &mut self,
        callback: impl Fn(Value) -> Value + Send + Sync + 'static,
    ) -> &mut Self {
        self.pipelines.postcss = Some(OptionsCallback::new(callback));
        self
    }

    pub fn enable_svelte(&mut self) -> &mut Self {
        self.pipelines.svelte = true;
        self
    }

    pub fn enable_vue_loader(
        &mut self,
        callback: impl Fn(Value) -> Value + Send + Sync + 'static,
        options: Value,
    ) -> Result<&mut Self> {
        const METHOD: &str = "enable_vue_loader";

        let options: VueOptions = parse_options(METHOD, options, VueOptions::KEYS)?;
        if let Some(version) = options.version {
            if version != 2 && version != 3 {
                return Err(ConfigError::invalid_argument(
                    METHOD,
                    format!("\"version\" must be 2 or 3, got {version}"),
                ));
            }
        }
        self.pipelines.vue = Some(VuePipeline {
            options,
            callback: OptionsCallback::new(callback),
        });
        Ok(self)
    }

    pub fn enable_handlebars_loader(
        &mut self,
        callback: impl Fn(Value) -> Value + Send + Sync + 'static,
    ) -> &mut Self {
        self.pipelines.handlebars = Some(OptionsCallback::new(callback));
        self
    }

    /// Full type-checking TypeScript loader.
    pub fn enable_typescript_loader(
        &mut self,
        callback: impl Fn(Value) -> Value + Send + Sync + 'static,
    ) -> Result<&mut Self> {
        if self.pipelines.babel_typescript.is_some() {
            return Err(ConfigError::ConflictingFeatures {
                method: "enable_typescript_loader",
                conflicting: "enable_babel_typescript_preset()",
            });
        }
        self.pipelines.typescript = Some(OptionsCallback::new(callback));
        Ok(self)
    }

    /// Moves type checking to a separate process; the TypeScript loader
    /// becomes transpile-only. Enables the loader when it is not enabled yet.
    pub fn enable_forked_type_script_types_checking(
        &mut self,
        callback: impl Fn(Value) -> Value + Send + Sync + 'static,
    ) -> Result<&mut Self> {
        if self.pipelines.babel_typescript.is_some() {
            return Err(ConfigError::ConflictingFeatures {
                method: "enable_forked_type_script_types_checking",
                conflicting: "enable_babel_typescript_preset()",
            });
        }
        if self.pipelines.typescript.is_none() {
            self.pipelines.typescript = Some(OptionsCallback::identity());
        }
        self.pipelines.forked_type_check = Some(OptionsCallback::new(callback));
        Ok(self)
    }

    /// Type-stripping TypeScript support through the script transpiler.
    /// Keys are checked against the preset's option names, then passed through.
    pub fn enable_babel_typescript_preset(&mut self, options: Value) -> Result<&mut Self> {
        const METHOD: &str = "enable_babel_typescript_preset";

        if self.pipelines.typescript.is_some() {
            return Err(ConfigError::ConflictingFeatures {
                method: METHOD,
                conflicting: "enable_typescript_loader()",
            });
        }
        let options = preset_options(METHOD, options, TYPESCRIPT_PRESET_KEYS)?;
        self.pipelines.babel_typescript = Some(options);
        Ok(self)
    }

    /// JSX support. Keys are checked against the preset's option names, then passed through.
    pub fn enable_react_preset(&mut self, options: Value) -> Result<&mut Self> {
        let options = preset_options("enable_react_preset", options, REACT_PRESET_KEYS)?;
        self.pipelines.react = Some(options);
        Ok(self)
    }

    pub fn enable_preact_preset(&mut self, options: Value) -> Result<&mut Self> {
        let options: PreactOptions =
            parse_options("enable_preact_preset", options, PreactOptions::KEYS)?;
        self.pipelines.preact = Some(options);
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callback::keep;
    use crate::options::{AssetType, UseBuiltIns};
    use crate::runtime::RuntimeContext;
    use serde_json::json;

    fn state() -> BuildState {
        BuildState::new(RuntimeContext::default())
    }

    #[test]
    fn max_size_requires_auto_asset_type() {
        let mut state = state();
        let err = state
            .configure_image_rule(json!({ "type": "asset/resource", "maxSize": 1024 }), keep)
            .unwrap_err();
        assert!(err.to_string().contains("maxSize"));

        state
            .configure_font_rule(json!({ "type": "asset", "maxSize": 1024 }), keep)
            .unwrap();
        assert_eq!(state.font_rule().options.kind, AssetType::Auto);
        assert_eq!(state.font_rule().options.max_size, Some(1024));
    }

    #[test]
    fn unknown_rule_name_lists_valid_rules() {
        let mut state = state();
        let err = state.configure_loader_rule("eslint", keep).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownRule { .. }));
        state.configure_loader_rule("images", keep).unwrap();
        assert!(state.rule_callback(RuleName::Images).is_some());
        assert!(state.rule_callback(RuleName::Fonts).is_none());
    }

    #[test]
    fn typescript_pipelines_conflict_in_either_order() {
        let mut state = state();
        state.enable_typescript_loader(keep).unwrap();
        assert!(matches!(
            state.enable_babel_typescript_preset(Value::Null),
            Err(ConfigError::ConflictingFeatures { .. })
        ));

        let mut state = self::state();
        state.enable_babel_typescript_preset(json!({})).unwrap();
        assert!(matches!(
            state.enable_typescript_loader(keep),
            Err(ConfigError::ConflictingFeatures { .. })
        ));
        assert!(state.enable_forked_type_script_types_checking(keep).is_err());
    }

    #[test]
    fn forked_checking_enables_the_loader() {
        let mut state = state();
        state.enable_forked_type_script_types_checking(keep).unwrap();
        assert!(state.pipelines().typescript.is_some());
        assert!(state.pipelines().forked_type_check.is_some());
    }

    #[test]
    fn babel_exclude_and_include_node_modules_are_exclusive() {
        let mut state = state();
        let err = state
            .configure_babel(
                keep,
                json!({ "exclude": "node_modules", "includeNodeModules": ["foo"] }),
            )
            .unwrap_err();
        assert!(err.to_string().contains("cannot be used together"));

        state
            .configure_babel(keep, json!({ "useBuiltIns": "usage", "corejs": 3 }))
            .unwrap();
        assert_eq!(state.babel().options.use_built_ins, UseBuiltIns::Usage);
        assert_eq!(state.babel().options.corejs, Some(json!(3)));
    }

    #[test]
    fn external_babel_config_ignores_preset_options() {
        let mut state = BuildState::new(RuntimeContext {
            babel_config_file_exists: true,
            ..RuntimeContext::default()
        });
        state
            .configure_babel(
                keep,
                json!({ "useBuiltIns": "entry", "includeNodeModules": ["foo"] }),
            )
            .unwrap();
        assert_eq!(state.babel().options.use_built_ins, UseBuiltIns::Disabled);
        assert_eq!(state.babel().options.include_node_modules, ["foo"]);
    }

    #[test]
    fn vue_version_is_checked() {
        let mut state = state();
        assert!(state.enable_vue_loader(keep, json!({ "version": 4 })).is_err());
        state
            .enable_vue_loader(keep, json!({ "version": 3, "useJsx": true }))
            .unwrap();
        assert!(state.pipelines().vue.as_ref().unwrap().options.use_jsx);
    }

    #[test]
    fn option_whitelists_apply_to_pipelines() {
        let mut state = state();
        assert!(matches!(
            state.enable_sass_loader(keep, json!({ "implementation": "dart" })),
            Err(ConfigError::UnknownOption { .. })
        ));
        assert!(matches!(
            state.enable_preact_preset(json!({ "compat": true })),
            Err(ConfigError::UnknownOption { .. })
        ));
        assert!(state.pipelines().sass.is_none());

        assert!(matches!(
            state.enable_react_preset(json!({ "runtim": "automatic" })),
            Err(ConfigError::UnknownOption { method: "enable_react_preset", .. })
        ));
        assert!(matches!(
            state.enable_babel_typescript_preset(json!({ "isTsx": true })),
            Err(ConfigError::UnknownOption { method: "enable_babel_typescript_preset", .. })
        ));
        assert!(state.pipelines().react.is_none());
        assert!(state.pipelines().babel_typescript.is_none());

        state
            .enable_react_preset(json!({ "runtime": "automatic" }))
            .unwrap()
            .enable_babel_typescript_preset(json!({ "isTSX": true, "allExtensions": true }))
            .unwrap();
        assert_eq!(
            state.pipelines().react.as_ref().and_then(|options| options.get("runtime")),
            Some(&json!("automatic"))
        );
    }
}
