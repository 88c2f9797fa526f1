//! The mutable build description.
//!
//! [`BuildState`] is created once per build from a [`RuntimeContext`], mutated
//! through its fluent methods, then read (never written) by the assembler.
//! Mutators that can reject their input return `Result<&mut Self>` so chains
//! read as `state.add_entry(..)?.add_style_entry(..)?`.

mod entries;
mod loaders;
mod output;
mod plugins;

use std::path::{Path, PathBuf};
use std::str::FromStr;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::cache_group::CacheGroup;
use crate::callback::OptionsCallback;
use crate::copy::CopyFilesConfig;
use crate::entry::EntrySource;
use crate::error::ConfigError;
use crate::integrity::HashAlgorithm;
use crate::options::{
    AssetRuleOptions, BabelOptions, FilenameOptions, PreactOptions, SassOptions, VueOptions,
};
use crate::plugin::RegisteredPlugin;
use crate::runtime::RuntimeContext;

/// Built-in rules that `configure_loader_rule()` can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleName {
    Javascript,
    Css,
    Images,
    Fonts,
    Sass,
    Less,
    Stylus,
    Svelte,
    Vue,
    Handlebars,
    Typescript,
}

impl RuleName {
    pub const NAMES: &'static [&'static str] = &[
        "javascript",
        "css",
        "images",
        "fonts",
        "sass",
        "less",
        "stylus",
        "svelte",
        "vue",
        "handlebars",
        "typescript",
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleName::Javascript => "javascript",
            RuleName::Css => "css",
            RuleName::Images => "images",
            RuleName::Fonts => "fonts",
            RuleName::Sass => "sass",
            RuleName::Less => "less",
            RuleName::Stylus => "stylus",
            RuleName::Svelte => "svelte",
            RuleName::Vue => "vue",
            RuleName::Handlebars => "handlebars",
            RuleName::Typescript => "typescript",
        }
    }
}

impl FromStr for RuleName {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "javascript" | "js" => RuleName::Javascript,
            "css" => RuleName::Css,
            "images" => RuleName::Images,
            "fonts" => RuleName::Fonts,
            "sass" | "scss" => RuleName::Sass,
            "less" => RuleName::Less,
            "stylus" => RuleName::Stylus,
            "svelte" => RuleName::Svelte,
            "vue" => RuleName::Vue,
            "handlebars" => RuleName::Handlebars,
            "typescript" | "ts" => RuleName::Typescript,
            _ => {
                return Err(ConfigError::UnknownRule {
                    name: s.to_string(),
                    valid: Self::NAMES,
                });
            }
        })
    }
}

/// Image or font rule settings.
#[derive(Debug, Default)]
pub struct AssetRule {
    pub options: AssetRuleOptions,
    pub callback: OptionsCallback,
}

#[derive(Debug, Default)]
pub struct BabelConfig {
    pub options: BabelOptions,
    pub callback: OptionsCallback,
    pub preset_env_callback: OptionsCallback,
}

#[derive(Debug, Default)]
pub struct SassPipeline {
    pub options: SassOptions,
    pub callback: OptionsCallback,
}

#[derive(Debug, Default)]
pub struct VuePipeline {
    pub options: VueOptions,
    pub callback: OptionsCallback,
}

/// Optional transform pipelines. `Some`/`true` means enabled.
#[derive(Debug, Default)]
pub struct Pipelines {
    pub sass: Option<SassPipeline>,
    pub less: Option<OptionsCallback>,
    pub stylus: Option<OptionsCallback>,
    pub postcss: Option<OptionsCallback>,
    pub svelte: bool,
    pub vue: Option<VuePipeline>,
    pub handlebars: Option<OptionsCallback>,
    /// Full type-checking TypeScript loader.
    pub typescript: Option<OptionsCallback>,
    pub forked_type_check: Option<OptionsCallback>,
    /// Type-stripping preset options.
    pub babel_typescript: Option<Map<String, Value>>,
    /// JSX preset options.
    pub react: Option<Map<String, Value>>,
    pub preact: Option<PreactOptions>,
}

/// Option callbacks for built-in pieces that are always present.
#[derive(Debug, Default)]
pub struct Callbacks {
    pub split_chunks: OptionsCallback,
    pub css_loader: OptionsCallback,
    pub style_loader: OptionsCallback,
    pub mini_css_extract_loader: OptionsCallback,
    pub mini_css_extract_plugin: OptionsCallback,
    pub define_plugin: OptionsCallback,
    pub manifest_plugin: OptionsCallback,
    pub terser_plugin: OptionsCallback,
    pub css_minimizer_plugin: OptionsCallback,
    pub friendly_errors_plugin: OptionsCallback,
    pub dev_server: OptionsCallback,
    pub watch: OptionsCallback,
}

#[derive(Debug)]
pub struct BuildCache {
    pub build_dependencies: IndexMap<String, Vec<String>>,
    pub callback: OptionsCallback,
}

#[derive(Debug)]
pub struct BuildState {
    runtime: RuntimeContext,

    entries: IndexMap<String, EntrySource>,
    style_entries: IndexMap<String, EntrySource>,
    output_path: Option<PathBuf>,
    public_path: Option<String>,
    manifest_key_prefix: Option<String>,
    copy_configs: Vec<CopyFilesConfig>,

    plugins: Vec<RegisteredPlugin>,
    loaders: Vec<Value>,
    cache_groups: IndexMap<String, CacheGroup>,
    aliases: IndexMap<String, String>,
    externals: Vec<Value>,
    provided_variables: IndexMap<String, String>,
    integrity_algorithms: Vec<HashAlgorithm>,

    use_versioning: bool,
    use_source_maps: bool,
    single_runtime_chunk: Option<bool>,
    split_entry_chunks: bool,
    css_extraction: bool,
    cleanup_output: Option<OptionsCallback>,
    build_notifications: Option<OptionsCallback>,
    build_cache: Option<BuildCache>,
    filenames: FilenameOptions,

    image_rule: AssetRule,
    font_rule: AssetRule,
    babel: BabelConfig,
    pipelines: Pipelines,
    callbacks: Callbacks,
    rule_callbacks: IndexMap<RuleName, OptionsCallback>,
}

impl BuildState {
    pub fn new(runtime: RuntimeContext) -> Self {
        Self {
            runtime,
            entries: IndexMap::new(),
            style_entries: IndexMap::new(),
            output_path: None,
            public_path: None,
            manifest_key_prefix: None,
            copy_configs: Vec::new(),
            plugins: Vec::new(),
            loaders: Vec::new(),
            cache_groups: IndexMap::new(),
            aliases: IndexMap::new(),
            externals: Vec::new(),
            provided_variables: IndexMap::new(),
            integrity_algorithms: Vec::new(),
            use_versioning: false,
            use_source_maps: false,
            single_runtime_chunk: None,
            split_entry_chunks: false,
            css_extraction: true,
            cleanup_output: None,
            build_notifications: None,
            build_cache: None,
            filenames: FilenameOptions::default(),
            image_rule: AssetRule::default(),
            font_rule: AssetRule::default(),
            babel: BabelConfig::default(),
            pipelines: Pipelines::default(),
            callbacks: Callbacks::default(),
            rule_callbacks: IndexMap::new(),
        }
    }

    /// Discard everything configured so far, keeping the runtime context.
    pub fn reset(&mut self) -> &mut Self {
        *self = Self::new(self.runtime.clone());
        self
    }

    pub fn runtime(&self) -> &RuntimeContext {
        &self.runtime
    }

    pub fn is_production(&self) -> bool {
        self.runtime.is_production()
    }

    pub fn is_dev(&self) -> bool {
        self.runtime.is_dev()
    }

    pub fn is_dev_server(&self) -> bool {
        self.runtime.is_dev_server()
    }

    pub fn entries(&self) -> &IndexMap<String, EntrySource> {
        &self.entries
    }

    pub fn style_entries(&self) -> &IndexMap<String, EntrySource> {
        &self.style_entries
    }

    pub fn output_path(&self) -> Option<&Path> {
        self.output_path.as_deref()
    }

    pub fn public_path(&self) -> Option<&str> {
        self.public_path.as_deref()
    }

    /// Explicit manifest key prefix; `None` means "derive from the public path".
    pub fn manifest_key_prefix(&self) -> Option<&str> {
        self.manifest_key_prefix.as_deref()
    }

    pub fn copy_configs(&self) -> &[CopyFilesConfig] {
        &self.copy_configs
    }

    pub fn plugins(&self) -> &[RegisteredPlugin] {
        &self.plugins
    }

    pub fn loaders(&self) -> &[Value] {
        &self.loaders
    }

    pub fn cache_groups(&self) -> &IndexMap<String, CacheGroup> {
        &self.cache_groups
    }

    pub fn aliases(&self) -> &IndexMap<String, String> {
        &self.aliases
    }

    pub fn externals(&self) -> &[Value] {
        &self.externals
    }

    pub fn provided_variables(&self) -> &IndexMap<String, String> {
        &self.provided_variables
    }

    pub fn integrity_algorithms(&self) -> &[HashAlgorithm] {
        &self.integrity_algorithms
    }

    pub fn use_versioning(&self) -> bool {
        self.use_versioning
    }

    pub fn use_source_maps(&self) -> bool {
        self.use_source_maps
    }

    /// `None` until one of the runtime-chunk methods has been called.
    pub fn single_runtime_chunk(&self) -> Option<bool> {
        self.single_runtime_chunk
    }

    pub fn splits_entry_chunks(&self) -> bool {
        self.split_entry_chunks
    }

    pub fn css_extraction_enabled(&self) -> bool {
        self.css_extraction
    }

    pub fn cleanup_output(&self) -> Option<&OptionsCallback> {
        self.cleanup_output.as_ref()
    }

    pub fn build_notifications(&self) -> Option<&OptionsCallback> {
        self.build_notifications.as_ref()
    }

    pub fn build_cache(&self) -> Option<&BuildCache> {
        self.build_cache.as_ref()
    }

    pub fn filenames(&self) -> &FilenameOptions {
        &self.filenames
    }

    pub fn image_rule(&self) -> &AssetRule {
        &self.image_rule
    }

    pub fn font_rule(&self) -> &AssetRule {
        &self.font_rule
    }

    pub fn babel(&self) -> &BabelConfig {
        &self.babel
    }

    pub fn pipelines(&self) -> &Pipelines {
        &self.pipelines
    }

    pub fn callbacks(&self) -> &Callbacks {
        &self.callbacks
    }

    pub fn rule_callback(&self, rule: RuleName) -> Option<&OptionsCallback> {
        self.rule_callbacks.get(&rule)
    }

    /// True when there is anything at all to build.
    pub fn has_build_input(&self) -> bool {
        !self.entries.is_empty()
            || !self.style_entries.is_empty()
            || !self.copy_configs.is_empty()
            || !self.plugins.is_empty()
    }
}
