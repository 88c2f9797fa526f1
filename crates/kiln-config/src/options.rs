//! Plain options objects accepted by the fluent API.
//!
//! Methods that take an options object receive a `serde_json::Value`, check every
//! key against the method's whitelist and only then deserialize it into one of the
//! typed structs below. `null` means "all defaults".

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::{ConfigError, Result};

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Checks that `options` is an object whose keys all appear in `valid`.
pub(crate) fn validate_keys(
    method: &'static str,
    options: &Value,
    valid: &'static [&'static str],
) -> Result<()> {
    let map = match options {
        Value::Null => return Ok(()),
        Value::Object(map) => map,
        other => {
            return Err(ConfigError::NotAnObject {
                method,
                found: json_kind(other),
            });
        }
    };

    if let Some(key) = map.keys().find(|key| !valid.contains(&key.as_str())) {
        return Err(ConfigError::UnknownOption {
            method,
            key: key.clone(),
            valid,
        });
    }

    Ok(())
}

/// Validates keys, then deserializes into `T`.
pub(crate) fn parse_options<T>(
    method: &'static str,
    options: Value,
    valid: &'static [&'static str],
) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    validate_keys(method, &options, valid)?;
    if options.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(options).map_err(|err| ConfigError::InvalidOptions {
        method,
        message: err.to_string(),
    })
}

/// Options of the transpiler's TypeScript preset, forwarded as given.
pub(crate) const TYPESCRIPT_PRESET_KEYS: &[&str] = &[
    "allExtensions",
    "allowDeclareFields",
    "allowNamespaces",
    "disallowAmbiguousJSXLike",
    "ignoreExtensions",
    "isTSX",
    "jsxPragma",
    "jsxPragmaFrag",
    "onlyRemoveTypeImports",
    "optimizeConstEnums",
    "rewriteImportExtensions",
];

/// Options of the transpiler's JSX preset, forwarded as given.
pub(crate) const REACT_PRESET_KEYS: &[&str] = &[
    "development",
    "importSource",
    "pragma",
    "pragmaFrag",
    "pure",
    "runtime",
    "throwIfNamespace",
    "useBuiltIns",
    "useSpread",
];

/// Validates keys, then keeps the object untyped for a preset that takes it verbatim.
pub(crate) fn preset_options(
    method: &'static str,
    options: Value,
    valid: &'static [&'static str],
) -> Result<Map<String, Value>> {
    validate_keys(method, &options, valid)?;
    match options {
        Value::Null => Ok(Map::new()),
        Value::Object(map) => Ok(map),
        other => Err(ConfigError::NotAnObject {
            method,
            found: json_kind(&other),
        }),
    }
}

/// How an image or font asset ends up in the build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AssetType {
    /// Always emitted as a separate file.
    #[default]
    #[serde(rename = "asset/resource")]
    Resource,
    /// Always embedded as a data URL.
    #[serde(rename = "asset/inline")]
    Inline,
    /// Embedded below a size threshold, emitted otherwise.
    #[serde(rename = "asset")]
    Auto,
}

impl AssetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetType::Resource => "asset/resource",
            AssetType::Inline => "asset/inline",
            AssetType::Auto => "asset",
        }
    }

    pub fn supports_size_threshold(&self) -> bool {
        matches!(self, AssetType::Auto)
    }

    pub fn emits_file(&self) -> bool {
        !matches!(self, AssetType::Inline)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssetRuleOptions {
    pub enabled: bool,
    pub filename: Option<String>,
    pub max_size: Option<u64>,
    #[serde(rename = "type")]
    pub kind: AssetType,
}

impl AssetRuleOptions {
    pub(crate) const KEYS: &'static [&'static str] = &["enabled", "filename", "maxSize", "type"];
}

impl Default for AssetRuleOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            filename: None,
            max_size: None,
            kind: AssetType::Resource,
        }
    }
}

/// Output filename overrides; each one wins over the versioning default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilenameOptions {
    pub js: Option<String>,
    pub css: Option<String>,
    pub assets: Option<String>,
}

impl FilenameOptions {
    pub(crate) const KEYS: &'static [&'static str] = &["js", "css", "assets"];
}

/// Polyfill injection mode for the env preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UseBuiltIns {
    #[default]
    Disabled,
    Usage,
    Entry,
}

impl UseBuiltIns {
    pub fn to_value(self) -> Value {
        match self {
            UseBuiltIns::Disabled => Value::Bool(false),
            UseBuiltIns::Usage => Value::String("usage".to_string()),
            UseBuiltIns::Entry => Value::String("entry".to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for UseBuiltIns {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Flag(bool),
            Mode(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Flag(false) => Ok(UseBuiltIns::Disabled),
            Raw::Mode(mode) if mode == "usage" => Ok(UseBuiltIns::Usage),
            Raw::Mode(mode) if mode == "entry" => Ok(UseBuiltIns::Entry),
            _ => Err(serde::de::Error::custom(
                "useBuiltIns must be false, \"usage\" or \"entry\"",
            )),
        }
    }
}

impl Serialize for UseBuiltIns {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.to_value().serialize(serializer)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BabelOptions {
    /// Regex source for files the script rule skips.
    pub exclude: Option<String>,
    /// Packages under `node_modules` that are still transpiled.
    pub include_node_modules: Vec<String>,
    pub use_built_ins: UseBuiltIns,
    pub corejs: Option<Value>,
}

impl BabelOptions {
    pub(crate) const KEYS: &'static [&'static str] =
        &["exclude", "includeNodeModules", "useBuiltIns", "corejs"];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SassOptions {
    pub resolve_url_loader: bool,
    pub resolve_url_loader_options: Map<String, Value>,
}

impl SassOptions {
    pub(crate) const KEYS: &'static [&'static str] =
        &["resolveUrlLoader", "resolveUrlLoaderOptions"];
}

impl Default for SassOptions {
    fn default() -> Self {
        Self {
            resolve_url_loader: true,
            resolve_url_loader_options: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VueOptions {
    pub use_jsx: bool,
    pub version: Option<u8>,
    pub runtime_compiler_build: Option<bool>,
}

impl VueOptions {
    pub(crate) const KEYS: &'static [&'static str] = &["useJsx", "version", "runtimeCompilerBuild"];
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreactOptions {
    pub preact_compat: bool,
}

impl PreactOptions {
    pub(crate) const KEYS: &'static [&'static str] = &["preactCompat"];
}
