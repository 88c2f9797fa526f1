use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A bundler plugin instance described as data: the plugin's name and the
/// options object it is constructed with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginDescriptor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub options: Value,
}

impl PluginDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: Value::Null,
        }
    }

    pub fn with_options(name: impl Into<String>, options: Value) -> Self {
        Self {
            name: name.into(),
            options,
        }
    }
}

/// A caller plugin together with its ordering keys.
///
/// Plugins are ordered by `priority` (higher first), ties broken by
/// `insertion_order` (earlier first).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisteredPlugin {
    pub plugin: PluginDescriptor,
    pub priority: i32,
    pub insertion_order: usize,
}
