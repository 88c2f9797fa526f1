//! Plugin assembly.
//!
//! Built-in plugins contribute descriptors in a fixed order, caller plugins
//! are appended after them, and [`PluginRegistry`] produces the final order.

mod builtins;
pub mod registry;

pub use builtins::{build_plugins, names};
pub use registry::{DEFAULT_PRIORITY, PluginRegistry};
