//! Plugin registry with priorities.
//!
//! Built-in plugins are registered first, in a fixed order, then caller
//! plugins in the order they were added. The final list is ordered by
//! priority (higher first); plugins of equal priority keep their
//! registration order.

use kiln_config::{PluginDescriptor, RegisteredPlugin};

/// Priority of every built-in plugin, and the default for caller plugins.
pub const DEFAULT_PRIORITY: i32 = 0;

/// Plugin registry that keeps plugins in a stable priority order.
#[derive(Debug, Default)]
pub struct PluginRegistry {
    plugins: Vec<RegisteredPlugin>,
}

impl PluginRegistry {
    /// Create a new empty plugin registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a plugin; its insertion order is the number of plugins added before it.
    pub fn add(&mut self, plugin: PluginDescriptor, priority: i32) {
        let insertion_order = self.plugins.len();
        self.plugins.push(RegisteredPlugin {
            plugin,
            priority,
            insertion_order,
        });
    }

    /// Add caller plugins after everything registered so far, keeping their
    /// relative registration order.
    pub fn extend_registered<'a, I>(&mut self, registered: I)
    where
        I: IntoIterator<Item = &'a RegisteredPlugin>,
    {
        let mut caller: Vec<&RegisteredPlugin> = registered.into_iter().collect();
        caller.sort_by_key(|plugin| plugin.insertion_order);
        for plugin in caller {
            self.add(plugin.plugin.clone(), plugin.priority);
        }
    }

    /// Plugins ordered by `(priority desc, insertion order asc)`.
    ///
    /// Sorting happens here (once) rather than on every `add()`.
    pub fn into_ordered(mut self) -> Vec<PluginDescriptor> {
        // sort_by is stable; the tiebreak on insertion order keeps it total anyway.
        self.plugins.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then(a.insertion_order.cmp(&b.insertion_order))
        });
        self.plugins.into_iter().map(|entry| entry.plugin).collect()
    }

    /// Get the number of plugins in the registry
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}
