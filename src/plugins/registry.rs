//! Session-scoped plugin registry
//!
//! The registry is a plain value. Every mutator consumes the current state and
//! returns the next one, so callers own the state outright and nothing else can
//! write to it. Insertion order is preserved for every entry a mutator does not
//! touch, and no operation fails: an absent id is a no-op.

use super::types::{Plugin, PluginPatch};

/// Ordered collection of plugins keyed by id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginRegistry {
    plugins: Vec<Plugin>,
}

impl PluginRegistry {
    /// Create a new empty registry
    #[must_use]
    pub const fn new() -> Self {
        Self {
            plugins: Vec::new(),
        }
    }

    /// Replace the entry sharing `plugin.id` in place, or append it
    ///
    /// Replacement is total: nothing from the previous entry carries over.
    #[must_use]
    pub fn upsert(mut self, plugin: Plugin) -> Self {
        if let Some(existing) = self.plugins.iter_mut().find(|p| p.id == plugin.id) {
            tracing::debug!(plugin_id = %plugin.id, "replacing plugin");
            *existing = plugin;
        } else {
            tracing::debug!(plugin_id = %plugin.id, "adding plugin");
            self.plugins.push(plugin);
        }
        self
    }

    /// Drop the entry with the given id
    #[must_use]
    pub fn remove(mut self, id: &str) -> Self {
        self.plugins.retain(|p| p.id != id);
        self
    }

    /// Flip the activation flag of the entry with the given id
    #[must_use]
    pub fn toggle_active(mut self, id: &str) -> Self {
        if let Some(plugin) = self.get_mut(id) {
            plugin.is_active = !plugin.is_active;
            tracing::debug!(plugin_id = %id, active = plugin.is_active, "toggled plugin");
        }
        self
    }

    /// Shallow-merge `patch` into the entry with the given id
    #[must_use]
    pub fn partial_update(mut self, id: &str, patch: PluginPatch) -> Self {
        if let Some(plugin) = self.get_mut(id) {
            patch.apply(plugin);
        }
        self
    }

    /// Entries with `is_active` set, in registry order
    pub fn active_plugins(&self) -> impl Iterator<Item = &Plugin> {
        self.plugins.iter().filter(|p| p.is_active)
    }

    /// All entries in registry order
    #[must_use]
    pub fn plugins(&self) -> &[Plugin] {
        &self.plugins
    }

    /// Get a plugin by id
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Plugin> {
        self.plugins.iter().find(|p| p.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Plugin> {
        self.plugins.iter_mut().find(|p| p.id == id)
    }

    /// Number of plugins
    #[must_use]
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Whether the registry is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}
