//! Per-session state owned by the caller

use crate::plugins::{GeneratedPlugin, Plugin, PluginPatch, PluginRegistry};

/// State a caller holds for the lifetime of a session
///
/// Nothing is persisted; dropping the session drops its plugins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    registry: PluginRegistry,
    last_reply: Option<String>,
}

impl Session {
    /// Create an empty session
    #[must_use]
    pub const fn new() -> Self {
        Self {
            registry: PluginRegistry::new(),
            last_reply: None,
        }
    }

    /// Plugins known to this session
    #[must_use]
    pub const fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    /// Most recent text reply, if any command has succeeded
    #[must_use]
    pub fn last_reply(&self) -> Option<&str> {
        self.last_reply.as_deref()
    }

    pub(crate) fn set_last_reply(&mut self, reply: String) {
        self.last_reply = Some(reply);
    }

    fn apply(&mut self, f: impl FnOnce(PluginRegistry) -> PluginRegistry) {
        self.registry = f(std::mem::take(&mut self.registry));
    }

    /// Insert or fully replace a plugin
    pub fn upsert(&mut self, plugin: Plugin) {
        self.apply(|r| r.upsert(plugin));
    }

    /// Remove a plugin; unknown ids are ignored
    pub fn remove(&mut self, id: &str) {
        self.apply(|r| r.remove(id));
    }

    /// Flip a plugin's activation; unknown ids are ignored
    pub fn toggle_active(&mut self, id: &str) {
        self.apply(|r| r.toggle_active(id));
    }

    /// Shallow-merge a patch into a plugin; unknown ids are ignored
    pub fn partial_update(&mut self, id: &str, patch: PluginPatch) {
        self.apply(|r| r.partial_update(id, patch));
    }

    /// Active plugins in registry order
    pub fn active_plugins(&self) -> impl Iterator<Item = &Plugin> {
        self.registry.active_plugins()
    }

    /// Upsert a batch of backend plugins with the given activation
    ///
    /// Returns the number of plugins imported.
    pub fn import(
        &mut self,
        generated: impl IntoIterator<Item = GeneratedPlugin>,
        active: bool,
    ) -> usize {
        let mut count = 0;
        self.apply(|mut registry| {
            for plugin in generated {
                registry = registry.upsert(plugin.into_plugin(active));
                count += 1;
            }
            registry
        });
        count
    }
}
