//! Plugin data model shared by the registry and the backend wire format

use serde::{Deserialize, Serialize};

/// Metadata describing a generated plugin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginMetadata {
    /// Human-readable name
    pub name: String,
    /// Short description
    pub description: String,
    /// Version string (e.g. "1.0.0")
    pub version: String,
    /// What kind of UI fragment this is
    #[serde(rename = "type")]
    pub kind: PluginType,
    /// Packages the plugin source imports
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<Vec<String>>,
}

/// Plugin category
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PluginType {
    Component,
    Utility,
    Widget,
}

impl std::fmt::Display for PluginType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Component => "component",
            Self::Utility => "utility",
            Self::Widget => "widget",
        };
        f.write_str(s)
    }
}

/// A plugin tracked by the session registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plugin {
    /// Unique identifier within the registry
    pub id: String,
    pub metadata: PluginMetadata,
    /// Plugin source text
    pub code: String,
    /// Whether the plugin is shown
    pub is_active: bool,
}

/// Plugin as returned by the generation and listing endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedPlugin {
    pub plugin_id: String,
    pub code: String,
    pub metadata: PluginMetadata,
}

impl GeneratedPlugin {
    /// Turn a generation result into a registry entry
    #[must_use]
    pub fn into_plugin(self, is_active: bool) -> Plugin {
        Plugin {
            id: self.plugin_id,
            metadata: self.metadata,
            code: self.code,
            is_active,
        }
    }
}

/// Shallow patch applied by [`PluginRegistry::partial_update`]
///
/// The id is not patchable; set fields replace the entry's field wholesale.
///
/// [`PluginRegistry::partial_update`]: super::PluginRegistry::partial_update
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginPatch {
    pub metadata: Option<PluginMetadata>,
    pub code: Option<String>,
    pub is_active: Option<bool>,
}

impl PluginPatch {
    /// Patch that replaces the metadata
    #[must_use]
    pub fn metadata(metadata: PluginMetadata) -> Self {
        Self {
            metadata: Some(metadata),
            ..Self::default()
        }
    }

    /// Patch that replaces the source text
    #[must_use]
    pub fn code(code: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            ..Self::default()
        }
    }

    /// Patch that sets the activation flag
    #[must_use]
    pub fn active(is_active: bool) -> Self {
        Self {
            is_active: Some(is_active),
            ..Self::default()
        }
    }

    pub(crate) fn apply(self, plugin: &mut Plugin) {
        if let Some(metadata) = self.metadata {
            plugin.metadata = metadata;
        }
        if let Some(code) = self.code {
            plugin.code = code;
        }
        if let Some(is_active) = self.is_active {
            plugin.is_active = is_active;
        }
    }
}
