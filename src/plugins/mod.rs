//! Plugins generated by the backend and the session registry that tracks them
//!
//! A plugin is a small UI fragment: metadata plus source text. The registry
//! never executes plugin code; it only records which plugins exist in the
//! session and which of them are active.

pub mod registry;
pub mod types;

pub use registry::PluginRegistry;
pub use types::{GeneratedPlugin, Plugin, PluginMetadata, PluginPatch, PluginType};
