//! Anything App - command orchestration for a self-extending document workspace
//!
//! This library provides the core of the Anything App:
//! - A gateway to the remote generation backend
//! - A session-scoped registry of generated plugins
//! - The orchestrator that turns a command into a reply and, sometimes, a plugin
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                     Caller                          │
//! │        CLI session  │  Session (registry)           │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                  Orchestrator                        │
//! │   validate  │  text prompt  │  classify  │  upsert  │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                    Gateway                           │
//! │   /api/prompt/text  │  /api/plugin/{generate,list}  │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod gateway;
pub mod orchestrator;
pub mod plugins;
pub mod shell;

pub use config::Config;
pub use error::{Error, ErrorKind, Result};
pub use gateway::{Gateway, HttpGateway};
pub use orchestrator::{
    Classifier, CommandOutcome, KeywordClassifier, Orchestrator, Phase, Session,
};
pub use plugins::{GeneratedPlugin, Plugin, PluginMetadata, PluginPatch, PluginRegistry, PluginType};
