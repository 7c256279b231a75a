//! Boundary to the remote generation service
//!
//! Each operation is a single remote attempt. Responses are unwrapped from the
//! backend envelope into a value or a classified [`Error`](crate::Error):
//! `TransportUnavailable`, `RemoteApplication` or `MalformedResponse`.

pub mod client;
pub mod envelope;

use async_trait::async_trait;

use crate::Result;
use crate::plugins::GeneratedPlugin;

pub use client::HttpGateway;
pub use envelope::{Envelope, Reply};

/// Text prompt endpoint
pub const TEXT_PROMPT_PATH: &str = "/api/prompt/text";
/// Plugin generation endpoint
pub const PLUGIN_GENERATE_PATH: &str = "/api/plugin/generate";
/// Plugin listing endpoint
pub const PLUGIN_LIST_PATH: &str = "/api/plugin/list";
/// Plugin source endpoint, followed by the plugin id
pub const PLUGIN_SERVE_PATH: &str = "/api/plugin/serve";
/// Health endpoint
pub const HEALTH_PATH: &str = "/health";

/// Remote operations the orchestrator depends on
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Send a free-text prompt and return the generated reply
    async fn send_text_prompt(&self, prompt: &str, user_id: Option<&str>) -> Result<String>;

    /// Ask the backend to generate a plugin from a description
    async fn generate_plugin(
        &self,
        description: &str,
        user_id: Option<&str>,
    ) -> Result<GeneratedPlugin>;

    /// List every plugin the backend knows about
    async fn list_plugins(&self) -> Result<Vec<GeneratedPlugin>>;
}
