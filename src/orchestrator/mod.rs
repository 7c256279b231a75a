//! Command orchestration
//!
//! Turns one free-text command into a text reply and, when the classifier asks
//! for it, a generated plugin registered into the caller's [`Session`]:
//!
//! ```text
//! command ─► trim/validate ─► send_text_prompt ─► classify ─┬─► done
//!                                   │                       │
//!                                   ▼                       ▼
//!                                failed            generate_plugin ─► upsert ─► done
//!                                                           │
//!                                                           ▼
//!                                                     warn, done
//! ```
//!
//! The text reply is the contract. Plugin generation is best effort: its
//! failures are logged and never change the command's outcome.

pub mod classifier;
pub mod session;

use std::sync::atomic::{AtomicBool, Ordering};

use crate::gateway::Gateway;
use crate::{Error, Result};

pub use classifier::{Classifier, DEFAULT_PLUGIN_KEYWORDS, KeywordClassifier};
pub use session::Session;

/// Where a command currently is in the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Sending,
    GeneratingPlugin,
    Failed,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Sending => "sending",
            Self::GeneratingPlugin => "generating_plugin",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Successful result of one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    /// Text reply from the backend
    pub reply: String,
    /// Id of the plugin registered by this command, if any
    pub plugin_id: Option<String>,
}

/// Runs commands against a [`Gateway`], one at a time
pub struct Orchestrator<G, C = KeywordClassifier> {
    gateway: G,
    classifier: C,
    user_id: Option<String>,
    in_flight: AtomicBool,
}

impl<G: Gateway> Orchestrator<G> {
    /// Create an orchestrator with the default keyword classifier
    #[must_use]
    pub fn new(gateway: G) -> Self {
        Self::with_classifier(gateway, KeywordClassifier::default())
    }
}

impl<G: Gateway, C: Classifier> Orchestrator<G, C> {
    /// Create an orchestrator with a custom classifier
    #[must_use]
    pub const fn with_classifier(gateway: G, classifier: C) -> Self {
        Self {
            gateway,
            classifier,
            user_id: None,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Attach a user id to every remote call
    #[must_use]
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// The gateway commands are sent through
    #[must_use]
    pub const fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Whether a command is currently being processed
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Run one command
    ///
    /// On success the session's last reply is set and, if a plugin was
    /// generated, it is upserted as active. On failure the session is left
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a blank command, `Busy` if another command is
    /// in flight, or the gateway error of the text prompt call
    pub async fn handle_command(
        &self,
        session: &mut Session,
        raw: &str,
    ) -> Result<CommandOutcome> {
        let command = raw.trim();
        if command.is_empty() {
            return Err(Error::Validation("command is empty".to_string()));
        }

        let _guard = InFlightGuard::acquire(&self.in_flight)?;
        let user_id = self.user_id.as_deref();

        tracing::debug!(phase = %Phase::Sending, "sending text prompt");
        let reply = match self.gateway.send_text_prompt(command, user_id).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::debug!(phase = %Phase::Failed, error = %e, "text prompt failed");
                return Err(e);
            }
        };

        let mut plugin = None;
        if self.classifier.wants_plugin(command) {
            tracing::debug!(phase = %Phase::GeneratingPlugin, "command requests a plugin");
            match self.gateway.generate_plugin(command, user_id).await {
                Ok(generated) => plugin = Some(generated.into_plugin(true)),
                Err(e) => {
                    tracing::warn!(error = %e, kind = ?e.kind(), "plugin generation failed");
                }
            }
        }

        let plugin_id = plugin.as_ref().map(|p| p.id.clone());
        if let Some(plugin) = plugin {
            tracing::info!(
                plugin_id = %plugin.id,
                name = %plugin.metadata.name,
                kind = %plugin.metadata.kind,
                "registered plugin"
            );
            session.upsert(plugin);
        }
        session.set_last_reply(reply.clone());

        tracing::debug!(phase = %Phase::Idle, "command complete");
        Ok(CommandOutcome { reply, plugin_id })
    }
}

/// Single-slot guard released on drop, including when the future is cancelled
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| Error::Busy)?;
        Ok(Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
