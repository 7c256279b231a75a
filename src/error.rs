//! Error types for the Anything App core

use thiserror::Error;

/// Result type alias for Anything App operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while handling commands
#[derive(Debug, Error)]
pub enum Error {
    /// Command rejected before any remote call was made
    #[error("invalid command: {0}")]
    Validation(String),

    /// Another command is already in flight
    #[error("a command is already being processed")]
    Busy,

    /// Backend service could not be reached
    #[error("backend service unavailable: {0}")]
    TransportUnavailable(String),

    /// Backend reported `success: false`
    #[error("backend error: {0}")]
    RemoteApplication(String),

    /// Backend answered with a body that does not fit the envelope contract
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client error not covered by the classes above
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Coarse classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Busy,
    TransportUnavailable,
    RemoteApplication,
    MalformedResponse,
    Local,
}

impl Error {
    /// Classify this error
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Busy => ErrorKind::Busy,
            Self::TransportUnavailable(_) => ErrorKind::TransportUnavailable,
            Self::RemoteApplication(_) => ErrorKind::RemoteApplication,
            Self::MalformedResponse(_) => ErrorKind::MalformedResponse,
            Self::Config(_)
            | Self::Io(_)
            | Self::Http(_)
            | Self::Serialization(_)
            | Self::Toml(_) => ErrorKind::Local,
        }
    }

    /// Whether the error came out of a remote call to the backend
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::TransportUnavailable
                | ErrorKind::RemoteApplication
                | ErrorKind::MalformedResponse
        )
    }
}
