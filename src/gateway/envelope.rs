//! Response envelope shared by every backend endpoint
//!
//! The backend wraps each payload as `{ success, data?, error? }`. The loose
//! shape is decoded once here into [`Reply`], so nothing downstream inspects the
//! optional fields directly.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Raw envelope as it appears on the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Tagged outcome of an envelope
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply<T> {
    /// `success == true` and `data` present
    Success(T),
    /// `success == false`, carrying the backend's message
    Failure(String),
    /// `success == true` without `data`
    Malformed,
}

const UNKNOWN_ERROR: &str = "unknown error occurred";

impl<T> Envelope<T> {
    /// Classify the envelope
    pub fn into_reply(self) -> Reply<T> {
        match (self.success, self.data) {
            (true, Some(data)) => Reply::Success(data),
            (true, None) => Reply::Malformed,
            (false, _) => Reply::Failure(
                self.error
                    .filter(|e| !e.is_empty())
                    .unwrap_or_else(|| UNKNOWN_ERROR.to_string()),
            ),
        }
    }
}

impl<T> Reply<T> {
    /// Convert into the crate result type
    ///
    /// # Errors
    ///
    /// Returns `RemoteApplication` for a failure and `MalformedResponse` for a
    /// success without data
    pub fn into_result(self) -> Result<T> {
        match self {
            Self::Success(data) => Ok(data),
            Self::Failure(message) => Err(Error::RemoteApplication(message)),
            Self::Malformed => Err(Error::MalformedResponse(
                "response reported success but carried no data".to_string(),
            )),
        }
    }
}

/// Decode an envelope body and extract a typed payload
///
/// `data` is decoded only after the envelope is classified, so a failure
/// envelope with an unexpected `data` shape still reports the backend's message.
///
/// # Errors
///
/// Returns `MalformedResponse` if the body is not an envelope or the payload
/// does not match `T`, otherwise whatever [`Reply::into_result`] returns
pub fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    let envelope: Envelope<serde_json::Value> = serde_json::from_slice(body)
        .map_err(|e| Error::MalformedResponse(format!("invalid response envelope: {e}")))?;

    let value = envelope.into_reply().into_result()?;
    serde_json::from_value(value)
        .map_err(|e| Error::MalformedResponse(format!("unexpected response data: {e}")))
}
