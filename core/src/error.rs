//! Error types for the request client.
//!
//! # Design
//! `Api` covers every response that arrived with a failure status. Timeouts
//! and transport failures never carry a status code, so callers can tell
//! "the server said no" apart from "the server never answered".

use std::time::Duration;

use thiserror::Error;

/// Error built from a response with a non-2xx status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ApiError {
    pub message: String,
    pub status_code: Option<u16>,
}

impl ApiError {
    pub fn new(message: impl Into<String>, status_code: u16) -> Self {
        Self {
            message: message.into(),
            status_code: Some(status_code),
        }
    }
}

/// Error returned by a `Transport` when no response could be obtained.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError(err.to_string())
    }
}

/// Errors returned by `RequestClient` calls.
#[derive(Debug, Error)]
pub enum Error {
    /// The server answered with a failure status.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// No response arrived within the configured timeout.
    #[error("request timeout after {}ms", .timeout.as_millis())]
    Timeout { timeout: Duration },

    /// The request could not be sent or the response could not be read.
    #[error("transport error: {0}")]
    Transport(String),

    /// The request body could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// A response declared as JSON could not be decoded.
    #[error("deserialization failed: {0}")]
    Decode(#[source] serde_json::Error),
}

impl Error {
    /// Status code of the failed response, if the server answered at all.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Api(err) => err.status_code,
            _ => None,
        }
    }
}

impl From<TransportError> for Error {
    fn from(err: TransportError) -> Self {
        Error::Transport(err.0)
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
