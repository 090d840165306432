//! Error handling and custom error types
//!
//! Provides unified error handling across the SDK using thiserror.

use crate::types::Status;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Inbound JSON that does not fit the target schema.
    ///
    /// `path` points at the offending field (empty for the document root) and
    /// `raw` holds the payload exactly as received.
    #[error("Decode error at '{path}': {message}")]
    Decode {
        path: String,
        message: String,
        raw: String,
    },

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Transport error: {0}")]
    Transport(String),

    /// Structured error returned by the remote service.
    #[error("Service error {}: {}", .0.code, .0.message)]
    Service(Status),

    #[error("API error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("Session is closed")]
    SessionClosed,

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] dotenvy::Error),
}

impl Error {
    /// Whether a live session can keep going after this error.
    ///
    /// Only per-message decode failures are recoverable; everything else is
    /// fatal to the session that produced it.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::Decode { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
