//! Error types for the rezka client
//!
//! Provides a single error enum with human-readable messages
//! and Tauri-compatible serialization.

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Error type for all rezka client operations
///
/// Implements Display for human-readable messages and Serialize
/// for Tauri command compatibility.
#[derive(Error, Debug)]
pub enum RezkaError {
    /// HTTP request failed (connection, timeout, body read)
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Response body was not valid JSON
    #[error("Invalid JSON response: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Server answered with a non-success status
    #[error("Unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    /// Server answered 404
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by server (HTTP 429)
    #[error("Rate limited - too many requests")]
    RateLimited,

    /// Invalid URL format
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Mirror list cannot be used for resolution
    #[error("Invalid mirror list: {0}")]
    InvalidMirrorList(String),

    /// Backend returned a payload with an `error` field
    #[error("Backend error: {0}")]
    Backend(String),

    /// JSON was valid but did not have the expected shape
    #[error("Unexpected response shape: {0}")]
    Decode(String),
}

impl Serialize for RezkaError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Result type alias for rezka client operations
pub type Result<T> = std::result::Result<T, RezkaError>;
