//! Error Handling Module
//!
//! Construction-time failures (provider list, endpoint patterns, response
//! validation) surface as `Err(OEmbedError)` to the caller building the value.
//! Runtime failures while answering a query are produced by the collaborators
//! (transport, codec) and collapsed into `None` by [`crate::client::OEmbedClient`].
//!
//! # Example
//!
//! ```rust,ignore
//! use oembed_client::error::OEmbedError;
//! use oembed_client::model::OEmbedResponse;
//! use oembed_client::types::OEmbedType;
//!
//! let err = OEmbedResponse::builder(OEmbedType::Photo).build().unwrap_err();
//! assert!(matches!(err, OEmbedError::InvalidState(_)));
//! ```

use thiserror::Error;

/// Errors produced by the oEmbed client.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OEmbedError {
    /// A value supplied by the caller is not acceptable
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A builder was asked to produce a value whose required state is missing
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Provider list, endpoint definition or client configuration is unusable
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Transport-level failure (connection, TLS, timeout, ...)
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// A body could not be decoded
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Local I/O failure
    #[error("IO error: {0}")]
    IoError(String),
}

impl From<std::io::Error> for OEmbedError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err.to_string())
    }
}

impl From<reqwest::Error> for OEmbedError {
    fn from(err: reqwest::Error) -> Self {
        Self::HttpError(err.to_string())
    }
}

impl From<serde_json::Error> for OEmbedError {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseError(format!("JSON: {err}"))
    }
}

impl From<quick_xml::Error> for OEmbedError {
    fn from(err: quick_xml::Error) -> Self {
        Self::ParseError(format!("XML: {err}"))
    }
}

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, OEmbedError>;
