//! HTTP transport abstraction.
//!
//! The client talks to providers through a [`Transport`]: one GET per call,
//! no redirect following. [`ReqwestTransport`] is the default
//! implementation; tests and embedders can inject their own.

mod http;

pub use http::{ReqwestTransport, build_http_client_from_config};

use async_trait::async_trait;
use url::Url;

use crate::error::Result;

/// Coarse classification of an HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCategory {
    Success,
    Redirect,
    Other,
}

impl StatusCategory {
    pub fn from_code(status: u16) -> Self {
        match status {
            200..=299 => Self::Success,
            300..=399 => Self::Redirect,
            _ => Self::Other,
        }
    }
}

/// Transport-level response data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: StatusCategory,
    pub status_code: u16,
    pub content_type: Option<String>,
    /// `Location` header, present on redirects.
    pub location: Option<String>,
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// A `200 OK` response carrying `body`.
    pub fn ok(content_type: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: StatusCategory::Success,
            status_code: 200,
            content_type: Some(content_type.into()),
            location: None,
            body: body.into(),
        }
    }

    /// A `302 Found` response pointing at `location`.
    pub fn redirect(location: impl Into<String>) -> Self {
        Self {
            status: StatusCategory::Redirect,
            status_code: 302,
            content_type: None,
            location: Some(location.into()),
            body: Vec::new(),
        }
    }

    pub fn status(status_code: u16) -> Self {
        Self {
            status: StatusCategory::from_code(status_code),
            status_code,
            content_type: None,
            location: None,
            body: Vec::new(),
        }
    }
}

/// Issues a single GET against an oEmbed endpoint.
///
/// Connection failures are returned as `Err`; any HTTP status, including
/// redirects and errors, is an `Ok` response.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<TransportResponse>;
}
