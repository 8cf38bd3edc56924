//! reqwest-backed transport.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, LOCATION};
use tracing::debug;
use url::Url;

use super::{StatusCategory, Transport, TransportResponse};
use crate::defaults;
use crate::error::{OEmbedError, Result};
use crate::types::HttpConfig;

/// Build an HTTP client from [`HttpConfig`].
///
/// The client follows redirects; the oEmbed transport uses
/// [`ReqwestTransport::from_config`], which does not.
pub fn build_http_client_from_config(config: &HttpConfig) -> Result<reqwest::Client> {
    client_builder(config)?
        .build()
        .map_err(|e| OEmbedError::HttpError(format!("Failed to create HTTP client: {e}")))
}

fn client_builder(config: &HttpConfig) -> Result<reqwest::ClientBuilder> {
    let mut builder = reqwest::Client::builder();

    if let Some(timeout) = config.timeout {
        builder = builder.timeout(timeout);
    }

    if let Some(connect_timeout) = config.connect_timeout {
        builder = builder.connect_timeout(connect_timeout);
    }

    if let Some(proxy_url) = &config.proxy {
        let proxy = reqwest::Proxy::all(proxy_url)
            .map_err(|e| OEmbedError::ConfigurationError(format!("Invalid proxy URL: {e}")))?;
        builder = builder.proxy(proxy);
    }

    if let Some(user_agent) = &config.user_agent {
        builder = builder.user_agent(user_agent);
    }

    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(defaults::http::ACCEPT));
    for (k, v) in &config.headers {
        let name = HeaderName::from_bytes(k.as_bytes()).map_err(|e| {
            OEmbedError::ConfigurationError(format!("Invalid header name '{k}': {e}"))
        })?;
        let value = HeaderValue::from_str(v).map_err(|e| {
            OEmbedError::ConfigurationError(format!("Invalid header value for '{k}': {e}"))
        })?;
        headers.insert(name, value);
    }
    Ok(builder.default_headers(headers))
}

/// [`Transport`] over a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Wrap an existing client. It should not follow redirects.
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Client built from `config` with redirect following disabled.
    pub fn from_config(config: &HttpConfig) -> Result<Self> {
        let client = client_builder(config)?
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| OEmbedError::HttpError(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn fetch(&self, url: &Url) -> Result<TransportResponse> {
        debug!(%url, "GET");
        let response = self.client.get(url.clone()).send().await?;

        let status_code = response.status().as_u16();
        let header = |name: HeaderName| {
            response
                .headers()
                .get(name)
                .and_then(|v: &HeaderValue| v.to_str().ok())
                .map(str::to_string)
        };
        let content_type = header(CONTENT_TYPE);
        let location = header(LOCATION);
        let body = response.bytes().await?.to_vec();

        Ok(TransportResponse {
            status: StatusCategory::from_code(status_code),
            status_code,
            content_type,
            location,
            body,
        })
    }
}
