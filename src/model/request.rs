//! oEmbed requests and target URL construction.

use url::Url;

use super::endpoint::Endpoint;
use crate::error::{OEmbedError, Result};

/// A request for embedding metadata about one locator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OEmbedRequest {
    resource_url: Url,
    max_height: Option<u32>,
    max_width: Option<u32>,
}

impl OEmbedRequest {
    /// Request for `resource_url` without size constraints.
    pub fn new(resource_url: Url) -> Self {
        Self {
            resource_url,
            max_height: None,
            max_width: None,
        }
    }

    /// Parse `resource_url` into a request.
    pub fn parse(resource_url: &str) -> Result<Self> {
        let url = Url::parse(resource_url.trim()).map_err(|e| {
            OEmbedError::InvalidParameter(format!("Invalid resource URL '{resource_url}': {e}"))
        })?;
        Ok(Self::new(url))
    }

    pub fn builder(resource_url: Url) -> OEmbedRequestBuilder {
        OEmbedRequestBuilder {
            request: Self::new(resource_url),
        }
    }

    pub fn resource_url(&self) -> &Url {
        &self.resource_url
    }

    pub fn max_height(&self) -> Option<u32> {
        self.max_height
    }

    pub fn max_width(&self) -> Option<u32> {
        self.max_width
    }

    /// Build the concrete fetch URL for this request against `endpoint`.
    ///
    /// The endpoint must serve the requested locator. The endpoint's default
    /// format is either substituted for `{format}` in its template or sent as
    /// a `format` query parameter. Query parameters are appended in the order
    /// `format`, `maxheight`, `maxwidth`, `url`.
    pub fn to_url(&self, endpoint: &Endpoint) -> Result<Url> {
        if !endpoint.matches(&self.resource_url) {
            return Err(OEmbedError::InvalidParameter(format!(
                "Endpoint {} does not serve {}",
                endpoint.uri_template(),
                self.resource_url
            )));
        }

        let format = endpoint.default_format();
        let template = endpoint.uri_template();
        let mut params: Vec<(&str, String)> = Vec::with_capacity(4);

        let mut target = if template.contains("format") {
            template.replace("{format}", format.as_str())
        } else {
            params.push(("format", format.to_string()));
            template.to_string()
        };
        if let Some(max_height) = self.max_height {
            params.push(("maxheight", max_height.to_string()));
        }
        if let Some(max_width) = self.max_width {
            params.push(("maxwidth", max_width.to_string()));
        }
        params.push(("url", self.resource_url.to_string()));

        let mut needs_separator = !(target.ends_with('?') || target.ends_with('&'));
        if !target.contains('?') {
            target.push('?');
            needs_separator = false;
        }
        for (key, value) in params {
            if needs_separator {
                target.push('&');
            }
            target.push_str(key);
            target.push('=');
            target.push_str(&urlencoding::encode(&value));
            needs_separator = true;
        }

        Url::parse(&target).map_err(|e| {
            OEmbedError::InvalidParameter(format!(
                "Endpoint template {template} produced an invalid URL: {e}"
            ))
        })
    }
}

/// Builder for [`OEmbedRequest`].
#[derive(Debug, Clone)]
pub struct OEmbedRequestBuilder {
    request: OEmbedRequest,
}

impl OEmbedRequestBuilder {
    pub fn max_height(mut self, max_height: u32) -> Self {
        self.request.max_height = Some(max_height);
        self
    }

    pub fn max_width(mut self, max_width: u32) -> Self {
        self.request.max_width = Some(max_width);
        self
    }

    /// Size constraints must be positive.
    pub fn build(self) -> Result<OEmbedRequest> {
        if self.request.max_height == Some(0) {
            return Err(OEmbedError::InvalidParameter(
                "maxheight must be a positive integer".to_string(),
            ));
        }
        if self.request.max_width == Some(0) {
            return Err(OEmbedError::InvalidParameter(
                "maxwidth must be a positive integer".to_string(),
            ));
        }
        Ok(self.request)
    }
}
