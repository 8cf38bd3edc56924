//! oEmbed client.
//!
//! Wires the pieces together: resolve the locator against the [`Registry`],
//! build the target URL, fetch it (following at most one redirect), decode
//! and validate the body. Every failure on this path is logged and turned
//! into `None`; "no embed" is an ordinary answer.
//!
//! # Example
//!
//! ```rust,ignore
//! use oembed_client::prelude::*;
//!
//! let registry = Registry::load_default(&HttpConfig::default()).await?;
//! let client = OEmbedClient::builder().registry(registry).build()?;
//!
//! let request = OEmbedRequest::parse("https://vimeo.com/76979871")?;
//! if let Some(response) = client.execute(&request).await {
//!     println!("{:?}", response.html());
//! }
//! ```

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

use crate::cache::{CacheConfig, ResponseCache, ResponseLoader};
use crate::codec::{Codec, DefaultCodec};
use crate::defaults::protocol::MAX_REDIRECTS;
use crate::error::{OEmbedError, Result};
use crate::model::{Endpoint, OEmbedRequest, OEmbedResponse};
use crate::registry::Registry;
use crate::transport::{ReqwestTransport, StatusCategory, Transport};
use crate::types::HttpConfig;

/// Resolve, fetch and decode; shared by the cached and uncached paths.
struct Pipeline {
    registry: Arc<Registry>,
    transport: Arc<dyn Transport>,
    codec: Arc<dyn Codec>,
}

impl Pipeline {
    fn resolve(&self, resource_url: &Url) -> Option<&Endpoint> {
        let endpoint = self.registry.resolve(resource_url);
        if endpoint.is_none() {
            debug!(url = %resource_url, "No oEmbed endpoint for resource");
        }
        endpoint
    }

    async fn fetch(&self, request: &OEmbedRequest, endpoint: &Endpoint) -> Option<OEmbedResponse> {
        match request.to_url(endpoint) {
            Ok(target) => self.fetch_url(target).await,
            Err(e) => {
                info!(url = %request.resource_url(), error = %e, "Cannot build oEmbed request");
                None
            }
        }
    }

    async fn fetch_url(&self, target: Url) -> Option<OEmbedResponse> {
        let mut current = target;
        let mut redirects = 0usize;

        loop {
            let response = match self.transport.fetch(&current).await {
                Ok(response) => response,
                Err(e) => {
                    info!(url = %current, error = %e, "oEmbed request failed");
                    return None;
                }
            };

            match response.status {
                StatusCategory::Success => {
                    let content_type = response.content_type.as_deref().unwrap_or_default();
                    return self.codec.decode(&response.body, content_type);
                }
                StatusCategory::Redirect => {
                    if redirects >= MAX_REDIRECTS {
                        info!(url = %current, "Too many oEmbed redirects, giving up");
                        return None;
                    }
                    let Some(location) = response.location.as_deref() else {
                        info!(
                            url = %current,
                            status = response.status_code,
                            "Redirect without Location"
                        );
                        return None;
                    };
                    match current.join(location) {
                        Ok(next) => {
                            debug!(from = %current, to = %next, "Following oEmbed redirect");
                            current = next;
                            redirects += 1;
                        }
                        Err(e) => {
                            info!(
                                url = %current,
                                location,
                                error = %e,
                                "Invalid redirect location"
                            );
                            return None;
                        }
                    }
                }
                StatusCategory::Other => {
                    info!(
                        url = %current,
                        status = response.status_code,
                        "oEmbed request was not successful"
                    );
                    return None;
                }
            }
        }
    }
}

#[async_trait]
impl ResponseLoader for Pipeline {
    async fn load(&self, resource_url: &Url) -> Option<OEmbedResponse> {
        let endpoint = self.resolve(resource_url)?;
        self.fetch(&OEmbedRequest::new(resource_url.clone()), endpoint)
            .await
    }
}

/// Client for oEmbed discovery.
///
/// Cheap to clone; clones share the registry, transport and cache.
#[derive(Clone)]
pub struct OEmbedClient {
    pipeline: Arc<Pipeline>,
    cache: Arc<ResponseCache>,
}

impl std::fmt::Debug for OEmbedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OEmbedClient")
            .field("providers", &self.pipeline.registry.count())
            .finish_non_exhaustive()
    }
}

impl OEmbedClient {
    pub fn builder() -> OEmbedClientBuilder {
        OEmbedClientBuilder::default()
    }

    /// Response for the request's locator, served from the cache while the
    /// provider's `cache_age` allows.
    ///
    /// Cached lookups are keyed by locator only, so `maxheight` and
    /// `maxwidth` are not sent on this path; use
    /// [`execute_skip_cache`](Self::execute_skip_cache) for sized requests.
    pub async fn execute(&self, request: &OEmbedRequest) -> Option<OEmbedResponse> {
        self.cache.get(request.resource_url()).await
    }

    /// Resolve and fetch without consulting or filling the cache.
    pub async fn execute_skip_cache(&self, request: &OEmbedRequest) -> Option<OEmbedResponse> {
        let endpoint = self.pipeline.resolve(request.resource_url())?;
        self.pipeline.fetch(request, endpoint).await
    }

    /// Fetch from a caller-chosen endpoint, bypassing resolution and the cache.
    pub async fn execute_with_endpoint(
        &self,
        request: &OEmbedRequest,
        endpoint: &Endpoint,
    ) -> Option<OEmbedResponse> {
        self.pipeline.fetch(request, endpoint).await
    }

    pub fn registry(&self) -> &Registry {
        &self.pipeline.registry
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }
}

/// Builder for [`OEmbedClient`].
#[derive(Default)]
pub struct OEmbedClientBuilder {
    registry: Option<Arc<Registry>>,
    http_config: Option<HttpConfig>,
    transport: Option<Arc<dyn Transport>>,
    codec: Option<Arc<dyn Codec>>,
    cache_config: Option<CacheConfig>,
}

impl OEmbedClientBuilder {
    /// Providers to resolve against (required).
    pub fn registry(mut self, registry: impl Into<Arc<Registry>>) -> Self {
        self.registry = Some(registry.into());
        self
    }

    /// HTTP settings for the default transport. Ignored when a custom
    /// transport is set.
    pub fn http_config(mut self, config: HttpConfig) -> Self {
        self.http_config = Some(config);
        self
    }

    /// Replace the HTTP transport.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn codec(mut self, codec: Arc<dyn Codec>) -> Self {
        self.codec = Some(codec);
        self
    }

    pub fn cache_config(mut self, config: CacheConfig) -> Self {
        self.cache_config = Some(config);
        self
    }

    pub fn build(self) -> Result<OEmbedClient> {
        let registry = self.registry.ok_or_else(|| {
            OEmbedError::ConfigurationError("A provider registry is required".to_string())
        })?;

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::from_config(
                &self.http_config.unwrap_or_default(),
            )?),
        };
        let codec = self.codec.unwrap_or_else(|| Arc::new(DefaultCodec::new()));

        let pipeline = Arc::new(Pipeline {
            registry,
            transport,
            codec,
        });
        let cache = ResponseCache::new(pipeline.clone(), self.cache_config.unwrap_or_default())?;

        Ok(OEmbedClient {
            pipeline,
            cache: Arc::new(cache),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::TransportResponse;
    use crate::types::OEmbedType;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Canned responses keyed by full URL; records every fetched URL.
    #[derive(Default)]
    struct StubTransport {
        responses: HashMap<String, TransportResponse>,
        fetched: Mutex<Vec<String>>,
    }

    impl StubTransport {
        fn with(mut self, url: &str, response: TransportResponse) -> Self {
            self.responses.insert(url.to_string(), response);
            self
        }

        fn fetched(&self) -> Vec<String> {
            self.fetched.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for StubTransport {
        async fn fetch(&self, url: &Url) -> Result<TransportResponse> {
            self.fetched.lock().unwrap().push(url.to_string());
            self.responses
                .get(url.as_str())
                .cloned()
                .ok_or_else(|| OEmbedError::HttpError(format!("connection refused: {url}")))
        }
    }

    const TARGET: &str =
        "https://example.com/oembed?format=json&url=https%3A%2F%2Fexample.com%2Fphotos%2F1";
    const PHOTO: &str = r#"{"type":"photo","version":"1.0","url":"https://example.com/1.jpg","width":640,"height":480}"#;

    fn registry() -> Registry {
        Registry::from_json_str(
            r#"[{
                "provider_name": "Example",
                "provider_url": "https://example.com",
                "endpoints": [{ "schemes": ["https://example.com/*"], "url": "https://example.com/oembed" }]
            }]"#,
        )
        .unwrap()
    }

    fn client(transport: Arc<StubTransport>) -> OEmbedClient {
        OEmbedClient::builder()
            .registry(registry())
            .transport(transport)
            .build()
            .unwrap()
    }

    fn photo_request() -> OEmbedRequest {
        OEmbedRequest::parse("https://example.com/photos/1").unwrap()
    }

    #[tokio::test]
    async fn fetches_and_decodes() {
        let transport = Arc::new(
            StubTransport::default().with(TARGET, TransportResponse::ok("application/json", PHOTO)),
        );
        let response = client(transport.clone())
            .execute_skip_cache(&photo_request())
            .await
            .unwrap();

        assert_eq!(response.kind(), OEmbedType::Photo);
        assert_eq!(response.width(), Some(640));
        assert_eq!(transport.fetched(), [TARGET]);
    }

    #[tokio::test]
    async fn unknown_resource_is_none_without_fetching() {
        let transport = Arc::new(StubTransport::default());
        let client = client(transport.clone());
        let request = OEmbedRequest::parse("https://other.com/x").unwrap();

        assert!(client.execute(&request).await.is_none());
        assert!(client.execute_skip_cache(&request).await.is_none());
        assert!(transport.fetched().is_empty());
    }

    #[tokio::test]
    async fn follows_one_relative_redirect() {
        let moved = "https://example.com/v2/oembed?url=1";
        let transport = Arc::new(
            StubTransport::default()
                .with(TARGET, TransportResponse::redirect("/v2/oembed?url=1"))
                .with(moved, TransportResponse::ok("application/json", PHOTO)),
        );
        let response = client(transport.clone())
            .execute_skip_cache(&photo_request())
            .await;

        assert!(response.is_some());
        assert_eq!(transport.fetched(), [TARGET, moved]);
    }

    #[tokio::test]
    async fn second_redirect_is_none() {
        let hop = "https://example.com/hop";
        let transport = Arc::new(
            StubTransport::default()
                .with(TARGET, TransportResponse::redirect(hop))
                .with(hop, TransportResponse::redirect("https://example.com/final"))
                .with(
                    "https://example.com/final",
                    TransportResponse::ok("application/json", PHOTO),
                ),
        );
        let response = client(transport.clone())
            .execute_skip_cache(&photo_request())
            .await;

        assert!(response.is_none());
        assert_eq!(transport.fetched().len(), 2);
    }

    #[tokio::test]
    async fn failures_collapse_to_none() {
        let cases = [
            TransportResponse::status(404),
            TransportResponse::status(500),
            TransportResponse::ok("text/html", "<html></html>"),
            TransportResponse::ok("application/json", "{"),
            TransportResponse::ok("application/json", r#"{"type":"video"}"#),
            TransportResponse::status(302),
        ];
        for canned in cases {
            let transport = Arc::new(StubTransport::default().with(TARGET, canned.clone()));
            let response = client(transport).execute_skip_cache(&photo_request()).await;
            assert!(response.is_none(), "{canned:?}");
        }

        // transport error
        let transport = Arc::new(StubTransport::default());
        assert!(client(transport).execute_skip_cache(&photo_request()).await.is_none());
    }

    #[tokio::test]
    async fn execute_with_mismatched_endpoint_is_none() {
        let transport = Arc::new(StubTransport::default());
        let endpoint = Endpoint::builder("https://elsewhere.com/oembed")
            .scheme("https://elsewhere.com/*")
            .build()
            .unwrap();
        let response = client(transport.clone())
            .execute_with_endpoint(&photo_request(), &endpoint)
            .await;

        assert!(response.is_none());
        assert!(transport.fetched().is_empty());
    }

    #[tokio::test]
    async fn cached_path_sends_locator_only() {
        let transport = Arc::new(
            StubTransport::default().with(TARGET, TransportResponse::ok("application/json", PHOTO)),
        );
        let request = OEmbedRequest::builder(Url::parse("https://example.com/photos/1").unwrap())
            .max_width(100)
            .build()
            .unwrap();

        assert!(client(transport.clone()).execute(&request).await.is_some());
        assert_eq!(transport.fetched(), [TARGET]);
    }

    #[test]
    fn registry_is_required() {
        let err = OEmbedClient::builder().build().unwrap_err();
        assert!(matches!(err, OEmbedError::ConfigurationError(_)));
    }
}
