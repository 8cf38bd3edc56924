//! Provider registry and endpoint resolution.
//!
//! A [`Registry`] is built once from an ordered provider list and is
//! read-only afterwards; share it behind an `Arc` and read it from any task
//! without locking.
//!
//! Resolution first tries the provider registered under the locator's
//! domain, then falls back to scanning every provider in registration order.
//! The fallback catches providers that serve content from hosts other than
//! their homepage (CDNs, short-link domains).

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::Path;

use tracing::{debug, info};
use url::Url;

use crate::defaults;
use crate::error::{OEmbedError, Result};
use crate::model::provider::domain_of;
use crate::model::{Endpoint, Provider};
use crate::transport::build_http_client_from_config;
use crate::types::HttpConfig;

/// Immutable set of oEmbed providers.
#[derive(Debug, Clone)]
pub struct Registry {
    providers: Vec<Provider>,
    by_name: HashMap<String, usize>,
    by_domain: HashMap<String, usize>,
}

impl Registry {
    /// Build a registry from providers in registration order.
    ///
    /// Provider names must be unique. When two providers share a domain the
    /// first one owns the domain lookup; the other is still reachable
    /// through the full scan.
    pub fn new(providers: Vec<Provider>) -> Result<Self> {
        let mut by_name = HashMap::with_capacity(providers.len());
        let mut by_domain = HashMap::with_capacity(providers.len());

        for (index, provider) in providers.iter().enumerate() {
            if by_name.insert(provider.name().to_string(), index).is_some() {
                return Err(OEmbedError::ConfigurationError(format!(
                    "Duplicate provider name '{}'",
                    provider.name()
                )));
            }
            match by_domain.entry(provider.domain().to_string()) {
                Entry::Vacant(slot) => {
                    slot.insert(index);
                }
                Entry::Occupied(slot) => {
                    debug!(
                        domain = provider.domain(),
                        provider = provider.name(),
                        owner = providers[*slot.get()].name(),
                        "Domain already registered, provider reachable by scan only"
                    );
                }
            }
        }

        info!(providers = providers.len(), "oEmbed registry loaded");
        Ok(Self {
            providers,
            by_name,
            by_domain,
        })
    }

    /// Parse a provider list in the `providers.json` format.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        let providers: Vec<Provider> = serde_json::from_slice(bytes).map_err(|e| {
            OEmbedError::ConfigurationError(format!("Invalid provider list: {e}"))
        })?;
        Self::new(providers)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::from_json_slice(json.as_bytes())
    }

    /// Read a provider list file.
    pub async fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            OEmbedError::IoError(format!(
                "Failed to read provider list {}: {e}",
                path.display()
            ))
        })?;
        Self::from_json_slice(&bytes)
    }

    /// Download a provider list.
    pub async fn load_from_url(url: &str, http_config: &HttpConfig) -> Result<Self> {
        let client = build_http_client_from_config(http_config)?;
        let response = client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(OEmbedError::ConfigurationError(format!(
                "Provider list request to {url} failed with status {status}"
            )));
        }

        let bytes = response.bytes().await?;
        Self::from_json_slice(&bytes)
    }

    /// Download the official list from [`defaults::registry::PROVIDERS_URL`].
    pub async fn load_default(http_config: &HttpConfig) -> Result<Self> {
        Self::load_from_url(defaults::registry::PROVIDERS_URL, http_config).await
    }

    /// Endpoint that serves `resource_url`, if any provider has one.
    pub fn resolve(&self, resource_url: &Url) -> Option<&Endpoint> {
        let by_domain = domain_of(resource_url)
            .and_then(|domain| self.by_domain.get(&domain))
            .and_then(|&index| self.providers[index].find_endpoint(resource_url));
        if by_domain.is_some() {
            return by_domain;
        }

        self.providers
            .iter()
            .find_map(|provider| provider.find_endpoint(resource_url))
    }

    /// Provider with exactly this name.
    pub fn get_provider(&self, name: &str) -> Option<&Provider> {
        self.by_name.get(name).map(|&index| &self.providers[index])
    }

    /// Number of registered providers.
    pub fn count(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Providers in registration order.
    pub fn providers(&self) -> &[Provider] {
        &self.providers
    }
}
