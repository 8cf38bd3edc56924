//! oEmbed providers.

use serde::{Deserialize, Serialize};
use url::Url;

use super::endpoint::Endpoint;
use crate::error::{OEmbedError, Result};

/// Provider as it appears in a provider list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderDefinition {
    pub provider_name: String,
    pub provider_url: String,
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
}

/// An oEmbed provider: a named homepage with its ordered endpoints.
///
/// The `domain` is always derived from the homepage URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ProviderDefinition", into = "ProviderDefinition")]
pub struct Provider {
    name: String,
    url: Url,
    domain: String,
    endpoints: Vec<Endpoint>,
}

impl Provider {
    pub fn new(name: impl Into<String>, url: Url, endpoints: Vec<Endpoint>) -> Result<Self> {
        let name = name.into();
        let domain = domain_of(&url).ok_or_else(|| {
            OEmbedError::ConfigurationError(format!(
                "Provider '{name}' has a homepage without a host: {url}"
            ))
        })?;

        Ok(Self {
            name,
            url,
            domain,
            endpoints,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    /// First endpoint, in declared order, that serves `resource_url`.
    pub fn find_endpoint(&self, resource_url: &Url) -> Option<&Endpoint> {
        self.endpoints.iter().find(|e| e.matches(resource_url))
    }
}

impl TryFrom<ProviderDefinition> for Provider {
    type Error = OEmbedError;

    fn try_from(definition: ProviderDefinition) -> Result<Self> {
        let url = Url::parse(definition.provider_url.trim()).map_err(|e| {
            OEmbedError::ConfigurationError(format!(
                "Invalid provider_url '{}' for provider '{}': {e}",
                definition.provider_url, definition.provider_name
            ))
        })?;
        Self::new(definition.provider_name, url, definition.endpoints)
    }
}

impl From<Provider> for ProviderDefinition {
    fn from(provider: Provider) -> Self {
        Self {
            provider_name: provider.name,
            provider_url: provider.url.into(),
            endpoints: provider.endpoints,
        }
    }
}

/// Lookup domain of a URL: its host, lowercased, without a trailing dot.
pub fn domain_of(url: &Url) -> Option<String> {
    url.host_str()
        .map(|host| host.trim_end_matches('.').to_ascii_lowercase())
        .filter(|host| !host.is_empty())
}
