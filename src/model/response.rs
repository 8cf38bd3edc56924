//! Validated oEmbed responses.
//!
//! [`OEmbedResponse`] can only be obtained through [`OEmbedResponseBuilder::build`]
//! (directly or while deserializing), which enforces the fields required by
//! the declared type:
//!
//! | type  | required                 |
//! |-------|--------------------------|
//! | link  | -                        |
//! | photo | `url`, `height`, `width` |
//! | rich  | `html`, `height`, `width`|
//! | video | `html`, `height`, `width`|
//!
//! Fields outside the oEmbed schema are kept in `custom_properties` and are
//! written back as top-level fields.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use super::lenient;
use crate::defaults::protocol::VERSION;
use crate::error::{OEmbedError, Result};
use crate::types::OEmbedType;

/// Wire names of every field in the oEmbed schema.
pub const SCHEMA_FIELDS: [&str; 15] = [
    "type",
    "version",
    "author_name",
    "author_url",
    "cache_age",
    "provider_name",
    "provider_url",
    "thumbnail_height",
    "thumbnail_url",
    "thumbnail_width",
    "title",
    "height",
    "html",
    "url",
    "width",
];

/// Embedding metadata returned by an oEmbed endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WireResponse", into = "WireResponse")]
pub struct OEmbedResponse {
    kind: OEmbedType,
    version: String,
    author_name: Option<String>,
    author_url: Option<String>,
    cache_age: Option<u64>,
    provider_name: Option<String>,
    provider_url: Option<String>,
    thumbnail_height: Option<u32>,
    thumbnail_url: Option<String>,
    thumbnail_width: Option<u32>,
    title: Option<String>,
    height: Option<u32>,
    html: Option<String>,
    url: Option<String>,
    width: Option<u32>,
    custom_properties: BTreeMap<String, serde_json::Value>,
}

impl OEmbedResponse {
    pub fn builder(kind: OEmbedType) -> OEmbedResponseBuilder {
        OEmbedResponseBuilder::new(kind)
    }

    /// The response `type`.
    pub fn kind(&self) -> OEmbedType {
        self.kind
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn author_name(&self) -> Option<&str> {
        self.author_name.as_deref()
    }

    pub fn author_url(&self) -> Option<&str> {
        self.author_url.as_deref()
    }

    /// Suggested cache lifetime, as sent by the provider.
    pub fn cache_age(&self) -> Option<Duration> {
        self.cache_age.map(Duration::from_secs)
    }

    pub fn provider_name(&self) -> Option<&str> {
        self.provider_name.as_deref()
    }

    pub fn provider_url(&self) -> Option<&str> {
        self.provider_url.as_deref()
    }

    pub fn thumbnail_height(&self) -> Option<u32> {
        self.thumbnail_height
    }

    pub fn thumbnail_url(&self) -> Option<&str> {
        self.thumbnail_url.as_deref()
    }

    pub fn thumbnail_width(&self) -> Option<u32> {
        self.thumbnail_width
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn height(&self) -> Option<u32> {
        self.height
    }

    pub fn html(&self) -> Option<&str> {
        self.html.as_deref()
    }

    /// Source URL of a photo.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn width(&self) -> Option<u32> {
        self.width
    }

    pub fn custom_properties(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.custom_properties
    }

    pub fn custom_property(&self, key: &str) -> Option<&serde_json::Value> {
        self.custom_properties.get(key)
    }

    pub fn has_custom_properties(&self) -> bool {
        !self.custom_properties.is_empty()
    }
}

/// Accumulates response fields; [`build`](Self::build) validates them.
#[derive(Debug, Clone)]
pub struct OEmbedResponseBuilder {
    inner: OEmbedResponse,
}

impl OEmbedResponseBuilder {
    pub fn new(kind: OEmbedType) -> Self {
        Self {
            inner: OEmbedResponse {
                kind,
                version: VERSION.to_string(),
                author_name: None,
                author_url: None,
                cache_age: None,
                provider_name: None,
                provider_url: None,
                thumbnail_height: None,
                thumbnail_url: None,
                thumbnail_width: None,
                title: None,
                height: None,
                html: None,
                url: None,
                width: None,
                custom_properties: BTreeMap::new(),
            },
        }
    }

    /// The oEmbed spec only allows `"1.0"`.
    pub fn version(mut self, version: impl Into<String>) -> Result<Self> {
        let version = version.into();
        if version != VERSION {
            return Err(OEmbedError::InvalidParameter(format!(
                "oEmbed version must be {VERSION}, got '{version}'"
            )));
        }
        self.inner.version = version;
        Ok(self)
    }

    pub fn author_name(mut self, author_name: impl Into<String>) -> Self {
        self.inner.author_name = Some(author_name.into());
        self
    }

    pub fn author_url(mut self, author_url: impl Into<String>) -> Self {
        self.inner.author_url = Some(author_url.into());
        self
    }

    /// Cache lifetime in seconds.
    pub fn cache_age(mut self, seconds: u64) -> Self {
        self.inner.cache_age = Some(seconds);
        self
    }

    pub fn provider_name(mut self, provider_name: impl Into<String>) -> Self {
        self.inner.provider_name = Some(provider_name.into());
        self
    }

    pub fn provider_url(mut self, provider_url: impl Into<String>) -> Self {
        self.inner.provider_url = Some(provider_url.into());
        self
    }

    pub fn thumbnail_height(mut self, thumbnail_height: u32) -> Self {
        self.inner.thumbnail_height = Some(thumbnail_height);
        self
    }

    pub fn thumbnail_url(mut self, thumbnail_url: impl Into<String>) -> Self {
        self.inner.thumbnail_url = Some(thumbnail_url.into());
        self
    }

    pub fn thumbnail_width(mut self, thumbnail_width: u32) -> Self {
        self.inner.thumbnail_width = Some(thumbnail_width);
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.inner.title = Some(title.into());
        self
    }

    pub fn height(mut self, height: u32) -> Self {
        self.inner.height = Some(height);
        self
    }

    pub fn html(mut self, html: impl Into<String>) -> Self {
        self.inner.html = Some(html.into());
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.inner.url = Some(url.into());
        self
    }

    pub fn width(mut self, width: u32) -> Self {
        self.inner.width = Some(width);
        self
    }

    pub fn custom_property(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.inner.custom_properties.insert(key.into(), value.into());
        self
    }

    pub fn custom_properties<I, K>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = (K, serde_json::Value)>,
        K: Into<String>,
    {
        self.inner
            .custom_properties
            .extend(properties.into_iter().map(|(k, v)| (k.into(), v)));
        self
    }

    /// Validate the type-conditional required fields and produce the response.
    pub fn build(self) -> Result<OEmbedResponse> {
        let response = self.inner;
        let kind = response.kind;
        let missing = |field: &str| {
            OEmbedError::InvalidState(format!("{field} is required for {kind} content"))
        };

        match kind {
            OEmbedType::Link => {}
            OEmbedType::Photo => {
                if response.url.is_none() {
                    return Err(missing("Source url"));
                }
                if response.height.is_none() {
                    return Err(missing("Height"));
                }
                if response.width.is_none() {
                    return Err(missing("Width"));
                }
            }
            OEmbedType::Rich | OEmbedType::Video => {
                if response.html.is_none() {
                    return Err(missing("Html"));
                }
                if response.height.is_none() {
                    return Err(missing("Height"));
                }
                if response.width.is_none() {
                    return Err(missing("Width"));
                }
            }
        }

        if let Some(key) = response
            .custom_properties
            .keys()
            .find(|key| SCHEMA_FIELDS.contains(&key.as_str()))
        {
            return Err(OEmbedError::InvalidParameter(format!(
                "Custom property '{key}' shadows an oEmbed field"
            )));
        }

        Ok(response)
    }
}

/// Wire shape shared by the JSON and XML encodings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct WireResponse {
    #[serde(rename = "type")]
    kind: OEmbedType,
    #[serde(default = "default_version", deserialize_with = "lenient::version")]
    version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    author_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    author_url: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::option_u64",
        skip_serializing_if = "Option::is_none"
    )]
    cache_age: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    provider_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    provider_url: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::option_u32",
        skip_serializing_if = "Option::is_none"
    )]
    thumbnail_height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    thumbnail_url: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::option_u32",
        skip_serializing_if = "Option::is_none"
    )]
    thumbnail_width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::option_u32",
        skip_serializing_if = "Option::is_none"
    )]
    height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::option_u32",
        skip_serializing_if = "Option::is_none"
    )]
    width: Option<u32>,
    #[serde(flatten)]
    custom_properties: BTreeMap<String, serde_json::Value>,
}

fn default_version() -> String {
    VERSION.to_string()
}

impl TryFrom<WireResponse> for OEmbedResponse {
    type Error = OEmbedError;

    fn try_from(wire: WireResponse) -> Result<Self> {
        let builder = OEmbedResponseBuilder::new(wire.kind).version(wire.version)?;
        let OEmbedResponseBuilder { mut inner } = builder;
        inner.author_name = wire.author_name;
        inner.author_url = wire.author_url;
        inner.cache_age = wire.cache_age;
        inner.provider_name = wire.provider_name;
        inner.provider_url = wire.provider_url;
        inner.thumbnail_height = wire.thumbnail_height;
        inner.thumbnail_url = wire.thumbnail_url;
        inner.thumbnail_width = wire.thumbnail_width;
        inner.title = wire.title;
        inner.height = wire.height;
        inner.html = wire.html;
        inner.url = wire.url;
        inner.width = wire.width;
        inner.custom_properties = wire.custom_properties;
        OEmbedResponseBuilder { inner }.build()
    }
}

impl From<OEmbedResponse> for WireResponse {
    fn from(response: OEmbedResponse) -> Self {
        Self {
            kind: response.kind,
            version: response.version,
            author_name: response.author_name,
            author_url: response.author_url,
            cache_age: response.cache_age,
            provider_name: response.provider_name,
            provider_url: response.provider_url,
            thumbnail_height: response.thumbnail_height,
            thumbnail_url: response.thumbnail_url,
            thumbnail_width: response.thumbnail_width,
            title: response.title,
            height: response.height,
            html: response.html,
            url: response.url,
            width: response.width,
            custom_properties: response.custom_properties,
        }
    }
}
