//! oEmbed endpoints and their locator matching.
//!
//! An endpoint is built once from its independent inputs (URL template,
//! scheme templates, formats, discovery flag). The compiled scheme patterns,
//! the URL-domain pattern and the default format are derived during
//! construction and exposed read-only.

use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{OEmbedError, Result};
use crate::types::OEmbedFormat;

/// The format preferred whenever an endpoint supports it.
const PREFERRED_FORMAT: OEmbedFormat = OEmbedFormat::Json;

/// Endpoint as it appears in a provider list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointDefinition {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schemes: Vec<String>,
    pub url: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub formats: Vec<OEmbedFormat>,
    #[serde(default)]
    pub discovery: bool,
}

/// A discovery endpoint of an oEmbed provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "EndpointDefinition", into = "EndpointDefinition")]
pub struct Endpoint {
    uri_template: String,
    scheme_templates: Vec<String>,
    discovery_enabled: bool,
    supported_formats: Vec<OEmbedFormat>,
    // derived
    scheme_patterns: Vec<Regex>,
    uri_domain_pattern: Regex,
    default_format: OEmbedFormat,
}

impl Endpoint {
    /// Start building an endpoint served at `uri_template`.
    pub fn builder(uri_template: impl Into<String>) -> EndpointBuilder {
        EndpointBuilder {
            definition: EndpointDefinition {
                url: uri_template.into(),
                ..Default::default()
            },
        }
    }

    /// Build an endpoint from its provider-list definition.
    pub fn new(definition: EndpointDefinition) -> Result<Self> {
        let EndpointDefinition {
            schemes,
            url,
            formats,
            discovery,
        } = definition;

        if url.trim().is_empty() {
            return Err(OEmbedError::ConfigurationError(
                "A non-empty URI template is required for an oEmbed endpoint".to_string(),
            ));
        }

        let mut supported_formats: Vec<OEmbedFormat> = Vec::with_capacity(formats.len());
        for format in formats {
            if !supported_formats.contains(&format) {
                supported_formats.push(format);
            }
        }
        if supported_formats.is_empty() {
            supported_formats.extend(OEmbedFormat::ALL);
        }
        let default_format = if supported_formats.contains(&PREFERRED_FORMAT) {
            PREFERRED_FORMAT
        } else {
            supported_formats[0]
        };

        let scheme_patterns = compile_scheme_patterns(&schemes)?;
        let uri_domain_pattern = compile_full_match(&wildcard_to_pattern(template_host(&url)))?;

        Ok(Self {
            uri_template: url,
            scheme_templates: schemes,
            discovery_enabled: discovery,
            supported_formats,
            scheme_patterns,
            uri_domain_pattern,
            default_format,
        })
    }

    pub fn uri_template(&self) -> &str {
        &self.uri_template
    }

    pub fn scheme_templates(&self) -> &[String] {
        &self.scheme_templates
    }

    /// Compiled scheme patterns, one or two per scheme template.
    pub fn scheme_patterns(&self) -> &[Regex] {
        &self.scheme_patterns
    }

    /// Pattern over locator hosts, used when no scheme templates are declared.
    pub fn uri_domain_pattern(&self) -> &Regex {
        &self.uri_domain_pattern
    }

    pub fn discovery_enabled(&self) -> bool {
        self.discovery_enabled
    }

    pub fn supported_formats(&self) -> &[OEmbedFormat] {
        &self.supported_formats
    }

    pub fn default_format(&self) -> OEmbedFormat {
        self.default_format
    }

    /// Whether this endpoint serves `resource_url`.
    ///
    /// With scheme patterns, any pattern must match the whole locator string.
    /// Without them, the URL-domain pattern must match the locator's host.
    pub fn matches(&self, resource_url: &Url) -> bool {
        if self.scheme_patterns.is_empty() {
            return resource_url
                .host_str()
                .is_some_and(|host| self.uri_domain_pattern.is_match(host));
        }

        self.scheme_patterns
            .iter()
            .any(|pattern| pattern.is_match(resource_url.as_str()))
    }
}

impl PartialEq for Endpoint {
    fn eq(&self, other: &Self) -> bool {
        // derived fields follow from these
        self.uri_template == other.uri_template
            && self.scheme_templates == other.scheme_templates
            && self.discovery_enabled == other.discovery_enabled
            && self.supported_formats == other.supported_formats
    }
}

impl Eq for Endpoint {}

impl TryFrom<EndpointDefinition> for Endpoint {
    type Error = OEmbedError;

    fn try_from(definition: EndpointDefinition) -> Result<Self> {
        Self::new(definition)
    }
}

impl From<Endpoint> for EndpointDefinition {
    fn from(endpoint: Endpoint) -> Self {
        Self {
            schemes: endpoint.scheme_templates,
            url: endpoint.uri_template,
            formats: endpoint.supported_formats,
            discovery: endpoint.discovery_enabled,
        }
    }
}

/// Builder for [`Endpoint`]. Only independent inputs can be set.
#[derive(Debug, Clone)]
pub struct EndpointBuilder {
    definition: EndpointDefinition,
}

impl EndpointBuilder {
    pub fn scheme(mut self, template: impl Into<String>) -> Self {
        self.definition.schemes.push(template.into());
        self
    }

    pub fn schemes<I, S>(mut self, templates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.definition
            .schemes
            .extend(templates.into_iter().map(Into::into));
        self
    }

    pub fn format(mut self, format: OEmbedFormat) -> Self {
        self.definition.formats.push(format);
        self
    }

    pub fn discovery(mut self, enabled: bool) -> Self {
        self.definition.discovery = enabled;
        self
    }

    pub fn build(self) -> Result<Endpoint> {
        Endpoint::new(self.definition)
    }
}

/// Textual wildcard translation: every `*` becomes a match-all group and
/// nothing else is escaped.
fn wildcard_to_pattern(template: &str) -> String {
    template.replace('*', "(.*)")
}

fn compile_full_match(pattern: &str) -> Result<Regex> {
    Regex::new(&format!("^(?:{pattern})$")).map_err(|e| {
        OEmbedError::ConfigurationError(format!("Invalid scheme pattern '{pattern}': {e}"))
    })
}

fn compile_scheme_patterns(templates: &[String]) -> Result<Vec<Regex>> {
    let mut sources: Vec<String> = Vec::with_capacity(templates.len() * 2);
    for template in templates {
        let pattern = wildcard_to_pattern(template);
        // providers listing only http:// schemes usually serve https:// too
        let widened = pattern.replacen("http:", "https:", 1);
        for source in [pattern, widened] {
            if !sources.contains(&source) {
                sources.push(source);
            }
        }
    }
    sources.iter().map(|s| compile_full_match(s)).collect()
}

/// Host part of a URL template: text after the last `://`, up to the first `/`.
fn template_host(uri_template: &str) -> &str {
    let without_scheme = uri_template
        .rsplit_once("://")
        .map_or(uri_template, |(_, rest)| rest);
    without_scheme.split('/').next().unwrap_or(without_scheme)
}
