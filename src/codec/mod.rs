//! Body decoding for oEmbed responses.
//!
//! The [`Codec`] picks a wire encoding from the response `Content-Type` and
//! turns the body into a validated [`OEmbedResponse`]. Anything it cannot
//! decode yields `None`.

pub mod json;
pub mod xml;

use tracing::info;

use crate::error::Result;
use crate::model::OEmbedResponse;
use crate::types::OEmbedFormat;

/// Decodes response bodies by content type.
pub trait Codec: Send + Sync {
    fn decode(&self, body: &[u8], content_type: &str) -> Option<OEmbedResponse>;
}

/// JSON (`application/json`) and XML (`text/xml`) decoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCodec;

impl DefaultCodec {
    pub fn new() -> Self {
        Self
    }

    /// Decode `body` as `format`, surfacing the failure.
    pub fn decode_as(&self, format: OEmbedFormat, body: &[u8]) -> Result<OEmbedResponse> {
        match format {
            OEmbedFormat::Json => json::decode(body),
            OEmbedFormat::Xml => xml::decode(body),
        }
    }

    /// Encode `response` as `format`.
    ///
    /// Only JSON preserves every response. XML carries text, so non-string
    /// custom property values decode back as strings, and custom property
    /// keys must be valid XML element names.
    pub fn encode(&self, format: OEmbedFormat, response: &OEmbedResponse) -> Result<Vec<u8>> {
        match format {
            OEmbedFormat::Json => json::encode(response),
            OEmbedFormat::Xml => xml::encode(response),
        }
    }
}

impl Codec for DefaultCodec {
    fn decode(&self, body: &[u8], content_type: &str) -> Option<OEmbedResponse> {
        let Some(format) = format_for_content_type(content_type) else {
            info!(content_type, "Unsupported oEmbed content type");
            return None;
        };

        match self.decode_as(format, body) {
            Ok(response) => Some(response),
            Err(e) => {
                info!(%format, error = %e, "Failed to decode oEmbed response");
                None
            }
        }
    }
}

/// Wire format for a `Content-Type` value, compared on its media type only.
pub fn format_for_content_type(content_type: &str) -> Option<OEmbedFormat> {
    let essence = content_type.split(';').next().unwrap_or_default().trim();
    if essence.eq_ignore_ascii_case("application/json") {
        Some(OEmbedFormat::Json)
    } else if essence.eq_ignore_ascii_case("text/xml") {
        Some(OEmbedFormat::Xml)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OEmbedType;

    #[test]
    fn content_type_selects_format() {
        let cases = [
            ("application/json", Some(OEmbedFormat::Json)),
            ("application/json; charset=utf-8", Some(OEmbedFormat::Json)),
            ("Application/JSON", Some(OEmbedFormat::Json)),
            ("text/xml", Some(OEmbedFormat::Xml)),
            ("text/xml;charset=UTF-8", Some(OEmbedFormat::Xml)),
            ("text/html", None),
            ("", None),
        ];
        for (content_type, expected) in cases {
            assert_eq!(format_for_content_type(content_type), expected, "{content_type}");
        }
    }

    #[test]
    fn decode_dispatches_on_content_type() {
        let codec = DefaultCodec::new();
        let json = br#"{"type":"link","version":"1.0","title":"Hello"}"#;
        let xml = b"<oembed><type>link</type><version>1.0</version><title>Hello</title></oembed>";

        let from_json = codec.decode(json, "application/json").unwrap();
        let from_xml = codec.decode(xml, "text/xml").unwrap();
        assert_eq!(from_json, from_xml);
        assert_eq!(from_json.kind(), OEmbedType::Link);

        assert!(codec.decode(json, "text/html").is_none());
        assert!(codec.decode(json, "text/xml").is_none());
    }

    #[test]
    fn invalid_response_decodes_to_none() {
        let codec = DefaultCodec::new();
        assert!(codec.decode(br#"{"type":"photo"}"#, "application/json").is_none());
    }
}
