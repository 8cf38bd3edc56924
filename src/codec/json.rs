//! JSON wire encoding.

use crate::error::Result;
use crate::model::OEmbedResponse;

pub fn decode(body: &[u8]) -> Result<OEmbedResponse> {
    Ok(serde_json::from_slice(body)?)
}

pub fn encode(response: &OEmbedResponse) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(response)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OEmbedType;

    #[test]
    fn decodes_rich_response() {
        let body = br#"{
            "version": "1.0",
            "type": "rich",
            "provider_name": "Example",
            "html": "<blockquote>hi</blockquote>",
            "width": "550",
            "height": null,
            "cache_age": "3153600000"
        }"#;
        // height is required for rich content
        assert!(decode(body).is_err());

        let body = br#"{"type":"rich","html":"<p/>","width":"550","height":120,"cache_age":"60"}"#;
        let response = decode(body).unwrap();
        assert_eq!(response.kind(), OEmbedType::Rich);
        assert_eq!(response.width(), Some(550));
        assert_eq!(response.cache_age().map(|d| d.as_secs()), Some(60));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = decode(b"{not json").unwrap_err();
        assert!(matches!(err, crate::error::OEmbedError::ParseError(_)));
    }
}
