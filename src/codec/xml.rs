//! XML wire encoding.
//!
//! Documents are rooted at an `oembed` element whose children carry the
//! response fields as text:
//!
//! ```xml
//! <?xml version="1.0" encoding="utf-8" standalone="yes"?>
//! <oembed>
//!   <version>1.0</version>
//!   <type>link</type>
//! </oembed>
//! ```

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use serde_json::{Map, Value};

use crate::error::{OEmbedError, Result};
use crate::model::OEmbedResponse;

const ROOT: &str = "oembed";

fn xml_error(err: impl std::fmt::Display) -> OEmbedError {
    OEmbedError::ParseError(format!("XML: {err}"))
}

/// Decode an `<oembed>` document. Every field arrives as a string; the
/// response model parses numeric fields from their text.
pub fn decode(body: &[u8]) -> Result<OEmbedResponse> {
    let fields = read_fields(body)?;
    Ok(serde_json::from_value(Value::Object(fields))?)
}

fn read_fields(body: &[u8]) -> Result<Map<String, Value>> {
    let mut reader = Reader::from_reader(body);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut fields = Map::new();
    let mut depth = 0usize;
    let mut seen_root = false;
    let mut current: Option<(String, String)> = None;

    loop {
        match reader.read_event_into(&mut buf).map_err(xml_error)? {
            Event::Start(element) => {
                depth += 1;
                let name = String::from_utf8_lossy(element.local_name().as_ref()).into_owned();
                match depth {
                    1 => {
                        if name != ROOT {
                            return Err(xml_error(format!("unexpected root element <{name}>")));
                        }
                        seen_root = true;
                    }
                    2 => current = Some((name, String::new())),
                    _ => {}
                }
            }
            Event::Empty(element) => {
                let name = String::from_utf8_lossy(element.local_name().as_ref()).into_owned();
                match depth {
                    0 if name == ROOT => seen_root = true,
                    0 => return Err(xml_error(format!("unexpected root element <{name}>"))),
                    1 => {
                        fields.insert(name, Value::String(String::new()));
                    }
                    _ => {}
                }
            }
            Event::Text(text) => {
                if depth == 2 {
                    if let Some((_, value)) = current.as_mut() {
                        value.push_str(&text.unescape().map_err(xml_error)?);
                    }
                }
            }
            Event::CData(data) => {
                if depth == 2 {
                    if let Some((_, value)) = current.as_mut() {
                        value.push_str(&String::from_utf8_lossy(&data.into_inner()));
                    }
                }
            }
            Event::End(_) => {
                if depth == 2 {
                    if let Some((name, value)) = current.take() {
                        fields.insert(name, Value::String(value.trim().to_string()));
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !seen_root {
        return Err(xml_error("missing <oembed> root element"));
    }
    Ok(fields)
}

/// Encode a response as an `<oembed>` document, one child per present field.
///
/// Elements carry only text, so custom property values that are numbers,
/// booleans or structures are written in their JSON form and decode back as
/// strings. A custom property whose key is not a valid XML element name
/// fails with `ParseError`.
pub fn encode(response: &OEmbedResponse) -> Result<Vec<u8>> {
    let Value::Object(fields) = serde_json::to_value(response)? else {
        return Err(OEmbedError::ParseError(
            "response did not serialize to an object".to_string(),
        ));
    };
    if let Some(name) = fields.keys().find(|name| !is_element_name(name)) {
        return Err(OEmbedError::ParseError(format!(
            "custom property '{name}' is not a valid XML element name"
        )));
    }

    let mut writer = Writer::new(Vec::new());
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), Some("yes"))))
        .map_err(xml_error)?;
    writer
        .write_event(Event::Start(BytesStart::new(ROOT)))
        .map_err(xml_error)?;

    for (name, value) in &fields {
        let text = match value {
            Value::Null => continue,
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        writer
            .write_event(Event::Start(BytesStart::new(name.as_str())))
            .map_err(xml_error)?;
        writer
            .write_event(Event::Text(BytesText::new(&text)))
            .map_err(xml_error)?;
        writer
            .write_event(Event::End(BytesEnd::new(name.as_str())))
            .map_err(xml_error)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new(ROOT)))
        .map_err(xml_error)?;
    Ok(writer.into_inner())
}

/// XML `Name` without namespace prefixes.
fn is_element_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_alphabetic() || first == '_')
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}
