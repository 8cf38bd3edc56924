//! Lenient deserializers for oEmbed wire fields.
//!
//! Providers send sizes and ages both as numbers and as numeric strings, and
//! XML bodies only ever carry text.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Unsigned(u64),
    Float(f64),
    Text(String),
}

pub fn option_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrText>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrText::Unsigned(n)) => Ok(Some(n)),
        Some(NumberOrText::Float(f)) => {
            if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 {
                Ok(Some(f as u64))
            } else {
                Err(D::Error::custom(format!("expected a non-negative integer, got {f}")))
            }
        }
        Some(NumberOrText::Text(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse::<u64>()
                .map(Some)
                .map_err(|e| D::Error::custom(format!("invalid integer '{trimmed}': {e}")))
        }
    }
}

pub fn option_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    option_u64(deserializer)?
        .map(|n| u32::try_from(n).map_err(D::Error::custom))
        .transpose()
}

/// `version` arrives as `"1.0"`, as the number `1.0`, or as `null`.
pub fn version<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s.trim().to_string()),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Null => Ok(crate::defaults::protocol::VERSION.to_string()),
        other => Err(D::Error::custom(format!("invalid version: {other}"))),
    }
}
