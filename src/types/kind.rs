//! oEmbed resource types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::OEmbedError;

/// The `type` of an oEmbed response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OEmbedType {
    Link,
    Photo,
    Rich,
    Video,
}

impl OEmbedType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Link => "link",
            Self::Photo => "photo",
            Self::Rich => "rich",
            Self::Video => "video",
        }
    }
}

impl fmt::Display for OEmbedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OEmbedType {
    type Err = OEmbedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "link" => Ok(Self::Link),
            "photo" => Ok(Self::Photo),
            "rich" => Ok(Self::Rich),
            "video" => Ok(Self::Video),
            other => Err(OEmbedError::ParseError(format!(
                "Unknown oEmbed type: {other}"
            ))),
        }
    }
}
