//! Wire formats an oEmbed endpoint can serve.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An oEmbed response format.
///
/// Declaration order matters: it is the iteration order used when an
/// endpoint does not declare its formats explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OEmbedFormat {
    Json,
    Xml,
}

impl OEmbedFormat {
    /// Every known format, in declaration order.
    pub const ALL: [OEmbedFormat; 2] = [OEmbedFormat::Json, OEmbedFormat::Xml];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Xml => "xml",
        }
    }
}

impl fmt::Display for OEmbedFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
