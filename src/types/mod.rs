//! Shared value types.

pub mod format;
pub mod http;
pub mod kind;

pub use format::OEmbedFormat;
pub use http::{HttpConfig, HttpConfigBuilder};
pub use kind::OEmbedType;
