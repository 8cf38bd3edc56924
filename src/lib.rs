//! # oembed-client - oEmbed discovery for Rust
//!
//! Resolves a resource URL (a page for a photo, video or link) to the oEmbed
//! endpoint of the provider that hosts it, fetches the embedding metadata,
//! validates it against the fields its type requires and caches it for as
//! long as the provider allows.
//!
#![deny(unsafe_code)]

//! ## Features
//!
//! - **Provider registry**: load the official `providers.json` (or your own)
//!   once; endpoint resolution tries the provider's own domain first and
//!   falls back to every provider's URL schemes.
//! - **Validated responses**: a `photo` always has `url`/`width`/`height`,
//!   `rich` and `video` always have `html`/`width`/`height`.
//! - **JSON and XML**: both wire encodings, chosen by `Content-Type`.
//! - **Caching**: responses live for their `cache_age`; concurrent misses for
//!   one resource share a single fetch.
//! - **Pluggable transport**: reqwest by default, any [`transport::Transport`]
//!   for tests or custom stacks.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use oembed_client::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = Registry::load_default(&HttpConfig::default()).await?;
//!     let client = OEmbedClient::builder().registry(registry).build()?;
//!
//!     let request = OEmbedRequest::parse("https://vimeo.com/76979871")?;
//!     match client.execute(&request).await {
//!         Some(response) => println!("{} embed: {:?}", response.kind(), response.html()),
//!         None => println!("no embed available"),
//!     }
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod client;
pub mod codec;
pub mod defaults;
pub mod error;
pub mod model;
pub mod registry;
#[cfg(feature = "telemetry")]
pub mod telemetry;
pub mod transport;
pub mod types;

pub use client::{OEmbedClient, OEmbedClientBuilder};
pub use error::{OEmbedError, Result};
pub use registry::Registry;

/// Commonly used types.
pub mod prelude {
    pub use crate::cache::{CacheConfig, ResponseCache, ResponseLoader};
    pub use crate::client::{OEmbedClient, OEmbedClientBuilder};
    pub use crate::codec::{Codec, DefaultCodec};
    pub use crate::error::{OEmbedError, Result};
    pub use crate::model::{
        Endpoint, EndpointBuilder, OEmbedRequest, OEmbedRequestBuilder, OEmbedResponse,
        OEmbedResponseBuilder, Provider,
    };
    pub use crate::registry::Registry;
    pub use crate::transport::{StatusCategory, Transport, TransportResponse};
    pub use crate::types::{HttpConfig, OEmbedFormat, OEmbedType};
}
