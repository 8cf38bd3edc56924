//! oEmbed data model: endpoints, providers, requests and responses.

pub mod endpoint;
mod lenient;
pub mod provider;
pub mod request;
pub mod response;

pub use endpoint::{Endpoint, EndpointBuilder, EndpointDefinition};
pub use provider::{Provider, ProviderDefinition};
pub use request::{OEmbedRequest, OEmbedRequestBuilder};
pub use response::{OEmbedResponse, OEmbedResponseBuilder};
