//! Default Configuration Values
//!
//! This module centralizes the default values used throughout the client.

use std::time::Duration;

/// HTTP client default configurations
pub mod http {
    use super::*;

    /// Default request timeout for a single oEmbed fetch
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    /// Default connection timeout for establishing HTTP connections
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Default User-Agent string for HTTP requests
    pub const USER_AGENT: &str = concat!("oembed-client/", env!("CARGO_PKG_VERSION"));

    /// Media types sent in the `Accept` header of every oEmbed fetch
    pub const ACCEPT: &str = "application/json, text/xml";
}

/// Provider registry defaults
pub mod registry {
    /// The official oEmbed provider list
    pub const PROVIDERS_URL: &str = "https://oembed.com/providers.json";
}

/// Response cache defaults
pub mod cache {
    /// Maximum number of locators kept in the response cache
    pub const MAX_ENTRIES: usize = 1024;
}

/// oEmbed protocol constants
pub mod protocol {
    /// The only version allowed by the oEmbed spec
    pub const VERSION: &str = "1.0";

    /// Number of redirect hops the client follows before giving up
    pub const MAX_REDIRECTS: usize = 1;
}
