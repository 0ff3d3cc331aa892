//! Client configuration.
//!
//! Loaded from environment variables:
//! - `NETMAP_URL` - Base URL the resource paths are resolved against
//!   (default: `http://127.0.0.1:8080/`)
//! - `NETMAP_API_KEY` - Bearer token sent with every request (optional)

/// Default base URL for a local netmap server.
pub const DEFAULT_URL: &str = "http://127.0.0.1:8080/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_key: Option<String>,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let base_url = std::env::var("NETMAP_URL").unwrap_or_else(|_| DEFAULT_URL.to_string());
        let api_key = std::env::var("NETMAP_API_KEY").ok().filter(|k| !k.is_empty());
        Self::new(base_url, api_key)
    }

    /// Create with explicit configuration.
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
