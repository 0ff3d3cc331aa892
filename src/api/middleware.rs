//! API key authentication for the graph server.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};

/// Security configuration loaded from environment variables.
#[derive(Clone, Debug, Default)]
pub struct SecurityConfig {
    /// API key for authentication (from NETMAP_API_KEY)
    pub api_key: Option<String>,
}

impl SecurityConfig {
    /// Load security configuration from environment variables.
    pub fn from_env() -> Self {
        let api_key = std::env::var("NETMAP_API_KEY").ok().filter(|k| !k.is_empty());
        Self { api_key }
    }

    /// Create a config with no authentication (for local development/testing).
    pub fn disabled() -> Self {
        Self { api_key: None }
    }

    /// Create a config with authentication enabled.
    pub fn with_api_key(key: impl Into<String>) -> Self {
        Self {
            api_key: Some(key.into()),
        }
    }
}

/// Authentication middleware that checks for valid API key.
pub async fn auth_middleware(
    State(config): State<SecurityConfig>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let expected_key = match &config.api_key {
        Some(key) => key,
        None => return Ok(next.run(request).await),
    };

    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok());

    match auth_header.and_then(|h| h.strip_prefix("Bearer ")) {
        Some(token) if token == expected_key => Ok(next.run(request).await),
        Some(_) => {
            tracing::warn!("Invalid API key provided");
            Err(StatusCode::UNAUTHORIZED)
        }
        None => {
            tracing::warn!("Missing or malformed Authorization header");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}
