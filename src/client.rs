//! HTTP transport for REST collections.
//!
//! Maps the collection operations onto the usual REST convention:
//!
//! | operation | request                 |
//! |-----------|-------------------------|
//! | list      | `GET {url}`             |
//! | create    | `POST {url}`            |
//! | update    | `PUT {url}/{id}`        |
//! | patch     | `PATCH {url}/{id}`      |
//! | delete    | `DELETE {url}/{id}`     |

use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use thiserror::Error;

use crate::config::ClientConfig;
use crate::models::RecordId;

/// HTTP client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: API key required or invalid")]
    Unauthorized,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// HTTP client shared by collections talking to the same server.
#[derive(Debug, Clone)]
pub struct RestClient {
    base_url: String,
    api_key: Option<String>,
    client: Client,
}

impl RestClient {
    /// Create client from environment variables.
    pub fn from_env() -> Self {
        Self::new(ClientConfig::from_env())
    }

    pub fn new(config: ClientConfig) -> Self {
        Self {
            base_url: config.base_url,
            api_key: config.api_key,
            client: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve a resource path against the base URL. Absolute URLs are used
    /// as they are.
    pub fn resolve(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Build a request with optional auth header.
    fn request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        let url = self.resolve(url);
        tracing::debug!("{} {}", method, url);
        let mut req = self.client.request(method, &url);
        if let Some(ref key) = self.api_key {
            req = req.bearer_auth(key);
        }
        req
    }

    /// Handle response, converting HTTP errors to ClientError. A successful
    /// response without a body (204 No Content) yields `None`.
    async fn handle_response(
        &self,
        response: reqwest::Response,
    ) -> Result<Option<Value>, ClientError> {
        let status = response.status();
        let body = response.text().await?;
        if status.is_success() {
            if body.trim().is_empty() {
                return Ok(None);
            }
            Ok(Some(serde_json::from_str(&body)?))
        } else {
            tracing::warn!("Request failed with {}: {}", status, body);
            match status {
                StatusCode::NOT_FOUND => Err(ClientError::NotFound(body)),
                StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                    Err(ClientError::BadRequest(body))
                }
                StatusCode::UNAUTHORIZED => Err(ClientError::Unauthorized),
                StatusCode::CONFLICT => Err(ClientError::Conflict(body)),
                _ => Err(ClientError::Server(format!("{}: {}", status, body))),
            }
        }
    }

    /// Read the whole resource. An empty body is reported as `Value::Null`.
    pub async fn list(&self, url: &str) -> Result<Value, ClientError> {
        let response = self.request(Method::GET, url).send().await?;
        Ok(self.handle_response(response).await?.unwrap_or(Value::Null))
    }

    pub async fn create(&self, url: &str, body: &Value) -> Result<Option<Value>, ClientError> {
        let response = self.request(Method::POST, url).json(body).send().await?;
        self.handle_response(response).await
    }

    pub async fn update(
        &self,
        url: &str,
        id: &RecordId,
        body: &Value,
    ) -> Result<Option<Value>, ClientError> {
        let response = self
            .request(Method::PUT, &member_url(url, id))
            .json(body)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Send a partial update.
    pub async fn patch(
        &self,
        url: &str,
        id: &RecordId,
        body: &Value,
    ) -> Result<Option<Value>, ClientError> {
        let response = self
            .request(Method::PATCH, &member_url(url, id))
            .json(body)
            .send()
            .await?;
        self.handle_response(response).await
    }

    pub async fn delete(&self, url: &str, id: &RecordId) -> Result<(), ClientError> {
        let response = self
            .request(Method::DELETE, &member_url(url, id))
            .send()
            .await?;
        self.handle_response(response).await.map(|_| ())
    }
}

/// URL of a single member of the resource at `collection_url`.
pub fn member_url(collection_url: &str, id: &RecordId) -> String {
    format!(
        "{}/{}",
        collection_url.trim_end_matches('/'),
        id.as_path_segment()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> RestClient {
        RestClient::new(ClientConfig::new(base, None))
    }

    #[test]
    fn resolves_relative_paths_with_single_slash() {
        assert_eq!(
            client("http://netmap.local/").resolve("api/graph"),
            "http://netmap.local/api/graph"
        );
        assert_eq!(
            client("http://netmap.local").resolve("/api/graph"),
            "http://netmap.local/api/graph"
        );
    }

    #[test]
    fn keeps_absolute_urls() {
        assert_eq!(
            client("http://netmap.local/").resolve("https://other.host/api/graph"),
            "https://other.host/api/graph"
        );
    }

    #[test]
    fn member_url_appends_encoded_id() {
        assert_eq!(member_url("api/graph", &RecordId::Int(4)), "api/graph/4");
        assert_eq!(
            member_url("api/graph/", &RecordId::from("a b")),
            "api/graph/a%20b"
        );
    }
}
