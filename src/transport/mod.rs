//! HTTP transport layer.
//!
//! The transport executes one request and hands back whatever came over the
//! wire. It never looks at status codes; classifying a response is the
//! governor's job.

use crate::auth::AuthMethod;
use crate::config::GitHubConfig;
use crate::errors::{GitHubError, GitHubErrorKind, GitHubResult};
use crate::observability::TracingHooks;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use std::time::Instant;
use tracing::debug;

/// Media type GitHub recommends for REST requests.
pub const GITHUB_JSON_MEDIA_TYPE: &str = "application/vnd.github+json";

/// Header carrying the API version.
pub const API_VERSION_HEADER: &str = "X-GitHub-Api-Version";

/// A raw HTTP response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Status code.
    pub status: u16,
    /// Response headers.
    pub headers: HeaderMap,
    /// Response body.
    pub body: Bytes,
}

impl HttpResponse {
    /// Returns true for status codes below 400.
    pub fn is_success(&self) -> bool {
        self.status < 400
    }

    /// Body as text, lossily decoded.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// GitHub request id, if present.
    pub fn request_id(&self) -> Option<String> {
        self.headers
            .get("x-github-request-id")
            .and_then(|v| v.to_str().ok())
            .map(String::from)
    }

    /// Decodes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> GitHubResult<T> {
        serde_json::from_slice(&self.body).map_err(|e| {
            GitHubError::deserialization(format!("Failed to deserialize response: {}", e))
                .with_status(self.status)
                .with_cause(e)
        })
    }
}

/// HTTP transport abstraction for testability.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Executes a request against `path` (relative to the API origin, may
    /// include a query string).
    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<Bytes>,
    ) -> GitHubResult<HttpResponse>;
}

/// Reqwest-based transport against the configured API origin.
pub struct ReqwestTransport {
    http: Client,
    base_url: String,
    api_version: String,
    auth: Option<AuthMethod>,
}

impl ReqwestTransport {
    /// Creates a transport from the client configuration.
    pub fn new(config: &GitHubConfig) -> GitHubResult<Self> {
        config.validate()?;

        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| {
                GitHubError::new(
                    GitHubErrorKind::InvalidConfiguration,
                    format!("Failed to create HTTP client: {}", e),
                )
            })?;

        debug!(
            base_url = %config.base_url,
            api_version = %config.api_version,
            auth = config.auth.as_ref().map_or("none", AuthMethod::token_prefix),
            "Created GitHub transport"
        );

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_version: config.api_version.clone(),
            auth: config.auth.clone(),
        })
    }

    fn build_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn map_send_error(e: reqwest::Error) -> GitHubError {
        if e.is_timeout() {
            GitHubError::timeout(format!("Request timed out: {}", e)).with_cause(e)
        } else if e.is_connect() {
            GitHubError::new(
                GitHubErrorKind::ConnectionFailed,
                format!("Connection failed: {}", e),
            )
            .with_cause(e)
        } else {
            GitHubError::new(GitHubErrorKind::RequestFailed, format!("Request failed: {}", e))
                .with_cause(e)
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<Bytes>,
    ) -> GitHubResult<HttpResponse> {
        let url = self.build_url(path);
        TracingHooks::on_request_start(method.as_str(), &url);
        let started = Instant::now();

        let mut request = self
            .http
            .request(method.clone(), &url)
            .header(ACCEPT, GITHUB_JSON_MEDIA_TYPE)
            .header(API_VERSION_HEADER, &self.api_version);

        if let Some(ref auth) = self.auth {
            request = request.header(AUTHORIZATION, auth.authorization_header());
        }

        if let Some(bytes) = body {
            request = request.header(CONTENT_TYPE, "application/json").body(bytes);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                let error = Self::map_send_error(e);
                TracingHooks::on_request_error(method.as_str(), &url, &error.to_string());
                return Err(error);
            }
        };

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(|e| {
            GitHubError::new(
                GitHubErrorKind::RequestFailed,
                format!("Failed to read response body: {}", e),
            )
            .with_status(status)
            .with_cause(e)
        })?;

        TracingHooks::on_request_complete(method.as_str(), &url, status, started.elapsed());

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthMethod;

    #[test]
    fn test_build_url() {
        let config = GitHubConfig::builder()
            .base_url("https://api.github.com/")
            .auth(AuthMethod::token("test"))
            .build()
            .unwrap();
        let transport = ReqwestTransport::new(&config).unwrap();

        assert_eq!(
            transport.build_url("/repos/owner/repo"),
            "https://api.github.com/repos/owner/repo"
        );
        assert_eq!(
            transport.build_url("search/issues?q=a"),
            "https://api.github.com/search/issues?q=a"
        );
    }

    #[test]
    fn test_response_json_error_is_decode_error() {
        let response = HttpResponse {
            status: 200,
            headers: HeaderMap::new(),
            body: Bytes::from_static(b"not json"),
        };

        let result: GitHubResult<serde_json::Value> = response.json();
        assert_eq!(
            result.unwrap_err().kind(),
            GitHubErrorKind::DeserializationError
        );
    }
}
