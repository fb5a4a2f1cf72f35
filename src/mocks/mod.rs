//! Mock transport and fixtures for testing without the network.

use crate::errors::GitHubResult;
use crate::transport::{HttpResponse, HttpTransport};
use crate::types::{IssueHit, PullRequestDetail, PullRequestRef, Repository, SearchPage, User};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock};

/// A mock response.
#[derive(Debug, Clone)]
pub struct MockResponse {
    /// Status code.
    pub status: u16,
    /// Response body.
    pub body: String,
    /// Headers.
    pub headers: HashMap<String, String>,
}

impl MockResponse {
    /// Creates a response with an arbitrary status and raw body.
    pub fn status(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            headers: HashMap::new(),
        }
    }

    /// Creates a successful response with the given body.
    pub fn ok<T: Serialize>(body: &T) -> Self {
        Self::status(200, &serde_json::to_string(body).unwrap_or_default())
    }

    /// Creates a 404 Not Found response.
    pub fn not_found(message: &str) -> Self {
        Self::status(404, &error_body(message))
    }

    /// Creates a 401 Unauthorized response.
    pub fn unauthorized(message: &str) -> Self {
        Self::status(401, &error_body(message))
    }

    /// Creates a 403 Forbidden response.
    pub fn forbidden(message: &str) -> Self {
        Self::status(403, &error_body(message))
    }

    /// Creates a primary rate limit response: 403 with zero quota left.
    pub fn rate_limited_until(reset_at: DateTime<Utc>) -> Self {
        Self::status(403, &error_body("API rate limit exceeded")).with_rate_limit(0, reset_at.timestamp())
    }

    /// Creates a 500 Internal Server Error response.
    pub fn server_error(message: &str) -> Self {
        Self::status(500, &error_body(message))
    }

    /// Adds a header to the response.
    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_lowercase(), value.to_string());
        self
    }

    /// Adds rate limit headers.
    pub fn with_rate_limit(self, remaining: u32, reset_timestamp: i64) -> Self {
        self.with_header("x-ratelimit-remaining", &remaining.to_string())
            .with_header("x-ratelimit-reset", &reset_timestamp.to_string())
    }

    /// Adds a `Link` header.
    pub fn with_link(self, link: &str) -> Self {
        self.with_header("link", link)
    }

    /// Converts into the transport's response type.
    pub fn into_http(self) -> HttpResponse {
        let mut headers = HeaderMap::new();
        for (key, value) in &self.headers {
            if let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(key.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                headers.insert(name, value);
            }
        }
        HttpResponse {
            status: self.status,
            headers,
            body: Bytes::from(self.body),
        }
    }
}

fn error_body(message: &str) -> String {
    serde_json::json!({
        "message": message,
        "documentation_url": "https://docs.github.com/rest"
    })
    .to_string()
}

/// A recorded mock request.
#[derive(Debug, Clone)]
pub struct MockRequest {
    /// HTTP method.
    pub method: String,
    /// Request path without the query string.
    pub path: String,
    /// Query string, if any.
    pub query: Option<String>,
}

impl MockRequest {
    /// Value of a query parameter.
    pub fn query_param(&self, key: &str) -> Option<String> {
        let query = self.query.as_deref()?;
        serde_urlencoded::from_str::<Vec<(String, String)>>(query)
            .ok()?
            .into_iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }
}

/// Scripted in-memory transport.
///
/// Responses registered for a method and path are served once each in
/// registration order; unmatched requests get a 404.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    responses: Arc<RwLock<HashMap<String, VecDeque<MockResponse>>>>,
    requests: Arc<RwLock<Vec<MockRequest>>>,
}

impl MockTransport {
    /// Creates a new mock transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a response for a given method and path (query ignored).
    pub fn register(&self, method: &str, path: &str, response: MockResponse) {
        let key = format!("{}:{}", method.to_uppercase(), path);
        let mut store = self.responses.write().unwrap();
        store.entry(key).or_default().push_back(response);
    }

    /// Registers a GET response.
    pub fn on_get(&self, path: &str, response: MockResponse) {
        self.register("GET", path, response);
    }

    /// Gets all recorded requests.
    pub fn requests(&self) -> Vec<MockRequest> {
        self.requests.read().unwrap().clone()
    }

    /// Gets requests whose path starts with `prefix`.
    pub fn requests_matching(&self, prefix: &str) -> Vec<MockRequest> {
        self.requests
            .read()
            .unwrap()
            .iter()
            .filter(|r| r.path.starts_with(prefix))
            .cloned()
            .collect()
    }

    /// Gets the count of requests made.
    pub fn request_count(&self) -> usize {
        self.requests.read().unwrap().len()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn execute(
        &self,
        method: Method,
        path: &str,
        _body: Option<Bytes>,
    ) -> GitHubResult<HttpResponse> {
        let (path, query) = match path.split_once('?') {
            Some((p, q)) => (p.to_string(), Some(q.to_string())),
            None => (path.to_string(), None),
        };

        self.requests.write().unwrap().push(MockRequest {
            method: method.to_string(),
            path: path.clone(),
            query,
        });

        let key = format!("{}:{}", method.as_str(), path);
        let response = self
            .responses
            .write()
            .unwrap()
            .get_mut(&key)
            .and_then(|queue| queue.pop_front());

        Ok(response
            .unwrap_or_else(|| MockResponse::not_found(&format!("No mock response for {} {}", method, path)))
            .into_http())
    }
}

/// Test fixtures for search hits and enrichment payloads.
pub mod fixtures {
    use super::*;

    fn timestamp(value: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(value)
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or_else(|_| panic!("invalid fixture timestamp {}", value))
    }

    /// Creates a test user.
    pub fn user(login: &str) -> User {
        User {
            login: login.to_string(),
            id: 1,
            user_type: "User".to_string(),
        }
    }

    /// Creates a search hit for a pull request in `owner/repo`.
    /// `merged_at` is RFC 3339; `None` makes an unmerged PR.
    pub fn hit(owner: &str, repo: &str, number: u64, merged_at: Option<&str>) -> IssueHit {
        let merged = merged_at.map(timestamp);
        IssueHit {
            number,
            title: format!("Test PR #{}", number),
            state: "closed".to_string(),
            created_at: timestamp("2023-12-01T00:00:00Z"),
            updated_at: merged.unwrap_or_else(|| timestamp("2023-12-02T00:00:00Z")),
            closed_at: merged,
            pull_request: Some(PullRequestRef {
                url: format!("https://api.github.com/repos/{}/{}/pulls/{}", owner, repo, number),
                html_url: format!("https://github.com/{}/{}/pull/{}", owner, repo, number),
                merged_at: merged,
            }),
            repository_url: format!("https://api.github.com/repos/{}/{}", owner, repo),
            html_url: format!("https://github.com/{}/{}/pull/{}", owner, repo, number),
            user: user("octocat"),
        }
    }

    /// Creates a search page.
    pub fn search_page(total_count: u64, items: Vec<IssueHit>) -> SearchPage {
        SearchPage {
            total_count,
            incomplete: false,
            items,
        }
    }

    /// Creates PR detail with the given counts.
    pub fn pull_request(number: u64, commits: u64, additions: u64, deletions: u64) -> PullRequestDetail {
        PullRequestDetail {
            number,
            state: "closed".to_string(),
            merged: true,
            merged_at: Some(timestamp("2024-01-01T00:00:00Z")),
            commits,
            additions,
            deletions,
            changed_files: 1,
        }
    }

    /// Creates a test repository.
    pub fn repository(owner: &str, name: &str, stars: u32) -> Repository {
        Repository {
            name: name.to_string(),
            full_name: format!("{}/{}", owner, name),
            owner: user(owner),
            description: Some(format!("The {} project", name)),
            html_url: format!("https://github.com/{}/{}", owner, name),
            fork: false,
            stargazers_count: stars,
            language: Some("Rust".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_transport_serves_in_order() {
        let mock = MockTransport::new();
        let repo = fixtures::repository("octocat", "hello-world", 10);
        mock.on_get("/repos/octocat/hello-world", MockResponse::ok(&repo));

        let first = mock
            .execute(Method::GET, "/repos/octocat/hello-world", None)
            .await
            .unwrap();
        let second = mock
            .execute(Method::GET, "/repos/octocat/hello-world?x=1", None)
            .await
            .unwrap();

        assert_eq!(first.status, 200);
        assert_eq!(second.status, 404);
        assert_eq!(mock.request_count(), 2);
        assert_eq!(mock.requests()[1].query_param("x").as_deref(), Some("1"));
    }

    #[test]
    fn test_fixtures() {
        let hit = fixtures::hit("rust-lang", "rust", 1, Some("2024-01-01T00:00:00Z"));
        assert!(hit.merged_at().is_some());
        assert_eq!(hit.repository_url, "https://api.github.com/repos/rust-lang/rust");

        let unmerged = fixtures::hit("rust-lang", "rust", 2, None);
        assert!(unmerged.merged_at().is_none());
    }
}
