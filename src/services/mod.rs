//! GitHub API service implementations.
//!
//! Every call goes through the session's governor, so one session is one
//! run's view of the API.

mod pull_requests;
mod rate_limit;
mod repositories;
mod search;

pub use pull_requests::*;
pub use rate_limit::*;
pub use repositories::*;
pub use search::*;

use crate::errors::GitHubResult;
use crate::resilience::RateLimitGovernor;
use crate::transport::{HttpResponse, HttpTransport};
use reqwest::Method;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// A transport paired with the governor of a single run.
pub struct ApiSession {
    transport: Arc<dyn HttpTransport>,
    governor: RateLimitGovernor,
}

impl ApiSession {
    /// Creates a session.
    pub fn new(transport: Arc<dyn HttpTransport>, governor: RateLimitGovernor) -> Self {
        Self {
            transport,
            governor,
        }
    }

    /// Gets the governor.
    pub fn governor(&self) -> &RateLimitGovernor {
        &self.governor
    }

    /// Makes a GET request, retried and paced by the governor.
    ///
    /// Returns only successful responses; anything else has been classified
    /// into an error.
    pub async fn get(&mut self, path: &str) -> GitHubResult<HttpResponse> {
        let transport = self.transport.as_ref();
        self.governor
            .execute(|| transport.execute(Method::GET, path, None))
            .await
    }

    /// Makes a GET request and decodes the JSON body.
    pub async fn get_json<T: DeserializeOwned>(&mut self, path: &str) -> GitHubResult<T> {
        self.get(path).await?.json()
    }

    /// Gets the search service.
    pub fn search(&mut self) -> SearchService<'_> {
        SearchService::new(self)
    }

    /// Gets the pull requests service.
    pub fn pull_requests(&mut self) -> PullRequestsService<'_> {
        PullRequestsService::new(self)
    }

    /// Gets the repositories service.
    pub fn repositories(&mut self) -> RepositoriesService<'_> {
        RepositoriesService::new(self)
    }

    /// Gets the rate limit service.
    pub fn rate_limit(&mut self) -> RateLimitService<'_> {
        RateLimitService::new(self)
    }
}
