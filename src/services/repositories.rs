//! Repository operations.

use super::ApiSession;
use crate::errors::{GitHubError, GitHubErrorKind, GitHubResult};
use crate::types::Repository;

/// Service for repository operations.
pub struct RepositoriesService<'a> {
    session: &'a mut ApiSession,
}

impl<'a> RepositoriesService<'a> {
    /// Creates a new repositories service.
    pub fn new(session: &'a mut ApiSession) -> Self {
        Self { session }
    }

    /// Gets a repository.
    pub async fn get(&mut self, owner: &str, repo: &str) -> GitHubResult<Repository> {
        self.session
            .get_json(&format!("/repos/{}/{}", owner, repo))
            .await
    }
}

/// Splits a repository URL into `(owner, repo)` using its last two path
/// segments, e.g. `https://api.github.com/repos/rust-lang/rust`.
pub fn parse_repo_url(url: &str) -> GitHubResult<(String, String)> {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let mut segments = path.rsplit('/').filter(|s| !s.is_empty());

    match (segments.next(), segments.next()) {
        (Some(repo), Some(owner)) if !owner.ends_with(':') => {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => Err(GitHubError::new(
            GitHubErrorKind::DeserializationError,
            format!("Invalid repository URL: {}", url),
        )),
    }
}
