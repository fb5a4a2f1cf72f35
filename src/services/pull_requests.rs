//! Pull request operations.

use super::ApiSession;
use crate::errors::GitHubResult;
use crate::types::PullRequestDetail;

/// Service for pull request operations.
pub struct PullRequestsService<'a> {
    session: &'a mut ApiSession,
}

impl<'a> PullRequestsService<'a> {
    /// Creates a new pull requests service.
    pub fn new(session: &'a mut ApiSession) -> Self {
        Self { session }
    }

    /// Gets a pull request with its commit and line counts.
    pub async fn get(&mut self, owner: &str, repo: &str, number: u64) -> GitHubResult<PullRequestDetail> {
        self.session
            .get_json(&format!("/repos/{}/{}/pulls/{}", owner, repo, number))
            .await
    }
}
