//! Rate limit status.

use super::ApiSession;
use crate::errors::GitHubResult;
use crate::types::RateLimitStatus;

/// Service for the rate limit endpoint.
pub struct RateLimitService<'a> {
    session: &'a mut ApiSession,
}

impl<'a> RateLimitService<'a> {
    /// Creates a new rate limit service.
    pub fn new(session: &'a mut ApiSession) -> Self {
        Self { session }
    }

    /// Gets the current core and search budgets. Does not count against them.
    pub async fn status(&mut self) -> GitHubResult<RateLimitStatus> {
        self.session.get_json("/rate_limit").await
    }
}
