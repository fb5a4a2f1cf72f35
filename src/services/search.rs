//! GitHub Search API operations.

use super::ApiSession;
use crate::errors::{GitHubError, GitHubErrorKind, GitHubResult};
use crate::pagination::LinkRelations;
use crate::types::SearchPage;
use serde::Serialize;

/// Query matching merged pull requests authored by `username`.
pub fn merged_prs_query(username: &str) -> String {
    format!("author:{} is:pr is:merged archived:false", username)
}

/// Service for search operations.
pub struct SearchService<'a> {
    session: &'a mut ApiSession,
}

impl<'a> SearchService<'a> {
    /// Creates a new search service.
    pub fn new(session: &'a mut ApiSession) -> Self {
        Self { session }
    }

    /// Fetches one page of issue search results, most recently updated first.
    pub async fn issues_page(
        &mut self,
        query: &str,
        page: u32,
        per_page: u32,
    ) -> GitHubResult<(SearchPage, LinkRelations)> {
        let params = SearchIssuesParams {
            q: query,
            page,
            per_page,
            sort: "updated",
            order: "desc",
        };
        let query_string = serde_urlencoded::to_string(&params).map_err(|e| {
            GitHubError::new(
                GitHubErrorKind::InvalidConfiguration,
                format!("Failed to encode search query: {}", e),
            )
        })?;

        let response = self
            .session
            .get(&format!("/search/issues?{}", query_string))
            .await?;
        let links = LinkRelations::from_headers(&response.headers);
        Ok((response.json()?, links))
    }
}

#[derive(Serialize)]
struct SearchIssuesParams<'q> {
    q: &'q str,
    page: u32,
    per_page: u32,
    sort: &'static str,
    order: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merged_prs_query() {
        assert_eq!(
            merged_prs_query("octocat"),
            "author:octocat is:pr is:merged archived:false"
        );
    }
}
