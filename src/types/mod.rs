//! Wire types for the GitHub REST endpoints the collector reads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// GitHub user (minimal representation).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Username (login).
    pub login: String,
    /// User ID.
    #[serde(default)]
    pub id: u64,
    /// User type (User, Organization, Bot).
    #[serde(rename = "type", default)]
    pub user_type: String,
}

/// One page of `/search/issues` results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchPage {
    /// Total number of matches server-side.
    pub total_count: u64,
    /// Whether the search timed out before finding every match.
    #[serde(rename = "incomplete_results", default)]
    pub incomplete: bool,
    /// The hits on this page.
    #[serde(default)]
    pub items: Vec<IssueHit>,
}

/// A search result that may be a pull request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueHit {
    /// Issue/PR number.
    pub number: u64,
    /// Title.
    pub title: String,
    /// State (open/closed).
    pub state: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
    /// Close time.
    pub closed_at: Option<DateTime<Utc>>,
    /// Present only when the hit is a pull request.
    pub pull_request: Option<PullRequestRef>,
    /// API URL of the repository, e.g. `https://api.github.com/repos/owner/repo`.
    pub repository_url: String,
    /// HTML URL of the issue.
    #[serde(default)]
    pub html_url: String,
    /// Author.
    pub user: User,
}

impl IssueHit {
    /// Merge time, if this hit is a merged pull request.
    pub fn merged_at(&self) -> Option<DateTime<Utc>> {
        self.pull_request.as_ref().and_then(|pr| pr.merged_at)
    }
}

/// Pull request links embedded in a search hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequestRef {
    /// API URL.
    #[serde(default)]
    pub url: String,
    /// HTML URL.
    #[serde(default)]
    pub html_url: String,
    /// Merge time.
    pub merged_at: Option<DateTime<Utc>>,
}

/// `/repos/{owner}/{repo}/pulls/{number}` (the fields used here).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequestDetail {
    /// PR number.
    pub number: u64,
    /// State.
    #[serde(default)]
    pub state: String,
    /// Whether it has been merged.
    #[serde(default)]
    pub merged: bool,
    /// Merge time.
    pub merged_at: Option<DateTime<Utc>>,
    /// Commit count.
    #[serde(default)]
    pub commits: u64,
    /// Lines added.
    #[serde(default)]
    pub additions: u64,
    /// Lines deleted.
    #[serde(default)]
    pub deletions: u64,
    /// Files changed.
    #[serde(default)]
    pub changed_files: u64,
}

/// `/repos/{owner}/{repo}` (the fields used here).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    /// Repository name.
    pub name: String,
    /// Full name (owner/repo).
    pub full_name: String,
    /// Owner information.
    pub owner: User,
    /// Repository description.
    pub description: Option<String>,
    /// HTML URL.
    pub html_url: String,
    /// Whether the repository is a fork.
    #[serde(default)]
    pub fork: bool,
    /// Stargazer count.
    #[serde(default)]
    pub stargazers_count: u32,
    /// Primary language.
    pub language: Option<String>,
}

/// `/rate_limit` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitStatus {
    /// Per-resource budgets.
    pub resources: RateLimitResources,
}

/// Budgets for the resources this crate touches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitResources {
    /// Core REST budget.
    pub core: RateLimitBudget,
    /// Search budget.
    pub search: RateLimitBudget,
}

/// A single resource budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitBudget {
    /// Requests per window.
    pub limit: u32,
    /// Requests left.
    pub remaining: u32,
    /// Unix timestamp of the reset.
    pub reset: i64,
    /// Requests used.
    #[serde(default)]
    pub used: u32,
}

impl RateLimitBudget {
    /// Reset time as a timestamp.
    pub fn reset_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.reset, 0)
    }
}
