//! Contribution statistics and the aggregator that builds them.

use crate::errors::{GitHubError, GitHubErrorKind, GitHubResult};
use crate::observability::TracingHooks;
use crate::services::{parse_repo_url, ApiSession};
use crate::types::{IssueHit, PullRequestDetail, Repository};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Key contributions are sorted by, always descending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Merged pull requests.
    #[default]
    #[serde(rename = "prs")]
    PrsMerged,
    /// Repository stars.
    Stars,
    /// Commits across merged pull requests.
    Commits,
}

impl SortKey {
    /// Name used on the command line and in JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PrsMerged => "prs",
            Self::Stars => "stars",
            Self::Commits => "commits",
        }
    }

    fn value(&self, contribution: &Contribution) -> u64 {
        match self {
            Self::PrsMerged => contribution.prs_merged,
            Self::Stars => u64::from(contribution.stars),
            Self::Commits => contribution.commits,
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = GitHubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "prs" => Ok(Self::PrsMerged),
            "stars" => Ok(Self::Stars),
            "commits" => Ok(Self::Commits),
            other => Err(GitHubError::configuration(format!(
                "Unknown sort key '{}', expected prs, stars or commits",
                other
            ))),
        }
    }
}

/// A user's contribution to one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contribution {
    /// `owner/repo`.
    #[serde(alias = "repo")]
    pub repo_full_name: String,
    /// Repository owner.
    pub owner: String,
    /// Repository name.
    pub repo_name: String,
    /// Repository description.
    #[serde(default)]
    pub description: String,
    /// Repository web URL.
    #[serde(rename = "repoURL")]
    pub repo_url: String,
    /// Star count; 0 when repository details were not fetched.
    #[serde(default)]
    pub stars: u32,
    /// Merged pull requests.
    pub prs_merged: u64,
    /// Commits across enriched pull requests.
    #[serde(default)]
    pub commits: u64,
    /// Lines added across enriched pull requests.
    #[serde(default)]
    pub additions: u64,
    /// Lines deleted across enriched pull requests.
    #[serde(default)]
    pub deletions: u64,
    /// Earliest merge.
    #[serde(alias = "firstContribution")]
    pub first_contribution_at: DateTime<Utc>,
    /// Latest merge.
    #[serde(alias = "lastContribution")]
    pub last_contribution_at: DateTime<Utc>,
}

impl Contribution {
    fn new(owner: &str, repo: &str, merged_at: DateTime<Utc>) -> Self {
        Self {
            repo_full_name: format!("{}/{}", owner, repo),
            owner: owner.to_string(),
            repo_name: repo.to_string(),
            description: String::new(),
            repo_url: format!("https://github.com/{}/{}", owner, repo),
            stars: 0,
            prs_merged: 0,
            commits: 0,
            additions: 0,
            deletions: 0,
            first_contribution_at: merged_at,
            last_contribution_at: merged_at,
        }
    }

    fn record_merge(&mut self, merged_at: DateTime<Utc>) {
        self.prs_merged += 1;
        self.first_contribution_at = self.first_contribution_at.min(merged_at);
        self.last_contribution_at = self.last_contribution_at.max(merged_at);
    }

    fn add_detail(&mut self, detail: &PullRequestDetail) {
        self.commits += detail.commits;
        self.additions += detail.additions;
        self.deletions += detail.deletions;
    }

    fn apply_repository(&mut self, repository: &Repository) {
        self.stars = repository.stargazers_count;
        self.description = repository.description.clone().unwrap_or_default();
        if !repository.html_url.is_empty() {
            self.repo_url = repository.html_url.clone();
        }
    }
}

/// Totals across all contributions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// Number of repositories.
    #[serde(rename = "totalProjects")]
    pub total_projects: usize,
    /// Sum of merged pull requests.
    #[serde(rename = "totalPRsMerged")]
    pub total_prs_merged: u64,
    /// Sum of commits.
    #[serde(rename = "totalCommits")]
    pub total_commits: u64,
    /// Sum of additions.
    #[serde(rename = "totalAdditions")]
    pub total_additions: u64,
    /// Sum of deletions.
    #[serde(rename = "totalDeletions")]
    pub total_deletions: u64,
}

impl Summary {
    /// Computes totals from a set of contributions.
    pub fn from_contributions(contributions: &[Contribution]) -> Self {
        contributions.iter().fold(
            Summary {
                total_projects: contributions.len(),
                ..Summary::default()
            },
            |mut summary, c| {
                summary.total_prs_merged += c.prs_merged;
                summary.total_commits += c.commits;
                summary.total_additions += c.additions;
                summary.total_deletions += c.deletions;
                summary
            },
        )
    }

    /// Additions plus deletions.
    pub fn total_lines_changed(&self) -> u64 {
        self.total_additions + self.total_deletions
    }
}

/// A finished statistics snapshot for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    /// GitHub login.
    pub username: String,
    /// When collection finished.
    pub generated_at: DateTime<Utc>,
    /// Totals.
    pub summary: Summary,
    /// Per-repository contributions, in the requested order.
    pub contributions: Vec<Contribution>,
}

impl Stats {
    /// The first `n` contributions.
    pub fn top(&self, n: usize) -> &[Contribution] {
        &self.contributions[..n.min(self.contributions.len())]
    }

    /// Serializes to pretty JSON.
    pub fn to_json_pretty(&self) -> GitHubResult<String> {
        serde_json::to_string_pretty(self).map_err(serialization_failure)
    }
}

fn serialization_failure(e: serde_json::Error) -> GitHubError {
    GitHubError::new(
        GitHubErrorKind::SerializationError,
        format!("Failed to serialize stats: {}", e),
    )
    .with_cause(e)
}

/// Source of enrichment details.
#[async_trait]
pub trait DetailSource: Send {
    /// Fetches one pull request.
    async fn pull_request(&mut self, owner: &str, repo: &str, number: u64) -> GitHubResult<PullRequestDetail>;

    /// Fetches one repository.
    async fn repository(&mut self, owner: &str, repo: &str) -> GitHubResult<Repository>;
}

#[async_trait]
impl DetailSource for ApiSession {
    async fn pull_request(&mut self, owner: &str, repo: &str, number: u64) -> GitHubResult<PullRequestDetail> {
        self.pull_requests().get(owner, repo, number).await
    }

    async fn repository(&mut self, owner: &str, repo: &str) -> GitHubResult<Repository> {
        self.repositories().get(owner, repo).await
    }
}

/// Folds merged pull request hits into per-repository contributions.
///
/// Enrichment failures that do not end the run are kept and reported by
/// [`finish`](Self::finish); the merge itself is always counted.
#[derive(Debug, Default)]
pub struct ContributionAggregator {
    include_pr_details: bool,
    include_repo_details: bool,
    contributions: HashMap<String, Contribution>,
    repo_cache: HashMap<String, Option<Repository>>,
    errors: Vec<GitHubError>,
}

impl ContributionAggregator {
    /// Creates an aggregator.
    pub fn new(include_pr_details: bool, include_repo_details: bool) -> Self {
        Self {
            include_pr_details,
            include_repo_details,
            ..Self::default()
        }
    }

    /// Number of repositories seen so far.
    pub fn len(&self) -> usize {
        self.contributions.len()
    }

    /// Returns true if nothing has been folded yet.
    pub fn is_empty(&self) -> bool {
        self.contributions.is_empty()
    }

    /// Errors recorded so far.
    pub fn errors(&self) -> &[GitHubError] {
        &self.errors
    }

    /// Folds one hit.
    ///
    /// Unmerged hits are skipped. Errors that end the run (rate limiting,
    /// authentication, cancellation) are returned; any other enrichment
    /// failure is recorded and the fold continues.
    pub async fn fold_hit<S>(&mut self, hit: &IssueHit, source: &mut S) -> GitHubResult<()>
    where
        S: DetailSource + ?Sized,
    {
        let Some(merged_at) = hit.merged_at() else {
            return Ok(());
        };

        let (owner, repo) = match parse_repo_url(&hit.repository_url) {
            Ok(parts) => parts,
            Err(e) => {
                TracingHooks::on_enrichment_failed(&hit.html_url, &e.to_string());
                self.errors.push(e);
                return Ok(());
            }
        };
        let key = format!("{}/{}", owner, repo);

        self.contributions
            .entry(key.clone())
            .or_insert_with(|| Contribution::new(&owner, &repo, merged_at))
            .record_merge(merged_at);

        if self.include_repo_details && !self.repo_cache.contains_key(&key) {
            let repository = self.enrich(&key, source.repository(&owner, &repo).await)?;
            if let (Some(repository), Some(contribution)) =
                (repository.as_ref(), self.contributions.get_mut(&key))
            {
                contribution.apply_repository(repository);
            }
            self.repo_cache.insert(key.clone(), repository);
        }

        if self.include_pr_details {
            let target = format!("{}#{}", key, hit.number);
            let detail = self.enrich(&target, source.pull_request(&owner, &repo, hit.number).await)?;
            if let (Some(detail), Some(contribution)) = (detail, self.contributions.get_mut(&key)) {
                contribution.add_detail(&detail);
            }
        }

        Ok(())
    }

    /// Folds hits in order, stopping at the first error that ends the run.
    pub async fn fold<'h, I, S>(&mut self, hits: I, source: &mut S) -> GitHubResult<()>
    where
        I: IntoIterator<Item = &'h IssueHit>,
        S: DetailSource + ?Sized,
    {
        for hit in hits {
            self.fold_hit(hit, source).await?;
        }
        Ok(())
    }

    /// Drops contributions that fail `keep`.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&Contribution) -> bool,
    {
        self.contributions.retain(|_, c| keep(c));
    }

    /// Applies the star threshold, recomputes the summary and sorts.
    ///
    /// Returns the stats together with the recorded enrichment errors.
    pub fn finish(
        self,
        username: &str,
        generated_at: DateTime<Utc>,
        min_stars: u32,
        sort_by: SortKey,
    ) -> (Stats, Vec<GitHubError>) {
        let mut contributions: Vec<Contribution> = self
            .contributions
            .into_values()
            .filter(|c| c.stars >= min_stars)
            .collect();

        contributions.sort_by(|a, b| compare(a, b, sort_by));

        let stats = Stats {
            username: username.to_string(),
            generated_at,
            summary: Summary::from_contributions(&contributions),
            contributions,
        };
        (stats, self.errors)
    }

    fn enrich<T>(&mut self, target: &str, result: GitHubResult<T>) -> GitHubResult<Option<T>> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_fatal_to_run() => Err(e),
            Err(e) => {
                TracingHooks::on_enrichment_failed(target, &e.to_string());
                self.errors.push(e);
                Ok(None)
            }
        }
    }
}

fn compare(a: &Contribution, b: &Contribution, key: SortKey) -> Ordering {
    key.value(b)
        .cmp(&key.value(a))
        .then_with(|| a.repo_full_name.cmp(&b.repo_full_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::fixtures;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    #[derive(Default)]
    struct FakeSource {
        failing_prs: HashSet<u64>,
        failing_repos: HashSet<String>,
        stars: HashMap<String, u32>,
        fatal: Option<GitHubErrorKind>,
        pr_calls: usize,
        repo_calls: usize,
    }

    #[async_trait]
    impl DetailSource for FakeSource {
        async fn pull_request(&mut self, owner: &str, repo: &str, number: u64) -> GitHubResult<PullRequestDetail> {
            self.pr_calls += 1;
            if let Some(kind) = self.fatal {
                return Err(GitHubError::new(kind, "fatal"));
            }
            if self.failing_prs.contains(&number) {
                return Err(GitHubError::from_status(
                    404,
                    &format!("{}/{}#{} gone", owner, repo, number),
                    None,
                ));
            }
            Ok(fixtures::pull_request(number, 2, 10, 5))
        }

        async fn repository(&mut self, owner: &str, repo: &str) -> GitHubResult<Repository> {
            self.repo_calls += 1;
            let key = format!("{}/{}", owner, repo);
            if self.failing_repos.contains(&key) {
                return Err(GitHubError::from_status(500, "boom", None));
            }
            let stars = self.stars.get(&key).copied().unwrap_or(0);
            Ok(fixtures::repository(owner, repo, stars))
        }
    }

    fn ts(value: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(value).unwrap().with_timezone(&Utc)
    }

    fn now() -> DateTime<Utc> {
        ts("2024-06-01T00:00:00Z")
    }

    #[tokio::test]
    async fn test_two_merges_same_repo() {
        let hits = vec![
            fixtures::hit("rust-lang", "rust", 2, Some("2024-03-01T00:00:00Z")),
            fixtures::hit("rust-lang", "rust", 1, Some("2024-01-01T00:00:00Z")),
        ];
        let mut source = FakeSource::default();
        let mut aggregator = ContributionAggregator::new(false, false);

        aggregator.fold(&hits, &mut source).await.unwrap();
        let (stats, errors) = aggregator.finish("octocat", now(), 0, SortKey::PrsMerged);

        assert!(errors.is_empty());
        assert_eq!(stats.contributions.len(), 1);
        let c = &stats.contributions[0];
        assert_eq!(c.repo_full_name, "rust-lang/rust");
        assert_eq!(c.prs_merged, 2);
        assert_eq!(c.first_contribution_at, ts("2024-01-01T00:00:00Z"));
        assert_eq!(c.last_contribution_at, ts("2024-03-01T00:00:00Z"));
        assert_eq!(source.pr_calls, 0);
        assert_eq!(source.repo_calls, 0);
    }

    #[tokio::test]
    async fn test_unmerged_hits_are_skipped() {
        let hits = vec![
            fixtures::hit("a", "one", 1, None),
            fixtures::hit("a", "two", 2, Some("2024-01-01T00:00:00Z")),
        ];
        let mut aggregator = ContributionAggregator::new(true, true);
        let mut source = FakeSource::default();

        aggregator.fold(&hits, &mut source).await.unwrap();
        let (stats, _) = aggregator.finish("octocat", now(), 0, SortKey::PrsMerged);

        assert_eq!(stats.summary.total_projects, 1);
        assert_eq!(stats.contributions[0].repo_name, "two");
        assert_eq!(source.pr_calls, 1);
    }

    #[tokio::test]
    async fn test_summary_matches_contributions_and_keys_unique() {
        let hits: Vec<_> = (0..12u64)
            .map(|n| {
                let repo = format!("repo-{}", n % 4);
                let day = format!("2024-01-{:02}T00:00:00Z", n + 1);
                fixtures::hit("org", &repo, n, Some(day.as_str()))
            })
            .collect();
        let mut aggregator = ContributionAggregator::new(true, false);

        aggregator.fold(&hits, &mut FakeSource::default()).await.unwrap();
        let (stats, _) = aggregator.finish("octocat", now(), 0, SortKey::Commits);

        let names: HashSet<_> = stats.contributions.iter().map(|c| &c.repo_full_name).collect();
        assert_eq!(names.len(), stats.contributions.len());
        assert_eq!(stats.summary.total_projects, 4);
        assert_eq!(
            stats.summary.total_prs_merged,
            stats.contributions.iter().map(|c| c.prs_merged).sum::<u64>()
        );
        assert_eq!(stats.summary.total_commits, 24);
        assert_eq!(stats.summary.total_lines_changed(), 180);
        for c in &stats.contributions {
            assert!(c.prs_merged >= 1);
            assert!(c.first_contribution_at <= c.last_contribution_at);
        }
    }

    #[tokio::test]
    async fn test_fold_is_order_independent() {
        let hits = vec![
            fixtures::hit("a", "x", 1, Some("2024-02-01T00:00:00Z")),
            fixtures::hit("b", "y", 2, Some("2024-01-15T00:00:00Z")),
            fixtures::hit("a", "x", 3, Some("2024-01-01T00:00:00Z")),
            fixtures::hit("b", "y", 4, Some("2024-05-01T00:00:00Z")),
            fixtures::hit("a", "x", 5, Some("2024-03-01T00:00:00Z")),
        ];
        let mut reversed = hits.clone();
        reversed.reverse();

        let mut forward = ContributionAggregator::new(true, true);
        forward.fold(&hits, &mut FakeSource::default()).await.unwrap();
        let mut backward = ContributionAggregator::new(true, true);
        backward.fold(&reversed, &mut FakeSource::default()).await.unwrap();

        let (a, _) = forward.finish("octocat", now(), 0, SortKey::PrsMerged);
        let (b, _) = backward.finish("octocat", now(), 0, SortKey::PrsMerged);
        assert_eq!(a, b);

        let x = &a.contributions[0];
        assert_eq!(x.repo_full_name, "a/x");
        assert_eq!(x.first_contribution_at, ts("2024-01-01T00:00:00Z"));
        assert_eq!(x.last_contribution_at, ts("2024-03-01T00:00:00Z"));
    }

    #[tokio::test]
    async fn test_pr_enrichment_failure_is_partial() {
        let hits = vec![
            fixtures::hit("acme", "widgets", 1, Some("2024-01-01T00:00:00Z")),
            fixtures::hit("acme", "widgets", 2, Some("2024-01-02T00:00:00Z")),
            fixtures::hit("acme", "widgets", 3, Some("2024-01-03T00:00:00Z")),
        ];
        let mut source = FakeSource {
            failing_prs: HashSet::from([2]),
            ..FakeSource::default()
        };
        let mut aggregator = ContributionAggregator::new(true, false);

        aggregator.fold(&hits, &mut source).await.unwrap();
        let (stats, errors) = aggregator.finish("octocat", now(), 0, SortKey::PrsMerged);

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind(), GitHubErrorKind::NotFound);
        assert_eq!(stats.summary.total_prs_merged, 3);
        assert_eq!(stats.summary.total_additions, 20);
        assert_eq!(stats.summary.total_deletions, 10);
    }

    #[tokio::test]
    async fn test_repository_details_are_cached() {
        let hits = vec![
            fixtures::hit("acme", "widgets", 1, Some("2024-01-01T00:00:00Z")),
            fixtures::hit("acme", "widgets", 2, Some("2024-01-02T00:00:00Z")),
            fixtures::hit("acme", "gadgets", 3, Some("2024-01-03T00:00:00Z")),
            fixtures::hit("acme", "gadgets", 4, Some("2024-01-04T00:00:00Z")),
        ];
        let mut source = FakeSource {
            failing_repos: HashSet::from(["acme/gadgets".to_string()]),
            stars: HashMap::from([("acme/widgets".to_string(), 42)]),
            ..FakeSource::default()
        };
        let mut aggregator = ContributionAggregator::new(false, true);

        aggregator.fold(&hits, &mut source).await.unwrap();
        let (stats, errors) = aggregator.finish("octocat", now(), 0, SortKey::Stars);

        assert_eq!(source.repo_calls, 2);
        assert_eq!(errors.len(), 1);
        assert_eq!(stats.contributions[0].repo_full_name, "acme/widgets");
        assert_eq!(stats.contributions[0].stars, 42);
        assert_eq!(stats.contributions[0].description, "The widgets project");
        assert_eq!(stats.contributions[0].repo_url, "https://github.com/acme/widgets");
        assert_eq!(stats.contributions[1].stars, 0);
    }

    #[tokio::test]
    async fn test_min_stars_filters_after_accumulation() {
        let hits = vec![
            fixtures::hit("big", "star", 1, Some("2024-01-01T00:00:00Z")),
            fixtures::hit("small", "fry", 2, Some("2024-01-01T00:00:00Z")),
        ];
        let mut source = FakeSource {
            stars: HashMap::from([("big/star".to_string(), 500), ("small/fry".to_string(), 3)]),
            ..FakeSource::default()
        };
        let mut aggregator = ContributionAggregator::new(true, true);

        aggregator.fold(&hits, &mut source).await.unwrap();
        let (stats, _) = aggregator.finish("octocat", now(), 100, SortKey::PrsMerged);

        assert_eq!(source.pr_calls, 2);
        assert_eq!(stats.summary.total_projects, 1);
        assert_eq!(stats.summary.total_prs_merged, 1);
        assert_eq!(stats.contributions[0].repo_full_name, "big/star");
    }

    #[tokio::test]
    async fn test_fatal_enrichment_error_aborts() {
        let hits = vec![
            fixtures::hit("a", "x", 1, Some("2024-01-01T00:00:00Z")),
            fixtures::hit("a", "x", 2, Some("2024-01-02T00:00:00Z")),
        ];
        let mut source = FakeSource {
            fatal: Some(GitHubErrorKind::RateLimited),
            ..FakeSource::default()
        };
        let mut aggregator = ContributionAggregator::new(true, false);

        let err = aggregator.fold(&hits, &mut source).await.unwrap_err();

        assert_eq!(err.kind(), GitHubErrorKind::RateLimited);
        assert_eq!(source.pr_calls, 1);
        assert_eq!(aggregator.len(), 1);
        assert!(aggregator.errors().is_empty());
    }

    #[tokio::test]
    async fn test_sort_ties_break_by_name() {
        let hits = vec![
            fixtures::hit("zeta", "z", 1, Some("2024-01-01T00:00:00Z")),
            fixtures::hit("alpha", "a", 2, Some("2024-01-01T00:00:00Z")),
            fixtures::hit("mid", "m", 3, Some("2024-01-01T00:00:00Z")),
            fixtures::hit("mid", "m", 4, Some("2024-01-02T00:00:00Z")),
        ];
        let mut aggregator = ContributionAggregator::new(false, false);
        aggregator.fold(&hits, &mut FakeSource::default()).await.unwrap();

        let (stats, _) = aggregator.finish("octocat", now(), 0, SortKey::PrsMerged);
        let order: Vec<_> = stats.contributions.iter().map(|c| c.repo_full_name.as_str()).collect();

        assert_eq!(order, vec!["mid/m", "alpha/a", "zeta/z"]);
        assert_eq!(stats.top(2).len(), 2);
        assert_eq!(stats.top(10).len(), 3);
    }

    #[test]
    fn test_sort_key_parsing() {
        assert_eq!("prs".parse::<SortKey>().unwrap(), SortKey::PrsMerged);
        assert_eq!("Stars".parse::<SortKey>().unwrap(), SortKey::Stars);
        assert_eq!(" COMMITS ".parse::<SortKey>().unwrap(), SortKey::Commits);
        assert!("lines".parse::<SortKey>().is_err());
        assert_eq!(serde_json::to_string(&SortKey::PrsMerged).unwrap(), "\"prs\"");
        assert_eq!(serde_json::to_string(&SortKey::Stars).unwrap(), "\"stars\"");
    }

    #[test]
    fn test_serialization_failure_kind() {
        let cause = <serde_json::Error as serde::ser::Error>::custom("unsupported value");
        let error = serialization_failure(cause);

        assert_eq!(error.kind(), GitHubErrorKind::SerializationError);
        assert!(error.message().starts_with("Failed to serialize stats"));
        assert!(!error.is_fatal_to_run());
    }

    #[test]
    fn test_stats_json_field_names() {
        let contribution = Contribution::new("acme", "widgets", ts("2024-01-01T00:00:00Z"));
        let stats = Stats {
            username: "octocat".to_string(),
            generated_at: now(),
            summary: Summary::from_contributions(std::slice::from_ref(&contribution)),
            contributions: vec![contribution],
        };

        let value = serde_json::to_value(&stats).unwrap();
        assert_eq!(value["generatedAt"], "2024-06-01T00:00:00Z");
        assert_eq!(value["summary"]["totalProjects"], 1);
        assert!(value["summary"].get("totalPRsMerged").is_some());
        let c = &value["contributions"][0];
        assert_eq!(c["repoFullName"], "acme/widgets");
        assert_eq!(c["repoURL"], "https://github.com/acme/widgets");
        assert!(c.get("firstContributionAt").is_some());
        assert!(c.get("prsMerged").is_some());
    }

    #[test]
    fn test_stats_accepts_legacy_names() {
        let json = r#"{
            "username": "octocat",
            "generatedAt": "2024-06-01T00:00:00Z",
            "summary": {"totalProjects": 1, "totalPRsMerged": 3, "totalCommits": 0,
                        "totalAdditions": 0, "totalDeletions": 0},
            "contributions": [{
                "repo": "acme/widgets", "owner": "acme", "repoName": "widgets",
                "description": "", "repoURL": "https://github.com/acme/widgets",
                "stars": 7, "prsMerged": 3, "commits": 0, "additions": 0, "deletions": 0,
                "firstContribution": "2024-01-01T00:00:00Z",
                "lastContribution": "2024-02-01T00:00:00Z"
            }]
        }"#;

        let stats: Stats = serde_json::from_str(json).unwrap();
        assert_eq!(stats.contributions[0].repo_full_name, "acme/widgets");
        assert_eq!(stats.contributions[0].last_contribution_at, ts("2024-02-01T00:00:00Z"));
    }
}
