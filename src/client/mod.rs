//! Client facade for collecting contribution statistics.

use crate::config::{CollectOptions, GitHubConfig};
use crate::errors::{GitHubError, GitHubErrorKind, GitHubResult, StatsError, StatsResult};
use crate::observability::TracingHooks;
use crate::pagination::SearchWalker;
use crate::resilience::RateLimitGovernor;
use crate::services::{merged_prs_query, parse_repo_url, ApiSession};
use crate::stats::{ContributionAggregator, Stats};
use crate::transport::{HttpTransport, ReqwestTransport};
use crate::types::{IssueHit, RateLimitStatus};
use chrono::Utc;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Entry point for collecting a user's open source contribution stats.
///
/// The client itself holds no per-run state: every call builds a fresh
/// governor, so concurrent or consecutive runs never share quota or backoff
/// bookkeeping.
pub struct OssStatsClient {
    transport: Arc<dyn HttpTransport>,
    config: GitHubConfig,
}

impl OssStatsClient {
    /// Creates a client talking to the configured API origin.
    pub fn new(config: GitHubConfig) -> GitHubResult<Self> {
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self::with_transport(Arc::new(transport), config))
    }

    /// Creates a client over a custom transport.
    pub fn with_transport(transport: Arc<dyn HttpTransport>, config: GitHubConfig) -> Self {
        Self { transport, config }
    }

    /// Gets the configuration.
    pub fn config(&self) -> &GitHubConfig {
        &self.config
    }

    /// Collects stats for `username`.
    pub async fn collect(&self, username: &str, options: &CollectOptions) -> StatsResult<Stats> {
        self.collect_with_cancel(username, options, CancellationToken::new())
            .await
    }

    /// Collects stats for `username`, stopping early once `cancel` fires.
    ///
    /// A run that completes with suppressed enrichment failures resolves to
    /// [`StatsError::PartialResults`], which still carries the stats.
    pub async fn collect_with_cancel(
        &self,
        username: &str,
        options: &CollectOptions,
        cancel: CancellationToken,
    ) -> StatsResult<Stats> {
        let username = username.trim();
        if username.is_empty() {
            return Err(GitHubError::configuration("username must not be empty").into());
        }
        options.validate()?;

        info!(username = %username, max_prs = options.max_prs, "Collecting contribution stats");

        let mut session = self.session(cancel);
        let walk = SearchWalker::new(
            &mut session,
            merged_prs_query(username),
            options.per_page,
            options.max_prs,
        )
        .collect_all()
        .await;

        if walk.total_count == Some(0) {
            return Err(StatsError::UserNotFound {
                username: username.to_string(),
            });
        }

        let hits: Vec<IssueHit> = walk
            .hits
            .into_iter()
            .filter(|hit| !options.exclude_own_repos || !is_owned_by(hit, username))
            .collect();
        debug!(hits = hits.len(), total_count = ?walk.total_count, "Search finished");

        let mut search_errors = Vec::new();
        if let Some(error) = walk.error {
            if walk.total_count.is_none() || error.is_fatal_to_run() {
                let partial = match walk.total_count {
                    Some(_) => {
                        // No enrichment: the run is already over.
                        let mut aggregator = ContributionAggregator::new(false, false);
                        aggregator.fold(&hits, &mut session).await?;
                        Some(self.finish(aggregator, username, options).0)
                    }
                    None => None,
                };
                return Err(run_failure(error, partial));
            }
            search_errors.push(error);
        }

        let mut aggregator =
            ContributionAggregator::new(options.include_pr_details, options.include_repo_details);
        if let Err(error) = aggregator.fold(&hits, &mut session).await {
            let (partial, _) = self.finish(aggregator, username, options);
            return Err(run_failure(error, Some(partial)));
        }

        let (stats, enrichment_errors) = self.finish(aggregator, username, options);
        let mut errors = search_errors;
        errors.extend(enrichment_errors);

        TracingHooks::on_collect_complete(
            username,
            stats.summary.total_projects,
            stats.summary.total_prs_merged,
            errors.len(),
            session.governor().metrics().snapshot(),
        );

        if errors.is_empty() {
            Ok(stats)
        } else {
            Err(StatsError::PartialResults {
                stats: Box::new(stats),
                errors,
            })
        }
    }

    /// Gets the current core and search quota.
    pub async fn rate_limit_status(&self) -> GitHubResult<RateLimitStatus> {
        self.session(CancellationToken::new())
            .rate_limit()
            .status()
            .await
    }

    fn session(&self, cancel: CancellationToken) -> ApiSession {
        let governor = RateLimitGovernor::new(self.config.rate_limit.clone(), cancel);
        ApiSession::new(Arc::clone(&self.transport), governor)
    }

    fn finish(
        &self,
        aggregator: ContributionAggregator,
        username: &str,
        options: &CollectOptions,
    ) -> (Stats, Vec<GitHubError>) {
        aggregator.finish(username, Utc::now(), options.min_stars, options.sort_by)
    }
}

fn is_owned_by(hit: &IssueHit, username: &str) -> bool {
    parse_repo_url(&hit.repository_url)
        .map(|(owner, _)| owner.eq_ignore_ascii_case(username))
        .unwrap_or(false)
}

fn run_failure(error: GitHubError, partial: Option<Stats>) -> StatsError {
    let partial = partial.map(Box::new);
    match error.kind() {
        GitHubErrorKind::AuthenticationFailed => StatsError::AuthenticationFailed {
            message: error.message().to_string(),
        },
        GitHubErrorKind::RateLimited => StatsError::RateLimited {
            reset_at: error.rate_limit().map(|info| info.reset_at),
            partial,
        },
        GitHubErrorKind::Cancelled => StatsError::Cancelled { partial },
        _ => StatsError::Api(error),
    }
}
