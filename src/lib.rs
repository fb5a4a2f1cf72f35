//! # gh-oss-stats
//!
//! Collects a GitHub user's merged pull requests to repositories they do not
//! own and folds them into per-repository contribution statistics:
//! - Rate limit aware requests (quota header waits, exponential backoff)
//! - Search pagination with link header parsing
//! - Optional per-PR and per-repository enrichment with partial failure
//! - Cooperative cancellation at every wait
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gh_oss_stats::{CollectOptions, GitHubConfig, OssStatsClient, SortKey};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = GitHubConfig::from_env()?;
//!     let client = OssStatsClient::new(config)?;
//!
//!     let options = CollectOptions::builder()
//!         .min_stars(10)
//!         .sort_by(SortKey::Stars)
//!         .build()?;
//!
//!     let stats = client.collect("octocat", &options).await?;
//!     for contribution in stats.top(5) {
//!         println!("{} ({} PRs)", contribution.repo_full_name, contribution.prs_merged);
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod config;
pub mod errors;
pub mod types;

// Authentication
pub mod auth;

// HTTP transport
pub mod transport;

// Client facade
pub mod client;

// Pagination handling
pub mod pagination;

// API Services
pub mod services;

// Aggregation
pub mod stats;

// Resilience patterns
pub mod resilience;

// Observability
pub mod observability;

// Mocks for testing
pub mod mocks;

// Re-exports for convenience
pub use auth::AuthMethod;
pub use client::OssStatsClient;
pub use config::{CollectOptions, CollectOptionsBuilder, GitHubConfig, GitHubConfigBuilder, RateLimitConfig};
pub use errors::{GitHubError, GitHubErrorKind, GitHubResult, RateLimitInfo, StatsError, StatsResult};
pub use pagination::{LinkRelations, SearchWalker};
pub use resilience::RateLimitGovernor;
pub use stats::{Contribution, SortKey, Stats, Summary};
pub use types::*;

// Cancellation handle accepted by `collect_with_cancel`.
pub use tokio_util::sync::CancellationToken;
