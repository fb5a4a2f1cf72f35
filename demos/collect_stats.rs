//! Collects open source contribution stats for a user and prints them as JSON.
//!
//! Run with:
//! ```
//! GITHUB_TOKEN=ghp_xxxxxxxxxxxx cargo run --example collect_stats -- octocat stars
//! ```
//!
//! Press Ctrl-C to stop early; whatever was collected is still printed.

use gh_oss_stats::{
    CancellationToken, CollectOptions, GitHubConfig, OssStatsClient, SortKey, StatsError,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let username = args.next().ok_or("usage: collect_stats <username> [prs|stars|commits]")?;
    let sort_by = match args.next() {
        Some(key) => key.parse::<SortKey>()?,
        None => SortKey::default(),
    };

    let client = OssStatsClient::new(GitHubConfig::from_env()?)?;
    let quota = client.rate_limit_status().await?;
    eprintln!(
        "core quota {}/{}, search quota {}/{}",
        quota.resources.core.remaining,
        quota.resources.core.limit,
        quota.resources.search.remaining,
        quota.resources.search.limit
    );

    let options = CollectOptions::builder().sort_by(sort_by).build()?;
    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    let stats = match client.collect_with_cancel(&username, &options, cancel).await {
        Ok(stats) => stats,
        Err(err) => {
            eprintln!("warning: {}", err);
            match err {
                StatsError::PartialResults { stats, errors } => {
                    for error in &errors {
                        eprintln!("  - {}", error);
                    }
                    *stats
                }
                StatsError::RateLimited { partial: Some(stats), .. }
                | StatsError::Cancelled { partial: Some(stats) } => *stats,
                other => return Err(other.into()),
            }
        }
    };

    println!("{}", stats.to_json_pretty()?);
    Ok(())
}
