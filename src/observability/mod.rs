//! Logging hooks and per-run request counters.

use crate::errors::RateLimitInfo;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Counters for one collection run.
#[derive(Debug, Default)]
pub struct RequestMetrics {
    requests_total: AtomicU64,
    requests_failed: AtomicU64,
    retries: AtomicU64,
    rate_limit_waits: AtomicU64,
}

impl RequestMetrics {
    /// Creates a new metrics collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a request sent.
    pub fn record_request(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a request that ended in an error.
    pub fn record_failure(&self) {
        self.requests_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a backoff retry.
    pub fn record_retry(&self) {
        self.retries.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a header-driven wait for the quota to reset.
    pub fn record_rate_limit_wait(&self) {
        self.rate_limit_waits.fetch_add(1, Ordering::Relaxed);
    }

    /// Gets a snapshot of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests_total: self.requests_total.load(Ordering::Relaxed),
            requests_failed: self.requests_failed.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
            rate_limit_waits: self.rate_limit_waits.load(Ordering::Relaxed),
        }
    }
}

/// A snapshot of metrics at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Requests sent, including retries.
    pub requests_total: u64,
    /// Requests that ended in an error.
    pub requests_failed: u64,
    /// Backoff retries.
    pub retries: u64,
    /// Header-driven waits.
    pub rate_limit_waits: u64,
}

/// Tracing hooks for API operations.
pub struct TracingHooks;

impl TracingHooks {
    /// Logs the start of an API request.
    pub fn on_request_start(method: &str, url: &str) {
        debug!(method = %method, url = %url, "GitHub API request started");
    }

    /// Logs the completion of an API request.
    pub fn on_request_complete(method: &str, url: &str, status: u16, duration: Duration) {
        debug!(
            method = %method,
            url = %url,
            status = status,
            duration_ms = duration.as_millis() as u64,
            "GitHub API request completed"
        );
    }

    /// Logs a request error.
    pub fn on_request_error(method: &str, url: &str, error: &str) {
        warn!(method = %method, url = %url, error = %error, "GitHub API request failed");
    }

    /// Logs a backoff retry.
    pub fn on_retry(status: u16, attempt: u32, delay: Duration) {
        warn!(
            status = status,
            attempt = attempt,
            delay_ms = delay.as_millis() as u64,
            "Retrying GitHub API request"
        );
    }

    /// Logs a wait for the quota window to reset.
    pub fn on_rate_limit_wait(info: &RateLimitInfo, wait: Duration) {
        warn!(
            remaining = info.remaining,
            reset_at = %info.reset_at,
            wait_secs = wait.as_secs(),
            "Rate limit exhausted, waiting for reset"
        );
    }

    /// Logs a quota that is running low.
    pub fn on_low_quota(info: &RateLimitInfo) {
        warn!(
            remaining = info.remaining,
            reset_at = %info.reset_at,
            "Rate limit quota running low"
        );
    }

    /// Logs pacing between search calls.
    pub fn on_search_pacing(page: u32, delay: Duration) {
        debug!(page = page, delay_ms = delay.as_millis() as u64, "Pacing search request");
    }

    /// Logs an enrichment call that failed without aborting the run.
    pub fn on_enrichment_failed(target: &str, error: &str) {
        warn!(target_resource = %target, error = %error, "Enrichment failed, continuing");
    }

    /// Logs the end of a collection run.
    pub fn on_collect_complete(
        username: &str,
        projects: usize,
        prs_merged: u64,
        errors: usize,
        metrics: MetricsSnapshot,
    ) {
        info!(
            username = %username,
            projects = projects,
            prs_merged = prs_merged,
            errors = errors,
            requests = metrics.requests_total,
            retries = metrics.retries,
            rate_limit_waits = metrics.rate_limit_waits,
            "Contribution stats collected"
        );
    }
}
