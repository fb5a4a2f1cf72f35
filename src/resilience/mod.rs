//! Rate limit governor.
//!
//! One governor is owned by one collection run and every request of that run
//! goes through it, so quota and backoff state stay consistent for the whole
//! run without leaking into the next one.

use crate::config::RateLimitConfig;
use crate::errors::{GitHubError, GitHubResult, RateLimitInfo};
use crate::observability::{RequestMetrics, TracingHooks};
use crate::transport::HttpResponse;
use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Header with the remaining request count.
pub const RATE_LIMIT_REMAINING_HEADER: &str = "x-ratelimit-remaining";

/// Header with the Unix timestamp of the window reset.
pub const RATE_LIMIT_RESET_HEADER: &str = "x-ratelimit-reset";

/// Parses the remaining/reset pair; `None` unless both are present and valid.
pub fn parse_rate_limit_headers(headers: &HeaderMap) -> Option<RateLimitInfo> {
    let remaining = headers
        .get(RATE_LIMIT_REMAINING_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())?;

    let reset_timestamp: i64 = headers
        .get(RATE_LIMIT_RESET_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())?;

    let reset_at = DateTime::from_timestamp(reset_timestamp, 0)?;

    Some(RateLimitInfo {
        remaining,
        reset_at,
    })
}

/// `initial * 2^attempt`, saturating.
pub fn backoff_delay(initial: Duration, attempt: u32) -> Duration {
    initial.saturating_mul(1u32.checked_shl(attempt).unwrap_or(u32::MAX))
}

/// Why a response is worth retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryCause {
    /// Quota header reads zero; wait for the reset.
    QuotaExhausted,
    /// 403 or 429 without a drained quota header.
    RateLimited,
    /// 5xx.
    ServerError,
}

/// What to do with a response.
#[derive(Debug)]
pub enum Verdict {
    /// Hand the response to the caller.
    Success,
    /// Suspend for `delay`, then try again.
    Retry {
        /// How long to wait.
        delay: Duration,
        /// Why.
        cause: RetryCause,
    },
    /// Give up now.
    Fail(GitHubError),
}

/// Enforces GitHub's rate limit and backoff policy for one run.
pub struct RateLimitGovernor {
    config: RateLimitConfig,
    cancel: CancellationToken,
    metrics: Arc<RequestMetrics>,
    last_rate_limit: Option<RateLimitInfo>,
    pending_reset: Option<RateLimitInfo>,
}

impl RateLimitGovernor {
    /// Creates a governor observing `cancel` at every suspension point.
    pub fn new(config: RateLimitConfig, cancel: CancellationToken) -> Self {
        Self {
            config,
            cancel,
            metrics: Arc::new(RequestMetrics::new()),
            last_rate_limit: None,
            pending_reset: None,
        }
    }

    /// Gets the configuration.
    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Gets the request counters.
    pub fn metrics(&self) -> &RequestMetrics {
        &self.metrics
    }

    /// The most recent quota reading.
    pub fn last_rate_limit(&self) -> Option<&RateLimitInfo> {
        self.last_rate_limit.as_ref()
    }

    /// Returns true once the caller has cancelled the run.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Fails with `Cancelled` if the run has been cancelled.
    pub fn ensure_not_cancelled(&self) -> GitHubResult<()> {
        if self.cancel.is_cancelled() {
            Err(GitHubError::cancelled())
        } else {
            Ok(())
        }
    }

    /// Header-driven wait: time until reset (never negative) plus the buffer.
    pub fn header_wait(&self, info: &RateLimitInfo, now: DateTime<Utc>) -> Duration {
        let until_reset = (info.reset_at - now).to_std().unwrap_or(Duration::ZERO);
        until_reset + self.config.reset_buffer
    }

    /// Classifies a response for the given 0-indexed attempt.
    ///
    /// A 403 or 429 is always treated as rate limiting: a zero quota header
    /// waits for the reset, anything else backs off exponentially. Only a 401
    /// is an authentication failure.
    pub fn evaluate(&self, response: &HttpResponse, attempt: u32, now: DateTime<Utc>) -> Verdict {
        if response.is_success() {
            return Verdict::Success;
        }

        let info = parse_rate_limit_headers(&response.headers);
        match response.status {
            403 | 429 => match info.as_ref().filter(|i| i.remaining == 0) {
                Some(info) => Verdict::Retry {
                    delay: self.header_wait(info, now),
                    cause: RetryCause::QuotaExhausted,
                },
                None => Verdict::Retry {
                    delay: backoff_delay(self.config.initial_backoff, attempt),
                    cause: RetryCause::RateLimited,
                },
            },
            500..=599 => Verdict::Retry {
                delay: backoff_delay(self.config.initial_backoff, attempt),
                cause: RetryCause::ServerError,
            },
            status => Verdict::Fail(GitHubError::from_status(
                status,
                &response.text(),
                response.request_id(),
            )),
        }
    }

    /// Runs one operation through the attempt/backoff state machine.
    ///
    /// Transport errors are returned as-is; only responses are retried.
    pub async fn execute<F, Fut>(&mut self, mut operation: F) -> GitHubResult<HttpResponse>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = GitHubResult<HttpResponse>>,
    {
        self.wait_for_pending_reset().await?;

        let mut attempt = 0;
        loop {
            self.ensure_not_cancelled()?;
            self.metrics.record_request();

            let response = match operation().await {
                Ok(response) => response,
                Err(e) => {
                    self.metrics.record_failure();
                    return Err(e);
                }
            };

            let info = parse_rate_limit_headers(&response.headers);
            if let Some(ref info) = info {
                self.observe(info);
            }

            match self.evaluate(&response, attempt, Utc::now()) {
                Verdict::Success => {
                    if let Some(info) = info.filter(|i| i.remaining == 0) {
                        self.pending_reset = Some(info);
                    }
                    return Ok(response);
                }
                Verdict::Fail(error) => {
                    self.metrics.record_failure();
                    return Err(error);
                }
                Verdict::Retry { delay, cause } => {
                    if attempt >= self.config.max_attempts {
                        self.metrics.record_failure();
                        return Err(self.exhausted(cause, &response));
                    }

                    match (cause, info.as_ref()) {
                        (RetryCause::QuotaExhausted, Some(info)) => {
                            self.metrics.record_rate_limit_wait();
                            TracingHooks::on_rate_limit_wait(info, delay);
                        }
                        _ => {
                            self.metrics.record_retry();
                            TracingHooks::on_retry(response.status, attempt, delay);
                        }
                    }

                    self.sleep(delay).await?;
                    attempt += 1;
                }
            }
        }
    }

    /// Fixed pause between consecutive successful search calls.
    pub async fn pace_search(&self, next_page: u32) -> GitHubResult<()> {
        TracingHooks::on_search_pacing(next_page, self.config.search_delay);
        self.sleep(self.config.search_delay).await
    }

    /// Sleeps for `delay` unless cancelled first.
    pub async fn sleep(&self, delay: Duration) -> GitHubResult<()> {
        if delay.is_zero() {
            return self.ensure_not_cancelled();
        }

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(GitHubError::cancelled()),
            _ = tokio::time::sleep(delay) => Ok(()),
        }
    }

    fn observe(&mut self, info: &RateLimitInfo) {
        let threshold = self.config.low_quota_threshold;
        let was_above = self
            .last_rate_limit
            .as_ref()
            .map_or(true, |last| last.remaining > threshold);
        if info.remaining <= threshold && was_above {
            TracingHooks::on_low_quota(info);
        }
        self.last_rate_limit = Some(info.clone());
    }

    /// A previous success drained the quota; wait out the window first.
    async fn wait_for_pending_reset(&mut self) -> GitHubResult<()> {
        let Some(info) = self.pending_reset.take() else {
            return Ok(());
        };

        let delay = self.header_wait(&info, Utc::now());
        self.metrics.record_rate_limit_wait();
        TracingHooks::on_rate_limit_wait(&info, delay);
        self.sleep(delay).await
    }

    fn exhausted(&self, cause: RetryCause, response: &HttpResponse) -> GitHubError {
        match cause {
            RetryCause::QuotaExhausted | RetryCause::RateLimited => GitHubError::rate_limited(
                format!(
                    "Rate limit retries exhausted after {} attempts",
                    self.config.max_attempts
                ),
                self.last_rate_limit.clone(),
            )
            .with_status(response.status),
            RetryCause::ServerError => {
                GitHubError::from_status(response.status, &response.text(), response.request_id())
            }
        }
    }
}
