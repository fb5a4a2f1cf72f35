//! Error types for the stats client.
//!
//! Two layers: [`GitHubError`] describes a single API call going wrong,
//! [`StatsError`] describes how a whole `collect` run ended.

use crate::stats::Stats;
use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt;
use thiserror::Error;

/// Result type alias for single API operations.
pub type GitHubResult<T> = Result<T, GitHubError>;

/// Result type alias for a whole collection run.
pub type StatsResult<T> = Result<T, StatsError>;

/// Error kinds for categorizing API call failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitHubErrorKind {
    // Configuration errors
    /// Invalid base URL.
    InvalidBaseUrl,
    /// Invalid configuration.
    InvalidConfiguration,

    // Transport errors
    /// Connection failed.
    ConnectionFailed,
    /// Request timeout.
    Timeout,
    /// Request could not be sent or its body could not be read.
    RequestFailed,

    // Response errors
    /// Failed to deserialize response.
    DeserializationError,
    /// Failed to serialize output.
    SerializationError,

    // Status errors
    /// Quota exhausted and retries used up.
    RateLimited,
    /// Unambiguous authentication or authorization failure.
    AuthenticationFailed,
    /// Resource not found (404).
    NotFound,
    /// Request validation failed (422).
    ValidationFailed,
    /// Any other non-retryable 4xx.
    ClientError,
    /// 5xx that kept failing after retries.
    ServerError,

    /// The run was cancelled by the caller.
    Cancelled,
}

impl fmt::Display for GitHubErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBaseUrl => write!(f, "invalid_base_url"),
            Self::InvalidConfiguration => write!(f, "invalid_configuration"),
            Self::ConnectionFailed => write!(f, "connection_failed"),
            Self::Timeout => write!(f, "timeout"),
            Self::RequestFailed => write!(f, "request_failed"),
            Self::DeserializationError => write!(f, "deserialization_error"),
            Self::SerializationError => write!(f, "serialization_error"),
            Self::RateLimited => write!(f, "rate_limited"),
            Self::AuthenticationFailed => write!(f, "authentication_failed"),
            Self::NotFound => write!(f, "not_found"),
            Self::ValidationFailed => write!(f, "validation_failed"),
            Self::ClientError => write!(f, "client_error"),
            Self::ServerError => write!(f, "server_error"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Rate limit information read from response headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitInfo {
    /// Remaining requests in the current window.
    pub remaining: u32,
    /// Time when the window resets.
    pub reset_at: DateTime<Utc>,
}

/// A single API call failure.
#[derive(Error, Debug)]
pub struct GitHubError {
    kind: GitHubErrorKind,
    message: String,
    status_code: Option<u16>,
    request_id: Option<String>,
    rate_limit: Option<RateLimitInfo>,
    #[source]
    cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for GitHubError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)?;
        if let Some(code) = self.status_code {
            write!(f, " (HTTP {})", code)?;
        }
        if let Some(ref id) = self.request_id {
            write!(f, " [request_id: {}]", id)?;
        }
        Ok(())
    }
}

impl GitHubError {
    /// Creates a new error.
    pub fn new(kind: GitHubErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status_code: None,
            request_id: None,
            rate_limit: None,
            cause: None,
        }
    }

    /// Sets the HTTP status code.
    pub fn with_status(mut self, code: u16) -> Self {
        self.status_code = Some(code);
        self
    }

    /// Sets the GitHub request ID.
    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    /// Sets the rate limit info.
    pub fn with_rate_limit(mut self, info: RateLimitInfo) -> Self {
        self.rate_limit = Some(info);
        self
    }

    /// Sets the underlying cause.
    pub fn with_cause(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Gets the error kind.
    pub fn kind(&self) -> GitHubErrorKind {
        self.kind
    }

    /// Gets the message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Gets the HTTP status code.
    pub fn status_code(&self) -> Option<u16> {
        self.status_code
    }

    /// Gets the request ID.
    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    /// Gets the rate limit info.
    pub fn rate_limit(&self) -> Option<&RateLimitInfo> {
        self.rate_limit.as_ref()
    }

    /// Returns true if the connection or timeout failed before a response arrived.
    pub fn is_transport(&self) -> bool {
        matches!(
            self.kind,
            GitHubErrorKind::ConnectionFailed
                | GitHubErrorKind::Timeout
                | GitHubErrorKind::RequestFailed
        )
    }

    /// Returns true if this error must end the whole run instead of being
    /// collected as a partial failure.
    pub fn is_fatal_to_run(&self) -> bool {
        matches!(
            self.kind,
            GitHubErrorKind::RateLimited
                | GitHubErrorKind::AuthenticationFailed
                | GitHubErrorKind::Cancelled
        )
    }

    /// Builds an error for a non-retryable status; the raw body is the message.
    pub fn from_status(status: u16, body: &str, request_id: Option<String>) -> Self {
        let message = if body.trim().is_empty() {
            format!("HTTP {} error", status)
        } else {
            body.trim().to_string()
        };
        let mut error = Self::new(Self::kind_from_status(status), message).with_status(status);
        if let Some(id) = request_id {
            error = error.with_request_id(id);
        }
        error
    }

    /// Maps HTTP status code to error kind.
    fn kind_from_status(status: u16) -> GitHubErrorKind {
        match status {
            401 | 403 => GitHubErrorKind::AuthenticationFailed,
            404 => GitHubErrorKind::NotFound,
            422 => GitHubErrorKind::ValidationFailed,
            429 => GitHubErrorKind::RateLimited,
            500..=599 => GitHubErrorKind::ServerError,
            _ => GitHubErrorKind::ClientError,
        }
    }

    // Convenience constructors

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(GitHubErrorKind::InvalidConfiguration, message)
    }

    /// Creates a rate limit error carrying the last known reset time.
    pub fn rate_limited(message: impl Into<String>, info: Option<RateLimitInfo>) -> Self {
        let error = Self::new(GitHubErrorKind::RateLimited, message);
        match info {
            Some(info) => error.with_rate_limit(info),
            None => error,
        }
    }

    /// Creates a cancellation error.
    pub fn cancelled() -> Self {
        Self::new(GitHubErrorKind::Cancelled, "Operation cancelled")
    }

    /// Creates a timeout error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(GitHubErrorKind::Timeout, message)
    }

    /// Creates a deserialization error.
    pub fn deserialization(message: impl Into<String>) -> Self {
        Self::new(GitHubErrorKind::DeserializationError, message)
    }
}

/// How a collection run failed.
#[derive(Error, Debug)]
pub enum StatsError {
    /// Quota exhausted and backoff attempts used up.
    #[error("rate limited (resets at {})", format_reset(.reset_at))]
    RateLimited {
        /// Last known reset time.
        reset_at: Option<DateTime<Utc>>,
        /// Stats folded from whatever was fetched before the limit hit.
        partial: Option<Box<Stats>>,
    },

    /// Credentials were rejected.
    #[error("authentication failed: {message}")]
    AuthenticationFailed {
        /// Response body or reason.
        message: String,
    },

    /// The search for the user returned nothing at all.
    #[error("user not found: {username}")]
    UserNotFound {
        /// The username that was searched.
        username: String,
    },

    /// The run finished but some enrichment calls failed.
    #[error("partial results ({} errors encountered)", .errors.len())]
    PartialResults {
        /// Best-effort stats.
        stats: Box<Stats>,
        /// The suppressed per-call errors.
        errors: Vec<GitHubError>,
    },

    /// The caller cancelled the run.
    #[error("collection cancelled")]
    Cancelled {
        /// Stats folded before cancellation was observed.
        partial: Option<Box<Stats>>,
    },

    /// Any other fatal API failure.
    #[error(transparent)]
    Api(#[from] GitHubError),
}

impl StatsError {
    /// Returns the best-effort stats carried by this error, if any.
    pub fn partial_stats(&self) -> Option<&Stats> {
        match self {
            Self::PartialResults { stats, .. } => Some(stats),
            Self::RateLimited { partial, .. } | Self::Cancelled { partial } => partial.as_deref(),
            _ => None,
        }
    }
}

fn format_reset(reset_at: &Option<DateTime<Utc>>) -> String {
    reset_at
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_else(|| "unknown".to_string())
}
