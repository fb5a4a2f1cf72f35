//! Configuration types for the stats client.

use crate::auth::AuthMethod;
use crate::errors::{GitHubError, GitHubErrorKind};
use crate::stats::SortKey;
use std::time::Duration;

/// Default GitHub API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.github.com";

/// Default GitHub API version (date-based).
pub const DEFAULT_API_VERSION: &str = "2022-11-28";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Default connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default User-Agent header.
pub const DEFAULT_USER_AGENT: &str = concat!("gh-oss-stats/", env!("CARGO_PKG_VERSION"));

/// Environment variables checked for a token, in order.
pub const TOKEN_ENV_VARS: &[&str] = &["GITHUB_TOKEN", "GH_TOKEN"];

/// Default cap on merged PRs fetched per run.
pub const DEFAULT_MAX_PRS: usize = 500;

/// Largest page size the search API accepts.
pub const MAX_PER_PAGE: u32 = 100;

/// Rate limit and backoff configuration.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Retries allowed per operation before giving up.
    pub max_attempts: u32,
    /// Backoff for attempt 0; doubles per attempt.
    pub initial_backoff: Duration,
    /// Added on top of a header-driven wait for the reset time.
    pub reset_buffer: Duration,
    /// Pause between consecutive successful search calls.
    pub search_delay: Duration,
    /// Remaining quota at or below which a warning is logged.
    pub low_quota_threshold: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff: Duration::from_secs(1),
            reset_buffer: Duration::from_secs(5),
            search_delay: Duration::from_secs(2),
            low_quota_threshold: 10,
        }
    }
}

impl RateLimitConfig {
    /// A configuration with every wait set to zero, for tests against live mocks.
    pub fn immediate() -> Self {
        Self {
            initial_backoff: Duration::ZERO,
            reset_buffer: Duration::ZERO,
            search_delay: Duration::ZERO,
            ..Default::default()
        }
    }
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    /// API base URL.
    pub base_url: String,
    /// API version header.
    pub api_version: String,
    /// Credential; `None` means unauthenticated requests.
    pub auth: Option<AuthMethod>,
    /// Request timeout.
    pub timeout: Duration,
    /// Connect timeout.
    pub connect_timeout: Duration,
    /// User-Agent header.
    pub user_agent: String,
    /// Rate limit configuration.
    pub rate_limit: RateLimitConfig,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            auth: None,
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl GitHubConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> GitHubConfigBuilder {
        GitHubConfigBuilder::new()
    }

    /// Default configuration with the token taken from the environment.
    pub fn from_env() -> Result<Self, GitHubError> {
        let mut builder = Self::builder();
        if let Some(auth) = AuthMethod::from_env() {
            builder = builder.auth(auth);
        }
        builder.build()
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), GitHubError> {
        if self.base_url.is_empty() {
            return Err(GitHubError::new(
                GitHubErrorKind::InvalidBaseUrl,
                "Base URL cannot be empty",
            ));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(GitHubError::new(
                GitHubErrorKind::InvalidBaseUrl,
                "Base URL must start with http:// or https://",
            ));
        }

        if self.user_agent.is_empty() {
            return Err(GitHubError::configuration("User-Agent is required by GitHub API"));
        }

        if self.timeout.is_zero() {
            return Err(GitHubError::configuration("Timeout must be greater than zero"));
        }

        if self.rate_limit.max_attempts == 0 {
            return Err(GitHubError::configuration("max_attempts must be at least 1"));
        }

        Ok(())
    }
}

/// Builder for GitHubConfig.
#[derive(Debug, Default)]
pub struct GitHubConfigBuilder {
    base_url: Option<String>,
    api_version: Option<String>,
    auth: Option<AuthMethod>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    user_agent: Option<String>,
    rate_limit: Option<RateLimitConfig>,
}

impl GitHubConfigBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the API version.
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    /// Sets the credential.
    pub fn auth(mut self, auth: AuthMethod) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Sets a bearer token.
    pub fn token(self, token: impl Into<String>) -> Self {
        self.auth(AuthMethod::token(token))
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets the User-Agent header.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Sets the rate limit configuration.
    pub fn rate_limit(mut self, config: RateLimitConfig) -> Self {
        self.rate_limit = Some(config);
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> Result<GitHubConfig, GitHubError> {
        let config = GitHubConfig {
            base_url: self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_version: self.api_version.unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            auth: self.auth,
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
            connect_timeout: self.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT),
            user_agent: self.user_agent.unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            rate_limit: self.rate_limit.unwrap_or_default(),
        };

        config.validate()?;
        Ok(config)
    }
}

/// Options for one `collect` run.
#[derive(Debug, Clone)]
pub struct CollectOptions {
    /// Fetch each PR's commit and line counts.
    pub include_pr_details: bool,
    /// Fetch each repository's stars and description.
    pub include_repo_details: bool,
    /// Repositories below this star count are dropped from the result.
    pub min_stars: u32,
    /// Upper bound on search hits consumed.
    pub max_prs: usize,
    /// Search page size.
    pub per_page: u32,
    /// Ordering of the contribution list.
    pub sort_by: SortKey,
    /// Drop hits in repositories owned by the user themselves.
    pub exclude_own_repos: bool,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            include_pr_details: true,
            include_repo_details: true,
            min_stars: 0,
            max_prs: DEFAULT_MAX_PRS,
            per_page: MAX_PER_PAGE,
            sort_by: SortKey::default(),
            exclude_own_repos: true,
        }
    }
}

impl CollectOptions {
    /// Creates a new options builder.
    pub fn builder() -> CollectOptionsBuilder {
        CollectOptionsBuilder::default()
    }

    /// Validates the options.
    pub fn validate(&self) -> Result<(), GitHubError> {
        if self.max_prs == 0 {
            return Err(GitHubError::configuration("max_prs must be at least 1"));
        }
        if self.per_page == 0 || self.per_page > MAX_PER_PAGE {
            return Err(GitHubError::configuration(format!(
                "per_page must be between 1 and {}",
                MAX_PER_PAGE
            )));
        }
        Ok(())
    }
}

/// Builder for CollectOptions.
#[derive(Debug, Default)]
pub struct CollectOptionsBuilder {
    options: CollectOptions,
}

impl CollectOptionsBuilder {
    /// Toggles PR detail enrichment.
    pub fn include_pr_details(mut self, enabled: bool) -> Self {
        self.options.include_pr_details = enabled;
        self
    }

    /// Toggles repository metadata enrichment.
    pub fn include_repo_details(mut self, enabled: bool) -> Self {
        self.options.include_repo_details = enabled;
        self
    }

    /// Sets the minimum star filter.
    pub fn min_stars(mut self, stars: u32) -> Self {
        self.options.min_stars = stars;
        self
    }

    /// Sets the cap on merged PRs.
    pub fn max_prs(mut self, max: usize) -> Self {
        self.options.max_prs = max;
        self
    }

    /// Sets the page size (clamped to the API maximum).
    pub fn per_page(mut self, per_page: u32) -> Self {
        self.options.per_page = per_page.min(MAX_PER_PAGE);
        self
    }

    /// Sets the sort key.
    pub fn sort_by(mut self, key: SortKey) -> Self {
        self.options.sort_by = key;
        self
    }

    /// Toggles dropping the user's own repositories.
    pub fn exclude_own_repos(mut self, enabled: bool) -> Self {
        self.options.exclude_own_repos = enabled;
        self
    }

    /// Builds the options.
    pub fn build(self) -> Result<CollectOptions, GitHubError> {
        self.options.validate()?;
        Ok(self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GitHubConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.api_version, DEFAULT_API_VERSION);
        assert!(config.auth.is_none());
        assert_eq!(config.rate_limit.max_attempts, 5);
        assert_eq!(config.rate_limit.search_delay, Duration::from_secs(2));
    }

    #[test]
    fn test_config_builder() {
        let config = GitHubConfig::builder()
            .base_url("https://github.example.com/api/v3")
            .user_agent("test-client/1.0")
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap();

        assert_eq!(config.base_url, "https://github.example.com/api/v3");
        assert_eq!(config.user_agent, "test-client/1.0");
        assert_eq!(config.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_invalid_base_url() {
        let result = GitHubConfig::builder().base_url("invalid-url").build();

        assert_eq!(result.unwrap_err().kind(), GitHubErrorKind::InvalidBaseUrl);
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let result = GitHubConfig::builder()
            .rate_limit(RateLimitConfig {
                max_attempts: 0,
                ..Default::default()
            })
            .build();

        assert!(result.is_err());
    }

    #[test]
    fn test_collect_options() {
        let options = CollectOptions::builder()
            .per_page(250)
            .min_stars(50)
            .sort_by(SortKey::Stars)
            .build()
            .unwrap();

        assert_eq!(options.per_page, 100);
        assert_eq!(options.min_stars, 50);
        assert_eq!(options.max_prs, DEFAULT_MAX_PRS);
        assert!(options.include_pr_details);
    }

    #[test]
    fn test_zero_max_prs_rejected() {
        assert!(CollectOptions::builder().max_prs(0).build().is_err());
    }
}
