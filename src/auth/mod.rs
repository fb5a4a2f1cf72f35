//! Credentials for GitHub API requests.

use crate::config::TOKEN_ENV_VARS;
use secrecy::{ExposeSecret, SecretString};

/// Authentication method for GitHub API.
#[derive(Debug, Clone)]
pub enum AuthMethod {
    /// Personal access token, OAuth token or Actions token; all sent as bearer.
    Token(SecretString),
}

impl AuthMethod {
    /// Creates a token authentication method.
    pub fn token(token: impl Into<String>) -> Self {
        Self::Token(SecretString::new(token.into()))
    }

    /// Reads a token from the first non-empty variable in [`TOKEN_ENV_VARS`].
    pub fn from_env() -> Option<Self> {
        TOKEN_ENV_VARS.iter().find_map(|var| {
            std::env::var(var)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .map(Self::token)
        })
    }

    /// Value for the `Authorization` header.
    pub fn authorization_header(&self) -> String {
        match self {
            Self::Token(token) => format!("Bearer {}", token.expose_secret()),
        }
    }

    /// Gets the token prefix for logging.
    pub fn token_prefix(&self) -> &'static str {
        match self {
            Self::Token(t) => {
                let exposed = t.expose_secret();
                if exposed.starts_with("ghp_") {
                    "ghp_***"
                } else if exposed.starts_with("github_pat_") {
                    "github_pat_***"
                } else if exposed.starts_with("gho_") {
                    "gho_***"
                } else if exposed.starts_with("ghs_") {
                    "ghs_***"
                } else {
                    "***"
                }
            }
        }
    }
}
