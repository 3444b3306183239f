//! Errors shared by the chat and embedding clients.
//!
//! Rate-limit responses keep hold of the provider's `Retry-After` wait
//! so the retry loop can sleep for exactly as long as the provider
//! asked.

use std::time::Duration;
use thiserror::Error;

/// Result alias for LLM operations.
pub type Result<T> = std::result::Result<T, LlmError>;

// ─────────────────────────────────────────────────────────────────────────────
// Rate Limit Info
// ─────────────────────────────────────────────────────────────────────────────

/// Details of a rate-limit rejection: the provider's message plus the
/// wait it requested, when one was given.
#[derive(Debug, Clone)]
pub struct RateLimitInfo {
    pub message: String,
    /// Requested wait before the next attempt, if the provider sent one.
    pub retry_after: Option<Duration>,
}

impl RateLimitInfo {
    /// Rate-limit info with no requested wait.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retry_after: None,
        }
    }

    /// Build from an error message and the raw `Retry-After` header, if
    /// the response carried one.
    pub fn from_response(message: &str, retry_after_header: Option<&str>) -> Self {
        Self {
            message: message.to_string(),
            retry_after: retry_after_header.and_then(parse_retry_after_header),
        }
    }
}

impl std::fmt::Display for RateLimitInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(retry_after) = self.retry_after {
            write!(f, " (retry after {:.2}s)", retry_after.as_secs_f64())?;
        }
        Ok(())
    }
}

// Only the delay-seconds form of Retry-After is understood; HTTP-date
// values fall back to the normal backoff schedule.
fn parse_retry_after_header(value: &str) -> Option<Duration> {
    value
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

// ─────────────────────────────────────────────────────────────────────────────
// LLM Error
// ─────────────────────────────────────────────────────────────────────────────

/// Anything that can go wrong talking to an LLM provider.
#[derive(Debug, Error)]
pub enum LlmError {
    /// The provider answered with an error.
    #[error("Backend error: {0}")]
    Backend(String),

    /// Connectivity problem; worth retrying.
    #[error("Network error: {0}")]
    Network(String),

    /// Missing or invalid client configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Rate limit hit; retryable, honoring [`RateLimitInfo::retry_after`].
    #[error("Rate limit exceeded: {0}")]
    RateLimit(RateLimitInfo),

    /// Credentials rejected.
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl LlmError {
    /// Rate-limit error carrying only a message.
    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::RateLimit(RateLimitInfo::new(message))
    }

    /// The provider-requested wait, for rate-limit errors that have one.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimit(info) => info.retry_after,
            _ => None,
        }
    }

    /// Whether a retry could plausibly succeed.
    ///
    /// Transient failures (network, rate limit) qualify; configuration,
    /// auth, and serialization failures do not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::RateLimit(_))
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Network(format!("Request timed out: {}", err))
        } else if err.is_connect() {
            LlmError::Network(format!("Connection failed: {}", err))
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for LlmError {
    fn from(err: serde_json::Error) -> Self {
        LlmError::Serialization(err.to_string())
    }
}

/// Free-function form of [`LlmError::is_retryable`], convenient in
/// retry loops.
pub fn is_retryable(error: &LlmError) -> bool {
    error.is_retryable()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_retryable() {
        assert!(is_retryable(&LlmError::Network("timeout".to_string())));
        assert!(is_retryable(&LlmError::rate_limit("rate limited")));
        assert!(!is_retryable(&LlmError::Config("bad config".to_string())));
        assert!(!is_retryable(&LlmError::Auth("unauthorized".to_string())));
        assert!(!is_retryable(&LlmError::Backend(
            "server error".to_string()
        )));
    }

    #[test]
    fn test_rate_limit_info_new() {
        let info = RateLimitInfo::new("Rate limited");
        assert_eq!(info.message, "Rate limited");
        assert!(info.retry_after.is_none());
    }

    #[test]
    fn test_rate_limit_from_response_header() {
        let info = RateLimitInfo::from_response("Rate limited", Some("5"));
        assert_eq!(info.retry_after, Some(Duration::from_secs(5)));

        let info = RateLimitInfo::from_response("Rate limited", Some(" 10 "));
        assert_eq!(info.retry_after, Some(Duration::from_secs(10)));

        let info = RateLimitInfo::from_response("Rate limited", Some("invalid"));
        assert!(info.retry_after.is_none());

        let info = RateLimitInfo::from_response("Rate limited", None);
        assert!(info.retry_after.is_none());
    }

    #[test]
    fn test_llm_error_retry_after() {
        let err = LlmError::RateLimit(RateLimitInfo::from_response("limited", Some("5")));
        assert_eq!(err.retry_after(), Some(Duration::from_secs(5)));

        let err = LlmError::Network("timeout".to_string());
        assert_eq!(err.retry_after(), None);
    }

    #[test]
    fn test_rate_limit_info_display() {
        let info = RateLimitInfo::new("Rate limited");
        assert_eq!(info.to_string(), "Rate limited");

        let info = RateLimitInfo::from_response("Rate limited", Some("6"));
        assert!(info.to_string().contains("retry after 6.00s"));
    }
}
