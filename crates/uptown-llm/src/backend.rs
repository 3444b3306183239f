//! Chat backend trait and mock implementation.
//!
//! This module defines the abstraction layer for LLM chat providers and
//! provides a mock implementation for deterministic testing.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{LlmError, Result, is_retryable};

// ─────────────────────────────────────────────────────────────────────────────
// Shared Retry Logic
// ─────────────────────────────────────────────────────────────────────────────

/// Execute an async operation with exponential backoff retry.
///
/// Retries only on transient errors (network failures, rate limits).
/// Non-retryable errors are returned immediately. When a rate-limit
/// error carries a `Retry-After` duration, that wait is used instead of
/// the computed backoff.
pub async fn with_retry<F, Fut, T>(
    max_retries: u32,
    initial_backoff: Duration,
    backend_name: &str,
    mut f: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut last_error = None;
    let mut backoff = initial_backoff;

    for attempt in 0..=max_retries {
        match f().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                if !is_retryable(&e) {
                    return Err(e);
                }

                let wait = e.retry_after().unwrap_or(backoff);
                last_error = Some(e);

                if attempt < max_retries {
                    tracing::warn!(
                        backend = backend_name,
                        attempt = attempt + 1,
                        max_retries = max_retries,
                        wait_ms = wait.as_millis() as u64,
                        "Request failed, retrying"
                    );
                    tokio::time::sleep(wait).await;
                    backoff *= 2;
                }
            }
        }
    }

    Err(last_error.unwrap())
}

// ─────────────────────────────────────────────────────────────────────────────
// Chat Request
// ─────────────────────────────────────────────────────────────────────────────

/// A chat completion request: a system instruction plus a user message.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// System instruction for the model.
    pub system: String,

    /// The user message.
    pub user: String,

    /// Sampling temperature. `None` uses the provider default.
    pub temperature: Option<f32>,

    /// Maximum tokens to generate.
    pub max_tokens: u32,
}

impl ChatRequest {
    /// Create a new request with the default token budget.
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            temperature: None,
            max_tokens: 1000,
        }
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the maximum tokens to generate.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Chat Backend Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Trait for LLM chat providers.
///
/// Implementations provide the actual connection to chat services like
/// OpenAI's API or a local OpenAI-compatible server.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Execute a chat completion and return the model's text output.
    async fn complete(&self, request: ChatRequest) -> Result<String>;

    /// Get the name of this backend.
    fn name(&self) -> &str;

    /// Check if the backend is available and properly configured.
    async fn health_check(&self) -> Result<()>;
}

/// A backend that can be shared across threads.
pub type SharedChatBackend = Arc<dyn ChatBackend>;

// ─────────────────────────────────────────────────────────────────────────────
// Mock Backend
// ─────────────────────────────────────────────────────────────────────────────

/// A mock backend for testing purposes.
///
/// Returns pre-configured responses in order and records every request,
/// useful for deterministic testing of the recommendation pipeline.
#[derive(Debug)]
pub struct MockBackend {
    name: String,
    responses: std::sync::Mutex<Vec<String>>,
    request_log: std::sync::Mutex<Vec<ChatRequest>>,
}

impl MockBackend {
    /// Create a new mock backend with the given responses.
    ///
    /// Responses are returned in order. If more requests are made than
    /// responses available, an error is returned.
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            name: "mock".to_string(),
            responses: std::sync::Mutex::new(responses),
            request_log: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Create a mock backend with a single text response.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self::new(vec![text.into()])
    }

    /// Get all requests that were made to this backend.
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.request_log.lock().unwrap().clone()
    }

    /// Get the number of requests made.
    pub fn request_count(&self) -> usize {
        self.request_log.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatBackend for MockBackend {
    async fn complete(&self, request: ChatRequest) -> Result<String> {
        self.request_log.lock().unwrap().push(request);

        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            return Err(LlmError::Backend(
                "MockBackend: no more responses available".to_string(),
            ));
        }
        Ok(responses.remove(0))
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_builder() {
        let request = ChatRequest::new("system", "user")
            .with_temperature(0.0)
            .with_max_tokens(256);

        assert_eq!(request.system, "system");
        assert_eq!(request.user, "user");
        assert_eq!(request.temperature, Some(0.0));
        assert_eq!(request.max_tokens, 256);
    }

    #[tokio::test]
    async fn test_mock_backend_single_response() {
        let backend = MockBackend::with_text("Hello!");

        let response = backend
            .complete(ChatRequest::new("sys", "Hi"))
            .await
            .unwrap();

        assert_eq!(response, "Hello!");
        assert_eq!(backend.request_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_backend_multiple_responses() {
        let backend = MockBackend::new(vec!["First".to_string(), "Second".to_string()]);

        let r1 = backend.complete(ChatRequest::new("sys", "1")).await.unwrap();
        let r2 = backend.complete(ChatRequest::new("sys", "2")).await.unwrap();

        assert_eq!(r1, "First");
        assert_eq!(r2, "Second");
        assert_eq!(backend.request_count(), 2);
    }

    #[tokio::test]
    async fn test_mock_backend_exhausted() {
        let backend = MockBackend::new(vec![]);

        let result = backend.complete(ChatRequest::new("sys", "Hi")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_mock_backend_records_requests() {
        let backend = MockBackend::with_text("ok");

        backend
            .complete(ChatRequest::new("extract filters", "free outdoor event"))
            .await
            .unwrap();

        let requests = backend.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].system, "extract filters");
        assert_eq!(requests[0].user, "free outdoor event");
    }

    #[tokio::test]
    async fn test_mock_backend_health_check() {
        let backend = MockBackend::with_text("test");
        assert!(backend.health_check().await.is_ok());
    }

    #[tokio::test]
    async fn test_with_retry_gives_up_on_non_retryable() {
        let mut calls = 0u32;
        let result: Result<()> = with_retry(3, Duration::from_millis(1), "test", || {
            calls += 1;
            async { Err(LlmError::Config("bad".to_string())) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_with_retry_honors_retry_after() {
        use crate::error::RateLimitInfo;

        let mut calls = 0u32;
        let start = std::time::Instant::now();
        let result: Result<u32> = with_retry(2, Duration::from_millis(1), "test", || {
            calls += 1;
            let attempt = calls;
            async move {
                if attempt == 1 {
                    Err(LlmError::RateLimit(RateLimitInfo {
                        message: "slow down".to_string(),
                        retry_after: Some(Duration::from_millis(30)),
                    }))
                } else {
                    Ok(attempt)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 2);
        // The server-provided wait wins over the 1ms backoff.
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[tokio::test]
    async fn test_with_retry_retries_transient() {
        let mut calls = 0u32;
        let result: Result<u32> = with_retry(3, Duration::from_millis(1), "test", || {
            calls += 1;
            let attempt = calls;
            async move {
                if attempt < 3 {
                    Err(LlmError::Network("flaky".to_string()))
                } else {
                    Ok(attempt)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls, 3);
    }
}
