//! Natural-language response composition.
//!
//! Turns retrieved candidates into a friendly markdown answer. With no
//! candidates the composer short-circuits to a fixed fallback message
//! and never touches the language model.

use std::fmt::Write;

use tracing::debug;

use uptown_llm::{ChatRequest, SharedChatBackend};

use crate::error::Result;
use crate::types::ScoredEvent;

/// Response returned when retrieval found nothing.
pub const EMPTY_RESULTS_RESPONSE: &str =
    "I couldn't find any events matching your criteria. Try broadening your search!";

/// How many candidates are shown to the model.
const CONTEXT_EVENT_LIMIT: usize = 5;

/// Description length cap in the context block.
const DESCRIPTION_PREVIEW_CHARS: usize = 200;

/// System prompt for the composition call.
const COMPOSER_SYSTEM_PROMPT: &str =
    "You are a friendly NYC event recommendation assistant. Be helpful and enthusiastic!";

/// Default token budget for the composition call.
const DEFAULT_COMPOSER_MAX_TOKENS: u32 = 1000;

/// Truncate a string to at most `max_chars` characters, respecting
/// character boundaries.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Render the numbered context block handed to the model.
fn build_event_context(events: &[ScoredEvent]) -> String {
    let mut context = String::new();
    for (i, scored) in events.iter().take(CONTEXT_EVENT_LIMIT).enumerate() {
        let event = &scored.event;
        let _ = write!(
            context,
            "\nEvent {}:\n\
             - Title: {}\n\
             - Description: {}...\n\
             - Baby-Friendly: {}\n\
             - URL: {}\n\
             - Relevance Score: {:.2}\n\n",
            i + 1,
            event.title,
            truncate_chars(&event.description, DESCRIPTION_PREVIEW_CHARS),
            if event.baby_friendly { "Yes" } else { "No" },
            event.url,
            scored.score,
        );
    }
    context
}

/// Build the composition instruction for a query and its candidates.
fn composition_prompt(query: &str, event_context: &str) -> String {
    format!(
        r#"You are a helpful NYC event recommender assistant.

User Query: "{query}"

Here are the top events I found:
{event_context}

Task: Write a friendly, conversational response recommending these events. Include:
1. A brief intro acknowledging their query
2. Top 3-5 events with titles, brief descriptions, and key details
3. Mention if events are baby-friendly when relevant
4. Include URLs for more info
5. End with an encouraging note

Format in markdown. Be enthusiastic but concise!"#
    )
}

/// Composes the final natural-language response.
pub struct ResponseComposer {
    backend: SharedChatBackend,
    temperature: Option<f32>,
    max_tokens: u32,
}

impl ResponseComposer {
    /// Create a new composer over a chat backend, using the provider's
    /// default temperature.
    pub fn new(backend: SharedChatBackend) -> Self {
        Self {
            backend,
            temperature: None,
            max_tokens: DEFAULT_COMPOSER_MAX_TOKENS,
        }
    }

    /// Set the sampling temperature for composition calls.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the token budget for composition calls.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Compose a response for a query and its retrieved candidates.
    ///
    /// Empty candidates return the fixed fallback without an LLM call.
    /// Model output is returned verbatim.
    pub async fn compose(&self, query: &str, events: &[ScoredEvent]) -> Result<String> {
        if events.is_empty() {
            debug!(query, "No candidates, returning fallback response");
            return Ok(EMPTY_RESULTS_RESPONSE.to_string());
        }

        let context = build_event_context(events);
        let mut request = ChatRequest::new(COMPOSER_SYSTEM_PROMPT, composition_prompt(query, &context))
            .with_max_tokens(self.max_tokens);
        if let Some(temperature) = self.temperature {
            request = request.with_temperature(temperature);
        }

        let response = self.backend.complete(request).await?;
        Ok(response)
    }
}
