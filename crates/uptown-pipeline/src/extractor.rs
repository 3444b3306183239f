//! Filter extraction from user queries.
//!
//! Asks the language model to map a free-text query onto the fixed
//! [`FilterSet`] schema. Extraction is best-effort: any model or parse
//! failure degrades to an empty filter set so the request can still be
//! served with an unfiltered search.

use tracing::{debug, warn};

use uptown_llm::{ChatRequest, SharedChatBackend};

use crate::types::FilterSet;

/// System prompt for the extraction call.
const EXTRACTION_SYSTEM_PROMPT: &str =
    "You extract metadata filters from user queries. Always return valid JSON.";

/// Build the extraction instruction for a query.
fn extraction_prompt(query: &str) -> String {
    format!(
        r#"Given this user query about NYC events, extract any explicit filters.

Query: "{query}"

Return JSON with these optional filters:
- baby_friendly: true/false (if query mentions babies, infants, toddlers, strollers, kids, family-friendly, OR "for adults" means false)
- is_free: true/false (if query mentions "free" → true, if query mentions "not free" or "paid" → false)
- indoor_or_outdoor: "indoor" | "outdoor" | "both" (if query mentions location type)
  * "indoor" for museums, theaters, indoor venues
  * "outdoor" for parks, outdoor festivals, street events
  * "both" for flexible or mixed indoor/outdoor activities

Important:
- "for adults" means baby_friendly: false
- "not free" or "paid" means is_free: false
- Only include filters that are explicitly mentioned

If a filter is not mentioned, omit it from the JSON.

Examples:
- "baby-friendly museum" → {{"baby_friendly": true}}
- "free outdoor event" → {{"is_free": true, "indoor_or_outdoor": "outdoor"}}
- "for adults" → {{"baby_friendly": false}}
- "not free indoor events" → {{"is_free": false, "indoor_or_outdoor": "indoor"}}
- "Find some events for me for adults and they should be free and indoor" → {{"baby_friendly": false, "is_free": true, "indoor_or_outdoor": "indoor"}}
- "romantic date night" → {{}}

Return ONLY valid JSON, no explanations."#
    )
}

/// Strip markdown code fences from model output.
///
/// Models often wrap JSON in ```json fences despite being told not to.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the language tag on the opening fence, then the closing fence.
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

/// Extracts a [`FilterSet`] from a user query via the chat backend.
pub struct FilterExtractor {
    backend: SharedChatBackend,
}

impl FilterExtractor {
    /// Create a new extractor over a chat backend.
    pub fn new(backend: SharedChatBackend) -> Self {
        Self { backend }
    }

    /// Extract filters from a query.
    ///
    /// Never fails: model errors and unparseable output both produce an
    /// empty filter set, logged at warn level.
    pub async fn extract(&self, query: &str) -> FilterSet {
        let request = ChatRequest::new(EXTRACTION_SYSTEM_PROMPT, extraction_prompt(query))
            .with_temperature(0.0);

        let raw = match self.backend.complete(request).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Filter extraction failed, proceeding unfiltered");
                return FilterSet::default();
            }
        };

        match serde_json::from_str::<FilterSet>(strip_code_fences(&raw)) {
            Ok(filters) => {
                debug!(?filters, "Extracted filters");
                filters
            }
            Err(e) => {
                warn!(error = %e, output = %raw, "Unparseable filter output, proceeding unfiltered");
                FilterSet::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use uptown_llm::MockBackend;

    use crate::types::IndoorOutdoor;

    fn extractor_with(responses: Vec<&str>) -> (FilterExtractor, Arc<MockBackend>) {
        let backend = Arc::new(MockBackend::new(
            responses.into_iter().map(String::from).collect(),
        ));
        (FilterExtractor::new(backend.clone()), backend)
    }

    #[tokio::test]
    async fn test_extracts_free_outdoor() {
        let (extractor, _) =
            extractor_with(vec![r#"{"is_free": true, "indoor_or_outdoor": "outdoor"}"#]);

        let filters = extractor.extract("free outdoor event").await;
        assert_eq!(filters.is_free, Some(true));
        assert_eq!(filters.indoor_or_outdoor, Some(IndoorOutdoor::Outdoor));
        assert_eq!(filters.baby_friendly, None);
    }

    #[tokio::test]
    async fn test_for_adults_means_not_baby_friendly() {
        let (extractor, _) = extractor_with(vec![r#"{"baby_friendly": false}"#]);

        let filters = extractor.extract("events for adults").await;
        assert_eq!(filters.baby_friendly, Some(false));
    }

    #[tokio::test]
    async fn test_neutral_query_yields_empty_set() {
        let (extractor, _) = extractor_with(vec!["{}"]);

        let filters = extractor.extract("romantic date night").await;
        assert!(filters.is_empty());
    }

    #[tokio::test]
    async fn test_fenced_json_is_parsed() {
        let (extractor, _) =
            extractor_with(vec!["```json\n{\"is_free\": false}\n```"]);

        let filters = extractor.extract("paid events").await;
        assert_eq!(filters.is_free, Some(false));
    }

    #[tokio::test]
    async fn test_garbage_output_fails_open() {
        let (extractor, _) = extractor_with(vec!["Sure! Here are some filters for you."]);

        let filters = extractor.extract("free events").await;
        assert!(filters.is_empty());
    }

    #[tokio::test]
    async fn test_backend_error_fails_open() {
        // Empty script: the mock errors on the first call.
        let (extractor, _) = extractor_with(vec![]);

        let filters = extractor.extract("free events").await;
        assert!(filters.is_empty());
    }

    #[tokio::test]
    async fn test_extraction_uses_zero_temperature() {
        let (extractor, backend) = extractor_with(vec!["{}"]);

        extractor.extract("anything").await;

        let requests = backend.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].temperature, Some(0.0));
        assert!(requests[0].user.contains("anything"));
        assert_eq!(requests[0].system, EXTRACTION_SYSTEM_PROMPT);
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("{\"a\": 1}"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("  {} \n"), "{}");
    }
}
