//! Domain types shared across the pipeline stages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Filters
// ─────────────────────────────────────────────────────────────────────────────

/// Indoor/outdoor classification of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndoorOutdoor {
    Indoor,
    Outdoor,
    Both,
}

impl IndoorOutdoor {
    /// Wire representation, matching the stored payload values.
    pub fn as_str(&self) -> &'static str {
        match self {
            IndoorOutdoor::Indoor => "indoor",
            IndoorOutdoor::Outdoor => "outdoor",
            IndoorOutdoor::Both => "both",
        }
    }
}

/// Metadata filters extracted from a user query.
///
/// Every field is optional: an absent field means the query did not
/// constrain that dimension, never "false". Extracted once per query and
/// immutable afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSet {
    /// Whether the event must (or must not) be baby-friendly.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baby_friendly: Option<bool>,

    /// Whether the event must (or must not) be free.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_free: Option<bool>,

    /// Required indoor/outdoor classification.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indoor_or_outdoor: Option<IndoorOutdoor>,
}

impl FilterSet {
    /// Returns true if no filter is set.
    pub fn is_empty(&self) -> bool {
        self.baby_friendly.is_none() && self.is_free.is_none() && self.indoor_or_outdoor.is_none()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Events
// ─────────────────────────────────────────────────────────────────────────────

/// An event record as stored in the vector index payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub title: String,
    pub description: String,
    pub baby_friendly: bool,
    #[serde(default)]
    pub is_free: bool,
    #[serde(default = "default_indoor_or_outdoor")]
    pub indoor_or_outdoor: String,
    pub url: String,
}

fn default_indoor_or_outdoor() -> String {
    "both".to_string()
}

/// An event paired with its relevance score from the index.
///
/// Higher scores mean more relevant. Ordering follows the index result
/// order (descending score).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredEvent {
    pub event: Event,
    pub score: f32,
}

// ─────────────────────────────────────────────────────────────────────────────
// Pipeline Result
// ─────────────────────────────────────────────────────────────────────────────

/// The complete output of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    /// The original user query.
    pub query: String,
    /// Filters extracted from the query.
    pub filters: FilterSet,
    /// Retrieved candidates, descending by score.
    pub events: Vec<ScoredEvent>,
    /// Natural-language response text.
    pub response: String,
    /// When this recommendation was generated.
    pub generated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_filter_set_parses_subset() {
        let filters: FilterSet =
            serde_json::from_value(json!({"is_free": true, "indoor_or_outdoor": "outdoor"}))
                .unwrap();

        assert_eq!(filters.is_free, Some(true));
        assert_eq!(filters.indoor_or_outdoor, Some(IndoorOutdoor::Outdoor));
        assert_eq!(filters.baby_friendly, None);
        assert!(!filters.is_empty());
    }

    #[test]
    fn test_filter_set_empty_object() {
        let filters: FilterSet = serde_json::from_value(json!({})).unwrap();
        assert!(filters.is_empty());
    }

    #[test]
    fn test_filter_set_unknown_fields_tolerated() {
        let filters: FilterSet =
            serde_json::from_value(json!({"baby_friendly": false, "mood": "romantic"})).unwrap();
        assert_eq!(filters.baby_friendly, Some(false));
    }

    #[test]
    fn test_filter_set_wrong_type_is_error() {
        let result: std::result::Result<FilterSet, _> =
            serde_json::from_value(json!({"is_free": "yes"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_filter_set_serializes_without_absent_fields() {
        let filters = FilterSet {
            is_free: Some(true),
            ..Default::default()
        };
        let json = serde_json::to_value(&filters).unwrap();
        assert_eq!(json, json!({"is_free": true}));
    }

    #[test]
    fn test_indoor_outdoor_roundtrip() {
        for (variant, s) in [
            (IndoorOutdoor::Indoor, "indoor"),
            (IndoorOutdoor::Outdoor, "outdoor"),
            (IndoorOutdoor::Both, "both"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(serde_json::to_value(variant).unwrap(), json!(s));
        }
    }

    #[test]
    fn test_event_payload_decode() {
        let event: Event = serde_json::from_value(json!({
            "title": "Jazz in the Park",
            "description": "Live jazz under the stars.",
            "baby_friendly": true,
            "is_free": true,
            "indoor_or_outdoor": "outdoor",
            "url": "https://example.com/jazz"
        }))
        .unwrap();

        assert_eq!(event.title, "Jazz in the Park");
        assert!(event.is_free);
    }
}
