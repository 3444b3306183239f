//! Recommendation pipeline for Uptown.
//!
//! Turns a free-text query about NYC events into a natural-language
//! recommendation:
//!
//! ```text
//!   ┌───────────────────────────────────────────────────────────────┐
//!   │                      RecommendPipeline                        │
//!   │                                                               │
//!   │  query ─▶ FilterExtractor ─▶ Retriever ─▶ ResponseComposer    │
//!   │               (LLM)        (embed+index)       (LLM)          │
//!   └───────────────────────────────────────────────────────────────┘
//!                                │
//!                          ResultCache
//!                  (bounded, TTL, soonest-expiry eviction)
//! ```
//!
//! The cache sits in front of the pipeline at the serving layer:
//! identical queries (modulo case and whitespace) within the TTL window
//! are answered from memory.

pub mod cache;
pub mod composer;
pub mod error;
pub mod extractor;
pub mod pipeline;
pub mod retriever;
pub mod types;

pub use cache::{DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL, ResultCache};
pub use composer::{EMPTY_RESULTS_RESPONSE, ResponseComposer};
pub use error::{PipelineError, Result};
pub use extractor::FilterExtractor;
pub use pipeline::RecommendPipeline;
pub use retriever::Retriever;
pub use types::{Event, FilterSet, IndoorOutdoor, Recommendation, ScoredEvent};
