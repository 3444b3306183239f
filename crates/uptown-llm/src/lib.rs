//! LLM client abstraction for Uptown.
//!
//! This crate provides the two external model capabilities the
//! recommendation pipeline consumes: chat completions (filter extraction
//! and response composition) and text embeddings (semantic event search).
//!
//! # Architecture
//!
//! The core abstractions are the [`ChatBackend`] and [`Embedder`] traits.
//! Production code uses the OpenAI-compatible implementations; tests use
//! the deterministic mocks.
//!
//! ```text
//! ┌──────────────────────────────┐   ┌──────────────────────────────┐
//! │  ChatBackend trait           │   │  Embedder trait              │
//! │  - complete() -> String      │   │  - embed() -> Vec<f32>       │
//! └──────────────────────────────┘   └──────────────────────────────┘
//!        │             │                   │             │
//!        ▼             ▼                   ▼             ▼
//!  ┌──────────┐  ┌──────────┐       ┌──────────┐  ┌──────────────┐
//!  │  OpenAI  │  │   Mock   │       │  OpenAI  │  │     Mock     │
//!  └──────────┘  └──────────┘       └──────────┘  └──────────────┘
//! ```

pub mod backend;
pub mod embeddings;
pub mod error;
pub mod openai;

pub use backend::{ChatBackend, ChatRequest, MockBackend, SharedChatBackend, with_retry};
pub use embeddings::{
    Embedder, MockEmbedder, OpenAiEmbedder, OpenAiEmbedderConfig, SharedEmbedder,
    cosine_similarity,
};
pub use error::{LlmError, RateLimitInfo, Result};
pub use openai::{OpenAiBackend, OpenAiConfig};
