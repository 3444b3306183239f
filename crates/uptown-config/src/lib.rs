//! Environment-driven settings for Uptown.
//!
//! All knobs have sensible defaults; `Settings::from_env()` overrides
//! them from the process environment. Only `OPENAI_API_KEY` has no
//! default, and even that is optional at load time so offline commands
//! and tests work without credentials.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

/// Result type alias using the config error type.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable held a value that does not parse.
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    /// A required setting is missing.
    #[error("Missing required setting: {0}")]
    Missing(String),
}

/// Default chat model.
pub const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";

/// Default embedding model.
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// Default embedding dimensionality (text-embedding-3-small).
pub const DEFAULT_EMBEDDING_DIMENSION: usize = 1536;

/// Default Qdrant endpoint.
pub const DEFAULT_QDRANT_URL: &str = "http://localhost:6333";

/// Default collection name.
pub const DEFAULT_COLLECTION_NAME: &str = "nyc_events";

/// Default cache TTL (24 hours).
pub const DEFAULT_CACHE_TTL_SECONDS: u64 = 86_400;

/// Default cache capacity.
pub const DEFAULT_CACHE_CAPACITY: usize = 100;

/// Default retrieval limit per query.
pub const DEFAULT_MAX_EVENTS_PER_QUERY: usize = 10;

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    // ─────────────────────────────────────────────────────────────────────────
    // OpenAI
    // ─────────────────────────────────────────────────────────────────────────
    /// API key. Required for live LLM and embedding calls.
    pub openai_api_key: Option<String>,

    /// Base URL override for OpenAI-compatible servers.
    pub openai_base_url: Option<String>,

    /// Chat model name.
    pub llm_model: String,

    /// Sampling temperature for response composition.
    pub llm_temperature: f32,

    /// Token budget per completion.
    pub llm_max_tokens: u32,

    /// Embedding model name.
    pub embedding_model: String,

    /// Embedding dimensionality.
    pub embedding_dimension: usize,

    // ─────────────────────────────────────────────────────────────────────────
    // Vector index
    // ─────────────────────────────────────────────────────────────────────────
    /// Qdrant REST endpoint.
    pub qdrant_url: String,

    /// Collection holding the event points.
    pub collection_name: String,

    // ─────────────────────────────────────────────────────────────────────────
    // Cache and limits
    // ─────────────────────────────────────────────────────────────────────────
    /// Result cache entry lifetime.
    pub cache_ttl: Duration,

    /// Result cache capacity.
    pub cache_capacity: usize,

    /// Retrieval limit per query.
    pub max_events_per_query: usize,

    // ─────────────────────────────────────────────────────────────────────────
    // HTTP server
    // ─────────────────────────────────────────────────────────────────────────
    /// Address to bind the server to.
    pub bind_address: SocketAddr,

    /// CORS allowed origins (empty = allow any).
    pub cors_origins: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            openai_base_url: None,
            llm_model: DEFAULT_LLM_MODEL.to_string(),
            llm_temperature: 0.7,
            llm_max_tokens: 1000,
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            embedding_dimension: DEFAULT_EMBEDDING_DIMENSION,
            qdrant_url: DEFAULT_QDRANT_URL.to_string(),
            collection_name: DEFAULT_COLLECTION_NAME.to_string(),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECONDS),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            max_events_per_query: DEFAULT_MAX_EVENTS_PER_QUERY,
            bind_address: SocketAddr::from(([0, 0, 0, 0], 8000)),
            cors_origins: Vec::new(),
        }
    }
}

/// Parse an env var, falling back to a default when unset.
fn env_parse<T: FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(value) => value.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            value,
            reason: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

fn env_string(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

impl Settings {
    /// Load settings from the environment, using defaults for anything
    /// unset.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let host = env_string("API_HOST", "0.0.0.0");
        let port: u16 = env_parse("API_PORT", 8000)?;
        let bind_address: SocketAddr = format!("{}:{}", host, port).parse().map_err(|e| {
            ConfigError::InvalidValue {
                key: "API_HOST".to_string(),
                value: host.clone(),
                reason: format!("{}", e),
            }
        })?;

        let cors_origins = std::env::var("CORS_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            openai_api_key: std::env::var("OPENAI_API_KEY").ok(),
            openai_base_url: std::env::var("OPENAI_BASE_URL").ok(),
            llm_model: env_string("LLM_MODEL", DEFAULT_LLM_MODEL),
            llm_temperature: env_parse("LLM_TEMPERATURE", defaults.llm_temperature)?,
            llm_max_tokens: env_parse("LLM_MAX_TOKENS", defaults.llm_max_tokens)?,
            embedding_model: env_string("EMBEDDING_MODEL", DEFAULT_EMBEDDING_MODEL),
            embedding_dimension: env_parse("EMBEDDING_DIMENSION", defaults.embedding_dimension)?,
            qdrant_url: env_string("QDRANT_URL", DEFAULT_QDRANT_URL),
            collection_name: env_string("QDRANT_COLLECTION_NAME", DEFAULT_COLLECTION_NAME),
            cache_ttl: Duration::from_secs(env_parse(
                "CACHE_TTL_SECONDS",
                DEFAULT_CACHE_TTL_SECONDS,
            )?),
            cache_capacity: env_parse("CACHE_CAPACITY", defaults.cache_capacity)?,
            max_events_per_query: env_parse(
                "MAX_EVENTS_PER_QUERY",
                defaults.max_events_per_query,
            )?,
            bind_address,
            cors_origins,
        })
    }

    /// The API key, or an error naming the missing variable. Used by
    /// commands that cannot run without credentials.
    pub fn require_api_key(&self) -> Result<&str> {
        self.openai_api_key
            .as_deref()
            .ok_or_else(|| ConfigError::Missing("OPENAI_API_KEY".to_string()))
    }
}
