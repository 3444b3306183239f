//! HTTP route handlers.

pub mod health;
pub mod recommend;
pub mod root;

pub use health::{ComponentHealth, HealthResponse, health};
pub use recommend::{RecommendRequest, RecommendResponse, recommend};
pub use root::{RootResponse, root};
