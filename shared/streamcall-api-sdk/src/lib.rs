//! Streamcall API SDK
//!
//! Typed client for the backend the call page talks to: call provisioning,
//! call details polling, OTP login and the streamer catalogue.

mod auth;
mod client;
mod error;
mod types;

pub use auth::{MemoryTokenStore, TokenStore, DEFAULT_TOKEN_TTL_DAYS};
pub use client::{ApiClient, ApiConfig, MEDIA_PAGE_SIZE, STREAMER_PAGE_SIZE};
pub use error::{ApiError, Result};
pub use types::*;

/// Re-export for convenience
pub mod prelude {
    pub use super::{ApiClient, ApiConfig, ApiError, MemoryTokenStore, Result, TokenStore};
    pub use super::types::*;
}
