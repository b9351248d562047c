//! Error types for the API SDK

/// Result type alias
pub type Result<T> = std::result::Result<T, ApiError>;

/// API client errors
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("No auth token found")]
    MissingToken,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl ApiError {
    /// True when the caller has to log in again
    pub fn requires_login(&self) -> bool {
        matches!(self, Self::MissingToken | Self::Unauthorized)
    }
}
