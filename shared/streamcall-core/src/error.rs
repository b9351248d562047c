//! Error types for Streamcall services

use thiserror::Error;

pub type Result<T> = std::result::Result<T, StreamcallError>;

#[derive(Error, Debug)]
pub enum StreamcallError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl StreamcallError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG_ERROR",
            Self::Network(_) => "NETWORK_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<std::io::Error> for StreamcallError {
    fn from(err: std::io::Error) -> Self {
        StreamcallError::Network(err.to_string())
    }
}
