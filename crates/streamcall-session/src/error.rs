//! Call bootstrap errors
//!
//! Every variant is caught where it happens and turned into the message the
//! page shows; none of them is retried.

pub type Result<T> = std::result::Result<T, CallError>;

/// Why joining the media room failed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HandoffFailure {
    #[error("incomplete join credentials: missing {0}")]
    IncompleteCredentials(&'static str),

    #[error("token generation failed: {0}")]
    Token(String),

    #[error("failed to create call instance: {0}")]
    Instance(String),

    #[error("container reference is missing, unable to join room")]
    ContainerMissing,

    #[error("join failed: {0}")]
    Join(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CallError {
    #[error("Failed to initiate the call: {0}")]
    InitiationFailed(String),

    #[error("Failed to fetch call details: {0}")]
    PollTransport(String),

    #[error("Gave up waiting for the call after {0} attempts")]
    PollAttemptsExhausted(u32),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Failed to join the call: {0}")]
    HandoffFailed(#[from] HandoffFailure),
}

impl CallError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InitiationFailed(_) => "INITIATION_FAILED",
            Self::PollTransport(_) => "POLL_TRANSPORT_ERROR",
            Self::PollAttemptsExhausted(_) => "POLL_ATTEMPTS_EXHAUSTED",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::HandoffFailed(HandoffFailure::ContainerMissing) => "CONTAINER_MISSING",
            Self::HandoffFailed(_) => "HANDOFF_FAILED",
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::InitiationFailed(_) | Self::PollTransport(_) => 502,
            Self::PollAttemptsExhausted(_) => 504,
            Self::Configuration(_) | Self::HandoffFailed(_) => 500,
        }
    }
}
