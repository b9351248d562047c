//! RTC errors

pub type Result<T> = std::result::Result<T, RtcError>;

#[derive(Debug, thiserror::Error)]
pub enum RtcError {
    #[error("Invalid join token: {0}")]
    InvalidToken(String),

    #[error("Failed to create room instance: {0}")]
    Instance(String),

    #[error("Failed to join room: {0}")]
    Join(String),

    #[error("Room not joined")]
    NotJoined,
}
