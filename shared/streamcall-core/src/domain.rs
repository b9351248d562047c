//! Core domain types for the call session bootstrap

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque identifier of one call attempt, issued by the provisioning API
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// Returns `None` for an empty or blank identifier.
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            None
        } else {
            Some(Self(id))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference to the user being called
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OpponentId(pub String);

impl OpponentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for OpponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Media kind of a call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallType {
    Video,
    Audio,
}

impl CallType {
    /// Path segment of the creation endpoint for this call type
    pub fn create_path(&self) -> &'static str {
        match self {
            Self::Video => "create",
            Self::Audio => "audio-create",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
        }
    }
}

impl fmt::Display for CallType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Session status as reported by the details endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallStatus {
    Pending,
    Joined,
    Ended,
    #[serde(other)]
    Unknown,
}

impl CallStatus {
    pub fn is_ended(&self) -> bool {
        matches!(self, Self::Ended)
    }
}

impl Default for CallStatus {
    fn default() -> Self {
        Self::Pending
    }
}

/// One provisioned call attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallSession {
    pub id: SessionId,
    pub call_type: CallType,
    pub status: CallStatus,
    pub opponent_id: OpponentId,
    pub channel_name: Option<String>,
    /// Local correlation id for logs; never sent to the API
    pub attempt_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl CallSession {
    pub fn new(id: SessionId, call_type: CallType, opponent_id: OpponentId) -> Self {
        Self {
            id,
            call_type,
            status: CallStatus::Pending,
            opponent_id,
            channel_name: None,
            attempt_id: Uuid::new_v4(),
            created_at: Utc::now(),
        }
    }

    pub fn with_channel_name(mut self, channel_name: Option<String>) -> Self {
        self.channel_name = channel_name.filter(|c| !c.is_empty());
        self
    }
}

/// Credentials for joining the media room, built once from a poll response.
///
/// Immutable after construction; handed to the join routine by value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinCredentials {
    channel_name: String,
    user_id: String,
    user_name: String,
    user_token: String,
    counterpart_token: Option<String>,
}

impl JoinCredentials {
    pub fn new(
        channel_name: impl Into<String>,
        user_id: impl Into<String>,
        user_name: Option<String>,
        user_token: impl Into<String>,
        counterpart_token: Option<String>,
    ) -> Self {
        let user_id = user_id.into();
        let user_name = user_name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| format!("user_{}", user_id));
        Self {
            channel_name: channel_name.into(),
            user_id,
            user_name,
            user_token: user_token.into(),
            counterpart_token,
        }
    }

    pub fn channel_name(&self) -> &str {
        &self.channel_name
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn user_token(&self) -> &str {
        &self.user_token
    }

    pub fn counterpart_token(&self) -> Option<&str> {
        self.counterpart_token.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_rejects_blank() {
        assert!(SessionId::new("").is_none());
        assert!(SessionId::new("   ").is_none());
        assert_eq!(SessionId::new("abc123").unwrap().as_str(), "abc123");
    }

    #[test]
    fn test_call_type_paths() {
        assert_eq!(CallType::Video.create_path(), "create");
        assert_eq!(CallType::Audio.create_path(), "audio-create");
        let parsed: CallType = serde_json::from_str("\"audio\"").unwrap();
        assert_eq!(parsed, CallType::Audio);
    }

    #[test]
    fn test_unknown_status_is_not_terminal() {
        let status: CallStatus = serde_json::from_str("\"ringing\"").unwrap();
        assert_eq!(status, CallStatus::Unknown);
        assert!(!status.is_ended());

        let ended: CallStatus = serde_json::from_str("\"ended\"").unwrap();
        assert!(ended.is_ended());
    }

    #[test]
    fn test_join_credentials_default_name() {
        let creds = JoinCredentials::new("ch1", "42", None, "tok", Some("tok2".into()));
        assert_eq!(creds.counterpart_token(), Some("tok2"));
        assert_eq!(creds.user_name(), "user_42");

        let named = JoinCredentials::new("ch1", "42", Some("Ada".into()), "tok", None);
        assert_eq!(named.user_name(), "Ada");
    }

    #[test]
    fn test_session_channel_name_filters_empty() {
        let session = CallSession::new(
            SessionId::new("abc").unwrap(),
            CallType::Video,
            OpponentId::new("2123"),
        )
        .with_channel_name(Some(String::new()));
        assert!(session.channel_name.is_none());
    }
}
