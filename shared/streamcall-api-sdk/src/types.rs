//! Request and response payloads

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use streamcall_core::{CallStatus, SessionId};

/// Identifier the backend sends either as a JSON number or a string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdValue {
    Number(i64),
    Text(String),
}

impl fmt::Display for IdValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Timestamp sent as epoch milliseconds or RFC 3339 text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    Millis(i64),
    Text(String),
}

impl Timestamp {
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Millis(ms) => Utc.timestamp_millis_opt(*ms).single(),
            Self::Text(s) => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
        }
    }
}

/// Response of the call creation endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCallResponse {
    pub id: Option<IdValue>,
    #[serde(alias = "channelName")]
    pub agora_channel_name: Option<String>,
}

impl CreateCallResponse {
    /// The issued session id, `None` when missing or blank
    pub fn session_id(&self) -> Option<SessionId> {
        self.id.as_ref().and_then(|id| SessionId::new(id.to_string()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDetails {
    pub name: Option<String>,
}

/// Response of the call details endpoint, fetched on every poll tick
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallDetails {
    pub id: Option<IdValue>,
    pub streamer_joined: Option<bool>,
    pub status: Option<CallStatus>,
    pub user_id: Option<IdValue>,
    pub user_details: Option<UserDetails>,
    #[serde(alias = "channelName")]
    pub agora_channel_name: Option<String>,
    #[serde(alias = "userToken")]
    pub agora_user_token: Option<String>,
    #[serde(alias = "streamerToken")]
    pub agora_streamer_token: Option<String>,
    pub start_time: Option<Timestamp>,
}

impl CallDetails {
    pub fn counterpart_joined(&self) -> bool {
        self.streamer_joined.unwrap_or(false)
    }

    pub fn is_ended(&self) -> bool {
        self.status.map(|s| s.is_ended()).unwrap_or(false)
    }

    pub fn participant_name(&self) -> Option<&str> {
        self.user_details.as_ref().and_then(|d| d.name.as_deref())
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.start_time.as_ref().and_then(Timestamp::to_datetime)
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct SendOtpRequest<'a> {
    pub mobile: &'a str,
}

/// Entry of the streamer catalogue
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Streamer {
    pub id: i64,
    pub name: String,
    pub about_me: Option<String>,
    pub age: Option<u32>,
    pub audio_calls: bool,
    pub audio_user_rate: Option<f64>,
    pub busy: bool,
    pub call_count: u64,
    pub city: Option<String>,
    pub display_rate: Option<f64>,
    pub face_pic: Option<String>,
    pub follower_count: u64,
    pub gender: Option<String>,
    pub interests: Vec<String>,
    pub languages: Vec<String>,
    pub live: bool,
    pub livestream_id: Option<String>,
    pub new_user: bool,
    pub online: bool,
    pub only_premium_users: bool,
    pub premium: bool,
    pub profile_pic: Option<String>,
    pub recommended: bool,
    pub score: f64,
    pub vip_call_rate: Option<f64>,
}

/// One page of the streamer catalogue
#[derive(Debug, Clone, Serialize)]
pub struct StreamerPage {
    pub page: u32,
    pub items: Vec<Streamer>,
    /// Index of the following page; `None` once a short page is seen
    pub next_page: Option<u32>,
}

impl StreamerPage {
    pub fn new(page: u32, items: Vec<Streamer>, page_size: usize) -> Self {
        let next_page = if items.len() == page_size {
            Some(page + 1)
        } else {
            None
        };
        Self { page, items, next_page }
    }
}

/// Streamer profile
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StreamerDetails {
    pub profile_pic: Option<String>,
    pub name: Option<String>,
    pub age: Option<u32>,
    pub city: Option<String>,
    pub online: Option<bool>,
    pub busy: Option<bool>,
    pub about_me: Option<String>,
    pub languages: Vec<String>,
    pub interests: Vec<String>,
    pub follower_count: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MediaType {
    Image,
    Video,
    #[serde(other)]
    Other,
}

/// Photo or clip on a streamer profile
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    pub id: i64,
    pub url: String,
    pub media_type: MediaType,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_response_accepts_both_channel_keys() {
        let legacy: CreateCallResponse =
            serde_json::from_value(json!({"id": "abc123", "agoraChannelName": "ch1"})).unwrap();
        assert_eq!(legacy.agora_channel_name.as_deref(), Some("ch1"));

        let plain: CreateCallResponse =
            serde_json::from_value(json!({"id": 77, "channelName": "ch2"})).unwrap();
        assert_eq!(plain.session_id().unwrap().as_str(), "77");
        assert_eq!(plain.agora_channel_name.as_deref(), Some("ch2"));
    }

    #[test]
    fn test_create_response_blank_id() {
        let resp: CreateCallResponse = serde_json::from_value(json!({"id": ""})).unwrap();
        assert!(resp.session_id().is_none());
        assert!(CreateCallResponse::default().session_id().is_none());
    }

    #[test]
    fn test_call_details_joined() {
        let details: CallDetails = serde_json::from_value(json!({
            "streamerJoined": true,
            "status": "pending",
            "userId": 42,
            "agoraChannelName": "ch1",
            "agoraUserToken": "tok",
            "agoraStreamerToken": "tok2",
            "startTime": 1_700_000_000_000i64
        }))
        .unwrap();

        assert!(details.counterpart_joined());
        assert!(!details.is_ended());
        assert_eq!(details.user_id.as_ref().unwrap().to_string(), "42");
        assert_eq!(details.started_at().unwrap().timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_call_details_minimal_and_ended() {
        let details: CallDetails = serde_json::from_value(json!({"status": "ended"})).unwrap();
        assert!(!details.counterpart_joined());
        assert!(details.is_ended());
        assert!(details.participant_name().is_none());
    }

    #[test]
    fn test_start_time_text() {
        let ts = Timestamp::Text("2024-05-01T10:00:00Z".to_string());
        assert_eq!(ts.to_datetime().unwrap().timestamp(), 1_714_557_600);
        assert!(Timestamp::Text("yesterday".to_string()).to_datetime().is_none());
    }

    #[test]
    fn test_streamer_page_rule() {
        let full = StreamerPage::new(0, vec![Streamer::default(); 20], 20);
        assert_eq!(full.next_page, Some(1));

        let short = StreamerPage::new(3, vec![Streamer::default(); 7], 20);
        assert_eq!(short.next_page, None);
    }

    #[test]
    fn test_media_type_unknown() {
        let item: MediaItem =
            serde_json::from_value(json!({"id": 1, "url": "u", "mediaType": "AUDIO"})).unwrap();
        assert_eq!(item.media_type, MediaType::Other);
    }
}
