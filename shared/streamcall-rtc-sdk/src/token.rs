//! Join tokens
//!
//! A kit token is the server-issued user token followed by `#` and a
//! base64 JSON blob naming the app, room and user it is valid for.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, RtcError};

/// Opaque token accepted by `RtcProvider::create`
#[derive(Clone, PartialEq, Eq)]
pub struct JoinToken(String);

impl JoinToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Build a kit token for production use
    pub fn kit(app_id: u32, user_token: &str, room_id: &str, user_id: &str, user_name: &str) -> Result<Self> {
        if user_token.is_empty() {
            return Err(RtcError::InvalidToken("user token is empty".to_string()));
        }
        if room_id.is_empty() || user_id.is_empty() {
            return Err(RtcError::InvalidToken("room id and user id are required".to_string()));
        }

        let claims = KitTokenClaims {
            app_id,
            room_id: room_id.to_string(),
            user_id: user_id.to_string(),
            user_name: user_name.to_string(),
        };
        let encoded = serde_json::to_vec(&claims)
            .map_err(|e| RtcError::InvalidToken(e.to_string()))?;

        Ok(Self(format!("{}#{}", user_token, STANDARD.encode(encoded))))
    }

    /// Split a kit token back into its user token and claims
    pub fn decode_kit(&self) -> Result<(String, KitTokenClaims)> {
        let (user_token, blob) = self
            .0
            .rsplit_once('#')
            .ok_or_else(|| RtcError::InvalidToken("missing claims section".to_string()))?;

        let bytes = STANDARD
            .decode(blob)
            .map_err(|e| RtcError::InvalidToken(e.to_string()))?;
        let claims = serde_json::from_slice(&bytes)
            .map_err(|e| RtcError::InvalidToken(e.to_string()))?;

        Ok((user_token.to_string(), claims))
    }
}

// tokens stay out of logs
impl fmt::Debug for JoinToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("JoinToken(***)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KitTokenClaims {
    #[serde(rename = "appID")]
    pub app_id: u32,
    #[serde(rename = "roomID")]
    pub room_id: String,
    #[serde(rename = "userID")]
    pub user_id: String,
    #[serde(rename = "userName")]
    pub user_name: String,
}
