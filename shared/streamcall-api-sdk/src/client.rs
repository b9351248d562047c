//! Streamcall API Client
//!
//! HTTP client for the call provisioning and catalogue endpoints.

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use streamcall_core::{CallType, OpponentId, SessionId};
use tracing::{debug, warn};

use crate::auth::TokenStore;
use crate::error::{ApiError, Result};
use crate::types::*;

/// Streamer catalogue page size
pub const STREAMER_PAGE_SIZE: usize = 20;

/// Streamer media page size
pub const MEDIA_PAGE_SIZE: usize = 30;

/// Client settings
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Backend API client
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
}

impl ApiClient {
    pub fn new(config: &ApiConfig, tokens: Arc<dyn TokenStore>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            tokens,
        })
    }

    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    /// Request a call with `opponent`; the response carries the session id
    pub async fn create_call(
        &self,
        opponent: &OpponentId,
        call_type: CallType,
    ) -> Result<CreateCallResponse> {
        let endpoint = format!("video/call/{}", call_type.create_path());
        debug!(opponent_id = %opponent, call_type = %call_type, "Creating call");

        let request = self
            .client
            .post(self.url(&endpoint))
            .query(&[("opponentId", opponent.as_str())])
            .json(&serde_json::Value::Null);

        let created: Option<CreateCallResponse> = self.send(request, true).await?;
        Ok(created.unwrap_or_default())
    }

    /// Fetch the current state of a call session
    pub async fn call_details(&self, session_id: &SessionId) -> Result<CallDetails> {
        let request = self
            .client
            .get(self.url("video/call/details"))
            .query(&[("videoId", session_id.as_str())]);

        self.send(request, true).await
    }

    /// Ask the backend to text a login OTP to `mobile`
    pub async fn send_otp(&self, mobile: &str) -> Result<()> {
        if mobile.trim().is_empty() {
            return Err(ApiError::Api {
                status: StatusCode::BAD_REQUEST.as_u16(),
                body: "mobile number is required".to_string(),
            });
        }

        debug!("Requesting login OTP");
        let request = self
            .client
            .post(self.url("login/send-otp"))
            .json(&SendOtpRequest { mobile });

        let _: serde_json::Value = self.send(request, false).await?;
        Ok(())
    }

    /// Fetch one page of the streamer catalogue
    pub async fn fetch_streamers(&self, page: u32) -> Result<StreamerPage> {
        let request = self
            .client
            .get(self.url("user/fetch/streamers-v2"))
            .query(&[
                ("page", page.to_string()),
                ("pageSize", STREAMER_PAGE_SIZE.to_string()),
            ]);

        let items: Vec<Streamer> = self.send(request, true).await?;
        Ok(StreamerPage::new(page, items, STREAMER_PAGE_SIZE))
    }

    pub async fn streamer_details(&self, streamer_id: &str) -> Result<StreamerDetails> {
        let request = self
            .client
            .get(self.url("user/streamer/details"))
            .query(&[("streamerId", streamer_id)]);

        self.send(request, true).await
    }

    /// Media items after `from_id`; pass `-1` for the first page
    pub async fn streamer_media(&self, streamer_id: &str, from_id: i64) -> Result<Vec<MediaItem>> {
        let request = self
            .client
            .get(self.url("user/streamer-media"))
            .query(&[
                ("streamerId", streamer_id.to_string()),
                ("fromId", from_id.to_string()),
                ("pageSize", MEDIA_PAGE_SIZE.to_string()),
            ]);

        self.send(request, true).await
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, use_token: bool) -> Result<T> {
        let request = if use_token {
            let token = self.tokens.token().ok_or(ApiError::MissingToken)?;
            request.bearer_auth(token)
        } else {
            request
        };

        let response = request.send().await?;
        self.handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            warn!("Backend rejected the auth token, clearing it");
            self.tokens.clear();
            return Err(ApiError::Unauthorized);
        }

        let body = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::Api {
                status: status.as_u16(),
                body,
            });
        }

        decode_body(&body)
    }
}

/// An empty body decodes like JSON `null`
fn decode_body<T: DeserializeOwned>(body: &str) -> Result<T> {
    let body = if body.trim().is_empty() { "null" } else { body };
    serde_json::from_str(body).map_err(|e| ApiError::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_empty_body_as_null() {
        let decoded: Option<CreateCallResponse> = decode_body("  ").unwrap();
        assert!(decoded.is_none());
    }

    #[test]
    fn test_decode_garbage_is_parse_error() {
        let result: Result<CallDetails> = decode_body("<html>");
        assert!(matches!(result, Err(ApiError::Parse(_))));
    }
}
