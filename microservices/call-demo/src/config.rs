//! Demo service configuration

use std::time::Duration;
use streamcall_api_sdk::ApiConfig;
use streamcall_core::{env_or, parse_env, OpponentId, Result};
use streamcall_rtc_sdk::JoinRoomOptions;
use streamcall_session::{CallSessionConfig, DEFAULT_POLL_INTERVAL_MS};

#[derive(Debug, Clone)]
pub struct CallDemoConfig {
    pub api_url: String,
    pub app_id: Option<String>,
    pub auth_token: Option<String>,
    pub poll_interval_ms: u64,
    pub poll_max_attempts: Option<u32>,
    pub request_timeout_secs: u64,
    pub branding_logo_url: String,
    pub demo_opponent_id: String,
    pub http_bind: String,
}

impl CallDemoConfig {
    pub fn from_env() -> Result<Self> {
        let poll_max_attempts = match parse_env("POLL_MAX_ATTEMPTS", 0u32)? {
            0 => None,
            n => Some(n),
        };

        Ok(Self {
            api_url: env_or("STREAMCALL_API_URL", "http://localhost:3000"),
            app_id: std::env::var("STREAMCALL_APP_ID").ok(),
            auth_token: std::env::var("STREAMCALL_AUTH_TOKEN")
                .ok()
                .filter(|t| !t.is_empty()),
            poll_interval_ms: parse_env("POLL_INTERVAL_MS", DEFAULT_POLL_INTERVAL_MS)?,
            poll_max_attempts,
            request_timeout_secs: parse_env("REQUEST_TIMEOUT_SECS", 30)?,
            branding_logo_url: env_or("BRANDING_LOGO_URL", "/icon.png"),
            demo_opponent_id: env_or("DEMO_OPPONENT_ID", "2123"),
            http_bind: env_or("HTTP_BIND", "0.0.0.0:8080"),
        })
    }

    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            base_url: self.api_url.clone(),
            request_timeout_secs: self.request_timeout_secs,
        }
    }

    pub fn session_config(&self) -> CallSessionConfig {
        CallSessionConfig {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            max_attempts: self.poll_max_attempts,
            app_id: self.app_id.clone(),
            join_options: JoinRoomOptions::one_on_one(
                Some(self.branding_logo_url.clone()).filter(|u| !u.is_empty()),
            ),
        }
    }

    pub fn default_opponent(&self) -> OpponentId {
        OpponentId::new(self.demo_opponent_id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CallDemoConfig {
        CallDemoConfig {
            api_url: "http://backend:3000".to_string(),
            app_id: Some("123456".to_string()),
            auth_token: None,
            poll_interval_ms: 250,
            poll_max_attempts: Some(10),
            request_timeout_secs: 5,
            branding_logo_url: String::new(),
            demo_opponent_id: "2123".to_string(),
            http_bind: "127.0.0.1:0".to_string(),
        }
    }

    #[test]
    fn test_session_config_mapping() {
        let session = sample().session_config();
        assert_eq!(session.poll_interval, Duration::from_millis(250));
        assert_eq!(session.max_attempts, Some(10));
        assert_eq!(session.app_id.as_deref(), Some("123456"));
        assert!(session.join_options.branding.logo_url.is_none());
        assert!(!session.join_options.show_pre_join_view);
    }

    #[test]
    fn test_api_config_mapping() {
        let api = sample().api_config();
        assert_eq!(api.base_url, "http://backend:3000");
        assert_eq!(api.request_timeout_secs, 5);
        assert_eq!(sample().default_opponent().as_str(), "2123");
    }
}
