//! Bootstrap settings

use std::time::Duration;
use streamcall_rtc_sdk::JoinRoomOptions;

/// Delay between two poll ticks
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

#[derive(Debug, Clone)]
pub struct CallSessionConfig {
    pub poll_interval: Duration,
    /// Fetch ceiling per session; `None` polls until a terminal state
    pub max_attempts: Option<u32>,
    /// Raw application id, resolved when the handoff runs
    pub app_id: Option<String>,
    pub join_options: JoinRoomOptions,
}

impl Default for CallSessionConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            max_attempts: None,
            app_id: None,
            join_options: JoinRoomOptions::default(),
        }
    }
}
