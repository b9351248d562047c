//! Room join options

use serde::{Deserialize, Serialize};

/// Where live media gets rendered (a container element on the page)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderTarget {
    pub container_id: String,
}

impl RenderTarget {
    pub fn new(container_id: impl Into<String>) -> Self {
        Self {
            container_id: container_id.into(),
        }
    }
}

/// Room scenario understood by the call library
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScenarioMode {
    OneOnOneCall,
    GroupCall,
    VideoConference,
    LiveStreaming,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branding {
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomOptions {
    pub scenario: ScenarioMode,
    pub show_pre_join_view: bool,
    pub branding: Branding,
}

impl JoinRoomOptions {
    /// One-on-one call straight into the room, no pre-join screen
    pub fn one_on_one(logo_url: Option<String>) -> Self {
        Self {
            scenario: ScenarioMode::OneOnOneCall,
            show_pre_join_view: false,
            branding: Branding { logo_url },
        }
    }
}

impl Default for JoinRoomOptions {
    fn default() -> Self {
        Self::one_on_one(Some("/icon.png".to_string()))
    }
}
