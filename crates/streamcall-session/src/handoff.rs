//! Session handoff: from "call provisioned" to "media session joined"

use std::sync::Arc;
use streamcall_api_sdk::CallDetails;
use streamcall_core::JoinCredentials;
use streamcall_rtc_sdk::{JoinRoomOptions, RenderTarget, RtcProvider};
use tracing::{debug, info, warn};

use crate::error::{CallError, HandoffFailure, Result};
use crate::state::PollState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandoffOutcome {
    Joined { room_id: String },
    /// The session had already joined; nothing was called
    AlreadyJoined,
    /// The session was cancelled before the join completed; any room
    /// joined on the way was left again
    Cancelled,
}

/// Build join credentials out of a details response that reported the
/// counterpart present.
pub fn credentials_from(details: &CallDetails) -> std::result::Result<JoinCredentials, HandoffFailure> {
    let channel = details
        .agora_channel_name
        .as_deref()
        .filter(|c| !c.is_empty())
        .ok_or(HandoffFailure::IncompleteCredentials("channel name"))?;
    let user_id = details
        .user_id
        .as_ref()
        .map(|id| id.to_string())
        .filter(|id| !id.is_empty())
        .ok_or(HandoffFailure::IncompleteCredentials("user id"))?;
    let user_token = details
        .agora_user_token
        .as_deref()
        .filter(|t| !t.is_empty())
        .ok_or(HandoffFailure::IncompleteCredentials("user token"))?;

    Ok(JoinCredentials::new(
        channel,
        user_id,
        details.participant_name().map(str::to_string),
        user_token,
        details.agora_streamer_token.clone(),
    ))
}

/// Parse the configured application id; it must be a non-zero number.
pub fn resolve_app_id(raw: Option<&str>) -> Result<u32> {
    let raw = raw
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .ok_or_else(|| CallError::Configuration("App ID is not set".to_string()))?;

    match raw.parse::<u32>() {
        Ok(0) | Err(_) => Err(CallError::Configuration(
            "App ID is not a valid number".to_string(),
        )),
        Ok(id) => Ok(id),
    }
}

/// Joins the RTC room once the counterpart is present
pub struct SessionHandoff {
    provider: Arc<dyn RtcProvider>,
    app_id: Option<String>,
    options: JoinRoomOptions,
}

impl SessionHandoff {
    pub fn new(provider: Arc<dyn RtcProvider>, app_id: Option<String>, options: JoinRoomOptions) -> Self {
        Self {
            provider,
            app_id,
            options,
        }
    }

    /// Join the room described by `credentials` into `target`.
    ///
    /// Returns `AlreadyJoined` without touching the provider when `state`
    /// has joined before. Concurrent calls on one state run one at a time.
    pub async fn handoff(
        &self,
        state: &PollState,
        credentials: JoinCredentials,
        target: Option<RenderTarget>,
    ) -> Result<HandoffOutcome> {
        let gate = state.lock_join().await;
        if state.is_room_joined() {
            debug!(room_id = %credentials.channel_name(), "Room already joined, skipping join");
            return Ok(HandoffOutcome::AlreadyJoined);
        }
        if state.is_stopped() {
            debug!(room_id = %credentials.channel_name(), "Session cancelled, skipping join");
            return Ok(HandoffOutcome::Cancelled);
        }

        let app_id = resolve_app_id(self.app_id.as_deref())?;

        let token = self
            .provider
            .generate_join_token(
                app_id,
                credentials.user_token(),
                credentials.channel_name(),
                credentials.user_id(),
                credentials.user_name(),
            )
            .map_err(|e| HandoffFailure::Token(e.to_string()))?;

        debug!(room_id = %credentials.channel_name(), "Creating call instance");
        let room = self
            .provider
            .create(token)
            .await
            .map_err(|e| HandoffFailure::Instance(e.to_string()))?;

        let target = target.ok_or(HandoffFailure::ContainerMissing)?;

        room.join_room(&target, &self.options)
            .await
            .map_err(|e| HandoffFailure::Join(e.to_string()))?;

        let room_id = room.room_id().to_string();
        if state.is_stopped() {
            info!(room_id = %room_id, "Session cancelled during join, leaving room");
            if let Err(e) = room.leave_room().await {
                warn!(room_id = %room_id, error = %e, "Failed to leave room after cancellation");
            }
            return Ok(HandoffOutcome::Cancelled);
        }
        state.mark_joined(room, &gate);

        info!(
            room_id = %room_id,
            user_id = %credentials.user_id(),
            container = %target.container_id,
            "Successfully joined the room"
        );

        Ok(HandoffOutcome::Joined { room_id })
    }
}
