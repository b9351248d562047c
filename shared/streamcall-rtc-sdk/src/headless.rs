//! Headless provider
//!
//! Validates tokens and records room activity instead of rendering media.
//! The demo service runs on it; tests use it to count joins.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

use crate::error::{Result, RtcError};
use crate::provider::{RtcProvider, RtcRoom};
use crate::room::{JoinRoomOptions, RenderTarget, ScenarioMode};
use crate::token::{JoinToken, KitTokenClaims};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RoomEvent {
    Created {
        room_id: String,
        user_id: String,
    },
    Joined {
        room_id: String,
        user_id: String,
        container_id: String,
        scenario: ScenarioMode,
    },
    Left {
        room_id: String,
    },
}

#[derive(Clone, Default)]
pub struct HeadlessProvider {
    events: Arc<Mutex<Vec<RoomEvent>>>,
}

impl HeadlessProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RoomEvent> {
        self.events.lock().clone()
    }

    pub fn join_count(&self) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| matches!(e, RoomEvent::Joined { .. }))
            .count()
    }
}

#[async_trait]
impl RtcProvider for HeadlessProvider {
    async fn create(&self, token: JoinToken) -> Result<Box<dyn RtcRoom>> {
        let (_, claims) = token
            .decode_kit()
            .map_err(|e| RtcError::Instance(e.to_string()))?;

        self.events.lock().push(RoomEvent::Created {
            room_id: claims.room_id.clone(),
            user_id: claims.user_id.clone(),
        });

        Ok(Box::new(HeadlessRoom {
            claims,
            events: self.events.clone(),
            joined: AtomicBool::new(false),
        }))
    }
}

struct HeadlessRoom {
    claims: KitTokenClaims,
    events: Arc<Mutex<Vec<RoomEvent>>>,
    joined: AtomicBool,
}

#[async_trait]
impl RtcRoom for HeadlessRoom {
    fn room_id(&self) -> &str {
        &self.claims.room_id
    }

    async fn join_room(&self, target: &RenderTarget, options: &JoinRoomOptions) -> Result<()> {
        if target.container_id.is_empty() {
            return Err(RtcError::Join("render target has no container id".to_string()));
        }

        self.joined.store(true, Ordering::SeqCst);
        self.events.lock().push(RoomEvent::Joined {
            room_id: self.claims.room_id.clone(),
            user_id: self.claims.user_id.clone(),
            container_id: target.container_id.clone(),
            scenario: options.scenario,
        });

        info!(
            room_id = %self.claims.room_id,
            user_id = %self.claims.user_id,
            app_id = self.claims.app_id,
            container = %target.container_id,
            scenario = ?options.scenario,
            "Joined room (headless)"
        );
        Ok(())
    }

    async fn leave_room(&self) -> Result<()> {
        if !self.joined.swap(false, Ordering::SeqCst) {
            return Err(RtcError::NotJoined);
        }
        self.events.lock().push(RoomEvent::Left {
            room_id: self.claims.room_id.clone(),
        });
        info!(room_id = %self.claims.room_id, "Left room (headless)");
        Ok(())
    }
}
