//! Capability traits implemented by RTC backends

use async_trait::async_trait;

use crate::error::Result;
use crate::room::{JoinRoomOptions, RenderTarget};
use crate::token::JoinToken;

/// Entry point of a real-time communication library
#[async_trait]
pub trait RtcProvider: Send + Sync {
    /// Mint the token a room instance is created from
    fn generate_join_token(
        &self,
        app_id: u32,
        user_token: &str,
        room_id: &str,
        user_id: &str,
        user_name: &str,
    ) -> Result<JoinToken> {
        JoinToken::kit(app_id, user_token, room_id, user_id, user_name)
    }

    /// Create a room instance bound to `token`
    async fn create(&self, token: JoinToken) -> Result<Box<dyn RtcRoom>>;
}

/// A created room instance
#[async_trait]
pub trait RtcRoom: Send + Sync {
    fn room_id(&self) -> &str;

    /// Join and start rendering live media into `target`
    async fn join_room(&self, target: &RenderTarget, options: &JoinRoomOptions) -> Result<()>;

    async fn leave_room(&self) -> Result<()>;
}
