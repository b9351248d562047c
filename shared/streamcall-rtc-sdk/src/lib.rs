//! Streamcall RTC SDK
//!
//! The narrow interface the call flow uses to reach a real-time
//! communication library: mint a join token, create a room instance,
//! join it into a rendering target.

pub mod error;
pub mod headless;
pub mod provider;
pub mod room;
pub mod token;

pub use error::{Result, RtcError};
pub use headless::{HeadlessProvider, RoomEvent};
pub use provider::{RtcProvider, RtcRoom};
pub use room::{Branding, JoinRoomOptions, RenderTarget, ScenarioMode};
pub use token::{JoinToken, KitTokenClaims};
