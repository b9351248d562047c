//! Call initiator

use std::sync::Arc;
use streamcall_core::{CallSession, CallType, OpponentId};
use tracing::{info, warn};

use crate::api::CallApi;
use crate::error::{CallError, Result};

/// Asks the provisioning API for a new call session
pub struct CallInitiator {
    api: Arc<dyn CallApi>,
}

impl CallInitiator {
    pub fn new(api: Arc<dyn CallApi>) -> Self {
        Self { api }
    }

    /// Request a `call_type` call with `opponent`.
    ///
    /// Fails with `InitiationFailed` when the opponent is blank, the request
    /// fails, or the response carries no session id.
    pub async fn initiate(&self, opponent: &OpponentId, call_type: CallType) -> Result<CallSession> {
        if opponent.is_empty() {
            return Err(CallError::InitiationFailed(
                "opponent identifier is required".to_string(),
            ));
        }

        let created = self
            .api
            .create_call(opponent, call_type)
            .await
            .map_err(|e| {
                warn!(opponent_id = %opponent, call_type = %call_type, error = %e, "Call creation request failed");
                CallError::InitiationFailed(e.to_string())
            })?;

        let session_id = created.session_id().ok_or_else(|| {
            warn!(opponent_id = %opponent, call_type = %call_type, "Call creation returned no session id");
            CallError::InitiationFailed("no session id returned, please try again".to_string())
        })?;

        let session = CallSession::new(session_id, call_type, opponent.clone())
            .with_channel_name(created.agora_channel_name);

        info!(
            session_id = %session.id,
            attempt_id = %session.attempt_id,
            opponent_id = %opponent,
            call_type = %call_type,
            "Call initiated"
        );
        Ok(session)
    }
}
