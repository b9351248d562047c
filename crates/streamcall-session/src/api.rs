//! Provisioning API seam

use async_trait::async_trait;
use streamcall_api_sdk::{ApiClient, ApiError, CallDetails, CreateCallResponse};
use streamcall_core::{CallType, OpponentId, SessionId};

/// The two backend calls the bootstrap needs
#[async_trait]
pub trait CallApi: Send + Sync {
    async fn create_call(
        &self,
        opponent: &OpponentId,
        call_type: CallType,
    ) -> Result<CreateCallResponse, ApiError>;

    async fn call_details(&self, session_id: &SessionId) -> Result<CallDetails, ApiError>;
}

#[async_trait]
impl CallApi for ApiClient {
    async fn create_call(
        &self,
        opponent: &OpponentId,
        call_type: CallType,
    ) -> Result<CreateCallResponse, ApiError> {
        ApiClient::create_call(self, opponent, call_type).await
    }

    async fn call_details(&self, session_id: &SessionId) -> Result<CallDetails, ApiError> {
        ApiClient::call_details(self, session_id).await
    }
}
