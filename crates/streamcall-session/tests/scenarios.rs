//! End-to-end bootstrap sequences against a scripted backend

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use streamcall_api_sdk::{
    ApiClient, ApiConfig, ApiError, CallDetails, CreateCallResponse, MemoryTokenStore,
};
use streamcall_core::{CallStatus, CallType, OpponentId, SessionId};
use streamcall_rtc_sdk::{
    HeadlessProvider, JoinRoomOptions, JoinToken, RenderTarget, RoomEvent, RtcProvider, RtcRoom,
};
use streamcall_session::{
    CallApi, CallError, CallSessionConfig, HandoffFailure, HandoffOutcome, PollPhase, PollState,
    SessionController, SessionHandoff,
};

/// Backend double: create responses are consumed in order, details
/// responses too, and the last details response repeats forever.
#[derive(Default)]
struct ScriptedApi {
    creates: Mutex<VecDeque<Result<CreateCallResponse, ApiError>>>,
    details: Mutex<VecDeque<Result<CallDetails, ApiError>>>,
    fetches: AtomicUsize,
    fetched_ids: Mutex<Vec<String>>,
}

impl ScriptedApi {
    fn new() -> Self {
        Self::default()
    }

    fn create(self, json: serde_json::Value) -> Self {
        self.creates
            .lock()
            .push_back(Ok(serde_json::from_value(json).unwrap()));
        self
    }

    fn details(self, json: serde_json::Value) -> Self {
        self.details
            .lock()
            .push_back(Ok(serde_json::from_value(json).unwrap()));
        self
    }

    fn details_error(self, status: u16) -> Self {
        self.details.lock().push_back(Err(ApiError::Api {
            status,
            body: "unavailable".to_string(),
        }));
        self
    }

    fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CallApi for ScriptedApi {
    async fn create_call(
        &self,
        _opponent: &OpponentId,
        _call_type: CallType,
    ) -> Result<CreateCallResponse, ApiError> {
        self.creates
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(CreateCallResponse::default()))
    }

    async fn call_details(&self, session_id: &SessionId) -> Result<CallDetails, ApiError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.fetched_ids.lock().push(session_id.to_string());

        let mut queue = self.details.lock();
        if queue.len() > 1 {
            return queue.pop_front().unwrap();
        }
        match queue.front() {
            Some(Ok(details)) => Ok(details.clone()),
            Some(Err(ApiError::Api { status, body })) => Err(ApiError::Api {
                status: *status,
                body: body.clone(),
            }),
            _ => Ok(CallDetails::default()),
        }
    }
}

/// Headless provider that also keeps every token it was handed
#[derive(Clone, Default)]
struct RecordingProvider {
    inner: HeadlessProvider,
    tokens: Arc<Mutex<Vec<JoinToken>>>,
}

#[async_trait]
impl RtcProvider for RecordingProvider {
    async fn create(&self, token: JoinToken) -> streamcall_rtc_sdk::Result<Box<dyn RtcRoom>> {
        self.tokens.lock().push(token.clone());
        self.inner.create(token).await
    }
}

fn config(app_id: &str) -> CallSessionConfig {
    CallSessionConfig {
        app_id: Some(app_id.to_string()),
        join_options: JoinRoomOptions::one_on_one(None),
        ..Default::default()
    }
}

fn joined_details() -> serde_json::Value {
    serde_json::json!({
        "streamerJoined": true,
        "userId": 42,
        "agoraChannelName": "ch1",
        "agoraUserToken": "tok",
        "agoraStreamerToken": "tok2"
    })
}

fn controller(api: Arc<ScriptedApi>, provider: RecordingProvider, config: CallSessionConfig) -> SessionController {
    let controller = SessionController::new(api, Arc::new(provider), config);
    controller.attach_target(RenderTarget::new("call-container"));
    controller
}

#[tokio::test(start_paused = true)]
async fn test_joins_once_counterpart_is_present() {
    let api = Arc::new(
        ScriptedApi::new()
            .create(serde_json::json!({"id": "abc123", "channelName": "ch1"}))
            .details(serde_json::json!({"streamerJoined": false, "status": "pending"}))
            .details(joined_details()),
    );
    let provider = RecordingProvider::default();
    let controller = controller(api.clone(), provider.clone(), config("123456"));

    let started = tokio::time::Instant::now();
    let report = assert_ok!(
        controller
            .start_call(OpponentId::new("2123"), CallType::Video)
            .await
    );

    assert_eq!(report.phase, PollPhase::JoinedAndHandedOff);
    assert_eq!(report.ticks, 2);
    assert!(started.elapsed() >= Duration::from_millis(1000));
    assert_eq!(
        report.handoff,
        Some(Ok(HandoffOutcome::Joined {
            room_id: "ch1".to_string()
        }))
    );

    let tokens = provider.tokens.lock().clone();
    assert_eq!(tokens.len(), 1);
    let (user_token, claims) = tokens[0].decode_kit().unwrap();
    assert_eq!(user_token, "tok");
    assert_eq!(claims.app_id, 123456);
    assert_eq!(claims.room_id, "ch1");
    assert_eq!(claims.user_id, "42");
    assert_eq!(claims.user_name, "user_42");
    assert_eq!(provider.inner.join_count(), 1);

    let view = controller.view();
    assert!(view.is_room_joined);
    assert!(!view.loading);
    assert!(view.error.is_none());
    let session = view.session.unwrap();
    assert_eq!(session.id.as_str(), "abc123");
    assert_eq!(session.channel_name.as_deref(), Some("ch1"));
    assert_eq!(session.status, CallStatus::Joined);

    // no third poll after the handoff
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(api.fetches(), 2);
    assert_eq!(controller.metrics().snapshot().joins, 1);
}

#[tokio::test(start_paused = true)]
async fn test_missing_session_id_never_polls() {
    let api = Arc::new(ScriptedApi::new().create(serde_json::json!({"channelName": "ch1"})));
    let controller = controller(api.clone(), RecordingProvider::default(), config("123456"));

    let err = assert_err!(
        controller
            .start_call(OpponentId::new("2123"), CallType::Audio)
            .await
    );

    assert!(matches!(err, CallError::InitiationFailed(_)));
    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(api.fetches(), 0);

    let view = controller.view();
    assert!(!view.loading);
    assert!(view.session.is_none());
    assert_eq!(view.error_code, Some("INITIATION_FAILED"));
    assert_eq!(controller.metrics().snapshot().initiation_failures, 1);
}

#[tokio::test(start_paused = true)]
async fn test_blank_opponent_fails_initiation() {
    let api = Arc::new(ScriptedApi::new().create(serde_json::json!({"id": "abc123"})));
    let controller = controller(api.clone(), RecordingProvider::default(), config("123456"));

    let err = controller
        .start_call(OpponentId::new("  "), CallType::Video)
        .await
        .unwrap_err();
    assert!(matches!(err, CallError::InitiationFailed(_)));
    assert_eq!(api.fetches(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_ended_session_stops_without_handoff() {
    let api = Arc::new(
        ScriptedApi::new()
            .create(serde_json::json!({"id": 77}))
            .details(serde_json::json!({"status": "ended"})),
    );
    let provider = RecordingProvider::default();
    let controller = controller(api.clone(), provider.clone(), config("123456"));

    let report = controller
        .start_call(OpponentId::new("2123"), CallType::Video)
        .await
        .unwrap();

    assert_eq!(report.phase, PollPhase::Ended);
    assert!(report.handoff.is_none());
    assert!(report.error().is_none());

    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(api.fetches(), 1);
    assert!(provider.inner.events().is_empty());

    let view = controller.view();
    assert!(view.error.is_none());
    assert!(!view.is_room_joined);
    assert_eq!(view.phase, Some(PollPhase::Ended));
    assert_eq!(view.session.unwrap().status, CallStatus::Ended);
}

#[tokio::test(start_paused = true)]
async fn test_zero_app_id_surfaces_after_readiness() {
    let api = Arc::new(
        ScriptedApi::new()
            .create(serde_json::json!({"id": "abc123"}))
            .details(joined_details()),
    );
    let provider = RecordingProvider::default();
    let controller = controller(api.clone(), provider.clone(), config("0"));

    let err = controller
        .start_call(OpponentId::new("2123"), CallType::Video)
        .await
        .unwrap_err();

    assert!(matches!(err, CallError::Configuration(_)));
    assert_eq!(api.fetches(), 1);
    assert!(provider.tokens.lock().is_empty());

    let view = controller.view();
    assert!(!view.is_room_joined);
    assert_eq!(view.error_code, Some("CONFIGURATION_ERROR"));
    assert_eq!(view.phase, Some(PollPhase::JoinedAndHandedOff));

    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(api.fetches(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_missing_render_target_fails_handoff() {
    let api = Arc::new(
        ScriptedApi::new()
            .create(serde_json::json!({"id": "abc123"}))
            .details(joined_details()),
    );
    let provider = RecordingProvider::default();
    let controller = SessionController::new(api.clone(), Arc::new(provider.clone()), config("123456"));

    let err = controller
        .start_call(OpponentId::new("2123"), CallType::Video)
        .await
        .unwrap_err();

    assert_eq!(err, CallError::HandoffFailed(HandoffFailure::ContainerMissing));
    assert_eq!(provider.inner.join_count(), 0);
    assert!(!controller.view().is_room_joined);
}

#[tokio::test(start_paused = true)]
async fn test_transport_error_stops_polling() {
    let api = Arc::new(
        ScriptedApi::new()
            .create(serde_json::json!({"id": "abc123"}))
            .details(serde_json::json!({"status": "pending"}))
            .details_error(503),
    );
    let controller = controller(api.clone(), RecordingProvider::default(), config("123456"));

    let err = controller
        .start_call(OpponentId::new("2123"), CallType::Video)
        .await
        .unwrap_err();

    assert!(matches!(err, CallError::PollTransport(_)));
    assert_eq!(api.fetches(), 2);

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(api.fetches(), 2);
    assert_eq!(controller.view().phase, Some(PollPhase::FailedTerminal));
}

#[tokio::test(start_paused = true)]
async fn test_attempt_ceiling() {
    let api = Arc::new(
        ScriptedApi::new()
            .create(serde_json::json!({"id": "abc123"}))
            .details(serde_json::json!({"status": "pending"})),
    );
    let config = CallSessionConfig {
        max_attempts: Some(3),
        ..config("123456")
    };
    let controller = controller(api.clone(), RecordingProvider::default(), config);

    let err = controller
        .start_call(OpponentId::new("2123"), CallType::Video)
        .await
        .unwrap_err();

    assert_eq!(err, CallError::PollAttemptsExhausted(3));
    assert_eq!(api.fetches(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_stops_further_fetches() {
    let api = Arc::new(
        ScriptedApi::new()
            .create(serde_json::json!({"id": "abc123"}))
            .details(serde_json::json!({"status": "pending"})),
    );
    let controller = Arc::new(controller(api.clone(), RecordingProvider::default(), config("123456")));

    let running = {
        let controller = controller.clone();
        tokio::spawn(async move {
            controller
                .start_call(OpponentId::new("2123"), CallType::Video)
                .await
        })
    };

    tokio::time::sleep(Duration::from_millis(2500)).await;
    assert_eq!(api.fetches(), 3);

    controller.cancel().await;
    let report = running.await.unwrap().unwrap();
    assert_eq!(report.phase, PollPhase::Cancelled);

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(api.fetches(), 3);
    assert_eq!(controller.metrics().snapshot().active_polls, 0);
}

#[tokio::test(start_paused = true)]
async fn test_new_attempt_replaces_previous_one() {
    let api = Arc::new(
        ScriptedApi::new()
            .create(serde_json::json!({"id": "first"}))
            .create(serde_json::json!({"id": "second"}))
            .details(serde_json::json!({"status": "pending"})),
    );
    let controller = Arc::new(controller(api.clone(), RecordingProvider::default(), config("123456")));

    let first = {
        let controller = controller.clone();
        tokio::spawn(async move {
            controller
                .start_call(OpponentId::new("2123"), CallType::Video)
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(1500)).await;

    let second = {
        let controller = controller.clone();
        tokio::spawn(async move {
            controller
                .start_call(OpponentId::new("2123"), CallType::Audio)
                .await
        })
    };

    let first = first.await.unwrap().unwrap();
    assert_eq!(first.phase, PollPhase::Cancelled);

    tokio::time::sleep(Duration::from_millis(3500)).await;
    let view = controller.view();
    let session = view.session.unwrap();
    assert_eq!(session.id.as_str(), "second");
    assert_eq!(session.call_type, CallType::Audio);
    assert_eq!(view.phase, Some(PollPhase::Polling));

    let fetched = api.fetched_ids.lock().clone();
    let first_fetches = fetched.iter().filter(|id| id.as_str() == "first").count();
    assert_eq!(first_fetches, 2);

    controller.cancel().await;
    assert_eq!(second.await.unwrap().unwrap().phase, PollPhase::Cancelled);
}

#[tokio::test]
async fn test_concurrent_handoffs_join_once() {
    let provider = HeadlessProvider::new();
    let handoff = SessionHandoff::new(
        Arc::new(provider.clone()),
        Some("123456".to_string()),
        JoinRoomOptions::default(),
    );
    let state = PollState::new();
    let details: CallDetails = serde_json::from_value(joined_details()).unwrap();
    let credentials = streamcall_session::credentials_from(&details).unwrap();
    let target = RenderTarget::new("call-container");

    let (a, b) = tokio::join!(
        handoff.handoff(&state, credentials.clone(), Some(target.clone())),
        handoff.handoff(&state, credentials.clone(), Some(target.clone())),
    );

    let outcomes = [a.unwrap(), b.unwrap()];
    assert!(outcomes.contains(&HandoffOutcome::AlreadyJoined));
    assert!(outcomes.contains(&HandoffOutcome::Joined {
        room_id: "ch1".to_string()
    }));
    assert_eq!(provider.join_count(), 1);
    assert!(state.is_room_joined());
    assert_eq!(state.joined_room_id().as_deref(), Some("ch1"));

    assert!(state.leave_room().await.unwrap().is_ok());
    assert!(matches!(provider.events().last(), Some(RoomEvent::Left { .. })));
}

/// Provider whose rooms take a while to join
#[derive(Clone, Default)]
struct SlowJoinProvider {
    inner: HeadlessProvider,
}

struct SlowJoinRoom {
    inner: Box<dyn RtcRoom>,
}

#[async_trait]
impl RtcProvider for SlowJoinProvider {
    async fn create(&self, token: JoinToken) -> streamcall_rtc_sdk::Result<Box<dyn RtcRoom>> {
        let inner = self.inner.create(token).await?;
        Ok(Box::new(SlowJoinRoom { inner }))
    }
}

#[async_trait]
impl RtcRoom for SlowJoinRoom {
    fn room_id(&self) -> &str {
        self.inner.room_id()
    }

    async fn join_room(&self, target: &RenderTarget, options: &JoinRoomOptions) -> streamcall_rtc_sdk::Result<()> {
        tokio::time::sleep(Duration::from_millis(500)).await;
        self.inner.join_room(target, options).await
    }

    async fn leave_room(&self) -> streamcall_rtc_sdk::Result<()> {
        self.inner.leave_room().await
    }
}

fn left_count(events: &[RoomEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, RoomEvent::Left { .. }))
        .count()
}

#[tokio::test(start_paused = true)]
async fn test_cancel_during_join_leaves_room() {
    let api = Arc::new(
        ScriptedApi::new()
            .create(serde_json::json!({"id": "abc123"}))
            .details(joined_details()),
    );
    let provider = SlowJoinProvider::default();
    let controller = Arc::new(SessionController::new(
        api.clone(),
        Arc::new(provider.clone()),
        config("123456"),
    ));
    controller.attach_target(RenderTarget::new("call-container"));

    let running = {
        let controller = controller.clone();
        tokio::spawn(async move {
            controller
                .start_call(OpponentId::new("2123"), CallType::Video)
                .await
        })
    };

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(provider.inner.join_count(), 0);
    controller.cancel().await;

    let report = assert_ok!(running.await.unwrap());
    assert_eq!(report.phase, PollPhase::Cancelled);
    assert_eq!(report.handoff, Some(Ok(HandoffOutcome::Cancelled)));
    assert!(!report.joined());

    let events = provider.inner.events();
    assert_eq!(provider.inner.join_count(), 1);
    assert_eq!(left_count(&events), 1);
    assert!(matches!(events.last(), Some(RoomEvent::Left { .. })));

    let view = controller.view();
    assert!(!view.is_room_joined);
    assert_eq!(view.phase, Some(PollPhase::Cancelled));
    assert_eq!(controller.metrics().snapshot().joins, 0);

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(api.fetches(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_new_attempt_during_join_leaves_previous_room() {
    let api = Arc::new(
        ScriptedApi::new()
            .create(serde_json::json!({"id": "first"}))
            .create(serde_json::json!({"id": "second"}))
            .details(joined_details()),
    );
    let provider = SlowJoinProvider::default();
    let controller = Arc::new(SessionController::new(
        api.clone(),
        Arc::new(provider.clone()),
        config("123456"),
    ));
    controller.attach_target(RenderTarget::new("call-container"));

    let first = {
        let controller = controller.clone();
        tokio::spawn(async move {
            controller
                .start_call(OpponentId::new("2123"), CallType::Video)
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    let second = assert_ok!(
        controller
            .start_call(OpponentId::new("2123"), CallType::Video)
            .await
    );
    assert_eq!(second.phase, PollPhase::JoinedAndHandedOff);

    let first = assert_ok!(first.await.unwrap());
    assert_eq!(first.phase, PollPhase::Cancelled);
    assert_eq!(first.handoff, Some(Ok(HandoffOutcome::Cancelled)));

    // the first room was joined and left before the second one was created
    let events = provider.inner.events();
    assert_eq!(provider.inner.join_count(), 2);
    assert_eq!(left_count(&events), 1);
    assert!(matches!(events.last(), Some(RoomEvent::Joined { .. })));

    let view = controller.view();
    assert!(view.is_room_joined);
    assert_eq!(view.session.unwrap().id.as_str(), "second");
}

async fn backend_with_details(details: ResponseTemplate) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/video/call/create"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "abc123"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/video/call/details"))
        .and(query_param("videoId", "abc123"))
        .respond_with(details)
        .expect(1)
        .mount(&server)
        .await;
    server
}

fn http_controller(server: &MockServer) -> SessionController {
    let api_config = ApiConfig {
        base_url: server.uri(),
        request_timeout_secs: 5,
    };
    let client = ApiClient::new(&api_config, Arc::new(MemoryTokenStore::with_token("tok"))).unwrap();
    let controller = SessionController::new(
        Arc::new(client),
        Arc::new(HeadlessProvider::new()),
        CallSessionConfig {
            poll_interval: Duration::from_millis(20),
            ..config("123456")
        },
    );
    controller.attach_target(RenderTarget::new("call-container"));
    controller
}

#[tokio::test]
async fn test_malformed_details_body_fails_poll() {
    let server = backend_with_details(ResponseTemplate::new(200).set_body_string("<html>oops</html>")).await;
    let controller = http_controller(&server);

    let err = assert_err!(
        controller
            .start_call(OpponentId::new("2123"), CallType::Video)
            .await
    );
    assert!(matches!(err, CallError::PollTransport(_)));

    let view = controller.view();
    assert_eq!(view.phase, Some(PollPhase::FailedTerminal));
    assert_eq!(view.error_code, Some("POLL_TRANSPORT_ERROR"));
    assert!(!view.is_room_joined);
}

#[tokio::test]
async fn test_null_details_body_fails_poll() {
    let server = backend_with_details(ResponseTemplate::new(200).set_body_string("null")).await;
    let controller = http_controller(&server);

    let err = assert_err!(
        controller
            .start_call(OpponentId::new("2123"), CallType::Video)
            .await
    );
    assert!(matches!(err, CallError::PollTransport(_)));
    assert_eq!(controller.view().phase, Some(PollPhase::FailedTerminal));
}
