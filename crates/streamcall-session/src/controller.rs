//! Session controller
//!
//! Owns the state of the current call attempt for the hosting page:
//! the per-session flags, the provisioned session, the last fetched
//! details and the error text to display.

use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::sync::Arc;
use streamcall_api_sdk::CallDetails;
use streamcall_core::{CallSession, CallStatus, CallType, OpponentId};
use streamcall_rtc_sdk::{RenderTarget, RtcProvider};
use tracing::{info, warn};

use crate::api::CallApi;
use crate::config::CallSessionConfig;
use crate::error::{CallError, Result};
use crate::handoff::SessionHandoff;
use crate::initiator::CallInitiator;
use crate::metrics::CallMetrics;
use crate::poller::{PollObserver, PollReport, ReadinessPoller};
use crate::state::{PollPhase, PollState};

/// What the page renders
#[derive(Debug, Clone, Default, Serialize)]
pub struct CallView {
    pub loading: bool,
    pub error: Option<String>,
    pub error_code: Option<&'static str>,
    pub session: Option<CallSession>,
    pub details: Option<CallDetails>,
    pub is_room_joined: bool,
    pub phase: Option<PollPhase>,
}

struct Current {
    generation: u64,
    state: Arc<PollState>,
    view: CallView,
}

pub struct SessionController {
    initiator: CallInitiator,
    poller: ReadinessPoller,
    target: RwLock<Option<RenderTarget>>,
    current: Mutex<Current>,
    metrics: CallMetrics,
}

impl SessionController {
    pub fn new(api: Arc<dyn CallApi>, provider: Arc<dyn RtcProvider>, config: CallSessionConfig) -> Self {
        let metrics = CallMetrics::new();
        let handoff = Arc::new(SessionHandoff::new(provider, config.app_id, config.join_options));
        let poller = ReadinessPoller::new(
            api.clone(),
            handoff,
            config.poll_interval,
            config.max_attempts,
            metrics.clone(),
        );

        Self {
            initiator: CallInitiator::new(api),
            poller,
            target: RwLock::new(None),
            current: Mutex::new(Current {
                generation: 0,
                state: Arc::new(PollState::new()),
                view: CallView::default(),
            }),
            metrics,
        }
    }

    pub fn metrics(&self) -> &CallMetrics {
        &self.metrics
    }

    pub fn attach_target(&self, target: RenderTarget) {
        *self.target.write() = Some(target);
    }

    pub fn detach_target(&self) {
        *self.target.write() = None;
    }

    pub fn view(&self) -> CallView {
        let current = self.current.lock();
        let mut view = current.view.clone();
        view.is_room_joined = current.state.is_room_joined();
        view
    }

    /// Run the whole bootstrap for one call attempt.
    ///
    /// Any earlier attempt is cancelled and its state discarded first. Every
    /// failure also lands in the view as the message to show.
    pub async fn start_call(&self, opponent: OpponentId, call_type: CallType) -> Result<PollReport> {
        let (generation, state, previous) = self.reset();
        Self::release(&previous).await;

        self.metrics.initiations.inc();
        let session = match self.initiator.initiate(&opponent, call_type).await {
            Ok(session) => session,
            Err(e) => {
                self.metrics.initiation_failures.inc();
                self.update(generation, |view| {
                    view.loading = false;
                    view.error = Some(e.to_string());
                    view.error_code = Some(e.error_code());
                });
                return Err(e);
            }
        };

        let session_id = session.id.clone();
        self.update(generation, |view| {
            view.loading = false;
            view.session = Some(session);
            view.phase = Some(PollPhase::Polling);
        });

        let observer = ControllerObserver {
            controller: self,
            generation,
        };
        let report = self.poller.run(&session_id, &state, &observer).await;

        self.update(generation, |view| {
            view.phase = Some(report.phase);
            if let Some(e) = report.error() {
                view.error = Some(e.to_string());
                view.error_code = Some(e.error_code());
            }
        });

        if let Some(e) = report.error().cloned() {
            return Err(e);
        }
        Ok(report)
    }

    /// Stop the current attempt and leave its room if one was joined
    pub async fn cancel(&self) {
        let state = self.current.lock().state.clone();
        state.stop_polling();
        Self::release(&state).await;
        info!("Call attempt cancelled");
    }

    /// Swap in a fresh state and a loading view; returns the old state
    fn reset(&self) -> (u64, Arc<PollState>, Arc<PollState>) {
        let mut current = self.current.lock();
        current.generation += 1;
        let state = Arc::new(PollState::new());
        let previous = std::mem::replace(&mut current.state, state.clone());
        current.view = CallView {
            loading: true,
            ..CallView::default()
        };
        (current.generation, state, previous)
    }

    async fn release(state: &PollState) {
        state.stop_polling();
        if let Some(Err(e)) = state.leave_room().await {
            warn!(error = %e, "Failed to leave previous room");
        }
    }

    /// Apply `f` to the view unless a newer attempt replaced it
    fn update(&self, generation: u64, f: impl FnOnce(&mut CallView)) {
        let mut current = self.current.lock();
        if current.generation == generation {
            f(&mut current.view);
        }
    }
}

struct ControllerObserver<'a> {
    controller: &'a SessionController,
    generation: u64,
}

impl PollObserver for ControllerObserver<'_> {
    fn on_details(&self, details: &CallDetails) {
        let status = if details.counterpart_joined() {
            CallStatus::Joined
        } else {
            details.status.unwrap_or_default()
        };

        self.controller.update(self.generation, |view| {
            view.details = Some(details.clone());
            if let Some(session) = view.session.as_mut() {
                session.status = status;
            }
        });
    }

    fn render_target(&self) -> Option<RenderTarget> {
        self.controller.target.read().clone()
    }
}
