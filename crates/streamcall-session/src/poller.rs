//! Readiness poller
//!
//! Fetches call details at a fixed interval until the counterpart joins,
//! the session ends, a fetch fails or the session is cancelled. Fetches for
//! one session never overlap: the next one is scheduled only after the
//! previous result has been handled.

use std::sync::Arc;
use std::time::{Duration, Instant};
use streamcall_api_sdk::CallDetails;
use streamcall_core::SessionId;
use streamcall_rtc_sdk::RenderTarget;
use tracing::{debug, info, warn};

use crate::api::CallApi;
use crate::error::CallError;
use crate::handoff::{credentials_from, HandoffOutcome, SessionHandoff};
use crate::metrics::CallMetrics;
use crate::state::{classify, transition, PollEvent, PollPhase, PollState};

/// Hooks the host provides to a running poll
pub trait PollObserver: Send + Sync {
    /// Called with every successfully fetched details response
    fn on_details(&self, _details: &CallDetails) {}

    /// Rendering target, read at the moment the handoff runs
    fn render_target(&self) -> Option<RenderTarget>;
}

impl PollObserver for RenderTarget {
    fn render_target(&self) -> Option<RenderTarget> {
        Some(self.clone())
    }
}

/// How a poll ended
#[derive(Debug, Clone)]
pub struct PollReport {
    pub phase: PollPhase,
    /// Number of details fetches issued
    pub ticks: u32,
    pub last_details: Option<CallDetails>,
    /// Set when the handoff ran
    pub handoff: Option<Result<HandoffOutcome, CallError>>,
    /// Set when the poll itself failed
    pub poll_error: Option<CallError>,
}

impl PollReport {
    /// The error to surface, from the poll or from the handoff
    pub fn error(&self) -> Option<&CallError> {
        self.poll_error
            .as_ref()
            .or_else(|| self.handoff.as_ref().and_then(|h| h.as_ref().err()))
    }

    pub fn joined(&self) -> bool {
        matches!(
            self.handoff,
            Some(Ok(HandoffOutcome::Joined { .. } | HandoffOutcome::AlreadyJoined))
        )
    }
}

pub struct ReadinessPoller {
    api: Arc<dyn CallApi>,
    handoff: Arc<SessionHandoff>,
    interval: Duration,
    max_attempts: Option<u32>,
    metrics: CallMetrics,
}

impl ReadinessPoller {
    pub fn new(
        api: Arc<dyn CallApi>,
        handoff: Arc<SessionHandoff>,
        interval: Duration,
        max_attempts: Option<u32>,
        metrics: CallMetrics,
    ) -> Self {
        Self {
            api,
            handoff,
            interval,
            max_attempts,
            metrics,
        }
    }

    /// Poll `session_id` until a terminal phase. Every terminal phase
    /// cancels `state`, so nothing else is fetched or joined afterwards.
    pub async fn run<O>(&self, session_id: &SessionId, state: &PollState, observer: &O) -> PollReport
    where
        O: PollObserver + ?Sized,
    {
        self.metrics.active_polls.inc();
        let report = self.poll_loop(session_id, state, observer).await;
        self.metrics.active_polls.dec();

        state.stop_polling();
        info!(
            session_id = %session_id,
            phase = ?report.phase,
            ticks = report.ticks,
            "Readiness poll finished"
        );
        report
    }

    async fn poll_loop<O>(&self, session_id: &SessionId, state: &PollState, observer: &O) -> PollReport
    where
        O: PollObserver + ?Sized,
    {
        let cancel = state.cancellation();
        let mut report = PollReport {
            phase: PollPhase::Polling,
            ticks: 0,
            last_details: None,
            handoff: None,
            poll_error: None,
        };

        loop {
            if cancel.is_cancelled() {
                report.phase = transition(report.phase, PollEvent::Cancelled);
                return report;
            }

            if let Some(max) = self.max_attempts {
                if report.ticks >= max {
                    warn!(session_id = %session_id, attempts = max, "Poll attempts exhausted");
                    self.metrics.poll_failures.inc();
                    report.poll_error = Some(CallError::PollAttemptsExhausted(max));
                    report.phase = transition(report.phase, PollEvent::FetchFailed);
                    return report;
                }
            }

            report.ticks += 1;
            self.metrics.poll_ticks.inc();
            let started = Instant::now();

            let fetched = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                result = self.api.call_details(session_id) => Some(result),
            };
            self.metrics
                .fetch_latency_ms
                .record(started.elapsed().as_secs_f64() * 1000.0);

            let details = match fetched {
                None => {
                    report.phase = transition(report.phase, PollEvent::Cancelled);
                    return report;
                }
                Some(Err(e)) => {
                    warn!(session_id = %session_id, tick = report.ticks, error = %e, "Call details fetch failed");
                    self.metrics.poll_failures.inc();
                    report.poll_error = Some(CallError::PollTransport(e.to_string()));
                    report.phase = transition(report.phase, PollEvent::FetchFailed);
                    return report;
                }
                Some(Ok(details)) => details,
            };

            observer.on_details(&details);
            let event = classify(&details);
            debug!(session_id = %session_id, tick = report.ticks, event = ?event, "Poll tick");

            if cancel.is_cancelled() {
                report.phase = transition(report.phase, PollEvent::Cancelled);
                report.last_details = Some(details);
                return report;
            }

            match event {
                PollEvent::CounterpartJoined => {
                    let handoff = self.hand_off(session_id, state, observer, &details).await;
                    let event = match &handoff {
                        Ok(HandoffOutcome::Cancelled) => PollEvent::Cancelled,
                        _ => event,
                    };
                    report.phase = transition(report.phase, event);
                    report.handoff = Some(handoff);
                    report.last_details = Some(details);
                    return report;
                }
                PollEvent::SessionEnded => {
                    report.phase = transition(report.phase, event);
                    info!(session_id = %session_id, "Call ended before the counterpart joined");
                    report.last_details = Some(details);
                    return report;
                }
                _ => {
                    report.phase = transition(report.phase, event);
                    report.last_details = Some(details);
                }
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    report.phase = transition(report.phase, PollEvent::Cancelled);
                    return report;
                }
                _ = tokio::time::sleep(self.interval) => {}
            }
        }
    }

    async fn hand_off<O>(
        &self,
        session_id: &SessionId,
        state: &PollState,
        observer: &O,
        details: &CallDetails,
    ) -> Result<HandoffOutcome, CallError>
    where
        O: PollObserver + ?Sized,
    {
        let result = match credentials_from(details) {
            Ok(credentials) => {
                self.handoff
                    .handoff(state, credentials, observer.render_target())
                    .await
            }
            Err(failure) => Err(failure.into()),
        };

        match &result {
            Ok(HandoffOutcome::Joined { .. }) => self.metrics.joins.inc(),
            Ok(HandoffOutcome::AlreadyJoined) => {}
            Ok(HandoffOutcome::Cancelled) => {
                info!(session_id = %session_id, "Handoff abandoned, session cancelled");
            }
            Err(e) => {
                warn!(session_id = %session_id, error = %e, "Handoff failed");
                self.metrics.handoff_failures.inc();
            }
        }
        result
    }
}
