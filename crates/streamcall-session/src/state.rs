//! Poll state machine and per-session flags

use parking_lot::Mutex;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use streamcall_api_sdk::CallDetails;
use streamcall_rtc_sdk::{RtcError, RtcRoom};
use tokio::sync::MutexGuard;
use tokio_util::sync::CancellationToken;

/// Where the readiness poll of one session stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PollPhase {
    Polling,
    JoinedAndHandedOff,
    Ended,
    FailedTerminal,
    Cancelled,
}

impl PollPhase {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Polling)
    }
}

/// What a poll tick observed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollEvent {
    CounterpartJoined,
    SessionEnded,
    StillPending,
    FetchFailed,
    Cancelled,
}

/// Next phase after `event`. Terminal phases never change.
pub fn transition(phase: PollPhase, event: PollEvent) -> PollPhase {
    if phase.is_terminal() {
        return phase;
    }
    match (phase, event) {
        (PollPhase::Polling, PollEvent::CounterpartJoined) => PollPhase::JoinedAndHandedOff,
        (PollPhase::Polling, PollEvent::SessionEnded) => PollPhase::Ended,
        (PollPhase::Polling, PollEvent::StillPending) => PollPhase::Polling,
        (PollPhase::Polling, PollEvent::FetchFailed) => PollPhase::FailedTerminal,
        (PollPhase::Polling, PollEvent::Cancelled) => PollPhase::Cancelled,
        (terminal, _) => terminal,
    }
}

/// Classify fetched details. A joined counterpart wins over an ended status.
pub fn classify(details: &CallDetails) -> PollEvent {
    if details.counterpart_joined() {
        PollEvent::CounterpartJoined
    } else if details.is_ended() {
        PollEvent::SessionEnded
    } else {
        PollEvent::StillPending
    }
}

/// Flags of one call session, shared by the poller, the handoff and the
/// controller. A fresh instance is created for every call attempt.
pub struct PollState {
    cancel: CancellationToken,
    room_joined: AtomicBool,
    join_gate: tokio::sync::Mutex<()>,
    room: Mutex<Option<Box<dyn RtcRoom>>>,
}

impl PollState {
    pub fn new() -> Self {
        Self {
            cancel: CancellationToken::new(),
            room_joined: AtomicBool::new(false),
            join_gate: tokio::sync::Mutex::new(()),
            room: Mutex::new(None),
        }
    }

    /// Handle the caller can hold on to and cancel later
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn stop_polling(&self) {
        self.cancel.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn is_room_joined(&self) -> bool {
        self.room_joined.load(Ordering::Acquire)
    }

    /// Serializes handoffs; the joined flag is only written under this gate
    pub(crate) async fn lock_join(&self) -> MutexGuard<'_, ()> {
        self.join_gate.lock().await
    }

    pub(crate) fn mark_joined(&self, room: Box<dyn RtcRoom>, _gate: &MutexGuard<'_, ()>) {
        *self.room.lock() = Some(room);
        self.room_joined.store(true, Ordering::Release);
    }

    pub fn joined_room_id(&self) -> Option<String> {
        self.room.lock().as_ref().map(|r| r.room_id().to_string())
    }

    /// Leave the joined room, if any. A handoff in flight finishes first.
    /// The joined flag stays set.
    pub async fn leave_room(&self) -> Option<Result<(), RtcError>> {
        let _gate = self.join_gate.lock().await;
        let room = self.room.lock().take()?;
        Some(room.leave_room().await)
    }
}

impl Default for PollState {
    fn default() -> Self {
        Self::new()
    }
}
