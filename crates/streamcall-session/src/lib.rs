//! Call session bootstrap
//!
//! Three steps run in order for every call attempt:
//!
//! 1. [`CallInitiator`] asks the backend for a new call and gets a session id.
//! 2. [`ReadinessPoller`] fetches the session details at a fixed interval
//!    until the counterpart joins, the session ends, a fetch fails, or the
//!    attempt is cancelled.
//! 3. [`SessionHandoff`] builds the join token and joins the media room,
//!    at most once per session.
//!
//! [`SessionController`] owns the per-session [`PollState`] and the view the
//! hosting page renders.

mod api;
mod config;
mod controller;
mod error;
mod handoff;
mod initiator;
mod metrics;
mod poller;
mod state;

pub use api::CallApi;
pub use config::{CallSessionConfig, DEFAULT_POLL_INTERVAL_MS};
pub use controller::{CallView, SessionController};
pub use error::{CallError, HandoffFailure, Result};
pub use handoff::{credentials_from, resolve_app_id, HandoffOutcome, SessionHandoff};
pub use initiator::CallInitiator;
pub use metrics::{CallMetrics, MetricsSnapshot};
pub use poller::{PollObserver, PollReport, ReadinessPoller};
pub use state::{classify, transition, PollEvent, PollPhase, PollState};
