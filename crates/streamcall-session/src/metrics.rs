//! Bootstrap metrics

use serde::Serialize;
use streamcall_telemetry::{Counter, Gauge, Histogram, HistogramSnapshot};

#[derive(Clone)]
pub struct CallMetrics {
    pub initiations: Counter,
    pub initiation_failures: Counter,
    pub poll_ticks: Counter,
    pub poll_failures: Counter,
    pub joins: Counter,
    pub handoff_failures: Counter,
    pub active_polls: Gauge,
    pub fetch_latency_ms: Histogram,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub initiations: u64,
    pub initiation_failures: u64,
    pub poll_ticks: u64,
    pub poll_failures: u64,
    pub joins: u64,
    pub handoff_failures: u64,
    pub active_polls: u64,
    pub fetch_latency_ms: HistogramSnapshot,
}

impl CallMetrics {
    pub fn new() -> Self {
        Self {
            initiations: Counter::new("call_initiations_total"),
            initiation_failures: Counter::new("call_initiation_failures_total"),
            poll_ticks: Counter::new("call_poll_ticks_total"),
            poll_failures: Counter::new("call_poll_failures_total"),
            joins: Counter::new("call_room_joins_total"),
            handoff_failures: Counter::new("call_handoff_failures_total"),
            active_polls: Gauge::new("call_active_polls"),
            fetch_latency_ms: Histogram::new("call_details_fetch_latency_ms"),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            initiations: self.initiations.get(),
            initiation_failures: self.initiation_failures.get(),
            poll_ticks: self.poll_ticks.get(),
            poll_failures: self.poll_failures.get(),
            joins: self.joins.get(),
            handoff_failures: self.handoff_failures.get(),
            active_polls: self.active_polls.get(),
            fetch_latency_ms: self.fetch_latency_ms.snapshot(),
        }
    }
}

impl Default for CallMetrics {
    fn default() -> Self {
        Self::new()
    }
}
