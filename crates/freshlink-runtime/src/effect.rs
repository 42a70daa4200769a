#![forbid(unsafe_code)]

//! Effect observability.
//!
//! Monotonic counters and tracing spans around the two effect kinds the
//! runtime executes: fire-once tasks and long-lived subscription feeds.
//! The counters exist so tests and dashboards can assert "no network call
//! was made" without instrumenting every service fake.

use std::sync::atomic::{AtomicU64, Ordering};
use web_time::Instant;

static TASKS_TOTAL: AtomicU64 = AtomicU64::new(0);
static FEEDS_TOTAL: AtomicU64 = AtomicU64::new(0);

/// Total fire-once tasks executed (monotonic, process-wide).
#[must_use]
pub fn tasks_executed_total() -> u64 {
    TASKS_TOTAL.load(Ordering::Relaxed)
}

/// Total subscription feeds started (monotonic, process-wide).
#[must_use]
pub fn feeds_started_total() -> u64 {
    FEEDS_TOTAL.load(Ordering::Relaxed)
}

/// Execute a fire-once task under an `effect.task` span.
pub(crate) fn trace_task<F, R>(label: &'static str, f: F) -> R
where
    F: FnOnce() -> R,
{
    TASKS_TOTAL.fetch_add(1, Ordering::Relaxed);
    let start = Instant::now();
    let _span = tracing::debug_span!("effect.task", label = %label).entered();
    tracing::debug!(target: "freshlink.effect", label = %label, "task started");
    let result = f();
    tracing::debug!(
        target: "freshlink.effect",
        label = %label,
        duration_us = start.elapsed().as_micros() as u64,
        "task completed"
    );
    result
}

/// Record a feed starting.
pub(crate) fn record_feed_start(sub_id: u64) {
    FEEDS_TOTAL.fetch_add(1, Ordering::Relaxed);
    tracing::debug!(target: "freshlink.effect", sub_id, active = true, "feed started");
}

/// Record a feed stopping.
pub(crate) fn record_feed_stop(sub_id: u64) {
    tracing::debug!(target: "freshlink.effect", sub_id, active = false, "feed stopped");
}
