//! Metrics definitions for the relay.
//!
//! This module defines all metrics used throughout the relay.
//! Metrics are collected using the `metrics` crate and can be exported
//! to Prometheus via `metrics-exporter-prometheus`.

use metrics::{counter, describe_counter, describe_histogram, histogram};
use std::time::Instant;

use crate::commands::CommandKind;

/// Initialize all metric descriptions.
/// Call this once at startup before any metrics are recorded.
pub fn init_metrics() {
    describe_counter!(
        "chain_events_total",
        "Total number of chain events received from the subscription"
    );
    describe_counter!(
        "events_unmapped_total",
        "Total number of chain events with no command mapping"
    );
    describe_counter!(
        "events_redelivered_total",
        "Total number of chain events skipped because they were already dispatched"
    );
    describe_counter!(
        "translation_faults_total",
        "Total number of chain events whose payload did not match the command schema"
    );
    describe_counter!(
        "commands_dispatched_total",
        "Total number of commands successfully applied by their handler"
    );
    describe_counter!(
        "handler_errors_total",
        "Total number of commands whose handler failed after all attempts"
    );
    describe_counter!(
        "handler_retries_total",
        "Total number of handler attempts retried after a transient failure"
    );
    describe_counter!(
        "notifications_created_total",
        "Total number of notifications persisted for actor state transitions"
    );
    describe_histogram!(
        "command_processing_duration_seconds",
        "Time taken to dispatch a command, including retries, in seconds"
    );
}

/// Record an event received from the chain.
pub fn record_chain_event(pallet: &str) {
    counter!("chain_events_total", "pallet" => pallet.to_string()).increment(1);
}

/// Record an event that maps to no command.
pub fn record_event_unmapped() {
    counter!("events_unmapped_total").increment(1);
}

/// Record an event skipped as already dispatched.
pub fn record_event_redelivered() {
    counter!("events_redelivered_total").increment(1);
}

/// Record a translation fault.
///
/// # Arguments
/// * `pallet` - The pallet name
/// * `event` - The event name
pub fn record_translation_fault(pallet: &str, event: &str) {
    counter!("translation_faults_total", "pallet" => pallet.to_string(), "event" => event.to_string())
        .increment(1);
}

/// Record a successfully applied command.
pub fn record_command_dispatched(kind: CommandKind) {
    counter!("commands_dispatched_total", "command" => kind.as_str()).increment(1);
}

/// Record a handler failure reported to the listener.
pub fn record_handler_error(kind: CommandKind) {
    counter!("handler_errors_total", "command" => kind.as_str()).increment(1);
}

/// Record a retried handler attempt.
pub fn record_handler_retry(kind: CommandKind) {
    counter!("handler_retries_total", "command" => kind.as_str()).increment(1);
}

/// Record a persisted notification.
///
/// # Arguments
/// * `role` - Recipient role ("GA" or "Lab")
/// * `entity` - Classification label
pub fn record_notification_created(role: &str, entity: &str) {
    counter!("notifications_created_total", "role" => role.to_string(), "entity" => entity.to_string())
        .increment(1);
}

/// Record command processing duration.
pub fn record_command_processing_duration(kind: CommandKind, duration_secs: f64) {
    histogram!("command_processing_duration_seconds", "command" => kind.as_str())
        .record(duration_secs);
}

/// A timer that automatically records duration when dropped.
pub struct ProcessingTimer {
    kind: CommandKind,
    start: Instant,
}

impl ProcessingTimer {
    /// Start a new processing timer for a command kind.
    pub fn new(kind: CommandKind) -> Self {
        Self {
            kind,
            start: Instant::now(),
        }
    }
}

impl Drop for ProcessingTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        record_command_processing_duration(self.kind, duration);
    }
}
