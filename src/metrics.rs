// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Metrics instrumentation for path-store.
//!
//! Uses the `metrics` crate for backend-agnostic metrics collection.
//! The host program is responsible for installing a recorder/exporter;
//! without one every call here is a no-op.
//!
//! # Metric Naming Convention
//! - `path_store_` prefix for all metrics
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Labels
//! - `operation`: set, find, list_all, list_children, search, delete, clear
//! - `status`: success, not_found, no_data

use metrics::{counter, gauge, histogram};
use std::time::{Duration, Instant};

/// Record the outcome of a store operation
pub fn record_operation(operation: &'static str, status: &'static str) {
    counter!(
        "path_store_operations_total",
        "operation" => operation,
        "status" => status
    )
    .increment(1);
}

/// Record operation latency
pub fn record_latency(operation: &'static str, duration: Duration) {
    histogram!(
        "path_store_operation_seconds",
        "operation" => operation
    )
    .record(duration.as_secs_f64());
}

/// Record entries created by a `set`, implicit ancestors included
pub fn record_entries_created(count: usize) {
    counter!("path_store_entries_created_total").increment(count as u64);
}

/// Record how many ancestors a single `set` had to synthesize
pub fn record_ancestors_synthesized(count: usize) {
    counter!("path_store_ancestors_synthesized_total").increment(count as u64);
}

/// Record entries removed by a cascading delete or a clear
pub fn record_entries_removed(count: usize) {
    counter!("path_store_entries_removed_total").increment(count as u64);
}

/// Set current number of entries (valued and implicit)
pub fn set_entry_count(count: usize) {
    gauge!("path_store_entries").set(count as f64);
}

/// Set current height of the ordered index
pub fn set_index_height(height: usize) {
    gauge!("path_store_index_height").set(height as f64);
}

/// Record a command the dispatcher could not run
pub fn record_command_rejected(reason: &'static str) {
    counter!(
        "path_store_commands_rejected_total",
        "reason" => reason
    )
    .increment(1);
}

/// A timing guard that records latency on drop
pub struct LatencyTimer {
    operation: &'static str,
    start: Instant,
}

impl LatencyTimer {
    /// Start a new latency timer
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            start: Instant::now(),
        }
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        record_latency(self.operation, self.start.elapsed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics_util::debugging::{DebugValue, DebuggingRecorder};

    #[test]
    fn test_calls_without_recorder_are_noops() {
        record_operation("find", "success");
        record_latency("set", Duration::from_micros(10));
        record_entries_created(3);
        record_ancestors_synthesized(2);
        record_entries_removed(1);
        set_entry_count(10);
        set_index_height(4);
        record_command_rejected("line_too_long");
    }

    #[test]
    fn test_operation_counter_is_labelled() {
        let recorder = DebuggingRecorder::new();
        let snapshotter = recorder.snapshotter();

        metrics::with_local_recorder(&recorder, || {
            record_operation("find", "no_data");
            record_operation("find", "no_data");
        });

        let snapshot = snapshotter.snapshot().into_vec();
        let (key, _, _, value) = snapshot
            .iter()
            .find(|(key, _, _, _)| key.key().name() == "path_store_operations_total")
            .expect("counter recorded");
        let labels: Vec<(&str, &str)> = key
            .key()
            .labels()
            .map(|l| (l.key(), l.value()))
            .collect();
        assert!(labels.contains(&("operation", "find")));
        assert!(labels.contains(&("status", "no_data")));
        assert_eq!(value, &DebugValue::Counter(2));
    }

    #[test]
    fn test_latency_timer_records_on_drop() {
        let recorder = DebuggingRecorder::new();
        let snapshotter = recorder.snapshotter();

        metrics::with_local_recorder(&recorder, || {
            let _timer = LatencyTimer::new("set");
        });

        let snapshot = snapshotter.snapshot().into_vec();
        assert!(snapshot
            .iter()
            .any(|(key, _, _, _)| key.key().name() == "path_store_operation_seconds"));
    }
}
