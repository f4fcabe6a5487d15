// SPDX-FileCopyrightText: 2026 Valley of the Commons Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric registration and recording helpers.
//!
//! Uses the metrics-rs facade so any recorder can collect these metrics.
//! Without an installed recorder every call is a no-op.

use metrics::{describe_counter, describe_histogram};

/// Register all votc metric descriptions.
///
/// Called once at startup after the recorder is installed.
pub fn register_metrics() {
    describe_counter!(
        "votc_chat_requests_total",
        "Chat requests by terminal outcome"
    );
    describe_counter!(
        "votc_stream_fragments_total",
        "Text fragments relayed to clients"
    );
    describe_counter!("votc_exports_total", "Transcript exports by kind and outcome");
    describe_counter!("votc_waitlist_signups_total", "Waitlist sign-ups by outcome");
    describe_histogram!(
        "votc_stream_duration_seconds",
        "Time from upstream request to stream end"
    );
}

/// Record the terminal outcome of one chat request.
pub fn record_chat_outcome(outcome: &str) {
    metrics::counter!("votc_chat_requests_total", "outcome" => outcome.to_string()).increment(1);
}

/// Record relayed fragments.
pub fn record_fragments(count: u64) {
    metrics::counter!("votc_stream_fragments_total").increment(count);
}

/// Record one export attempt.
pub fn record_export(kind: &str, outcome: &str) {
    metrics::counter!(
        "votc_exports_total",
        "kind" => kind.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// Record one waitlist sign-up attempt.
pub fn record_waitlist(outcome: &str) {
    metrics::counter!("votc_waitlist_signups_total", "outcome" => outcome.to_string())
        .increment(1);
}

/// Record stream duration.
pub fn record_stream_duration(seconds: f64) {
    metrics::histogram!("votc_stream_duration_seconds").record(seconds);
}
