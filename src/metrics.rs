// Copyright (c) CrowdPulse Team
// SPDX-License-Identifier: Apache-2.0

//! Prometheus counters for the notification pipeline, exported at
//! `GET /metrics`.

use once_cell::sync::Lazy;
use prometheus::{register_int_counter, Encoder, IntCounter, TextEncoder};
use tracing::warn;

/// Outbox entries dispatched successfully.
pub static OUTBOX_DISPATCHED: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "crowdpulse_outbox_dispatched_total",
        "Outbox entries dispatched successfully"
    )
    .expect("Failed to create OUTBOX_DISPATCHED metric")
});

/// Outbox entries whose dispatch attempt failed (the entry may be retried).
pub static OUTBOX_FAILURES: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "crowdpulse_outbox_failures_total",
        "Outbox dispatch attempts that failed"
    )
    .expect("Failed to create OUTBOX_FAILURES metric")
});

/// Notification rows delivered to recipients (after fan-out and
/// self-action suppression).
pub static NOTIFICATIONS_DELIVERED: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "crowdpulse_notifications_delivered_total",
        "Notification rows delivered to recipients"
    )
    .expect("Failed to create NOTIFICATIONS_DELIVERED metric")
});

/// Renders every registered metric in the Prometheus text format.
pub fn render() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        warn!("Failed to encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_includes_registered_counters() {
        OUTBOX_DISPATCHED.inc();
        let text = render();
        assert!(text.contains("crowdpulse_outbox_dispatched_total"));
    }
}
