// Copyright (c) CrowdPulse Team
// SPDX-License-Identifier: Apache-2.0

use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::metrics;

/// Prometheus metrics endpoint
pub async fn get_metrics() -> impl IntoResponse {
    (StatusCode::OK, metrics::render())
}
