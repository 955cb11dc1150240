// Copyright (c) CrowdPulse Team
// SPDX-License-Identifier: Apache-2.0

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::api::routes::{result_to_response, PaginationParams};
use crate::api::AppState;
use crate::error::ServiceError;

#[derive(Debug, Deserialize)]
pub struct RecipientAction {
    pub recipient_id: i64,
}

/// List a profile's notifications, newest first
pub async fn list_notifications(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(pagination): Query<PaginationParams>,
) -> impl IntoResponse {
    result_to_response(
        state
            .notifications
            .list_for_recipient(id, pagination.limit(), pagination.offset())
            .await,
    )
}

/// Count unread notifications
pub async fn unread_count(State(state): State<AppState>, Path(id): Path<i64>) -> impl IntoResponse {
    result_to_response(state.notifications.unread_count(id).await)
}

/// Mark one notification read; only the recipient can
pub async fn mark_read(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<RecipientAction>,
) -> impl IntoResponse {
    let result = state
        .notifications
        .mark_read(id, req.recipient_id)
        .await
        .and_then(|updated| {
            if updated {
                Ok(())
            } else {
                Err(ServiceError::not_found(format!("notification {}", id)))
            }
        });
    result_to_response(result)
}

/// Mark every unread notification read, returning how many flipped
pub async fn mark_all_read(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    result_to_response(state.notifications.mark_all_read(id).await)
}
