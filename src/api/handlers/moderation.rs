// Copyright (c) CrowdPulse Team
// SPDX-License-Identifier: Apache-2.0

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::api::routes::result_to_response;
use crate::api::AppState;
use crate::models::content_ref::ReportTarget;
use crate::models::report::{ReportAction, ReportReason, ReportStatus};

/// A report points at exactly one entity; the rest of the ids stay unset.
#[derive(Debug, Deserialize)]
pub struct ReportPayload {
    pub reporter_id: i64,
    pub post_id: Option<i64>,
    pub reel_id: Option<i64>,
    pub campaign_id: Option<i64>,
    pub comment_id: Option<i64>,
    pub profile_id: Option<i64>,
    pub reason: ReportReason,
    pub details: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReportListParams {
    pub status: Option<ReportStatus>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct AdminAction {
    pub admin_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    pub admin_id: i64,
    pub action: ReportAction,
    pub note: Option<String>,
}

/// File a report against a post, reel, campaign, comment or profile
pub async fn submit_report(
    State(state): State<AppState>,
    Json(req): Json<ReportPayload>,
) -> impl IntoResponse {
    let target = ReportTarget::from_parts(
        req.post_id,
        req.reel_id,
        req.campaign_id,
        req.comment_id,
        req.profile_id,
    );
    let result = match target {
        Ok(target) => {
            state
                .moderation
                .submit_report(req.reporter_id, target, req.reason, req.details)
                .await
        }
        Err(err) => Err(err),
    };
    result_to_response(result)
}

/// Get a report by id
pub async fn get_report(State(state): State<AppState>, Path(id): Path<i64>) -> impl IntoResponse {
    result_to_response(state.moderation.get_report(id).await)
}

/// List reports by status; defaults to the pending queue
pub async fn list_reports(
    State(state): State<AppState>,
    Query(params): Query<ReportListParams>,
) -> impl IntoResponse {
    let status = params.status.unwrap_or(ReportStatus::Pending);
    let limit = params.limit.unwrap_or(10).clamp(1, 100);
    let offset = params.offset.unwrap_or(0).max(0);
    result_to_response(state.moderation.list_by_status(status, limit, offset).await)
}

/// Claim a pending report for review
pub async fn begin_review(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<AdminAction>,
) -> impl IntoResponse {
    result_to_response(state.moderation.begin_review(req.admin_id, id).await)
}

/// Close a report, applying the chosen enforcement action first
pub async fn resolve_report(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<ResolveRequest>,
) -> impl IntoResponse {
    result_to_response(
        state
            .moderation
            .resolve(req.admin_id, id, req.action, req.note)
            .await,
    )
}

/// Close a report without action
pub async fn dismiss_report(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<AdminAction>,
) -> impl IntoResponse {
    result_to_response(state.moderation.dismiss(req.admin_id, id).await)
}

/// Escalate a report to the senior admin tier
pub async fn escalate_report(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<AdminAction>,
) -> impl IntoResponse {
    result_to_response(state.moderation.escalate(req.admin_id, id).await)
}
