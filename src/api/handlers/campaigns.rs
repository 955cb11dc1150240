// Copyright (c) CrowdPulse Team
// SPDX-License-Identifier: Apache-2.0

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use bigdecimal::BigDecimal;
use serde::Deserialize;

use crate::api::routes::{result_to_response, PaginationParams};
use crate::api::AppState;
use crate::engines::campaign::CampaignDraft;

#[derive(Debug, Deserialize)]
pub struct CreatorAction {
    pub creator_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct AdminAction {
    pub admin_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    pub admin_id: i64,
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct DonationRequest {
    pub donor_id: i64,
    pub amount: BigDecimal,
    #[serde(default)]
    pub is_anonymous: bool,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RefundRequest {
    pub reason: String,
    /// Omitted means refund whatever is still refundable.
    pub amount: Option<BigDecimal>,
}

#[derive(Debug, Deserialize)]
pub struct WithdrawalRequest {
    pub requester_id: i64,
    pub bank_account_id: i64,
    pub amount: BigDecimal,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePayload {
    pub author_id: i64,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub is_milestone: bool,
}

/// Create a draft campaign
pub async fn create_campaign(
    State(state): State<AppState>,
    Json(draft): Json<CampaignDraft>,
) -> impl IntoResponse {
    result_to_response(state.campaigns.create_campaign(draft).await)
}

/// Get a campaign by id
pub async fn get_campaign(State(state): State<AppState>, Path(id): Path<i64>) -> impl IntoResponse {
    result_to_response(state.campaigns.get_campaign(id).await)
}

/// Submit a draft for review
pub async fn publish_campaign(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<CreatorAction>,
) -> impl IntoResponse {
    result_to_response(state.campaigns.publish(req.creator_id, id).await)
}

/// Approve a campaign under review, activating it
pub async fn approve_campaign(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<AdminAction>,
) -> impl IntoResponse {
    result_to_response(state.campaigns.approve(req.admin_id, id).await)
}

/// Reject a campaign under review
pub async fn reject_campaign(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<RejectRequest>,
) -> impl IntoResponse {
    result_to_response(state.campaigns.reject(req.admin_id, id, req.reason).await)
}

/// Pause an active campaign
pub async fn pause_campaign(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<CreatorAction>,
) -> impl IntoResponse {
    result_to_response(state.campaigns.pause(req.creator_id, id).await)
}

/// Resume a paused campaign
pub async fn resume_campaign(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<CreatorAction>,
) -> impl IntoResponse {
    result_to_response(state.campaigns.resume(req.creator_id, id).await)
}

/// Donate to an active campaign; the charge settles before the response
pub async fn donate(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<DonationRequest>,
) -> impl IntoResponse {
    result_to_response(
        state
            .campaigns
            .donate(req.donor_id, id, req.amount, req.is_anonymous, req.message)
            .await,
    )
}

/// List a campaign's donations
pub async fn list_donations(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(pagination): Query<PaginationParams>,
) -> impl IntoResponse {
    result_to_response(
        state
            .campaigns
            .list_donations(id, pagination.limit(), pagination.offset())
            .await,
    )
}

/// Refund a completed donation, fully or partially
pub async fn refund_donation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<RefundRequest>,
) -> impl IntoResponse {
    result_to_response(
        state
            .campaigns
            .refund_donation(id, req.reason, req.amount)
            .await,
    )
}

/// Request a withdrawal against the campaign balance
pub async fn request_withdrawal(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<WithdrawalRequest>,
) -> impl IntoResponse {
    result_to_response(
        state
            .campaigns
            .request_withdrawal(req.requester_id, id, req.bank_account_id, req.amount)
            .await,
    )
}

/// List a campaign's withdrawals
pub async fn list_withdrawals(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(pagination): Query<PaginationParams>,
) -> impl IntoResponse {
    result_to_response(
        state
            .campaigns
            .list_withdrawals(id, pagination.limit(), pagination.offset())
            .await,
    )
}

/// Approve a pending withdrawal and execute the transfer
pub async fn approve_withdrawal(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<AdminAction>,
) -> impl IntoResponse {
    result_to_response(state.campaigns.approve_withdrawal(req.admin_id, id).await)
}

/// Reject a pending withdrawal
pub async fn reject_withdrawal(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<RejectRequest>,
) -> impl IntoResponse {
    result_to_response(
        state
            .campaigns
            .reject_withdrawal(req.admin_id, id, req.reason)
            .await,
    )
}

/// Post a progress update to donors
pub async fn post_update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdatePayload>,
) -> impl IntoResponse {
    result_to_response(
        state
            .campaigns
            .post_update(req.author_id, id, req.title, req.body, req.is_milestone)
            .await,
    )
}

/// List a campaign's updates
pub async fn list_updates(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(pagination): Query<PaginationParams>,
) -> impl IntoResponse {
    result_to_response(
        state
            .campaigns
            .list_updates(id, pagination.limit(), pagination.offset())
            .await,
    )
}
