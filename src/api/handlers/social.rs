// Copyright (c) CrowdPulse Team
// SPDX-License-Identifier: Apache-2.0

use axum::{extract::State, response::IntoResponse, Json};
use serde::Deserialize;

use crate::api::routes::result_to_response;
use crate::api::AppState;

#[derive(Debug, Deserialize)]
pub struct FollowRequest {
    pub follower_id: i64,
    pub following_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct ApprovalRequest {
    pub approver_id: i64,
    pub requester_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct BlockRequest {
    pub blocker_id: i64,
    pub blocked_id: i64,
}

/// Follow a profile (or request to, when the target is private)
pub async fn follow(
    State(state): State<AppState>,
    Json(req): Json<FollowRequest>,
) -> impl IntoResponse {
    result_to_response(state.social.follow(req.follower_id, req.following_id).await)
}

/// Withdraw a follow or a pending request
pub async fn unfollow(
    State(state): State<AppState>,
    Json(req): Json<FollowRequest>,
) -> impl IntoResponse {
    result_to_response(
        state
            .social
            .unfollow(req.follower_id, req.following_id)
            .await,
    )
}

/// Accept a pending follow request
pub async fn approve(
    State(state): State<AppState>,
    Json(req): Json<ApprovalRequest>,
) -> impl IntoResponse {
    result_to_response(state.social.approve(req.approver_id, req.requester_id).await)
}

/// Decline a pending follow request
pub async fn reject(
    State(state): State<AppState>,
    Json(req): Json<ApprovalRequest>,
) -> impl IntoResponse {
    result_to_response(state.social.reject(req.approver_id, req.requester_id).await)
}

/// Block a profile, severing any follow edges both ways
pub async fn block(
    State(state): State<AppState>,
    Json(req): Json<BlockRequest>,
) -> impl IntoResponse {
    result_to_response(state.social.block(req.blocker_id, req.blocked_id).await)
}

/// Lift a block
pub async fn unblock(
    State(state): State<AppState>,
    Json(req): Json<BlockRequest>,
) -> impl IntoResponse {
    result_to_response(state.social.unblock(req.blocker_id, req.blocked_id).await)
}

/// Mute a followed profile
pub async fn mute(
    State(state): State<AppState>,
    Json(req): Json<FollowRequest>,
) -> impl IntoResponse {
    result_to_response(state.social.mute(req.follower_id, req.following_id).await)
}

/// Unmute a followed profile
pub async fn unmute(
    State(state): State<AppState>,
    Json(req): Json<FollowRequest>,
) -> impl IntoResponse {
    result_to_response(state.social.unmute(req.follower_id, req.following_id).await)
}
