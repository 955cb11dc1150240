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
use crate::models::content::{NewComment, NewPost, NewReel};
use crate::models::content_ref::ContentRef;

/// Like and unlike requests carry up to three optional ids; exactly one
/// must be set.
#[derive(Debug, Deserialize)]
pub struct LikePayload {
    pub user_id: i64,
    pub post_id: Option<i64>,
    pub reel_id: Option<i64>,
    pub campaign_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CommentPayload {
    pub author_id: i64,
    pub post_id: Option<i64>,
    pub reel_id: Option<i64>,
    pub campaign_id: Option<i64>,
    pub parent_comment_id: Option<i64>,
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteCommentRequest {
    pub user_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct CommentListParams {
    pub post_id: Option<i64>,
    pub reel_id: Option<i64>,
    pub campaign_id: Option<i64>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Publish a post
pub async fn create_post(
    State(state): State<AppState>,
    Json(new): Json<NewPost>,
) -> impl IntoResponse {
    result_to_response(state.engagement.create_post(new).await)
}

/// Get a post by id
pub async fn get_post(State(state): State<AppState>, Path(id): Path<i64>) -> impl IntoResponse {
    result_to_response(state.engagement.get_post(id).await)
}

/// Publish a reel
pub async fn create_reel(
    State(state): State<AppState>,
    Json(new): Json<NewReel>,
) -> impl IntoResponse {
    result_to_response(state.engagement.create_reel(new).await)
}

/// Get a reel by id
pub async fn get_reel(State(state): State<AppState>, Path(id): Path<i64>) -> impl IntoResponse {
    result_to_response(state.engagement.get_reel(id).await)
}

/// Like a post, reel or campaign
pub async fn like_content(
    State(state): State<AppState>,
    Json(req): Json<LikePayload>,
) -> impl IntoResponse {
    let result = match ContentRef::from_parts(req.post_id, req.reel_id, req.campaign_id) {
        Ok(target) => state.engagement.like_content(req.user_id, target).await,
        Err(err) => Err(err),
    };
    result_to_response(result)
}

/// Remove a like
pub async fn unlike_content(
    State(state): State<AppState>,
    Json(req): Json<LikePayload>,
) -> impl IntoResponse {
    let result = match ContentRef::from_parts(req.post_id, req.reel_id, req.campaign_id) {
        Ok(target) => state.engagement.unlike_content(req.user_id, target).await,
        Err(err) => Err(err),
    };
    result_to_response(result)
}

/// Campaign like totals are counted from the like rows, not denormalized
pub async fn get_campaign_like_count(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    result_to_response(state.engagement.campaign_like_count(id).await)
}

/// Comment on a post, reel or campaign, optionally as a reply
pub async fn create_comment(
    State(state): State<AppState>,
    Json(req): Json<CommentPayload>,
) -> impl IntoResponse {
    let result = match ContentRef::from_parts(req.post_id, req.reel_id, req.campaign_id) {
        Ok(target) => {
            state
                .engagement
                .create_comment(NewComment {
                    author_id: req.author_id,
                    target,
                    parent_comment_id: req.parent_comment_id,
                    body: req.body,
                })
                .await
        }
        Err(err) => Err(err),
    };
    result_to_response(result)
}

/// Soft-delete a comment (author only)
pub async fn delete_comment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<DeleteCommentRequest>,
) -> impl IntoResponse {
    result_to_response(state.engagement.delete_comment(req.user_id, id).await)
}

/// Bump a comment's like counter
pub async fn like_comment(State(state): State<AppState>, Path(id): Path<i64>) -> impl IntoResponse {
    result_to_response(state.engagement.like_comment(id).await)
}

/// Drop a comment's like counter
pub async fn unlike_comment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    result_to_response(state.engagement.unlike_comment(id).await)
}

/// List comments under a post, reel or campaign
pub async fn list_comments(
    State(state): State<AppState>,
    Query(params): Query<CommentListParams>,
) -> impl IntoResponse {
    let limit = params.limit.unwrap_or(10).clamp(1, 100);
    let offset = params.offset.unwrap_or(0).max(0);
    let result = match ContentRef::from_parts(params.post_id, params.reel_id, params.campaign_id) {
        Ok(target) => state.engagement.list_comments(target, limit, offset).await,
        Err(err) => Err(err),
    };
    result_to_response(result)
}
