// Copyright (c) CrowdPulse Team
// SPDX-License-Identifier: Apache-2.0

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use axum::Json;

use crate::api::routes::{result_to_response, PaginationParams};
use crate::api::AppState;
use crate::error::ServiceError;
use crate::models::profile::{NewProfile, Profile, UpdateProfile};

/// Register a new profile
pub async fn create_profile(
    State(state): State<AppState>,
    Json(new): Json<NewProfile>,
) -> impl IntoResponse {
    result_to_response(state.identity.create_profile(new).await)
}

/// Get a profile by id
pub async fn get_profile(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let result = state.identity.get_profile(id).await.and_then(|found| {
        found.ok_or_else(|| ServiceError::not_found(format!("profile {}", id)))
    });
    result_to_response::<Profile>(result)
}

/// Patch display name, bio, avatar or privacy
pub async fn update_profile(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(changes): Json<UpdateProfile>,
) -> impl IntoResponse {
    result_to_response(state.identity.update_profile(id, changes).await)
}

/// List accepted follow edges pointing at this profile
pub async fn get_profile_followers(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(pagination): Query<PaginationParams>,
) -> impl IntoResponse {
    result_to_response(
        state
            .social
            .followers(id, pagination.limit(), pagination.offset())
            .await,
    )
}

/// List accepted follow edges this profile created
pub async fn get_profile_following(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(pagination): Query<PaginationParams>,
) -> impl IntoResponse {
    result_to_response(
        state
            .social
            .following(id, pagination.limit(), pagination.offset())
            .await,
    )
}
