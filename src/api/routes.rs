// Copyright (c) CrowdPulse Team
// SPDX-License-Identifier: Apache-2.0

use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::{ServiceError, ServiceResult};

/// Standard API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a success response with data
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response with message
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Maps an error kind to the HTTP status it travels under.
pub fn status_for(err: &ServiceError) -> StatusCode {
    match err {
        ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::AlreadyExists(_) => StatusCode::CONFLICT,
        ServiceError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        ServiceError::InvalidState(_) => StatusCode::CONFLICT,
        ServiceError::Unauthorized(_) => StatusCode::FORBIDDEN,
        ServiceError::UpstreamFailure(_) => StatusCode::BAD_GATEWAY,
        ServiceError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Convert an engine result to an API response with the matching status
pub fn result_to_response<T: Serialize>(
    result: ServiceResult<T>,
) -> (StatusCode, Json<ApiResponse<T>>) {
    match result {
        Ok(data) => (StatusCode::OK, Json(ApiResponse::success(data))),
        Err(err) => (status_for(&err), Json(ApiResponse::error(err.to_string()))),
    }
}

/// Pagination parameters
#[derive(Debug, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Standard pagination implementation
impl PaginationParams {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(10).clamp(1, 100)
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kinds_map_to_their_status() {
        assert_eq!(
            status_for(&ServiceError::not_found("x")),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&ServiceError::already_exists("x")),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_for(&ServiceError::invalid_state("x")),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_for(&ServiceError::unauthorized("x")),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_for(&ServiceError::upstream("x")),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn pagination_clamps_to_sane_bounds() {
        let params = PaginationParams {
            limit: Some(5000),
            offset: Some(-3),
        };
        assert_eq!(params.limit(), 100);
        assert_eq!(params.offset(), 0);

        let defaults = PaginationParams {
            limit: None,
            offset: None,
        };
        assert_eq!(defaults.limit(), 10);
        assert_eq!(defaults.offset(), 0);
    }
}
