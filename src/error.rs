// Copyright (c) CrowdPulse Team
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

/// Error taxonomy surfaced by engines and stores.
///
/// Every business operation returns one of these kinds so callers can react
/// to the failure mode instead of parsing messages. Notification dispatch and
/// best-effort counter maintenance absorb their own failures and never
/// surface here.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A referenced entity does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// A uniqueness rule was violated (duplicate edge, like, report, username).
    #[error("{0}")]
    AlreadyExists(String),

    /// Malformed input: wrong content-reference count, self-action, bad amount.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The operation is not legal in the entity's current state.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// The actor lacks the required relationship to the resource.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The payment gateway (or another upstream collaborator) failed.
    #[error("upstream failure: {0}")]
    UpstreamFailure(String),

    /// Storage-level fault (pool exhaustion, query failure).
    #[error("database error: {0}")]
    Database(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn already_exists(msg: impl Into<String>) -> Self {
        Self::AlreadyExists(msg.into())
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::UpstreamFailure(msg.into())
    }

    pub fn database(err: impl std::fmt::Display) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<diesel::result::Error> for ServiceError {
    fn from(err: diesel::result::Error) -> Self {
        use diesel::result::{DatabaseErrorKind, Error};
        match err {
            Error::NotFound => ServiceError::NotFound("record".to_string()),
            Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                ServiceError::AlreadyExists(info.message().to_string())
            }
            other => ServiceError::Database(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kinds_render_their_context() {
        assert_eq!(
            ServiceError::not_found("profile 7").to_string(),
            "profile 7 not found"
        );
        assert_eq!(
            ServiceError::invalid_argument("cannot follow yourself").to_string(),
            "invalid argument: cannot follow yourself"
        );
        assert_eq!(
            ServiceError::upstream("card declined").to_string(),
            "upstream failure: card declined"
        );
    }

    #[test]
    fn diesel_not_found_maps_to_not_found() {
        let err: ServiceError = diesel::result::Error::NotFound.into();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
