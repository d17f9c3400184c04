//! Error types for the LocalLibrary server

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::renewal::RejectionReason;

/// Stable numeric error codes returned in every error body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Failure = 1,
    NotAuthorized = 2,
    DbFailure = 3,
    NoSuchRecord = 4,
    BadValue = 5,
    MalformedInput = 6,
    Duplicate = 7,
    RuleViolation = 8,
    PastDate = 9,
    TooFarInFuture = 10,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Business rule violation: {0}")]
    BusinessRule(String),

    #[error("Renewal rejected: {0}")]
    Renewal(RejectionReason),
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db) = e {
            if db.is_unique_violation() {
                return AppError::Conflict(db.message().to_string());
            }
            if db.is_foreign_key_violation() {
                return AppError::Validation(format!("Missing or still referenced record: {}", db.message()));
            }
        }
        AppError::Database(e)
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::MalformedInput(rejection.body_text())
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl AppError {
    fn parts(&self) -> (StatusCode, ErrorCode, String) {
        match self {
            AppError::Authentication(msg) => {
                (StatusCode::UNAUTHORIZED, ErrorCode::NotAuthorized, msg.clone())
            }
            AppError::Authorization(msg) => {
                (StatusCode::FORBIDDEN, ErrorCode::NotAuthorized, msg.clone())
            }
            AppError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, ErrorCode::NoSuchRecord, msg.clone())
            }
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone())
            }
            AppError::MalformedInput(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::MalformedInput, msg.clone())
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::DbFailure,
                    "Database error".to_string(),
                )
            }
            AppError::Conflict(msg) => {
                (StatusCode::CONFLICT, ErrorCode::Duplicate, msg.clone())
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::Failure,
                    "Internal server error".to_string(),
                )
            }
            AppError::BusinessRule(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::RuleViolation, msg.clone())
            }
            AppError::Renewal(reason) => {
                let code = match reason {
                    RejectionReason::PastDate => ErrorCode::PastDate,
                    RejectionReason::TooFarFuture => ErrorCode::TooFarInFuture,
                };
                (StatusCode::UNPROCESSABLE_ENTITY, code, reason.message().to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        let error = match &self {
            AppError::Renewal(reason) => reason.as_str().to_string(),
            _ => format!("{:?}", code),
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error,
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renewal_rejection_maps_to_unprocessable() {
        let (status, code, _) = AppError::Renewal(RejectionReason::PastDate).parts();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(code, ErrorCode::PastDate);

        let (_, code, _) = AppError::Renewal(RejectionReason::TooFarFuture).parts();
        assert_eq!(code, ErrorCode::TooFarInFuture);
    }

    #[test]
    fn test_malformed_input_is_bad_request() {
        let (status, code, msg) = AppError::MalformedInput("renewal_date".into()).parts();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(code, ErrorCode::MalformedInput);
        assert_eq!(msg, "renewal_date");
    }

    async fn body_of(error: AppError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_renewal_rejection_body_carries_reason_code() {
        let (status, body) = body_of(AppError::Renewal(RejectionReason::PastDate)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], ErrorCode::PastDate as u32);
        assert_eq!(body["error"], "PAST_DATE");
        assert_eq!(body["message"], RejectionReason::PastDate.message());

        let (_, body) = body_of(AppError::Renewal(RejectionReason::TooFarFuture)).await;
        assert_eq!(body["code"], ErrorCode::TooFarInFuture as u32);
        assert_eq!(body["error"], "TOO_FAR_FUTURE");
    }

    #[tokio::test]
    async fn test_other_errors_name_their_code() {
        let (status, body) = body_of(AppError::NotFound("Book with id 3 not found".into())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "NoSuchRecord");
        assert_eq!(body["message"], "Book with id 3 not found");
    }

    #[test]
    fn test_row_not_found_stays_database_error() {
        let err = AppError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, AppError::Database(_)));
    }
}
