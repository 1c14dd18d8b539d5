//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps domain errors from khata-account, khata-ocr, khata-ledger, and
//! khata-private to HTTP status codes. Returns JSON error response
//! bodies with error code, message, and details. Never exposes internal
//! error details in production responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses use this format across the API surface. The
/// `details` field carries additional context for 422 validation errors
/// but is omitted for 500-class errors to prevent information leakage.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "VALIDATION_ERROR").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional details, present only for client errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
///
/// Maps domain errors to appropriate HTTP status codes and structured
/// JSON error bodies. Internal error details are never exposed to clients.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found — or not owned by the caller (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Request validation failed (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Business-rule violation or malformed body (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Authentication failure — missing or invalid token (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Authorization failure — wrong account type or privilege (403).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Conflict with current resource state (409).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Never expose internal error messages to clients.
        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        if matches!(&self, Self::Internal(_)) {
            tracing::error!(error = %self, "internal server error");
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Field validation errors from khata-core map to 422.
impl From<khata_core::ValidationError> for AppError {
    fn from(err: khata_core::ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Account transition errors map per variant: validation is 422, a
/// business-only operation on a private account is 403, resubmitting
/// approved KYC is a business-rule 400.
impl From<khata_account::AccountError> for AppError {
    fn from(err: khata_account::AccountError) -> Self {
        match err {
            khata_account::AccountError::Validation(e) => Self::Validation(e.to_string()),
            khata_account::AccountError::NotBusiness => Self::Forbidden(err.to_string()),
            khata_account::AccountError::KycAlreadyApproved => Self::BadRequest(err.to_string()),
        }
    }
}

/// Deciding on a missing KYC record is a business-rule 400.
impl From<khata_account::ReviewError> for AppError {
    fn from(err: khata_account::ReviewError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

/// Document errors: confirming a non-draft is a business-rule 400.
impl From<khata_ocr::DocumentError> for AppError {
    fn from(err: khata_ocr::DocumentError) -> Self {
        match err {
            khata_ocr::DocumentError::NotDraft => Self::BadRequest(err.to_string()),
            khata_ocr::DocumentError::Validation(e) => Self::Validation(e.to_string()),
        }
    }
}

/// Ledger errors: double-settle is a 409.
impl From<khata_ledger::LedgerError> for AppError {
    fn from(err: khata_ledger::LedgerError) -> Self {
        match err {
            khata_ledger::LedgerError::AlreadySettled => Self::Conflict(err.to_string()),
            khata_ledger::LedgerError::Validation(e) => Self::Validation(e.to_string()),
        }
    }
}

/// Private-feature errors follow the REST conventions of the surface:
/// membership gaps are 404, role gaps are 403, repeat returns are 409,
/// the rest are business-rule 400s.
impl From<khata_private::PrivateError> for AppError {
    fn from(err: khata_private::PrivateError) -> Self {
        use khata_private::PrivateError as E;
        match err {
            E::NotMember => Self::NotFound(err.to_string()),
            E::AdminOnly => Self::Forbidden(err.to_string()),
            E::AlreadyReturned => Self::Conflict(err.to_string()),
            E::Validation(e) => Self::Validation(e.to_string()),
            E::SelfTarget | E::AlreadyConnected | E::AlreadyMember | E::MustBeFriend
            | E::CannotRemoveOwner => Self::BadRequest(err.to_string()),
        }
    }
}
