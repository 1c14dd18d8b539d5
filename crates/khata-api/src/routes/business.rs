//! # Business Onboarding API
//!
//! Payment submission, KYC submission, the combined status view, and
//! the privileged review actions.
//!
//! ## Endpoints
//!
//! - `POST /v1/business/payment` — submit/resubmit onboarding payment
//! - `POST /v1/business/kyc` — submit/resubmit the KYC profile
//! - `GET /v1/business/status` — onboarding status (runs the reconciler)
//! - `POST /v1/business/kyc/:account_id/approve` — approve (superuser)
//! - `POST /v1/business/kyc/:account_id/reject` — reject (superuser)

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use khata_account::{
    reconcile, review, Account, BusinessStatus, KycProfile, KycRecord, KycStatus, PaymentRecord,
    PaymentSubmission, ReviewState,
};

use khata_core::ValidationError;

use crate::auth::CallerIdentity;
use crate::error::AppError;
use crate::extractors::{Validate, ValidatedJson};
use crate::routes::{require_business, require_superuser};
use crate::state::AppState;

// ── Request/Response DTOs ───────────────────────────────────────────

/// Request to submit the onboarding payment. All fields optional;
/// amount and provider fall back to the fixed onboarding defaults.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PaymentRequest {
    #[schema(value_type = Option<String>)]
    pub amount: Option<Decimal>,
    pub provider: Option<String>,
    pub transaction_code: Option<String>,
    pub screenshot_ref: Option<String>,
}

impl Validate for PaymentRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        if let Some(amount) = self.amount {
            if amount <= Decimal::ZERO {
                return Err(ValidationError::InvalidAmount { field: "amount" });
            }
        }
        Ok(())
    }
}

/// Request to submit the KYC profile.
#[derive(Debug, Deserialize, ToSchema)]
pub struct KycRequest {
    pub business_name: String,
    pub registration_number: String,
    pub tax_id: Option<String>,
    pub address: String,
    pub phone: Option<String>,
    pub owner_name: String,
    pub owner_id_number: Option<String>,
    pub owner_dob: Option<NaiveDate>,
    pub registration_doc_ref: Option<String>,
    pub owner_id_doc_ref: Option<String>,
}

impl Validate for KycRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [
            ("business_name", &self.business_name),
            ("registration_number", &self.registration_number),
            ("address", &self.address),
            ("owner_name", &self.owner_name),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::Required { field });
            }
        }
        Ok(())
    }
}

impl From<KycRequest> for KycProfile {
    fn from(req: KycRequest) -> Self {
        Self {
            business_name: req.business_name,
            registration_number: req.registration_number,
            tax_id: req.tax_id,
            address: req.address,
            phone: req.phone,
            owner_name: req.owner_name,
            owner_id_number: req.owner_id_number,
            owner_dob: req.owner_dob,
            registration_doc_ref: req.registration_doc_ref,
            owner_id_doc_ref: req.owner_id_doc_ref,
        }
    }
}

/// Request to reject a KYC record. The body may be omitted entirely;
/// a blank or missing reason is replaced with the stock rejection
/// message.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RejectRequest {
    pub reason: Option<String>,
}

/// Wire view of a payment record.
#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentView {
    #[schema(value_type = String)]
    pub amount: Decimal,
    pub provider: String,
    pub transaction_code: Option<String>,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&PaymentRecord> for PaymentView {
    fn from(record: &PaymentRecord) -> Self {
        Self {
            amount: record.amount,
            provider: record.provider.clone(),
            transaction_code: record.transaction_code.clone(),
            is_verified: record.is_verified,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Wire view of a KYC record: the submitted business name plus the
/// review outcome.
#[derive(Debug, Serialize, ToSchema)]
pub struct KycView {
    pub business_name: String,
    /// "PENDING", "APPROVED" or "REJECTED".
    pub review_status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
    pub submitted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&KycRecord> for KycView {
    fn from(record: &KycRecord) -> Self {
        let review_status = match record.review {
            ReviewState::Pending => "PENDING",
            ReviewState::Approved { .. } => "APPROVED",
            ReviewState::Rejected { .. } => "REJECTED",
        };
        Self {
            business_name: record.profile.business_name.clone(),
            review_status: review_status.to_string(),
            rejection_reason: record.review.rejection_reason().map(str::to_owned),
            reviewed_at: record.review.reviewed_at(),
            submitted_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Combined onboarding status view.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    pub account_id: Uuid,
    #[schema(value_type = String)]
    pub business_status: BusinessStatus,
    #[schema(value_type = String)]
    pub kyc_status: KycStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment: Option<PaymentView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kyc: Option<KycView>,
}

impl From<&Account> for StatusResponse {
    fn from(account: &Account) -> Self {
        Self {
            account_id: account.id,
            business_status: account.business_status,
            kyc_status: account.kyc_status,
            payment: account.payment.as_ref().map(PaymentView::from),
            kyc: account.kyc.as_ref().map(KycView::from),
        }
    }
}

// ── Router ──────────────────────────────────────────────────────────

/// Build the business onboarding router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/business/payment", post(submit_payment))
        .route("/v1/business/kyc", post(submit_kyc))
        .route("/v1/business/status", get(onboarding_status))
        .route("/v1/business/kyc/:account_id/approve", post(approve_kyc))
        .route("/v1/business/kyc/:account_id/reject", post(reject_kyc))
}

// ── Handlers ────────────────────────────────────────────────────────

/// POST /v1/business/payment — Submit or resubmit the onboarding payment.
#[utoipa::path(
    post,
    path = "/v1/business/payment",
    request_body = PaymentRequest,
    responses(
        (status = 200, description = "Payment recorded", body = PaymentView),
        (status = 403, description = "Not a business account", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "business"
)]
pub(crate) async fn submit_payment(
    State(state): State<AppState>,
    caller: CallerIdentity,
    ValidatedJson(req): ValidatedJson<PaymentRequest>,
) -> Result<Json<PaymentView>, AppError> {
    let account = require_business(&state, &caller)?;

    let submission = PaymentSubmission {
        amount: req.amount,
        provider: req.provider,
        transaction_code: req.transaction_code,
        screenshot_ref: req.screenshot_ref,
    };

    let result = state
        .accounts
        .try_update(&account.id, |acc| {
            acc.submit_payment(submission, Utc::now())
                .map(PaymentView::from)
        })
        .ok_or_else(|| AppError::NotFound(format!("account {} not found", account.id)))?;
    let view = result?;
    Ok(Json(view))
}

/// POST /v1/business/kyc — Submit or resubmit the KYC profile.
///
/// Rejected profiles can be resubmitted (the rejection is cleared);
/// approved profiles cannot.
#[utoipa::path(
    post,
    path = "/v1/business/kyc",
    request_body = KycRequest,
    responses(
        (status = 200, description = "KYC profile recorded", body = KycView),
        (status = 400, description = "Already approved", body = crate::error::ErrorBody),
        (status = 403, description = "Not a business account", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "business"
)]
pub(crate) async fn submit_kyc(
    State(state): State<AppState>,
    caller: CallerIdentity,
    ValidatedJson(req): ValidatedJson<KycRequest>,
) -> Result<Json<KycView>, AppError> {
    let account = require_business(&state, &caller)?;
    let profile = KycProfile::from(req);

    let result = state
        .accounts
        .try_update(&account.id, |acc| {
            acc.submit_kyc(profile, Utc::now()).map(KycView::from)
        })
        .ok_or_else(|| AppError::NotFound(format!("account {} not found", account.id)))?;
    let view = result?;
    Ok(Json(view))
}

/// GET /v1/business/status — The caller's onboarding status.
///
/// Runs the status reconciler inside the store's write lock before
/// building the view.
#[utoipa::path(
    get,
    path = "/v1/business/status",
    responses(
        (status = 200, description = "Onboarding status", body = StatusResponse),
        (status = 403, description = "Not a business account", body = crate::error::ErrorBody),
    ),
    tag = "business"
)]
pub(crate) async fn onboarding_status(
    State(state): State<AppState>,
    caller: CallerIdentity,
) -> Result<Json<StatusResponse>, AppError> {
    let account = require_business(&state, &caller)?;
    let repaired = state
        .accounts
        .update(&account.id, |acc| {
            let outcome = reconcile(acc, Utc::now());
            if outcome.changed() {
                tracing::info!(account_id = %acc.id, ?outcome, "repaired account status on read");
            }
        })
        .ok_or_else(|| AppError::NotFound(format!("account {} not found", account.id)))?;
    Ok(Json(StatusResponse::from(&repaired)))
}

/// POST /v1/business/kyc/:account_id/approve — Approve a KYC record.
#[utoipa::path(
    post,
    path = "/v1/business/kyc/{account_id}/approve",
    params(("account_id" = Uuid, Path, description = "Account under review")),
    responses(
        (status = 200, description = "KYC approved", body = StatusResponse),
        (status = 400, description = "No KYC record to review", body = crate::error::ErrorBody),
        (status = 403, description = "Not a superuser", body = crate::error::ErrorBody),
        (status = 404, description = "Account not found", body = crate::error::ErrorBody),
    ),
    tag = "business"
)]
pub(crate) async fn approve_kyc(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(account_id): Path<Uuid>,
) -> Result<Json<StatusResponse>, AppError> {
    let reviewer = require_superuser(&state, &caller)?;
    let result = state
        .accounts
        .try_update(&account_id, |acc| {
            review::approve(acc, reviewer, Utc::now())?;
            Ok::<_, AppError>(StatusResponse::from(&*acc))
        })
        .ok_or_else(|| AppError::NotFound(format!("account {account_id} not found")))?;
    let view = result?;
    tracing::info!(%account_id, reviewer = ?reviewer, "KYC approved");
    Ok(Json(view))
}

/// POST /v1/business/kyc/:account_id/reject — Reject a KYC record.
#[utoipa::path(
    post,
    path = "/v1/business/kyc/{account_id}/reject",
    params(("account_id" = Uuid, Path, description = "Account under review")),
    request_body = RejectRequest,
    responses(
        (status = 200, description = "KYC rejected", body = StatusResponse),
        (status = 400, description = "No KYC record to review", body = crate::error::ErrorBody),
        (status = 403, description = "Not a superuser", body = crate::error::ErrorBody),
        (status = 404, description = "Account not found", body = crate::error::ErrorBody),
    ),
    tag = "business"
)]
pub(crate) async fn reject_kyc(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(account_id): Path<Uuid>,
    body: Option<Json<RejectRequest>>,
) -> Result<Json<StatusResponse>, AppError> {
    let reviewer = require_superuser(&state, &caller)?;
    let req = body.map(|Json(r)| r).unwrap_or_default();
    let result = state
        .accounts
        .try_update(&account_id, |acc| {
            review::reject(acc, reviewer, req.reason, Utc::now())?;
            Ok::<_, AppError>(StatusResponse::from(&*acc))
        })
        .ok_or_else(|| AppError::NotFound(format!("account {account_id} not found")))?;
    let view = result?;
    tracing::info!(%account_id, reviewer = ?reviewer, "KYC rejected");
    Ok(Json(view))
}
