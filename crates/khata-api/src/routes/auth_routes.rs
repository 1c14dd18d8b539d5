//! # Auth & Profile API
//!
//! Registration and the caller's own profile. Token issuance happens
//! out-of-band; registration returns the account id a token is minted
//! against.
//!
//! ## Endpoints
//!
//! - `POST /v1/auth/register` — create an account
//! - `GET /v1/auth/me` — caller's profile (runs the status reconciler)

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use khata_account::{reconcile, Account, AccountType, BusinessStatus, KycStatus};
use khata_core::ValidationError;

use crate::auth::CallerIdentity;
use crate::error::AppError;
use crate::extractors::{Validate, ValidatedJson};
use crate::routes::caller_account;
use crate::state::AppState;

// ── Request/Response DTOs ───────────────────────────────────────────

/// Request to register a new account.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    /// Email address, unique across accounts (case-insensitive).
    pub email: String,
    /// Display name.
    pub full_name: String,
    /// "PRIVATE" or "BUSINESS" ("PERSONAL" is accepted as PRIVATE).
    pub account_type: String,
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.email.trim().is_empty() {
            return Err(ValidationError::Required { field: "email" });
        }
        if self.full_name.trim().is_empty() {
            return Err(ValidationError::Required { field: "full_name" });
        }
        if AccountType::parse(&self.account_type).is_none() {
            return Err(ValidationError::InvalidChoice {
                field: "account_type",
                allowed: "PRIVATE, BUSINESS, PERSONAL",
            });
        }
        Ok(())
    }
}

/// Public view of an account.
#[derive(Debug, Serialize, ToSchema)]
pub struct AccountResponse {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    #[schema(value_type = String)]
    pub account_type: AccountType,
    #[schema(value_type = String)]
    pub kyc_status: KycStatus,
    #[schema(value_type = String)]
    pub business_status: BusinessStatus,
    /// Code other private accounts use to connect to this one.
    pub invite_code: String,
    pub is_superuser: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Account> for AccountResponse {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            email: account.email.clone(),
            full_name: account.full_name.clone(),
            account_type: account.account_type,
            kyc_status: account.kyc_status,
            business_status: account.business_status,
            invite_code: account.invite_code.clone(),
            is_superuser: account.is_superuser,
            created_at: account.created_at,
        }
    }
}

// ── Router ──────────────────────────────────────────────────────────

/// Build the unauthenticated part of the auth router. Registration has
/// to work before the caller holds a token.
pub fn public_router() -> Router<AppState> {
    Router::new().route("/v1/auth/register", post(register))
}

/// Build the authenticated part of the auth router.
pub fn router() -> Router<AppState> {
    Router::new().route("/v1/auth/me", get(me))
}

// ── Handlers ────────────────────────────────────────────────────────

/// POST /v1/auth/register — Create a new account.
#[utoipa::path(
    post,
    path = "/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AccountResponse),
        (status = 409, description = "Email already registered", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "auth"
)]
pub(crate) async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AccountResponse>), AppError> {
    let account_type = AccountType::parse(&req.account_type)
        .ok_or_else(|| AppError::Validation("unrecognized account_type".into()))?;

    let account = Account::new(&req.email, &req.full_name, account_type, Utc::now())
        .map_err(AppError::from)?;
    let response = AccountResponse::from(&account);

    let email = account.email.clone();
    state
        .accounts
        .insert_unique(account.id, account, |existing| existing.email == email)
        .map_err(|()| AppError::Conflict("an account with this email already exists".into()))?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /v1/auth/me — The caller's own profile.
///
/// Runs the status reconciler before returning, so a profile read
/// always reflects a coherent onboarding state.
#[utoipa::path(
    get,
    path = "/v1/auth/me",
    responses(
        (status = 200, description = "Caller profile", body = AccountResponse),
        (status = 401, description = "Missing or invalid token", body = crate::error::ErrorBody),
    ),
    tag = "auth"
)]
pub(crate) async fn me(
    State(state): State<AppState>,
    caller: CallerIdentity,
) -> Result<Json<AccountResponse>, AppError> {
    let account = caller_account(&state, &caller)?;
    let repaired = state
        .accounts
        .update(&account.id, |acc| {
            let outcome = reconcile(acc, Utc::now());
            if outcome.changed() {
                tracing::info!(account_id = %acc.id, ?outcome, "repaired account status on read");
            }
        })
        .ok_or_else(|| AppError::NotFound(format!("account {} not found", account.id)))?;
    Ok(Json(AccountResponse::from(&repaired)))
}
