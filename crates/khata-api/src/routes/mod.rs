//! # Route Modules
//!
//! One module per API area, each exposing a `router()` that the app
//! merges. Shared authorization guards live here: every guard loads the
//! caller's account and checks the account-type gate for its area.

pub mod auth_routes;
pub mod business;
pub mod health;
pub mod ledger;
pub mod ocr;
pub mod private;

use uuid::Uuid;

use khata_account::{Account, AccountType};

use crate::auth::CallerIdentity;
use crate::error::AppError;
use crate::state::AppState;

/// Resolve the caller's account record.
///
/// Superuser tokens carry no account binding, so account-scoped
/// endpoints reject them; review endpoints accept the identity without
/// resolving an account.
pub(crate) fn caller_account(
    state: &AppState,
    caller: &CallerIdentity,
) -> Result<Account, AppError> {
    let account_id = caller
        .account_id
        .ok_or_else(|| AppError::Unauthorized("token is not bound to an account".into()))?;
    state
        .accounts
        .get(&account_id)
        .ok_or_else(|| AppError::Unauthorized("token account no longer exists".into()))
}

/// Gate for business endpoints: caller must hold a BUSINESS account.
pub(crate) fn require_business(
    state: &AppState,
    caller: &CallerIdentity,
) -> Result<Account, AppError> {
    let account = caller_account(state, caller)?;
    if account.account_type != AccountType::Business {
        return Err(AppError::Forbidden(
            "this endpoint requires a business account".into(),
        ));
    }
    Ok(account)
}

/// Gate for OCR and ledger endpoints: a BUSINESS account that has
/// cleared onboarding (KYC or business status approved).
pub(crate) fn require_business_enabled(
    state: &AppState,
    caller: &CallerIdentity,
) -> Result<Account, AppError> {
    let account = require_business(state, caller)?;
    if !account.is_business_enabled() {
        return Err(AppError::Forbidden(
            "business account is not yet approved".into(),
        ));
    }
    Ok(account)
}

/// Gate for private endpoints: caller must hold a PRIVATE account.
pub(crate) fn require_private(
    state: &AppState,
    caller: &CallerIdentity,
) -> Result<Account, AppError> {
    let account = caller_account(state, caller)?;
    if account.account_type != AccountType::Private {
        return Err(AppError::Forbidden(
            "this endpoint requires a private account".into(),
        ));
    }
    Ok(account)
}

/// Gate for review endpoints: the token itself is a superuser token, or
/// it is bound to an account flagged as superuser.
pub(crate) fn require_superuser(
    state: &AppState,
    caller: &CallerIdentity,
) -> Result<Option<Uuid>, AppError> {
    if caller.superuser {
        return Ok(caller.account_id);
    }
    let account = caller_account(state, caller)?;
    if !account.is_superuser {
        return Err(AppError::Forbidden(
            "review operations require superuser privileges".into(),
        ));
    }
    Ok(Some(account.id))
}
