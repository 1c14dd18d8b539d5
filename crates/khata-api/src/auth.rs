//! # Authentication Middleware
//!
//! Bearer token middleware binding requests to accounts.
//!
//! ## Token Format
//!
//! Token issuance is out of scope for this service; a static shared
//! secret stands in, with the account binding carried in the token:
//!
//! ```text
//! Bearer {account_id}:{secret}   — account-bound
//! Bearer admin:{secret}          — superuser, no account binding
//! Bearer {secret}                — legacy format (treated as superuser)
//! ```
//!
//! ## CallerIdentity
//!
//! Every authenticated request gets a [`CallerIdentity`] injected into
//! the request extensions. Handlers extract it via the
//! `FromRequestParts` impl. Account type and approval gates are checked
//! per route against the account store, not here.

use axum::extract::Request;
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::error::{AppError, ErrorBody, ErrorDetail};

// ── CallerIdentity ──────────────────────────────────────────────────

/// Identity of the authenticated caller, available to all route
/// handlers via Axum's `FromRequestParts`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    /// The caller's account, when the token is account-bound.
    /// `None` for superuser tokens.
    pub account_id: Option<Uuid>,
    /// Whether the token grants review privileges.
    pub superuser: bool,
}

impl CallerIdentity {
    /// Identity for an account-bound token.
    pub fn account(account_id: Uuid) -> Self {
        Self {
            account_id: Some(account_id),
            superuser: false,
        }
    }

    /// Identity for a superuser token with no account binding.
    pub fn superuser() -> Self {
        Self {
            account_id: None,
            superuser: true,
        }
    }
}

/// Extracts the identity that the auth middleware injected into
/// extensions. Returns 401 if no identity is present (middleware didn't
/// run or failed).
#[axum::async_trait]
impl<S: Send + Sync> axum::extract::FromRequestParts<S> for CallerIdentity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CallerIdentity>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("no caller identity in request context".into()))
    }
}

// ── Auth Configuration ──────────────────────────────────────────────

/// Auth configuration injected into request extensions.
///
/// Custom `Debug` redacts the token value to prevent credential leakage in logs.
#[derive(Clone)]
pub struct AuthConfig {
    pub token: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

// ── Token Validation ────────────────────────────────────────────────

/// Constant-time comparison of bearer tokens.
///
/// Prevents timing side-channels that could reveal token length or prefix.
/// When lengths differ, performs a dummy comparison to avoid leaking length
/// information through timing variance.
fn constant_time_token_eq(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();
    if provided.len() != expected.len() {
        // Dummy comparison to keep timing constant regardless of length match.
        let _ = expected.ct_eq(expected);
        return false;
    }
    provided.ct_eq(expected).into()
}

/// Parse a bearer token in format `{account_id}:{secret}`,
/// `admin:{secret}`, or bare `{secret}` (legacy, treated as superuser).
pub fn parse_bearer_token(provided: &str, expected_secret: &str) -> Result<CallerIdentity, String> {
    match provided.split_once(':') {
        None => {
            // Legacy format: just the secret.
            if constant_time_token_eq(provided, expected_secret) {
                Ok(CallerIdentity::superuser())
            } else {
                Err("invalid bearer token".into())
            }
        }
        Some((subject, secret)) => {
            if !constant_time_token_eq(secret, expected_secret) {
                return Err("invalid bearer token".into());
            }
            if subject == "admin" {
                return Ok(CallerIdentity::superuser());
            }
            let account_id = subject
                .parse::<Uuid>()
                .map_err(|e| format!("invalid account binding: {e}"))?;
            Ok(CallerIdentity::account(account_id))
        }
    }
}

// ── Middleware ──────────────────────────────────────────────────────

/// Extract and validate the Bearer token from the Authorization header.
///
/// Parses the token to extract [`CallerIdentity`] and injects it into
/// request extensions for downstream handlers.
///
/// When `AuthConfig.token` is `None`, all requests are allowed with an
/// unbound superuser identity (auth disabled / development mode).
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let expected_token = request.extensions().get::<AuthConfig>().cloned();

    match expected_token {
        Some(AuthConfig {
            token: Some(ref expected),
        }) => {
            let auth_header = request
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok());

            match auth_header {
                Some(header_value) if header_value.starts_with("Bearer ") => {
                    let provided = &header_value[7..];
                    match parse_bearer_token(provided, expected) {
                        Ok(identity) => {
                            request.extensions_mut().insert(identity);
                            next.run(request).await
                        }
                        Err(msg) => {
                            tracing::warn!(reason = %msg, "authentication failed: invalid bearer token");
                            unauthorized_response(&msg)
                        }
                    }
                }
                Some(_) => {
                    tracing::warn!("authentication failed: non-Bearer authorization scheme");
                    unauthorized_response("authorization header must use Bearer scheme")
                }
                None => {
                    tracing::warn!("authentication failed: missing authorization header");
                    unauthorized_response("missing authorization header")
                }
            }
        }
        _ => {
            // Auth disabled. An account binding in the header is still
            // honored so account-scoped endpoints stay usable; anything
            // else gets an unbound superuser.
            let identity = request
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.strip_prefix("Bearer "))
                .and_then(|token| {
                    let subject = token.split_once(':').map_or(token, |(s, _)| s);
                    subject.parse::<Uuid>().ok()
                })
                .map_or_else(CallerIdentity::superuser, CallerIdentity::account);
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
    }
}

fn unauthorized_response(message: &str) -> Response {
    let body = ErrorBody {
        error: ErrorDetail {
            code: "UNAUTHORIZED".to_string(),
            message: message.to_string(),
            details: None,
        },
    };
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}
