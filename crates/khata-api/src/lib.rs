//! # khata-api — Axum HTTP Surface
//!
//! HTTP layer over the khata domain crates: accounts and onboarding,
//! receipt scanning, the business ledger, and the private peer-to-peer
//! features.
//!
//! ## API Surface
//!
//! | Prefix                    | Module                    | Domain                  |
//! |---------------------------|---------------------------|-------------------------|
//! | `/v1/auth/*`              | [`routes::auth_routes`]   | Registration, profile   |
//! | `/v1/business/payment`    | [`routes::business`]      | Onboarding payment      |
//! | `/v1/business/kyc*`       | [`routes::business`]      | KYC submission & review |
//! | `/v1/business/ocr/*`      | [`routes::ocr`]           | Receipt scanning        |
//! | `/v1/business/ledger/*`   | [`routes::ledger`]        | Business ledger         |
//! | `/v1/private/*`           | [`routes::private`]       | Friends, groups, items  |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → AuthMiddleware → Handler
//! ```
//!
//! Health probes, registration and the OpenAPI spec are mounted outside
//! the auth middleware.

pub mod auth;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::middleware::from_fn;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::auth::AuthConfig;
use crate::middleware::metrics::ApiMetrics;
use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    let auth_config = AuthConfig {
        token: state.config.auth_token.clone(),
    };
    let metrics = ApiMetrics::new();

    // Authenticated API routes.
    let api = Router::new()
        .merge(routes::auth_routes::router())
        .merge(routes::business::router())
        .merge(routes::ocr::router())
        .merge(routes::ledger::router())
        .merge(routes::private::router())
        .layer(from_fn(auth::auth_middleware))
        .layer(axum::Extension(auth_config));

    // Registration and the OpenAPI document stay reachable without a token.
    let public = Router::new()
        .merge(routes::auth_routes::public_router())
        .merge(openapi::router());

    let app = Router::new()
        .merge(api)
        .merge(public)
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(axum::Extension(metrics.clone()))
        .with_state(state);

    // Unauthenticated health probes.
    Router::new().merge(routes::health::router(metrics)).merge(app)
}
