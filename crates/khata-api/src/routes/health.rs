//! # Health Probes
//!
//! Unauthenticated liveness/readiness endpoints. Readiness reports the
//! request counters so a smoke test can see traffic flow.

use axum::routing::get;
use axum::{Extension, Json, Router};
use serde::Serialize;

use crate::middleware::metrics::{ApiMetrics, MetricsSnapshot};

/// Readiness response body.
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub status: &'static str,
    pub metrics: MetricsSnapshot,
}

/// Build the health router. Mounted outside the auth middleware.
pub fn router(metrics: ApiMetrics) -> Router {
    Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness))
        .layer(Extension(metrics))
}

/// Liveness probe, 200 whenever the process runs.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe with the current request counters.
async fn readiness(Extension(metrics): Extension<ApiMetrics>) -> Json<ReadinessResponse> {
    Json(ReadinessResponse {
        status: "ready",
        metrics: metrics.snapshot(),
    })
}
