use crate::config::UploadConfig;
use crate::submission::pipeline::SubmissionPipeline;
use crate::upload::{self, stage_submission};
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::warn;

#[derive(Clone)]
pub struct AppState {
    pub readiness: Arc<AtomicBool>,
    pub metrics: PrometheusHandle,
    pub pipeline: Arc<SubmissionPipeline>,
    pub upload: UploadConfig,
}

pub fn router(state: AppState) -> Router {
    let body_limit = upload::body_limit_bytes(&state.upload);

    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/submit", post(submit_endpoint))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// One form submission: stage the multipart body, run the pipeline, map the
/// outcome to the response contract. Upload-bound violations are rejected
/// here, before the pipeline runs.
async fn submit_endpoint(
    State(state): State<AppState>,
    multipart: Multipart,
) -> impl IntoResponse {
    let (submission, uploads) = match stage_submission(multipart, &state.upload).await {
        Ok(staged) => staged,
        Err(err) => {
            warn!(%err, "submission rejected before processing");
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "ok": false, "error": err.to_string() })),
            );
        }
    };

    let outcome = state.pipeline.process(&submission, uploads).await;
    if outcome.ok {
        (
            StatusCode::OK,
            Json(json!({ "ok": true, "message": outcome.message })),
        )
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "ok": false, "error": outcome.message })),
        )
    }
}
