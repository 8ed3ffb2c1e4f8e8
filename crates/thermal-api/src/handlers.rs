//! Extender HTTP handlers.
//!
//! Rejections of individual nodes are a normal 200 outcome. Only a body
//! that can't be decoded (400) or a blown request deadline (503) produce an
//! error status, and both still carry a JSON body.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use thermal_core::extender::ExtenderFilterResult;

use crate::ApiState;
use crate::convert::{decode_request, filter_response, priority_response};

/// Error body for the prioritize call, whose success body is a bare list.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

fn prioritize_error(msg: String, status: StatusCode) -> Response {
    (status, Json(ErrorBody { error: msg })).into_response()
}

fn filter_error(msg: String, status: StatusCode) -> Response {
    (status, Json(ExtenderFilterResult::error(msg))).into_response()
}

/// POST {base_path}/{filter_verb}
pub async fn filter(State(state): State<ApiState>, body: Bytes) -> Response {
    let request = match decode_request(&body) {
        Ok(request) => request,
        Err(e) => {
            state.orchestrator.stats().record_malformed_request();
            warn!(error = %e, "rejecting filter call");
            return filter_error(e.to_string(), StatusCode::BAD_REQUEST);
        }
    };

    match state.orchestrator.decide_filter(&request).await {
        Ok(result) => Json(filter_response(result, &request)).into_response(),
        Err(e) => filter_error(e.to_string(), StatusCode::SERVICE_UNAVAILABLE),
    }
}

/// POST {base_path}/{prioritize_verb}
pub async fn prioritize(State(state): State<ApiState>, body: Bytes) -> Response {
    let request = match decode_request(&body) {
        Ok(request) => request,
        Err(e) => {
            state.orchestrator.stats().record_malformed_request();
            warn!(error = %e, "rejecting prioritize call");
            return prioritize_error(e.to_string(), StatusCode::BAD_REQUEST);
        }
    };

    match state.orchestrator.decide_priority(&request).await {
        Ok(result) => Json(priority_response(result)).into_response(),
        Err(e) => prioritize_error(e.to_string(), StatusCode::SERVICE_UNAVAILABLE),
    }
}

/// GET /healthz
pub async fn healthz() -> &'static str {
    "ok"
}

/// GET /metrics
pub async fn prometheus_metrics(State(state): State<ApiState>) -> impl IntoResponse {
    let body = thermal_decision::render_prometheus(&state.orchestrator.stats().snapshot());
    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
}
