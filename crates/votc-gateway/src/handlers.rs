// SPDX-FileCopyrightText: 2026 Valley of the Commons Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway.
//!
//! Bodies are taken as raw JSON and parsed by the agent-side request types,
//! so a malformed body and a missing field produce the same 400.

use axum::Json;
use axum::body::Body;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderName, StatusCode, header};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use votc_agent::{
    ExportReceipt, ExportRequest, INVALID_REQUEST_MESSAGE, STREAM_TERMINATOR_HEADER,
    STREAM_TERMINATOR_NAME, SignupRequest, WAITLIST_SUCCESS_MESSAGE,
};

use crate::error::ApiError;
use crate::server::AppState;

/// Response body for POST /export.
#[derive(Debug, Serialize)]
pub struct ExportResponse {
    pub success: bool,
    #[serde(flatten)]
    pub receipt: ExportReceipt,
}

/// Response body for POST /waitlist.
#[derive(Debug, Serialize)]
pub struct WaitlistResponse {
    pub success: bool,
    pub message: String,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// POST /chat
///
/// Streams the game master's reply as chunked `text/plain`, terminated by
/// U+0004 on a clean end.
pub async fn post_chat(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let Ok(Json(body)) = body else {
        return ApiError::bad_request(INVALID_REQUEST_MESSAGE).into_response();
    };

    match state.relay.start(body.get("messages")).await {
        Ok(stream) => {
            debug!(
                request_id = stream.request_id(),
                prompt = %stream.prompt_kind(),
                "streaming chat response"
            );
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
                    (header::CACHE_CONTROL, "no-cache"),
                    (
                        HeaderName::from_static(STREAM_TERMINATOR_HEADER),
                        STREAM_TERMINATOR_NAME,
                    ),
                ],
                Body::from_stream(stream),
            )
                .into_response()
        }
        Err(e) => ApiError::chat(&e, state.expose_details).into_response(),
    }
}

/// POST /export
pub async fn post_export(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let Ok(Json(body)) = body else {
        return ApiError::bad_request(INVALID_REQUEST_MESSAGE).into_response();
    };

    let result = match ExportRequest::parse(&body) {
        Ok(request) => state.exporter.export(request, Utc::now()).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(receipt) => Json(ExportResponse {
            success: true,
            receipt,
        })
        .into_response(),
        Err(e) => ApiError::export(&e).into_response(),
    }
}

/// POST /waitlist
pub async fn post_waitlist(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let body = body.map(|Json(v)| v).unwrap_or(Value::Null);

    let result = match SignupRequest::parse(&body) {
        Ok(request) => state.waitlist.join(request, Utc::now()).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => Json(WaitlistResponse {
            success: true,
            message: WAITLIST_SUCCESS_MESSAGE.to_string(),
        })
        .into_response(),
        Err(e) => ApiError::waitlist(&e).into_response(),
    }
}

/// GET /health
pub async fn get_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.health.start_time.elapsed().as_secs(),
    })
}

/// GET /metrics
///
/// Prometheus text exposition; 404 when metrics are disabled.
pub async fn get_metrics(State(state): State<AppState>) -> Response {
    match state.health.prometheus_render.as_ref() {
        Some(render) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            render(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_response_flattens_receipt() {
        let resp = ExportResponse {
            success: true,
            receipt: ExportReceipt {
                url: "https://github.com/understories/votc/blob/main/a.md".into(),
                filename: "a.md".into(),
                path: "a.md".into(),
            },
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["filename"], "a.md");
        assert!(json.get("receipt").is_none());
    }

    #[test]
    fn health_response_serializes() {
        let resp = HealthResponse {
            status: "ok".to_string(),
            version: "0.1.0".to_string(),
            uptime_secs: 42,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"status\":\"ok\""));
        assert!(json.contains("\"uptime_secs\":42"));
    }
}
