// SPDX-FileCopyrightText: 2026 Valley of the Commons Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{Method, header};
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use votc_agent::{CompletionRelay, TranscriptExporter, WaitlistService};
use votc_config::VotcConfig;
use votc_context::StaticZone;
use votc_core::{CompletionProvider, RepositoryProvider, VotcError, WaitlistStore};

use crate::handlers;

/// Request bodies above this size are rejected before parsing.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Health state for the health and metrics endpoints.
#[derive(Clone)]
pub struct HealthState {
    /// Process start time for uptime calculation.
    pub start_time: Instant,
    /// Optional Prometheus metrics render function.
    pub prometheus_render: Option<Arc<dyn Fn() -> String + Send + Sync>>,
}

impl HealthState {
    pub fn new(prometheus_render: Option<Arc<dyn Fn() -> String + Send + Sync>>) -> Self {
        Self {
            start_time: Instant::now(),
            prometheus_render,
        }
    }
}

/// The concrete collaborators, each absent when its credentials are.
#[derive(Clone, Default)]
pub struct Adapters {
    pub completion: Option<Arc<dyn CompletionProvider>>,
    pub repository: Option<Arc<dyn RepositoryProvider>>,
    pub waitlist: Option<Arc<dyn WaitlistStore>>,
}

/// Shared state for axum request handlers. Immutable after startup.
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<CompletionRelay>,
    pub exporter: Arc<TranscriptExporter>,
    pub waitlist: Arc<WaitlistService>,
    /// Include upstream error details in chat error bodies.
    pub expose_details: bool,
    pub health: HealthState,
}

impl AppState {
    pub fn from_config(
        config: &VotcConfig,
        adapters: Adapters,
        prompts: Arc<StaticZone>,
        health: HealthState,
    ) -> Self {
        Self {
            relay: Arc::new(CompletionRelay::from_config(
                adapters.completion,
                prompts,
                config,
            )),
            exporter: Arc::new(TranscriptExporter::from_config(
                adapters.repository,
                &config.github,
            )),
            waitlist: Arc::new(WaitlistService::new(
                adapters.waitlist,
                std::time::Duration::from_secs(config.sheets.timeout_secs),
            )),
            expose_details: !config.server.is_production(),
            health,
        }
    }
}

/// Builds the router:
/// - POST /chat, /export, /waitlist (the last with open CORS)
/// - GET /health, /metrics
pub fn router(state: AppState) -> Router {
    let waitlist_cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    let waitlist_routes = Router::new()
        .route("/waitlist", post(handlers::post_waitlist))
        .layer(waitlist_cors)
        .with_state(state.clone());

    let api_routes = Router::new()
        .route("/chat", post(handlers::post_chat))
        .route("/export", post(handlers::post_export))
        .route("/health", get(handlers::get_health))
        .route("/metrics", get(handlers::get_metrics))
        .with_state(state);

    Router::new()
        .merge(api_routes)
        .merge(waitlist_routes)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
}

/// Binds the listener for `host:port`.
pub async fn bind(host: &str, port: u16) -> Result<TcpListener, VotcError> {
    let addr = format!("{host}:{port}");
    TcpListener::bind(&addr)
        .await
        .map_err(|e| VotcError::Internal(format!("failed to bind gateway to {addr}: {e}")))
}

/// Serves until `shutdown` is cancelled, then drains in-flight requests.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown: CancellationToken,
) -> Result<(), VotcError> {
    let addr = listener
        .local_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "<unknown>".into());
    tracing::info!(%addr, "gateway listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| VotcError::Internal(format!("gateway server error: {e}")))?;

    tracing::info!("gateway stopped");
    Ok(())
}
