//! Core HTTP shadowing handler.
//!
//! [`forward_handler`] is the Axum fallback that receives every request.
//! Each request runs capture ([`capture`]), fan-out ([`dispatch`]) and
//! relay ([`relay`]) inside its own spawned task. A panic anywhere in
//! that task is caught at the join point, logged, and answered with
//! `502`, leaving the listener and other requests untouched.

pub mod capture;
pub mod client;
pub mod dispatch;
pub mod headers;
pub mod relay;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::server::AppState;
use capture::Captured;
use dispatch::DispatchRequest;

pub async fn forward_handler(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    req: Request,
) -> Response {
    let correlation_id = req
        .headers()
        .get("x-correlation-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| uuid::Uuid::new_v4().to_string(), String::from);

    tracing::info!(
        correlation_id = %correlation_id,
        client = %addr,
        method = %req.method(),
        uri = %req.uri(),
        shadows = state.config.forwards.len(),
        "request received"
    );

    let task = tokio::spawn(handle(state, req, correlation_id.clone()));
    match task.await {
        Ok(response) => response,
        Err(join_err) => {
            tracing::error!(
                correlation_id = %correlation_id,
                error = %join_err,
                "request handler panicked"
            );
            StatusCode::BAD_GATEWAY.into_response()
        }
    }
}

/// Capture, fan out, relay. Runs as one unit of work per request.
pub async fn handle(state: Arc<AppState>, req: Request, correlation_id: String) -> Response {
    let captured = match Captured::capture(req).await {
        Ok(captured) => captured,
        Err(e) => {
            tracing::warn!(
                correlation_id = %correlation_id,
                error = %e,
                "failed to read request body"
            );
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    let primary = dispatch::dispatch(DispatchRequest {
        upstream: &state.upstream,
        primary: &state.config.proxy,
        shadows: &state.config.forwards,
        captured: &captured,
        correlation_id: &correlation_id,
    })
    .await;

    relay::relay(
        primary,
        &captured.head().method,
        state.config.relay_head,
        &correlation_id,
    )
    .await
}
