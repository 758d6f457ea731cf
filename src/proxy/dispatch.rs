//! Fan-out of one captured request to the primary and every shadow.
//!
//! Each shadow target gets its own [`Envelope`] and a detached Tokio
//! task. The dispatcher never looks at a shadow task again: its outcome
//! is only logged. The primary is forwarded on the caller's own task and
//! its response is handed back for relaying.
//!
//! Shadow tasks are not cancelled when the caller disconnects. During
//! graceful shutdown the runtime may drop them before they finish.

use std::sync::Arc;
use std::time::Instant;

use http_body_util::BodyExt;

use crate::config::model::Target;

use super::capture::Captured;
use super::client::{Upstream, UpstreamResponse};

pub struct DispatchRequest<'a> {
    pub upstream: &'a Arc<dyn Upstream>,
    pub primary: &'a Target,
    pub shadows: &'a [Target],
    pub captured: &'a Captured,
    pub correlation_id: &'a str,
}

/// Fire every shadow, then forward the primary and wait for its response head.
///
/// Returns `None` when the primary produced no response. Shadow outcomes
/// never influence the result.
#[allow(clippy::cast_possible_truncation)]
pub async fn dispatch(req: DispatchRequest<'_>) -> Option<UpstreamResponse> {
    for target in req.shadows {
        spawn_shadow(
            Arc::clone(req.upstream),
            target.clone(),
            req.captured,
            req.correlation_id.to_string(),
        );
    }

    let start = Instant::now();
    match req
        .upstream
        .forward(req.primary, req.captured.envelope())
        .await
    {
        Ok(response) => {
            tracing::info!(
                correlation_id = %req.correlation_id,
                target = %req.primary,
                status = response.status().as_u16(),
                latency_ms = start.elapsed().as_millis() as u64,
                "primary target responded"
            );
            Some(response)
        }
        Err(e) => {
            tracing::warn!(
                correlation_id = %req.correlation_id,
                target = %req.primary,
                error = %e,
                latency_ms = start.elapsed().as_millis() as u64,
                "primary target failed"
            );
            None
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn spawn_shadow(
    upstream: Arc<dyn Upstream>,
    target: Target,
    captured: &Captured,
    correlation_id: String,
) {
    let envelope = captured.envelope();

    tokio::spawn(async move {
        let start = Instant::now();
        let response = match upstream.forward(&target, envelope).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(
                    correlation_id = %correlation_id,
                    target = %target,
                    error = %e,
                    latency_ms = start.elapsed().as_millis() as u64,
                    "shadow target failed"
                );
                return;
            }
        };

        let status = response.status().as_u16();
        // Read and discard so the one-shot connection finishes cleanly.
        match response.into_body().collect().await {
            Ok(_) => tracing::info!(
                correlation_id = %correlation_id,
                target = %target,
                status,
                latency_ms = start.elapsed().as_millis() as u64,
                "shadow target responded"
            ),
            Err(e) => tracing::warn!(
                correlation_id = %correlation_id,
                target = %target,
                status,
                error = %e,
                latency_ms = start.elapsed().as_millis() as u64,
                "shadow target failed"
            ),
        }
    });
}
