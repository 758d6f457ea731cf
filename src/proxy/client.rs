//! Upstream client: one TCP connection, one request, one response.
//!
//! [`SingleUseClient`] dials the target, performs an HTTP/1 handshake,
//! writes a single [`Envelope`] and returns the response head with a
//! streaming body. There is no pool. The connection is released as soon
//! as the response body is consumed or dropped, or when any step fails.
//!
//! The [`Upstream`] trait is the seam the dispatcher talks to, so tests
//! and alternative transports can stand in for the network.

use std::time::Duration;

use async_trait::async_trait;
use axum::http::Response;
use bytes::Bytes;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;

use crate::config::model::Target;
use crate::error::ForwardError;

use super::capture::Envelope;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;
pub type UpstreamBody = UnsyncBoxBody<Bytes, BoxError>;
pub type UpstreamResponse = Response<UpstreamBody>;

// async_trait is required here because Upstream is used as Arc<dyn Upstream>
// and native async fn in traits does not support dyn dispatch.
#[async_trait]
pub trait Upstream: Send + Sync {
    /// Send `envelope` to `target` exactly once. Never retries.
    async fn forward(
        &self,
        target: &Target,
        envelope: Envelope,
    ) -> Result<UpstreamResponse, ForwardError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SingleUseClient {
    timeout: Option<Duration>,
}

impl SingleUseClient {
    /// `timeout` bounds connect + write + response head. `None` waits forever.
    #[must_use]
    pub const fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    async fn exchange(
        target: &Target,
        envelope: Envelope,
    ) -> Result<Response<Incoming>, ForwardError> {
        let stream = TcpStream::connect(target.connect_addr())
            .await
            .map_err(|source| ForwardError::Connect {
                target: target.to_string(),
                source,
            })?;

        let (mut sender, connection) =
            hyper::client::conn::http1::handshake::<_, Full<Bytes>>(TokioIo::new(stream))
                .await
                .map_err(|source| ForwardError::Handshake {
                    target: target.to_string(),
                    source,
                })?;

        let peer = target.to_string();
        tokio::spawn(async move {
            // The peer hanging up once its single response is out is the
            // expected end of a one-shot connection.
            match connection.await {
                Ok(()) => tracing::trace!(target = %peer, "upstream connection closed"),
                Err(e) if e.is_incomplete_message() || e.is_closed() => {
                    tracing::trace!(target = %peer, error = %e, "upstream hung up");
                }
                Err(e) => tracing::debug!(target = %peer, error = %e, "upstream connection error"),
            }
        });

        let request = envelope
            .into_request()
            .map_err(|source| ForwardError::Request {
                target: target.to_string(),
                source,
            })?;

        // `sender` drops on return, so the connection shuts down after this response.
        sender
            .send_request(request)
            .await
            .map_err(|source| ForwardError::Exchange {
                target: target.to_string(),
                source,
            })
    }
}

#[async_trait]
impl Upstream for SingleUseClient {
    async fn forward(
        &self,
        target: &Target,
        envelope: Envelope,
    ) -> Result<UpstreamResponse, ForwardError> {
        let exchange = Self::exchange(target, envelope);
        let response = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, exchange)
                .await
                .map_err(|_| ForwardError::Timeout {
                    target: target.to_string(),
                    timeout: limit,
                })??,
            None => exchange.await?,
        };

        Ok(response.map(|body| body.map_err(BoxError::from).boxed_unsync()))
    }
}
