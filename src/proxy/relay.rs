//! Relay the primary response back to the original caller.
//!
//! The primary body is read to completion before anything is written,
//! so a body that fails half-way never reaches the caller as a
//! truncated success. The upstream body, and with it the one-shot
//! connection, is released on every path out of [`relay`].

use axum::body::Body;
use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use http_body_util::BodyExt;

use super::client::UpstreamResponse;
use super::headers::strip_response_hop_by_hop;

/// Turn the primary's response (or its absence) into the caller's response.
///
/// With `relay_head` the primary's status and end-to-end headers are
/// copied; without it only the body is written, under a plain 200.
/// A missing primary response or an unreadable body becomes `502`.
///
/// `method` is the inbound request method. Answers to `HEAD` and `304`
/// responses carry no body, so their upstream `content-length` is kept
/// rather than recomputed from the empty buffer.
pub async fn relay(
    response: Option<UpstreamResponse>,
    method: &Method,
    relay_head: bool,
    correlation_id: &str,
) -> Response {
    let Some(response) = response else {
        return StatusCode::BAD_GATEWAY.into_response();
    };

    let (parts, body) = response.into_parts();
    let bytes = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            tracing::warn!(
                correlation_id = %correlation_id,
                status = parts.status.as_u16(),
                error = %e,
                "failed to read primary response body"
            );
            return StatusCode::BAD_GATEWAY.into_response();
        }
    };

    let keep_length = bytes.is_empty() && bodiless(method, parts.status);
    let mut out = Response::new(Body::from(bytes));
    if relay_head {
        let mut headers = parts.headers;
        let declared = headers.get(header::CONTENT_LENGTH).cloned();
        strip_response_hop_by_hop(&mut headers);
        if let Some(length) = declared.filter(|_| keep_length) {
            headers.insert(header::CONTENT_LENGTH, length);
        }
        *out.status_mut() = parts.status;
        *out.headers_mut() = headers;
    }
    out
}

fn bodiless(method: &Method, status: StatusCode) -> bool {
    *method == Method::HEAD || status == StatusCode::NOT_MODIFIED
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::client::{BoxError, UpstreamBody};
    use bytes::Bytes;
    use http_body_util::Full;
    use hyper::body::Frame;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    fn upstream(status: u16, body: &'static str) -> UpstreamResponse {
        with_length(status, body, None)
    }

    fn with_length(status: u16, body: &'static str, length: Option<&str>) -> UpstreamResponse {
        let body = Full::new(Bytes::from_static(body.as_bytes()))
            .map_err(|never| -> BoxError { match never {} })
            .boxed_unsync();
        let mut builder = axum::http::Response::builder()
            .status(status)
            .header("content-type", "text/plain")
            .header("x-upstream", "u1");
        builder = match length {
            Some(length) => builder.header("content-length", length),
            None => builder.header("transfer-encoding", "chunked"),
        };
        builder.body(body).unwrap()
    }

    async fn read(response: Response) -> Bytes {
        response.into_body().collect().await.unwrap().to_bytes()
    }

    #[tokio::test]
    async fn relays_body_status_and_headers() {
        let response = relay(Some(upstream(201, "ok")), &Method::GET, true, "t").await;
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()["x-upstream"], "u1");
        assert!(response.headers().get("transfer-encoding").is_none());
        assert_eq!(read(response).await, "ok");
    }

    #[tokio::test]
    async fn body_only_mode_writes_a_plain_200() {
        let response = relay(Some(upstream(404, "missing")), &Method::GET, false, "t").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get("x-upstream").is_none());
        assert_eq!(read(response).await, "missing");
    }

    #[tokio::test]
    async fn head_answer_keeps_upstream_content_length() {
        let upstream = with_length(200, "", Some("11"));
        let response = relay(Some(upstream), &Method::HEAD, true, "t").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-length"], "11");
        assert!(read(response).await.is_empty());
    }

    #[tokio::test]
    async fn not_modified_keeps_upstream_content_length() {
        let upstream = with_length(304, "", Some("42"));
        let response = relay(Some(upstream), &Method::GET, true, "t").await;
        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
        assert_eq!(response.headers()["content-length"], "42");
    }

    #[tokio::test]
    async fn stale_content_length_is_dropped_for_bodies() {
        let upstream = with_length(200, "ok", Some("99"));
        let response = relay(Some(upstream), &Method::GET, true, "t").await;
        assert!(response.headers().get("content-length").is_none());
        assert_eq!(read(response).await, "ok");
    }

    #[tokio::test]
    async fn missing_primary_is_bad_gateway() {
        let response = relay(None, &Method::GET, true, "t").await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert!(read(response).await.is_empty());
    }

    /// A body whose first read fails.
    struct Broken;

    impl hyper::body::Body for Broken {
        type Data = Bytes;
        type Error = BoxError;

        fn poll_frame(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
        ) -> Poll<Option<Result<Frame<Bytes>, BoxError>>> {
            Poll::Ready(Some(Err("upstream reset".into())))
        }
    }

    #[tokio::test]
    async fn unreadable_body_is_bad_gateway() {
        let body: UpstreamBody = Broken.boxed_unsync();
        let response = axum::http::Response::new(body);

        let relayed = relay(Some(response), &Method::GET, true, "t").await;
        assert_eq!(relayed.status(), StatusCode::BAD_GATEWAY);
        assert!(read(relayed).await.is_empty());
    }
}
