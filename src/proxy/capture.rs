//! Request duplication: buffer an inbound body once, replay it many times.
//!
//! [`Captured::capture`] drains the inbound body into a single [`Bytes`]
//! buffer and freezes the request head behind an `Arc`. Every
//! [`Envelope`] handed out afterwards shares that head and buffer, so
//! the primary and each shadow see byte-identical requests no matter how
//! their reads interleave. Nothing can mutate the head after capture.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderMap, HeaderValue, Method, Request, Uri, Version};
use bytes::Bytes;
use http_body_util::{BodyExt, Full};

/// Immutable copy of an inbound request line and headers.
#[derive(Debug)]
pub struct RequestHead {
    pub method: Method,
    pub uri: Uri,
    pub version: Version,
    pub headers: HeaderMap,
}

impl RequestHead {
    #[must_use]
    pub fn host(&self) -> Option<&HeaderValue> {
        self.headers.get(http::header::HOST)
    }

    /// Declared `Content-Length`, if the client sent one.
    #[must_use]
    pub fn content_length(&self) -> Option<u64> {
        self.headers
            .get(http::header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok())
    }
}

/// The buffered body plus frozen head of one inbound request.
#[derive(Debug, Clone)]
pub struct Captured {
    head: Arc<RequestHead>,
    body: Bytes,
}

impl Captured {
    /// Read the inbound body to completion exactly once.
    ///
    /// The original body stream is consumed and dropped here; an empty
    /// body yields an empty buffer.
    pub async fn capture(req: Request<Body>) -> Result<Self, axum::Error> {
        let (parts, body) = req.into_parts();
        let body = body.collect().await?.to_bytes();

        Ok(Self::from_parts(
            RequestHead {
                method: parts.method,
                uri: parts.uri,
                version: parts.version,
                headers: parts.headers,
            },
            body,
        ))
    }

    #[must_use]
    pub fn from_parts(head: RequestHead, body: Bytes) -> Self {
        Self {
            head: Arc::new(head),
            body,
        }
    }

    #[must_use]
    pub fn head(&self) -> &RequestHead {
        &self.head
    }

    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// A fresh envelope replaying the captured body from the start.
    #[must_use]
    pub fn envelope(&self) -> Envelope {
        Envelope {
            head: Arc::clone(&self.head),
            body: self.body.clone(),
        }
    }

    /// Two independent envelopes over the same capture.
    #[must_use]
    pub fn duplicate(&self) -> (Envelope, Envelope) {
        (self.envelope(), self.envelope())
    }
}

/// One outbound copy of a captured request. Consumed by a single forward.
#[derive(Debug)]
pub struct Envelope {
    head: Arc<RequestHead>,
    body: Bytes,
}

impl Envelope {
    #[must_use]
    pub fn head(&self) -> &RequestHead {
        &self.head
    }

    /// A readable view over the shared body, positioned at byte zero.
    #[must_use]
    pub fn body_reader(&self) -> Full<Bytes> {
        Full::new(self.body.clone())
    }

    /// Build the outbound request. Method, URI, version and headers are
    /// copied verbatim, `Host` and `Content-Length` included.
    pub fn into_request(self) -> Result<Request<Full<Bytes>>, http::Error> {
        let mut builder = Request::builder()
            .method(self.head.method.clone())
            .uri(self.head.uri.clone())
            .version(self.head.version);

        if let Some(headers) = builder.headers_mut() {
            headers.clone_from(&self.head.headers);
        }

        builder.body(Full::new(self.body))
    }
}
