//! Serde data structures for the Shadowtap configuration file.
//!
//! The document has PascalCase top-level keys:
//!
//! ```json
//! { "Listen": ":8080", "Proxy": "primary:9000", "Forwards": ["shadow:9001"] }
//! ```
//!
//! [`Config`] is parsed once at startup and shared read-only behind an
//! `Arc` for the lifetime of the server.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

const fn default_true() -> bool {
    true
}

fn is_true(v: &bool) -> bool {
    *v
}

/// An upstream or listen address in `host:port` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Target(String);

impl Target {
    #[must_use]
    pub fn new(addr: impl Into<String>) -> Self {
        Self(addr.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split into host and port text. `None` when there is no `:`.
    #[must_use]
    pub fn split(&self) -> Option<(&str, &str)> {
        self.0.rsplit_once(':')
    }

    /// Address to dial. An empty host (`":9000"`) means the local machine.
    #[must_use]
    pub fn connect_addr(&self) -> String {
        self.with_default_host("127.0.0.1")
    }

    /// Address to bind. An empty host (`":8080"`) means every interface.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        self.with_default_host("0.0.0.0")
    }

    fn with_default_host(&self, host: &str) -> String {
        match self.split() {
            Some(("", port)) => format!("{host}:{port}"),
            _ => self.0.clone(),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Target {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Target {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct Config {
    pub listen: Target,

    /// Primary upstream; its response is relayed to the caller.
    pub proxy: Target,

    /// Shadow upstreams; their responses are discarded.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub forwards: Vec<Target>,

    /// Per-forward timeout in milliseconds. Absent means wait forever.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Relay the primary's status line and headers, not just its body.
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub relay_head: bool,
}

impl Config {
    #[must_use]
    pub fn new(listen: impl Into<Target>, proxy: impl Into<Target>) -> Self {
        Self {
            listen: listen.into(),
            proxy: proxy.into(),
            forwards: Vec::new(),
            timeout: None,
            relay_head: true,
        }
    }

    #[must_use]
    pub fn with_forwards<I, T>(mut self, forwards: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Target>,
    {
        self.forwards = forwards.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn timeout_duration(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_millis)
    }

    /// Primary plus every shadow.
    #[must_use]
    pub fn total_targets(&self) -> usize {
        1 + self.forwards.len()
    }
}
