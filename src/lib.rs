//! Shadowtap is an HTTP traffic-shadowing forwarder.
//!
//! Every inbound request is buffered once, forwarded to a single primary
//! upstream whose response goes back to the caller, and copied to any
//! number of shadow upstreams whose responses are discarded. Shadow
//! traffic never affects what the caller sees.
//!
//! # Architecture
//!
//! - [`cli`] -- Command-line argument parsing with clap derive macros.
//! - [`cmd`] -- Subcommand dispatch and execution (run, init, validate).
//! - [`config`] -- Loading and validating the `Listen` / `Proxy` /
//!   `Forwards` document.
//! - [`error`] -- Unified error types using `thiserror`.
//! - [`logging`] -- Structured tracing setup with JSON and pretty-print output.
//! - [`proxy`] -- Request capture, single-use upstream client, fan-out
//!   dispatch, response relay, and the per-request failure boundary.
//! - [`server`] -- Axum server setup, shared state, and graceful shutdown.
//!
//! # Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `yaml` | YAML config file support _(enabled by default)_ |
//! | `toml` | TOML config file support |
//! | `file-backends` | All file format backends |
//! | `full` | All features |
//!
//! JSON config files are always supported.

// Binary crate — public functions are internal, not consumed by external users.
#![allow(clippy::missing_errors_doc)]

pub mod cli;
pub mod cmd;
pub mod config;
pub mod error;
pub mod logging;
pub mod proxy;
pub mod server;
