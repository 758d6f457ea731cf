//! `shadowtap run` — start the forwarder.
//!
//! Loads the configuration once, binds the listen address, and serves
//! until Ctrl+C or SIGTERM.

use std::sync::Arc;

use crate::cli::RunArgs;
use crate::config::{self, model::Target, validation};
use crate::error::ShadowtapError;
use crate::logging;
use crate::server::{self, AppState};

pub async fn execute(args: RunArgs) -> Result<(), ShadowtapError> {
    let log_format = logging::resolve_format(args.pretty, args.json);
    logging::init(&args.effective_log_level(), log_format);

    let mut config = config::load(&args.file).await?;
    if let Some(listen) = args.listen {
        config.listen = Target::new(listen);
        if let Err(errors) = validation::validate(&config) {
            return Err(ShadowtapError::ConfigValidation { errors });
        }
    }

    tracing::debug!(config = ?config, "loaded config");

    let listener = tokio::net::TcpListener::bind(config.listen.bind_addr()).await?;
    let addr = listener.local_addr()?;

    tracing::info!(
        addr = %addr,
        primary = %config.proxy,
        shadows = config.forwards.len(),
        timeout_ms = config.timeout,
        "shadowtap started"
    );

    let state = Arc::new(AppState::new(config));
    let router = server::build_router(state);

    server::serve(listener, router, server::shutdown_signal()).await?;

    tracing::info!("shadowtap stopped");
    Ok(())
}
