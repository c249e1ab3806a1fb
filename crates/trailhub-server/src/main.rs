//! TrailHub Server - Main entry point

use anyhow::Result;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::signal;
use tracing::{info, warn};
use trailhub_common::logging::{init_logging, LogConfig};

use trailhub_server::{
    api,
    auth::HttpAccessVerifier,
    client_info::SystemMacResolver,
    config::Config,
    db::MongoGateway,
    features::{logs::MongoLogStore, FeatureState, LogsPolicy},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Environment variables take precedence over these defaults
    let log_config = LogConfig::builder()
        .log_file_prefix("trailhub-server")
        .filter_directives("trailhub_server=debug,tower_http=debug,mongodb=info")
        .build()
        .merge_env()?;

    let _log_guard = init_logging(&log_config)?;

    info!("Starting TrailHub server");

    let config = Config::cached()?;
    info!(
        app = %config.app.name,
        reload = config.app.reload,
        access_log = config.app.access_log,
        anonymous_push = config.logs.allow_anonymous_push,
        "Configuration loaded - server will bind to {}:{}",
        config.server.host,
        config.server.port
    );
    if config.app.reload {
        info!("APP_RELOAD is set; restart the process to pick up code changes");
    }

    let gateway = MongoGateway::new(config.database.clone(), &config.app.name);
    let database = gateway.database().await?;

    let store = MongoLogStore::new(
        &database,
        &config.database.collection,
        config.database.timeout(),
    );
    match store.register_schema().await {
        Ok(()) => {},
        Err(e) if config.database.fail_fast => return Err(e.into()),
        Err(e) => warn!(error = %e, "Schema registration failed, queries will run without indexes"),
    }

    let state = FeatureState {
        store: Arc::new(store),
        verifier: Arc::new(HttpAccessVerifier::from_config(&config.auth)?),
        mac_resolver: Arc::new(SystemMacResolver::default()),
        policy: LogsPolicy::from_config(config),
    };

    let app = api::create_router(state, config);

    let listener =
        tokio::net::TcpListener::bind((config.server.host.as_str(), config.server.port)).await?;
    info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal(config.server.shutdown_timeout_secs))
        .await?;

    gateway.close().await;
    info!("Server shut down gracefully");

    Ok(())
}

/// Graceful shutdown signal handler
///
/// Once a signal arrives, in-flight requests get `timeout_secs` to finish before
/// the process exits regardless.
async fn shutdown_signal(timeout_secs: u64) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        },
    }

    info!("Waiting up to {} seconds for connections to close", timeout_secs);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(timeout_secs)).await;
        warn!("Graceful shutdown timed out, exiting");
        std::process::exit(1);
    });
}
