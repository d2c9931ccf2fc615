use std::path::PathBuf;

use tokio::net::TcpListener;
use tokio::signal;
use users_api::config::Configuration;
use users_api::{app, initialize_state, telemetry};

#[tokio::main]
async fn main() -> Result<(), telemetry::Error> {
    dotenvy::dotenv().ok();

    let path = std::env::var("CONFIG_PATH").map(PathBuf::from).unwrap_or_default();
    let (config, fallback) = Configuration::default().path(path).read();

    let guard = telemetry::init(&config.telemetry)?;
    if let Some(err) = fallback {
        tracing::error!(error = %err, "configuration file cannot be read, using defaults");
    }

    let state = initialize_state(&config).await?;

    let listener = TcpListener::bind((config.address.as_str(), config.port)).await?;
    tracing::info!(
        name = %config.name,
        version = config.version(),
        address = ?listener.local_addr()?,
        "server started"
    );

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    guard.shutdown();

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = ?err, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(err) => {
                tracing::error!(error = ?err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
