use std::{future::IntoFuture, time::Duration};

use anyhow::Error as AnyhowError;
use db::DbErr;
use deployment::{Deployment, DeploymentError};
use server::{DeploymentImpl, http};
use thiserror::Error;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utils::assets::asset_dir;

const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
enum RoomeryError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error(transparent)]
    Deployment(#[from] DeploymentError),
    #[error(transparent)]
    Other(#[from] AnyhowError),
}

fn init_tracing() {
    let level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let filter = EnvFilter::try_new(format!(
        "warn,server={level},services={level},db={level},media={level},drafts={level},deployment={level},local_deployment={level},utils={level}"
    ))
    .expect("Failed to create tracing filter");
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn requested_port() -> u16 {
    let configured = std::env::var("BACKEND_PORT")
        .or_else(|_| std::env::var("PORT"))
        .ok()
        .and_then(|raw| raw.trim().parse::<u16>().ok());
    match configured {
        Some(port) => port,
        None => {
            tracing::info!("No PORT environment variable set, using port 0 for auto-assignment");
            0
        }
    }
}

/// Resolves when the first SIGINT or SIGTERM arrives.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        let mut interrupt =
            signal(SignalKind::interrupt()).expect("Failed to install SIGINT handler");
        let mut terminate =
            signal(SignalKind::terminate()).expect("Failed to install SIGTERM handler");
        tokio::select! {
            _ = interrupt.recv() => {}
            _ = terminate.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to listen for ctrl-c");
    }
}

#[tokio::main]
async fn main() -> Result<(), RoomeryError> {
    init_tracing();

    let asset_root = asset_dir();
    if !asset_root.exists() {
        std::fs::create_dir_all(&asset_root)?;
    }

    let deployment = DeploymentImpl::new().await?;
    let app = http::router(deployment);

    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let listener = TcpListener::bind((host.as_str(), requested_port())).await?;
    let port = listener.local_addr()?.port();
    tracing::info!("Server running on http://{host}:{port}");

    let (drain_tx, drain_rx) = tokio::sync::oneshot::channel();
    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, draining connections (send it again to force exit)");
        let _ = drain_tx.send(());
    })
    .into_future();
    tokio::pin!(server);

    // Runs until the listener fails or a shutdown signal starts the drain.
    tokio::select! {
        result = &mut server => {
            result?;
            return Ok(());
        }
        _ = drain_rx => {}
    }

    // Draining: open connections may finish, but a second signal or the
    // grace deadline cuts them off.
    tokio::select! {
        result = &mut server => result?,
        _ = shutdown_signal() => {
            tracing::warn!("Second shutdown signal received, exiting immediately");
            std::process::exit(130);
        }
        _ = tokio::time::sleep(SHUTDOWN_GRACE) => {
            tracing::warn!("Connections still open after {SHUTDOWN_GRACE:?}, exiting");
            std::process::exit(130);
        }
    }
    Ok(())
}
