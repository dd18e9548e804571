//! Agri greeter service.
//!
//! - `GET /`        : greeting
//! - `GET /metrics` : request counters and latency histograms
//!
//! Config is optional: `agri-greeter.yaml` in the working directory,
//! otherwise listen on `0.0.0.0:8080` with default buckets.

use tracing_subscriber::{fmt, EnvFilter};

use agri_core::error::Result;
use agri_greeter::{app_state, config, router};

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cfg = config::load_or_default(config::DEFAULT_CONFIG_PATH)?;
    let state = app_state::AppState::new(cfg)?;
    let listen = state.cfg().server.listen_addr()?;
    let app = router::build_router(state);

    tracing::info!(%listen, "agri-greeter starting");
    let listener = tokio::net::TcpListener::bind(listen).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("signal received, starting graceful shutdown");
}
