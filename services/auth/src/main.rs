use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use identity::MemoryUserStore;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use auth::{
    AppState, AuthService,
    config::{Config, Environment, LogConfig, LogFormat},
    routes,
};

/// Demonstration login service with JWT sessions over an in-memory user store
#[derive(Debug, Parser)]
#[command(name = "login-app", version)]
struct Cli {
    /// Port to listen on, overriding PORT
    #[arg(long)]
    port: Option<u16>,

    /// Deployment environment
    #[arg(long, value_enum, default_value_t = Environment::Development)]
    env: Environment,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::from_env(cli.env)?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    init_tracing(&config.log);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = ?cli.env,
        "Starting login-app"
    );

    // In-memory only; every restart starts from an empty store.
    let store = Arc::new(MemoryUserStore::new());
    let auth_service = AuthService::new(store, &config.auth)?;

    let app = routes::create_router(AppState { auth_service });

    let addr = format!("0.0.0.0:{}", config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("login-app listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server exited");
    Ok(())
}

fn init_tracing(log: &LogConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match log.format {
        LogFormat::Json => builder.json().with_target(false).init(),
        LogFormat::Text => builder.init(),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
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

    info!("Shutting down server...");
}
