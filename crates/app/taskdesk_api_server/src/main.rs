//! Taskdesk API server binary.

use std::sync::Arc;

use clap::Parser;
use taskdesk_api::config::ApiConfig;
use taskdesk_api::{AppState, router};
use taskdesk_core::store::{MemoryStore, PgStore};
use tracing::{info, warn};

/// CLI arguments for the API server.
#[derive(Parser, Debug)]
#[command(name = "taskdesk_api_server", about = "Taskdesk API server")]
struct Args {
    /// Port to listen on.
    #[arg(long, env = "APP_PORT", default_value_t = 8080)]
    port: u16,

    /// PostgreSQL connection URL.
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "postgres://localhost:5432/taskdesk"
    )]
    database_url: String,

    /// Maximum number of database connections in the pool.
    #[arg(long, default_value_t = 5)]
    max_connections: u32,

    /// Keep everything in process memory instead of PostgreSQL.
    #[arg(long, default_value_t = false)]
    in_memory: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,taskdesk_api=debug,taskdesk_core=debug".into()),
        )
        .init();

    let args = Args::parse();
    let config = ApiConfig::from_env()?;

    let state = if args.in_memory {
        warn!("using in-memory store; data is lost on exit");
        AppState::new(config, Arc::new(MemoryStore::new()))?
    } else {
        info!(
            max_connections = args.max_connections,
            "configuring connection pool"
        );
        let pool = taskdesk_core::db::connect(&args.database_url, args.max_connections).await?;
        taskdesk_core::db::migrate(&pool).await?;
        AppState::new(config, Arc::new(PgStore::new(pool)))?
    };

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", args.port)).await?;
    info!(addr = %listener.local_addr()?, "REST API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for ctrl-c: {e}");
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
                warn!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("shutdown signal received");
}
