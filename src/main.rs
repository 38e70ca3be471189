// src/main.rs
//! GymApp auth server entry point
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gymapp_auth::auth::{create_app, spawn_token_cleanup, AuthService, MemoryStorage, SqliteStorage};
use gymapp_auth::config::AppConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "gymapp-auth")]
#[command(about = "GymApp authentication server")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port to bind, overriding the configured one
        #[arg(long)]
        port: Option<u16>,
    },
    /// Apply the database schema and exit
    Migrate,
    /// Delete expired refresh tokens once and exit
    PurgeTokens,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging()?;

    info!("Starting gymapp-auth v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load().context("invalid configuration")?;

    match args.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::Serve { port } => serve(config, port).await,
        Commands::Migrate => {
            if config.database.is_memory() {
                warn!("in-memory storage selected, nothing to migrate");
                return Ok(());
            }
            // connect applies the schema
            SqliteStorage::connect(&config.database.url, config.database.max_connections)
                .await
                .context("migration failed")?;
            info!("database schema is up to date");
            Ok(())
        }
        Commands::PurgeTokens => {
            let service = build_service(&config).await?;
            let removed = service.purge_expired_tokens().await?;
            info!(removed, "expired refresh tokens purged");
            Ok(())
        }
    }
}

async fn serve(config: AppConfig, port: Option<u16>) -> Result<()> {
    let service = Arc::new(build_service(&config).await?);

    let cleanup = spawn_token_cleanup(
        service.clone(),
        Duration::from_secs(config.auth.cleanup_interval_secs),
    );

    let addr = format!("{}:{}", config.server.host, port.unwrap_or(config.server.port));
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Listening on {}", addr);

    axum::serve(listener, create_app(service))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cleanup.abort();
    info!("Server stopped");
    Ok(())
}

async fn build_service(config: &AppConfig) -> Result<AuthService> {
    let service = if config.database.is_memory() {
        warn!("using in-memory storage, data is lost on exit");
        AuthService::with_storage(MemoryStorage::new(), config.auth.clone())?
    } else {
        let storage =
            SqliteStorage::connect(&config.database.url, config.database.max_connections)
                .await
                .context("failed to open database")?;
        AuthService::with_storage(storage, config.auth.clone())?
    };
    Ok(service)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Initialize logging
fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn,hyper=info"));

    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
