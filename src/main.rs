//! Bulletin API server binary

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use boletines::config::Config;
use boletines::error::Result;
use boletines::server::{build_router, AppState};
use boletines::store::{BoletinStore, MemoryStore, RestStore};

#[derive(Parser)]
#[command(name = "boletines-server", version, about = "Bulletin tracking API server")]
struct Args {
    /// Path to the config file (defaults to ~/.boletines/config.yaml)
    #[arg(long, env = "BOLETINES_CONFIG")]
    config: Option<PathBuf>,

    /// Bind address, overriding the configured one
    #[arg(long, env = "BOLETINES_BIND")]
    bind: Option<String>,

    /// Run against the in-memory store instead of the managed datastore
    #[arg(long)]
    memory: bool,
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let args = Args::parse();

    let config = match args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let store: Arc<dyn BoletinStore> = if args.memory {
        log::warn!("using in-memory store; data is lost on shutdown");
        Arc::new(MemoryStore::new())
    } else {
        config.validate_database()?;
        Arc::new(RestStore::new(&config.database)?)
    };

    let router = build_router(AppState::new(store));

    let bind_addr = args.bind.unwrap_or_else(|| config.server.bind_addr.clone());
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    log::info!("API server listening on http://{}", bind_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            log::error!("failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => log::error!("failed to install signal handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => log::info!("received Ctrl+C signal"),
        _ = terminate => log::info!("received terminate signal"),
    }

    log::info!("shutting down gracefully...");
}
