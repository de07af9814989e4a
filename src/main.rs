use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use buku_server::{
    api,
    auth::HeaderIdentityResolver,
    config::Config,
    cover_store::{CoverStore, LocalCoverStore},
    storage::Database,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; the environment may already be populated
    dotenvy::dotenv().ok();

    // Initialize tracing
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());

    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    match log_format.to_lowercase().as_str() {
        "gcp" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_stackdriver::layer())
                .init();
        }
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_span_list(false),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    info!(version = env!("CARGO_PKG_VERSION"), "buku-server starting");

    // Load configuration
    let config = Config::load()?;
    info!(auth_mode = ?config.auth_mode, "Loaded configuration");

    // Initialize database
    let db = Database::open(&config.storage.data_dir)?;
    info!("Database opened at: {}", config.storage.data_dir);

    // Initialize cover store
    let cover_store: Arc<dyn CoverStore> =
        Arc::new(LocalCoverStore::new(&config.storage.covers_dir)?);
    info!("Storing covers at: {}", config.storage.covers_dir);

    if !config.storage.default_cover.exists() {
        tracing::warn!(
            path = %config.storage.default_cover.display(),
            "Default cover not found; cover fallback will answer 404"
        );
    }

    // Create shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        cover_store,
        identity_resolver: Arc::new(HeaderIdentityResolver),
    });

    // Build and start the HTTP server
    let app = api::create_router(Arc::clone(&state));
    let listener = tokio::net::TcpListener::bind(&config.server.bind_address).await?;
    info!("Listening on: {}", config.server.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
}
