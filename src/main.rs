//! lendauth binary entry point

use lendauth::{AppState, config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Application entry point
///
/// # Setup
/// 1. Initialize tracing/logging
/// 2. Load configuration from file and environment
/// 3. Initialize AppState
/// 4. Build Axum router
/// 5. Start background token sweep
/// 6. Start HTTP server
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Initialize tracing/logging
    let log_format =
        std::env::var("LENDAUTH__LOGGING__FORMAT").unwrap_or_else(|_| "pretty".to_string());

    if log_format == "json" {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "lendauth=info,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "lendauth=info,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }

    tracing::info!("Starting lendauth...");

    // 2. Initialize metrics
    lendauth::metrics::init_metrics();

    // 3. Load configuration
    let config = config::AppConfig::load()?;
    tracing::info!(
        host = %config.server.host,
        port = config.server.port,
        backend = ?config.storage.backend,
        "Configuration loaded"
    );

    // 4. Initialize application state
    let state = AppState::new(config.clone()).await?;

    // 5. Build Axum router
    let app = lendauth::build_router(state.clone());

    // 6. Start background tasks
    if config.auth.sweep_interval_seconds > 0 {
        spawn_token_sweep_task(state.clone());
    }

    // 7. Start HTTP server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Spawn background allow-list sweep
fn spawn_token_sweep_task(state: AppState) {
    tokio::spawn(async move {
        let interval_secs = state.config.auth.sweep_interval_seconds;
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(interval_secs));

        // Startup already pruned once; skip the immediate first tick.
        interval.tick().await;

        loop {
            interval.tick().await;

            match state.sessions.prune().await {
                Ok(removed) => tracing::debug!(removed, "Token sweep completed"),
                Err(error) => tracing::error!(%error, "Token sweep failed"),
            }
        }
    });

    tracing::info!("Token sweep task spawned");
}
