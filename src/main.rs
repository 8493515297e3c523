//! Focusd - A state-managed HTTP server for Pomodoro focus timing
//!
//! This is the main entry point for the focusd application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use focusd::{
    api::create_router,
    config::Config,
    services::{DesktopNotifier, FileSessionStore, FileSettingsStore, FileSnapshotStore},
    state::AppState,
    tasks::ticker_task,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("focusd={},tower_http=info", config.log_level()))
        .init();

    info!("Starting focusd server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, work={}min, break={}min",
          config.host, config.port, config.work, config.r#break);

    let data_dir = config.resolve_data_dir();
    std::fs::create_dir_all(&data_dir)?;
    info!("Data directory: {}", data_dir.display());

    // Create application state with the file-backed collaborator stores
    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        config.work,
        config.r#break,
        Arc::new(FileSessionStore::new(&data_dir)),
        Arc::new(FileSettingsStore::new(data_dir.join("settings.json"))),
        Arc::new(FileSnapshotStore::new(data_dir.join("timer.json"))),
        Arc::new(DesktopNotifier),
    ));

    // Start the countdown ticker background task
    let ticker_state = Arc::clone(&state);
    tokio::spawn(async move {
        ticker_task(ticker_state).await;
    });

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /timer/start            - Start the countdown");
    info!("  POST /timer/pause            - Pause the countdown");
    info!("  POST /timer/reset            - Reset the current interval");
    info!("  GET  /status                 - Timer state and server status");
    info!("  GET/PUT /settings            - Work and break durations");
    info!("  GET  /sessions               - Recorded sessions");
    info!("  GET  /sessions/stats/weekly  - Last 7 days of aggregates");
    info!("  GET  /sessions/stats/by-type - Work vs break totals");
    info!("  GET  /streak                 - Consecutive-day work streak");
    info!("  GET  /health                 - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}
