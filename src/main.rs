//! Study Clock - a persistent countdown timer and stopwatch
//! 
//! This is the main entry point for the study-clock server.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use study_clock::{
    api::create_router,
    clock::SystemClock,
    config::Config,
    state::AppState,
    store::FileStore,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("study_clock={},tower_http=info", config.log_level()))
        .init();

    info!("Starting study-clock server v{}", env!("CARGO_PKG_VERSION"));

    let store_path = config.store_path();
    info!("Configuration: host={}, port={}, store={}",
          config.host, config.port, store_path.display());

    // Restore the clock model from the persisted store
    let store = Arc::new(FileStore::open(store_path));
    let state = Arc::new(AppState::new(
        store,
        Arc::new(SystemClock),
        config.port,
        config.host.clone(),
    ));
    state.resume_ticking()?;

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;
    
    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /timer/duration            - Set countdown minutes");
    info!("  POST /timer/{{start,pause,reset}} - Control the countdown");
    info!("  POST /stopwatch/{{start,pause,reset}} - Control the stopwatch");
    info!("  GET  /history, DELETE /history?confirm=true - Session history");
    info!("  GET  /theme, PUT /theme         - Background theme");
    info!("  GET  /events                    - Live display updates (SSE)");
    info!("  GET  /status                    - Check current status");
    info!("  GET  /health                    - Health check");

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
