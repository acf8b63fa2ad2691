use mm_server::{AppState, ShutdownCoordinator, build_router, logger, maintenance};

use mm_core::{RateLimiter, TtlCache};
use mm_sse::{BroadcastConfig, configure_manager, get_manager, reset_manager};

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use log::{error, info};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // .env is optional
    dotenvy::dotenv().ok();

    // Load and validate configuration
    let config = mm_config::Config::load()?;
    config.validate()?;

    // Construct log file path if configured
    let log_file_path: Option<std::path::PathBuf> = if let Some(ref filename) = config.logging.file
    {
        let config_dir = mm_config::Config::config_dir()?;
        let log_dir = config_dir.join(&config.logging.dir);
        std::fs::create_dir_all(&log_dir)?;

        Some(log_dir.join(filename))
    } else {
        None
    };

    // Initialize logger (before any other logging)
    logger::initialize(config.logging.level, log_file_path, config.logging.colored)?;

    info!("Starting mm-server v{}", env!("CARGO_PKG_VERSION"));
    config.log_summary();

    // Process-wide broadcast manager, started on first use
    configure_manager(BroadcastConfig::new(
        Duration::from_secs(config.broadcast.heartbeat_interval_secs),
        Duration::from_secs(config.broadcast.idle_timeout_secs),
    ))
    .await;
    let manager = get_manager().await;

    let rate_limiter =
        RateLimiter::new(config.rate_limit.max_requests, config.rate_limit.window_secs)?;

    let publish_cache = Arc::new(Mutex::new(TtlCache::new(
        config.cache.max_entries,
        Duration::from_secs(config.cache.ttl_secs),
    )));

    let shutdown = ShutdownCoordinator::new();

    let app_state = AppState {
        manager,
        rate_limiter,
        publish_cache,
        shutdown: shutdown.clone(),
        send_buffer_size: config.broadcast.send_buffer_size,
    };

    let maintenance_period = Duration::from_secs(config.rate_limit.window_secs);
    let maintenance = maintenance::spawn(app_state.clone(), maintenance_period);

    let app = build_router(app_state);

    let bind_addr = config.bind_addr();
    let listener = TcpListener::bind(&bind_addr).await?;
    info!("Server listening on {}", listener.local_addr()?);

    // Spawn signal handler for graceful shutdown
    let shutdown_for_signal = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received SIGINT (Ctrl+C), initiating graceful shutdown");
                shutdown_for_signal.shutdown();
            }
            Err(e) => {
                error!("Failed to listen for SIGINT: {}", e);
            }
        }
    });

    info!("Server ready to accept connections");
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.subscribe_guard().wait().await;
            // Open event streams never finish on their own; closing every
            // sink lets the server drain.
            reset_manager().await;
            info!("All event streams closed");
        })
        .await?;

    if let Err(e) = maintenance.await {
        error!("Maintenance task failed: {e}");
    }

    info!("Graceful shutdown complete");
    Ok(())
}
