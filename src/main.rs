//! Guardian Eye Camserver
//!
//! Main entry point for the camera fleet monitor.

use std::sync::Arc;

use guardian_eye::{
    alert_generator::AlertGenerator,
    alert_hub::AlertHub,
    blob_store::BlobStore,
    broadcast::AlertBroadcaster,
    directory::UserDirectory,
    prober::ReachabilityProber,
    state::{AppConfig, AppState},
    store::{AlertStore, CameraStore},
    thumbnail::ThumbnailCapturer,
    web_api,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "guardian_eye=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Guardian Eye camserver v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = AppConfig::default();
    tracing::info!(
        host = %config.host,
        port = config.port,
        thumbnail_dir = %config.thumbnail_dir.display(),
        degraded_env = config.degraded_env,
        "Configuration loaded"
    );

    if config.degraded_env {
        tracing::warn!("Degraded environment: probes short-circuit to online without network I/O");
    }

    // Initialize registries
    let directory = Arc::new(UserDirectory::new());
    for user in &config.seed_users {
        directory.register(user).await;
    }
    tracing::info!(users = config.seed_users.len(), "UserDirectory seeded");

    let cameras = Arc::new(CameraStore::new());
    let alerts = Arc::new(AlertStore::new());
    let blobs = Arc::new(BlobStore::new(config.thumbnail_dir.clone()).await?);
    let hub = Arc::new(AlertHub::new());

    // Initialize services
    let prober = Arc::new(ReachabilityProber::with_timeouts(
        config.degraded_env,
        config.stream_probe_timeout_secs,
        config.connect_timeout_ms,
    ));
    let thumbnails = Arc::new(ThumbnailCapturer::new(
        blobs.clone(),
        cameras.clone(),
        config.stream_probe_timeout_secs,
        config.degraded_env,
    ));
    let broadcaster = Arc::new(AlertBroadcaster::new(cameras.clone(), hub.clone()));
    let generator = Arc::new(AlertGenerator::new(
        cameras.clone(),
        alerts.clone(),
        broadcaster.clone(),
    ));

    // Create application state
    let state = AppState {
        config: config.clone(),
        directory,
        cameras,
        alerts,
        blobs,
        hub,
        prober,
        thumbnails,
        broadcaster,
        generator: generator.clone(),
    };

    // Start background alert generation
    generator.start().await;
    tracing::info!("Alert generator started");

    // Create router
    let app = web_api::create_router(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
