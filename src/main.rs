use std::sync::Arc;

use anyhow::Context;

use saathi::app::{router, AppState};
use saathi::config::{redact_mongo_url, AppConfig};
use saathi::db::repository::{MongoPostRepository, PostRepository};
use saathi::db::trip_repository::{MongoTripRepository, TripRepository};
use saathi::speech::engine::EspeakEngine;
use saathi::speech::pool::SynthesisPool;
use tokio::signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "saathi=info,tower_http=info".into()),
        )
        .init();

    tracing::info!("Starting Saathi server...");

    let config = AppConfig::load().context("Failed to load configuration")?;

    // Connect to MongoDB
    let mongo_client = mongodb::Client::with_uri_str(&config.mongo_url)
        .await
        .context("Failed to connect to MongoDB")?;
    let mongo_db = mongo_client
        .default_database()
        .unwrap_or_else(|| mongo_client.database(&config.database));

    tracing::info!(
        "Connected to MongoDB at {} (database '{}')",
        redact_mongo_url(&config.mongo_url),
        mongo_db.name()
    );

    let post_repo: Arc<dyn PostRepository> = Arc::new(MongoPostRepository::new(&mongo_db));
    let trip_repo: Arc<dyn TripRepository> = Arc::new(MongoTripRepository::new(&mongo_db));

    post_repo
        .ensure_indexes()
        .await
        .context("Failed to create geospatial index on posts")?;

    if config.demo_mode {
        saathi::seeder::seed_demo_posts(post_repo.as_ref()).await;
    }

    // Speech engine
    let engine = EspeakEngine::new(&config.tts);
    match engine.probe() {
        Ok(version) => tracing::info!("Speech engine ready: {}", version),
        Err(e) => tracing::warn!("Speech engine unavailable, TTS requests will fail: {e}"),
    }
    let synthesizer = SynthesisPool::new(Arc::new(engine), config.tts.workers);

    tracing::info!(workers = synthesizer.workers(), "Synthesis pool initialized");

    let app_state = AppState {
        post_repo,
        trip_repo,
        synthesizer,
        default_radius: config.nearby.default_radius,
        default_batch_size: config.tts.batch_size,
    };

    let app = router(app_state);

    // Start the server
    tracing::info!("Listening on http://{}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");

        tracing::info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        tracing::info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
