use std::sync::Arc;

use tokio::signal;
use tracing::{error, info};

use smartedu_analytics_api::{
    background::scheduler::BackgroundScheduler,
    build_router, database,
    services::{AnalyticsStore, MemoryStore, PgStore},
    AppState, Config,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "smartedu_analytics_api=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting Smart-Edu analytics API...");

    let config = Arc::new(Config::from_env()?);
    info!(
        "Configuration loaded (min session duration {}ms)",
        config.min_session_duration_ms
    );

    let store: Arc<dyn AnalyticsStore> = match &config.database_url {
        Some(url) => {
            let pool = database::new_pool(url).await?;
            info!("Database connection pool created");
            Arc::new(PgStore::new(pool))
        }
        None => {
            info!("DATABASE_URL not set, keeping analytics in memory");
            Arc::new(MemoryStore::new())
        }
    };

    let scheduler = BackgroundScheduler::new(store.clone(), config.clone()).await?;

    let app = build_router(AppState::new(store, config.clone()));

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);

    tokio::select! {
        result = axum::serve(listener, app) => {
            if let Err(e) = result {
                error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutting down gracefully...");
        }
    }
    scheduler.shutdown().await;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
