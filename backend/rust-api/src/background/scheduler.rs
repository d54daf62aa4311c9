use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::config::Config;
use crate::services::{AnalyticsStore, StoreError};

const SWEEP_SCHEDULE: &str = "0 * * * * *";

/// Close sessions with no activity for `idle_timeout`.
pub async fn sweep_idle_sessions(
    store: &dyn AnalyticsStore,
    idle_timeout: Duration,
) -> Result<u64, StoreError> {
    let now = Utc::now();
    let cutoff = now.checked_sub_signed(idle_timeout).unwrap_or(DateTime::<Utc>::MIN_UTC);
    store.close_idle_sessions(cutoff).await
}

pub struct BackgroundScheduler {
    scheduler: JobScheduler,
}

impl BackgroundScheduler {
    pub async fn new(store: Arc<dyn AnalyticsStore>, config: Arc<Config>) -> anyhow::Result<Self> {
        let scheduler = JobScheduler::new().await?;
        let idle_timeout = config.session_idle_timeout();

        scheduler
            .add(Job::new_async(SWEEP_SCHEDULE, move |_uuid, _l| {
                let store = store.clone();
                Box::pin(async move {
                    match sweep_idle_sessions(store.as_ref(), idle_timeout).await {
                        Ok(0) => {}
                        Ok(closed) => info!("Closed {} idle sessions", closed),
                        Err(e) => error!("Idle session sweep failed: {:?}", e),
                    }
                })
            })?)
            .await?;

        scheduler.start().await?;
        info!("Background scheduler started");

        Ok(Self { scheduler })
    }

    pub async fn shutdown(mut self) {
        if let Err(e) = self.scheduler.shutdown().await {
            error!("Error stopping background scheduler: {:?}", e);
        }
        info!("Background scheduler stopped");
    }
}
