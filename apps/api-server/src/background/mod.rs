//! Background maintenance jobs.

mod scheduler;

pub use scheduler::{Scheduler, SchedulerConfig};

use std::sync::Arc;

use tokio_cron_scheduler::JobSchedulerError;

use crate::state::AppState;

/// Jobs that run alongside the HTTP server.
pub struct Maintenance {
    pub state: AppState,
    #[cfg(feature = "rate-limit")]
    pub limiter: Arc<quill_infra::KeyedRateLimiter>,
}

/// Register and start the maintenance jobs.
///
/// - orphan sweep: removes likes, comments and tag links whose post is gone
/// - limiter pruning: drops idle per-client buckets
pub async fn start(
    config: SchedulerConfig,
    jobs: Maintenance,
) -> Result<Scheduler, JobSchedulerError> {
    let scheduler = Scheduler::new(config).await?;
    let schedule = scheduler.config().orphan_sweep_cron.clone();

    let posts = Arc::new(jobs.state.posts);
    scheduler
        .add_cron("orphan-sweep", &schedule, move || {
            let posts = posts.clone();
            async move {
                if let Err(e) = posts.sweep_orphans().await {
                    tracing::error!(error = %e, "Orphan sweep failed");
                }
            }
        })
        .await?;

    #[cfg(feature = "rate-limit")]
    {
        let limiter = jobs.limiter;
        scheduler
            .add_cron("rate-limit-prune", "0 */10 * * * *", move || {
                let limiter = limiter.clone();
                async move {
                    let remaining = limiter.prune();
                    tracing::debug!(remaining, "Pruned idle rate limit buckets");
                }
            })
            .await?;
    }

    scheduler.start().await?;
    Ok(scheduler)
}
