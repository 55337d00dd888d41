//! Interval scheduling for crawl cycles.
//!
//! The first cycle runs as soon as the scheduler starts. A tick that fires
//! while the previous cycle is still running is skipped, so cycles never
//! overlap.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::crawl::{crawl_once, CrawlContext};

/// Admits at most one cycle at a time.
#[derive(Debug, Clone, Default)]
pub(crate) struct CycleGate {
    running: Arc<Mutex<()>>,
}

impl CycleGate {
    /// Run `cycle` unless another one holds the gate. Returns whether it ran.
    pub(crate) async fn run_gated<Fut>(&self, cycle: Fut) -> bool
    where
        Fut: Future<Output = ()>,
    {
        let Ok(_guard) = self.running.try_lock() else {
            tracing::warn!("scheduler: previous cycle still running; skipping tick");
            return false;
        };
        cycle.await;
        true
    }
}

/// Builds and starts the crawl scheduler.
///
/// The returned [`JobScheduler`] must be kept alive for the lifetime of the
/// process and shut down on exit.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// the job cannot be registered, or the scheduler fails to start.
pub(crate) async fn build_scheduler(
    ctx: Arc<CrawlContext>,
    interval: Duration,
) -> Result<JobScheduler, JobSchedulerError> {
    start_scheduler(interval, move || {
        let ctx = Arc::clone(&ctx);
        async move { run_cycle_logged(&ctx).await }
    })
    .await
}

/// Register `cycle` on `interval`, start the scheduler, and kick off one
/// cycle right away. Every run goes through the same [`CycleGate`].
pub(crate) async fn start_scheduler<C, Fut>(
    interval: Duration,
    cycle: C,
) -> Result<JobScheduler, JobSchedulerError>
where
    C: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let scheduler = JobScheduler::new().await?;
    let gate = CycleGate::default();
    let cycle = Arc::new(cycle);

    let job_gate = gate.clone();
    let job_cycle = Arc::clone(&cycle);
    let job = Job::new_repeated_async(interval, move |_uuid, _lock| {
        let gate = job_gate.clone();
        let run = job_cycle();

        Box::pin(async move {
            gate.run_gated(run).await;
        })
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;

    let first = cycle();
    tokio::spawn(async move {
        gate.run_gated(first).await;
    });

    Ok(scheduler)
}

async fn run_cycle_logged(ctx: &CrawlContext) {
    let status = crawl_once(ctx).await;
    if status.is_failure() {
        tracing::warn!(%status, "scheduler: cycle ended without a snapshot");
    } else {
        tracing::info!(%status, "scheduler: cycle finished");
    }
}
