//! Cron scheduling for monitor tasks.
//!
//! Each task gets its own recurring job driven by the task's `cron`
//! expression. Schedules are evaluated in UTC. A tick that fires while the
//! previous pass of the same task is still running is skipped, so one task
//! never has two passes in flight.

use std::sync::Arc;

use pickwatch_core::MonitorTask;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::monitor::Monitor;

/// Builds and starts the scheduler with one job per task.
///
/// The returned handle must be kept alive; dropping it stops all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if a cron expression does not parse, a job
/// cannot be registered, or the scheduler fails to start.
pub(crate) async fn build_scheduler(
    tasks: Vec<MonitorTask>,
    monitor: Arc<Monitor>,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    for task in tasks {
        register_task_job(&scheduler, Arc::new(task), Arc::clone(&monitor)).await?;
    }

    scheduler.start().await?;
    Ok(scheduler)
}

async fn register_task_job(
    scheduler: &JobScheduler,
    task: Arc<MonitorTask>,
    monitor: Arc<Monitor>,
) -> Result<(), JobSchedulerError> {
    let label = task.label();
    let cron = task.cron.clone();
    let in_flight = Arc::new(Mutex::new(()));

    let job = Job::new_async(cron.as_str(), move |_uuid, _lock| {
        let task = Arc::clone(&task);
        let monitor = Arc::clone(&monitor);
        let in_flight = Arc::clone(&in_flight);

        Box::pin(async move {
            run_exclusive(&in_flight, &monitor, &task).await;
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(task = %label, cron = %cron, "scheduler: registered monitor job");
    Ok(())
}

/// Run one pass unless the previous pass guarded by `in_flight` is still
/// running. Returns whether a pass ran.
async fn run_exclusive(in_flight: &Mutex<()>, monitor: &Monitor, task: &MonitorTask) -> bool {
    let Ok(_pass) = in_flight.try_lock() else {
        tracing::warn!(
            task = %task.label(),
            "scheduler: previous monitor pass still running; skipping this tick"
        );
        return false;
    };

    tracing::info!(task = %task.label(), "scheduler: starting monitor pass");
    monitor.run_task(task).await;
    tracing::info!(task = %task.label(), "scheduler: monitor pass complete");
    true
}
