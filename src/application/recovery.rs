use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::application::planner;
use crate::domain::repositories::task_repository::{StoreError, TaskRepository};
use crate::infrastructure::scheduler::timer_engine::TimerEngine;

/// What a recovery pass did, for the startup log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecoveryReport {
    /// Tasks whose events were re-armed.
    pub tasks: usize,
    /// Individual events armed.
    pub armed: usize,
    /// Stale one-off tasks purged from the store.
    pub purged: usize,
}

/// Rebuild the timer queue from the task store.
///
/// Run once at process start, before the engine takes requests. The queue
/// is cleared first, so a second pass with no firings in between re-arms
/// the exact same set of events instead of doubling it.
pub async fn recover(
    task_repo: &Arc<dyn TaskRepository>,
    engine: &TimerEngine,
    now: DateTime<Utc>,
) -> Result<RecoveryReport, StoreError> {
    engine.clear().await;

    let mut report = RecoveryReport::default();
    for task in task_repo.list_tasks().await {
        let events = planner::plan(&task, now);
        if events.is_empty() {
            // one-off whose whole alert window has passed: purge it so
            // dead tasks don't pile up in the store
            task_repo.remove_task(task.id).await?;
            report.purged += 1;
            info!(task_id = task.id, description = %task.description, "purged stale reminder");
            continue;
        }
        report.armed += engine.arm_all(events, now).await;
        report.tasks += 1;
    }

    info!(
        tasks = report.tasks,
        armed = report.armed,
        purged = report.purged,
        "recovery finished"
    );
    Ok(report)
}
