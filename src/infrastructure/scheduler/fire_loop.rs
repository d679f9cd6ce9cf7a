use std::sync::Arc;

use chrono::Utc;
use tokio::sync::broadcast;
use tokio::time::{Duration, sleep};
use tracing::{error, info};

use crate::application::planner;
use crate::application::services::notification_service::NotificationService;
use crate::domain::entities::fire_event::{AlertStage, FireEvent};
use crate::domain::repositories::task_repository::{StoreError, TaskRepository};
use crate::infrastructure::scheduler::timer_engine::TimerEngine;

/// How long the loop dozes when the queue is empty.
const IDLE_SLEEP: Duration = Duration::from_secs(300);

/// Single controller loop that consumes the timer engine. Sleeps until the
/// head event is due or a wakeup arrives, then fires events one at a time
/// in queue order.
pub fn start_fire_loop(
    engine: Arc<TimerEngine>,
    task_repo: Arc<dyn TaskRepository>,
    notifier: Arc<NotificationService>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut wakeup = engine.subscribe_wakeup();
        info!("fire loop started");

        loop {
            if let Err(e) = loop_iteration(&engine, &task_repo, &notifier, &mut wakeup).await {
                error!("fire loop iteration failed: {}", e);
                // wait before retrying so a broken store doesn't spin
                sleep(Duration::from_secs(60)).await;
            }
        }
    })
}

async fn loop_iteration(
    engine: &TimerEngine,
    task_repo: &Arc<dyn TaskRepository>,
    notifier: &NotificationService,
    wakeup: &mut broadcast::Receiver<()>,
) -> Result<(), StoreError> {
    let now = Utc::now();

    let Some(next) = engine.peek_next().await else {
        tokio::select! {
            _ = sleep(IDLE_SLEEP) => {}
            _ = wakeup.recv() => {}
        }
        return Ok(());
    };

    if next.fire_time <= now {
        if let Some(event) = engine.pop_due(now).await {
            process_due_event(engine, task_repo, notifier, event).await?;
        }
        // go straight back around, there may be more due events
        return Ok(());
    }

    let until_due = (next.fire_time - now)
        .to_std()
        .unwrap_or(Duration::from_secs(1));
    tokio::select! {
        _ = sleep(until_due) => {}
        _ = wakeup.recv() => {}
    }
    Ok(())
}

async fn process_due_event(
    engine: &TimerEngine,
    task_repo: &Arc<dyn TaskRepository>,
    notifier: &NotificationService,
    event: FireEvent,
) -> Result<(), StoreError> {
    notifier.dispatch(&event).await;

    // pre-alerts leave the task alone; the on-time event consumes a
    // one-off and rolls a weekly task over to its next cycle
    if event.stage != AlertStage::Due {
        return Ok(());
    }

    match task_repo.get_task(event.task_id).await {
        Some(task) if task.is_recurring() => {
            let now = Utc::now();
            let armed = engine.arm_all(planner::plan(&task, now), now).await;
            info!(task_id = task.id, armed, "re-armed weekly reminder for next cycle");
        }
        Some(task) => {
            task_repo.remove_task(task.id).await?;
            info!(task_id = task.id, "one-off reminder consumed");
        }
        None => {
            // cancelled while the event was in flight; nothing to do
        }
    }
    Ok(())
}
