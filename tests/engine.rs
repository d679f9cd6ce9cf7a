use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Datelike, Duration as ChronoDuration, TimeZone, Utc, Weekday};
use tempfile::TempDir;

use nudge::application::planner;
use nudge::application::services::NotificationService;
use nudge::domain::boundaries::delivery::{DeliveryChannel, DeliveryError};
use nudge::domain::entities::fire_event::{AlertStage, FireEvent};
use nudge::domain::entities::task::{Schedule, Task};
use nudge::domain::repositories::TaskRepository;
use nudge::infrastructure::repositories::JsonTaskRepository;
use nudge::infrastructure::scheduler::{TimerEngine, start_fire_loop};

/// Test double that records every delivered notification.
#[derive(Default)]
struct RecordingChannel {
    sent: Mutex<Vec<(i64, String)>>,
}

impl RecordingChannel {
    fn sent(&self) -> Vec<(i64, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl DeliveryChannel for RecordingChannel {
    async fn send(&self, destination: i64, text: &str) -> Result<(), DeliveryError> {
        self.sent.lock().unwrap().push((destination, text.to_string()));
        Ok(())
    }
}

fn one_off_task(id: u64, description: &str, at: chrono::DateTime<Utc>) -> Task {
    Task::new(id, 500, description.to_string(), Schedule::Once(at))
}

#[tokio::test]
async fn arming_an_expired_event_is_refused() {
    let engine = TimerEngine::new();
    let now = Utc.with_ymd_and_hms(2025, 5, 15, 14, 0, 0).unwrap();
    let task = one_off_task(1, "late", now);

    let armed = engine
        .arm(FireEvent::new(&task, now - ChronoDuration::seconds(1), AlertStage::Due), now)
        .await;

    assert!(!armed);
    assert_eq!(engine.pending_count().await, 0);
}

#[tokio::test]
async fn due_events_pop_in_fire_time_order_with_fifo_ties() {
    let engine = TimerEngine::new();
    let now = Utc.with_ymd_and_hms(2025, 5, 15, 14, 0, 0).unwrap();
    let t = now + ChronoDuration::minutes(5);

    // same fire time for tasks 1..3, an earlier one for task 4
    for (id, name) in [(1, "first"), (2, "second"), (3, "third")] {
        let task = one_off_task(id, name, t);
        assert!(engine.arm(FireEvent::new(&task, t, AlertStage::Due), now).await);
    }
    let early = one_off_task(4, "early", t - ChronoDuration::minutes(1));
    engine
        .arm(
            FireEvent::new(&early, t - ChronoDuration::minutes(1), AlertStage::Due),
            now,
        )
        .await;

    let later = t + ChronoDuration::minutes(1);
    let mut order = Vec::new();
    while let Some(event) = engine.pop_due(later).await {
        order.push(event.description);
    }
    assert_eq!(order, vec!["early", "first", "second", "third"]);
}

#[tokio::test]
async fn head_event_in_the_future_is_not_popped() {
    let engine = TimerEngine::new();
    let now = Utc.with_ymd_and_hms(2025, 5, 15, 14, 0, 0).unwrap();
    let task = one_off_task(1, "patience", now + ChronoDuration::minutes(10));

    engine
        .arm(
            FireEvent::new(&task, now + ChronoDuration::minutes(10), AlertStage::Due),
            now,
        )
        .await;

    assert!(engine.pop_due(now).await.is_none());
    assert_eq!(engine.pending_count().await, 1);
}

#[tokio::test]
async fn disarming_a_task_leaves_other_tasks_armed() {
    let engine = TimerEngine::new();
    let now = Utc.with_ymd_and_hms(2025, 5, 15, 14, 0, 0).unwrap();

    let doomed = one_off_task(1, "doomed", now + ChronoDuration::hours(2));
    let survivor = one_off_task(2, "survivor", now + ChronoDuration::hours(2));
    engine.arm_all(planner::plan(&doomed, now), now).await;
    engine.arm_all(planner::plan(&survivor, now), now).await;
    assert_eq!(engine.pending_count().await, 6);

    let removed = engine.disarm_task(1).await;

    assert_eq!(removed, 3);
    assert_eq!(engine.pending_for_task(1).await, 0);
    assert_eq!(engine.pending_for_task(2).await, 3);
}

#[tokio::test]
async fn clear_empties_the_queue() {
    let engine = TimerEngine::new();
    let now = Utc.with_ymd_and_hms(2025, 5, 15, 14, 0, 0).unwrap();
    let task = one_off_task(1, "x", now + ChronoDuration::hours(2));
    engine.arm_all(planner::plan(&task, now), now).await;

    engine.clear().await;
    assert_eq!(engine.pending_count().await, 0);
}

#[tokio::test]
async fn fire_loop_delivers_and_consumes_a_one_off() {
    let dir = TempDir::new().unwrap();
    let repo: Arc<dyn TaskRepository> =
        Arc::new(JsonTaskRepository::open(dir.path().join("tasks.json")).unwrap());
    let engine = Arc::new(TimerEngine::new());
    let channel = Arc::new(RecordingChannel::default());
    let notifier = Arc::new(NotificationService::new(channel.clone()));

    let now = Utc::now();
    let at = now + ChronoDuration::milliseconds(300);
    let task = repo
        .add_task(500, "drink water".into(), Schedule::Once(at))
        .await
        .unwrap();
    // within 15 minutes of the instant only the on-time event survives
    assert_eq!(engine.arm_all(planner::plan(&task, now), now).await, 1);

    let loop_handle = start_fire_loop(engine.clone(), repo.clone(), notifier);
    tokio::time::sleep(Duration::from_millis(1200)).await;

    let sent = channel.sent();
    assert_eq!(sent, vec![(500, "Reminder: drink water".to_string())]);
    assert_eq!(engine.pending_count().await, 0);
    assert!(repo.list_tasks().await.is_empty());

    loop_handle.abort();
}

#[tokio::test]
async fn fire_loop_rearms_a_weekly_task_after_the_due_event() {
    let dir = TempDir::new().unwrap();
    let repo: Arc<dyn TaskRepository> =
        Arc::new(JsonTaskRepository::open(dir.path().join("tasks.json")).unwrap());
    let engine = Arc::new(TimerEngine::new());
    let channel = Arc::new(RecordingChannel::default());
    let notifier = Arc::new(NotificationService::new(channel.clone()));

    // pick a weekday two days out so the re-planned occurrence is always
    // far enough away for all three stages to be armed
    let two_days_out = (Utc::now().with_timezone(&chrono_tz::Europe::Moscow).date_naive()
        + ChronoDuration::days(2))
    .weekday();
    let task = repo
        .add_task(
            500,
            "stretch".into(),
            Schedule::Weekly {
                days: vec![two_days_out],
                hour: 8,
                minute: 0,
            },
        )
        .await
        .unwrap();

    // stand in for this cycle's on-time event so the rollover happens now
    let now = Utc::now();
    let due = FireEvent::new(&task, now + ChronoDuration::milliseconds(300), AlertStage::Due);
    assert!(engine.arm(due, now).await);

    let loop_handle = start_fire_loop(engine.clone(), repo.clone(), notifier);
    tokio::time::sleep(Duration::from_millis(1200)).await;

    let sent = channel.sent();
    assert_eq!(sent, vec![(500, "Reminder: stretch".to_string())]);
    // the next cycle is fully armed and the task is still stored
    assert_eq!(engine.pending_for_task(task.id).await, 3);
    assert_eq!(repo.list_tasks().await.len(), 1);

    loop_handle.abort();
}

#[tokio::test]
async fn fire_loop_skips_rollover_for_a_task_cancelled_in_flight() {
    let dir = TempDir::new().unwrap();
    let repo: Arc<dyn TaskRepository> =
        Arc::new(JsonTaskRepository::open(dir.path().join("tasks.json")).unwrap());
    let engine = Arc::new(TimerEngine::new());
    let channel = Arc::new(RecordingChannel::default());
    let notifier = Arc::new(NotificationService::new(channel.clone()));

    let task = repo
        .add_task(
            500,
            "stretch".into(),
            Schedule::Weekly {
                days: vec![Weekday::Mon],
                hour: 8,
                minute: 0,
            },
        )
        .await
        .unwrap();
    let now = Utc::now();
    let due = FireEvent::new(&task, now + ChronoDuration::milliseconds(300), AlertStage::Due);
    engine.arm(due, now).await;

    // cancellation wins the race: the task is gone before the event fires
    repo.remove_task(task.id).await.unwrap();

    let loop_handle = start_fire_loop(engine.clone(), repo.clone(), notifier);
    tokio::time::sleep(Duration::from_millis(1200)).await;

    // the in-flight notification may still go out, but nothing is re-armed
    assert_eq!(engine.pending_for_task(task.id).await, 0);
    assert!(repo.list_tasks().await.is_empty());

    loop_handle.abort();
}
