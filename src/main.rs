use std::sync::Arc;

use anyhow::Context as _;
use chrono::Utc;
use dotenvy::dotenv;
use tracing::info;

use nudge::application::recovery;
use nudge::application::services::NotificationService;
use nudge::domain::repositories::TaskRepository;
use nudge::infrastructure::delivery::LogDeliveryChannel;
use nudge::infrastructure::repositories::JsonTaskRepository;
use nudge::infrastructure::scheduler::{TimerEngine, start_fire_loop};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    nudge::utils::setup_logging();
    dotenv().ok();

    let store_path = std::env::var("TASKS_FILE").unwrap_or_else(|_| "tasks.json".to_string());
    let task_repo: Arc<dyn TaskRepository> = Arc::new(
        JsonTaskRepository::open(&store_path)
            .with_context(|| format!("opening task store at {}", store_path))?,
    );

    let engine = Arc::new(TimerEngine::new());
    let notifier = Arc::new(NotificationService::new(Arc::new(LogDeliveryChannel)));

    // re-arm persisted reminders before anything else runs
    recovery::recover(&task_repo, &engine, Utc::now())
        .await
        .context("recovering persisted reminders")?;

    let _fire_loop = start_fire_loop(engine.clone(), task_repo.clone(), notifier);

    info!(store = %store_path, "reminder engine running");
    tokio::signal::ctrl_c()
        .await
        .context("waiting for shutdown signal")?;
    info!("shutting down");
    Ok(())
}
