use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::entities::task::{Schedule, Task};
use crate::domain::repositories::task_repository::{StoreError, TaskRepository};
use crate::infrastructure::repositories::json_storage;

struct Inner {
    tasks: Vec<Task>,
    next_id: u64,
}

/// TaskRepository backed by a single JSON file.
///
/// The mutex spans every load-compute-persist sequence, so concurrent
/// mutations serialize instead of losing updates. The file itself is
/// replaced atomically by `json_storage`; when a write fails the in-memory
/// state is rolled back, so the repository never holds a task the file
/// does not.
pub struct JsonTaskRepository {
    inner: Mutex<Inner>,
    path: PathBuf,
}

impl JsonTaskRepository {
    /// Open the store at `path`. A missing file starts an empty store;
    /// ids are (re)assigned in file order, so insertion order survives
    /// restarts.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let records = json_storage::load_tasks(&path)?;

        let mut tasks = Vec::with_capacity(records.len());
        let mut next_id: u64 = 1;
        for record in records {
            let schedule = record.schedule()?;
            tasks.push(Task::new(
                next_id,
                record.destination,
                record.description,
                schedule,
            ));
            next_id += 1;
        }

        Ok(Self {
            inner: Mutex::new(Inner { tasks, next_id }),
            path,
        })
    }
}

#[async_trait]
impl TaskRepository for JsonTaskRepository {
    async fn add_task(
        &self,
        destination: i64,
        description: String,
        schedule: Schedule,
    ) -> Result<Task, StoreError> {
        let mut inner = self.inner.lock().unwrap();

        let task = Task::new(inner.next_id, destination, description, schedule);
        inner.tasks.push(task.clone());

        if let Err(e) = json_storage::save_tasks(&inner.tasks, &self.path) {
            inner.tasks.pop();
            return Err(e);
        }
        inner.next_id += 1;
        Ok(task)
    }

    async fn list_tasks(&self) -> Vec<Task> {
        self.inner.lock().unwrap().tasks.clone()
    }

    async fn list_for_destination(&self, destination: i64) -> Vec<Task> {
        self.inner
            .lock()
            .unwrap()
            .tasks
            .iter()
            .filter(|task| task.destination == destination)
            .cloned()
            .collect()
    }

    async fn get_task(&self, task_id: u64) -> Option<Task> {
        self.inner
            .lock()
            .unwrap()
            .tasks
            .iter()
            .find(|task| task.id == task_id)
            .cloned()
    }

    async fn remove_task(&self, task_id: u64) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();

        let Some(pos) = inner.tasks.iter().position(|task| task.id == task_id) else {
            return Ok(false);
        };
        let removed = inner.tasks.remove(pos);

        if let Err(e) = json_storage::save_tasks(&inner.tasks, &self.path) {
            inner.tasks.insert(pos, removed);
            return Err(e);
        }
        Ok(true)
    }

    async fn remove_all_for_destination(&self, destination: i64) -> Result<Vec<Task>, StoreError> {
        let mut inner = self.inner.lock().unwrap();

        let previous = std::mem::take(&mut inner.tasks);
        let (removed, kept): (Vec<Task>, Vec<Task>) = previous
            .into_iter()
            .partition(|task| task.destination == destination);
        inner.tasks = kept;

        if let Err(e) = json_storage::save_tasks(&inner.tasks, &self.path) {
            // restore the pre-removal contents in their original order
            let mut restored = std::mem::take(&mut inner.tasks);
            restored.extend(removed);
            restored.sort_by_key(|task| task.id);
            inner.tasks = restored;
            return Err(e);
        }
        Ok(removed)
    }
}
