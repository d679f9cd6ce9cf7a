use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, broadcast};
use tracing::debug;

use crate::domain::entities::fire_event::FireEvent;

/// Process-wide queue of armed fire events.
///
/// One instance owns all pending timers; the fire loop is its only
/// consumer, so every fire-time comparison happens against a single clock.
/// Arm and disarm go through one lock, which is what synchronizes user
/// cancellation with concurrent firing: an event popped for dispatch
/// before the disarm may still complete, anything still queued cannot.
pub struct TimerEngine {
    // Reverse turns BinaryHeap's max-heap into a min-heap on (fire_time, seq)
    events: Mutex<BinaryHeap<Reverse<FireEvent>>>,
    seq: AtomicU64,
    wakeup: broadcast::Sender<()>,
}

impl TimerEngine {
    pub fn new() -> Self {
        let (wakeup, _) = broadcast::channel(16);
        Self {
            events: Mutex::new(BinaryHeap::new()),
            seq: AtomicU64::new(0),
            wakeup,
        }
    }

    /// Receiver the fire loop listens on to re-evaluate its sleep when the
    /// queue changes under it.
    pub fn subscribe_wakeup(&self) -> broadcast::Receiver<()> {
        self.wakeup.subscribe()
    }

    /// Register a single-fire event. Events whose fire time is not
    /// strictly after `now` are dropped: a zero or negative delay is never
    /// armed, so nothing ever fires late. Returns whether the event was
    /// queued.
    pub async fn arm(&self, mut event: FireEvent, now: DateTime<Utc>) -> bool {
        if event.fire_time <= now {
            debug!(
                task_id = event.task_id,
                fire_time = %event.fire_time,
                "dropping already-expired event"
            );
            return false;
        }
        event.seq = self.seq.fetch_add(1, Ordering::Relaxed);
        self.events.lock().await.push(Reverse(event));
        let _ = self.wakeup.send(());
        true
    }

    /// Arm a planned batch; returns how many events were actually queued.
    pub async fn arm_all(&self, events: Vec<FireEvent>, now: DateTime<Utc>) -> usize {
        let mut armed = 0;
        for event in events {
            if self.arm(event, now).await {
                armed += 1;
            }
        }
        armed
    }

    /// Disarm every still-pending event of one task. Returns the number
    /// removed.
    pub async fn disarm_task(&self, task_id: u64) -> usize {
        let mut events = self.events.lock().await;
        let before = events.len();

        let kept: BinaryHeap<Reverse<FireEvent>> = std::mem::take(&mut *events)
            .into_iter()
            .filter(|entry| entry.0.task_id != task_id)
            .collect();
        *events = kept;

        let removed = before - events.len();
        if removed > 0 {
            let _ = self.wakeup.send(());
        }
        removed
    }

    /// Drop every pending event. Recovery runs this before re-arming so a
    /// repeated pass cannot double-arm.
    pub async fn clear(&self) {
        self.events.lock().await.clear();
        let _ = self.wakeup.send(());
    }

    /// The next event to fire, if any.
    pub async fn peek_next(&self) -> Option<FireEvent> {
        self.events.lock().await.peek().map(|entry| entry.0.clone())
    }

    /// Pop the head only if it is due at `now`. The check and the pop
    /// happen under one lock, so a concurrent disarm either wins fully or
    /// not at all.
    pub async fn pop_due(&self, now: DateTime<Utc>) -> Option<FireEvent> {
        let mut events = self.events.lock().await;
        match events.peek() {
            Some(entry) if entry.0.fire_time <= now => events.pop().map(|entry| entry.0),
            _ => None,
        }
    }

    pub async fn pending_count(&self) -> usize {
        self.events.lock().await.len()
    }

    pub async fn pending_for_task(&self, task_id: u64) -> usize {
        self.events
            .lock()
            .await
            .iter()
            .filter(|entry| entry.0.task_id == task_id)
            .count()
    }
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new()
    }
}
