use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

struct ActiveTimer {
    cancel: oneshot::Sender<()>,
}

/// Per-draft one-shot deadline timers, owned entirely in memory (spec §4.5,
/// §9). Two invariants matter here:
///
///   - Setting a new timer for a draft atomically cancels and drains the
///     previous one, so a draft never has two timers racing to fire.
///   - An idempotency guard skips re-arming when `last_scheduled[draft_id]`
///     already equals the requested `base_time`, so replaying the same
///     `DraftStarted`/`PickMade` event twice (at-least-once delivery) does
///     not reschedule twice.
///
/// Firing enqueues the draft id onto `on_fire` for the worker pool to pick
/// up; the registry itself does no business logic.
pub struct TimerRegistry {
    active: Arc<DashMap<Uuid, ActiveTimer>>,
    last_scheduled: Arc<DashMap<Uuid, DateTime<Utc>>>,
    on_fire: mpsc::Sender<Uuid>,
}

impl TimerRegistry {
    pub fn new(on_fire: mpsc::Sender<Uuid>) -> Self {
        Self {
            active: Arc::new(DashMap::new()),
            last_scheduled: Arc::new(DashMap::new()),
            on_fire,
        }
    }

    /// Arms a timer so that `draft_id` is enqueued for autopick at
    /// `deadline`. `base_time` is the scheduling epoch (pick start or
    /// resume instant) used purely for the idempotency guard.
    pub fn schedule(&self, draft_id: Uuid, base_time: DateTime<Utc>, deadline: DateTime<Utc>) {
        if self.last_scheduled.get(&draft_id).map(|v| *v) == Some(base_time) {
            return;
        }

        self.cancel(draft_id);
        self.last_scheduled.insert(draft_id, base_time);

        let (cancel_tx, mut cancel_rx) = oneshot::channel();
        self.active.insert(draft_id, ActiveTimer { cancel: cancel_tx });

        let active = self.active.clone();
        let last_scheduled = self.last_scheduled.clone();
        let on_fire = self.on_fire.clone();

        tokio::spawn(async move {
            let wait = (deadline - Utc::now()).to_std().unwrap_or(Duration::ZERO);
            tokio::select! {
                _ = tokio::time::sleep(wait) => {
                    active.remove(&draft_id);
                    last_scheduled.remove(&draft_id);
                    if on_fire.send(draft_id).await.is_err() {
                        tracing::warn!(draft_id = %draft_id, "timer fired but the worker queue is gone");
                    }
                }
                _ = &mut cancel_rx => {
                    // Cancelled: the canceller already removed our map entries.
                }
            }
        });
    }

    /// Cancels any active timer for `draft_id`. A no-op if none is armed.
    /// Also called on `DraftCompleted`/`DraftCancelled` to drop per-draft
    /// state and keep the maps from growing unbounded.
    pub fn cancel(&self, draft_id: Uuid) {
        if let Some((_, timer)) = self.active.remove(&draft_id) {
            let _ = timer.cancel.send(());
        }
        self.last_scheduled.remove(&draft_id);
    }

    #[cfg(test)]
    pub fn is_active(&self, draft_id: Uuid) -> bool {
        self.active.contains_key(&draft_id)
    }
}
