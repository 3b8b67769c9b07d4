use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use uuid::Uuid;

use domain::errors::DomainResult;
use domain::models::{DraftStatus, EventPayload, EventType, OutboxRecord};
use domain::repositories::{MakePickOutcome, OutboxRepository};
use domain::services::{AutopickStrategy, DraftStoreService};

use crate::timers::TimerRegistry;
use crate::workers::TimeoutHandler;

/// Reacts to bus events by (re)scheduling or cancelling per-draft timers.
/// Every decision recomputes from current Store state rather than trusting
/// event payload fields, per spec §5's ordering guarantee: the bus may
/// reorder or redeliver, but Store state is totally ordered by
/// transaction, so handlers treat it as the source of truth.
pub struct DraftEventHandler {
    store: Arc<DraftStoreService>,
    outbox: Arc<dyn OutboxRepository>,
    timers: Arc<TimerRegistry>,
}

impl DraftEventHandler {
    pub fn new(
        store: Arc<DraftStoreService>,
        outbox: Arc<dyn OutboxRepository>,
        timers: Arc<TimerRegistry>,
    ) -> Self {
        Self { store, outbox, timers }
    }

    pub async fn handle(&self, draft_id: Uuid, payload: &EventPayload) -> DomainResult<()> {
        match payload {
            EventPayload::DraftStarted { started_at, .. } => {
                self.schedule_next_pick(draft_id, *started_at).await
            }
            EventPayload::PickMade { .. } => self.schedule_next_pick(draft_id, Utc::now()).await,
            EventPayload::DraftPaused { .. } => {
                self.timers.cancel(draft_id);
                Ok(())
            }
            EventPayload::DraftResumed { resumed_at } => {
                // Open question in spec §9, resolved: a fresh full
                // time_per_pick_sec window starting at resume, not the
                // remaining time from when the draft was paused.
                self.schedule_next_pick(draft_id, *resumed_at).await
            }
            EventPayload::DraftCompleted { .. } => {
                self.timers.cancel(draft_id);
                Ok(())
            }
        }
    }

    /// Shared scheduling sequence used by `DraftStarted`, `PickMade`, and
    /// `DraftResumed` (spec §4.5): compute the deadline from current
    /// settings, persist it, emit `PickStarted` for the next open slot, and
    /// arm the in-memory timer.
    async fn schedule_next_pick(&self, draft_id: Uuid, base_time: DateTime<Utc>) -> DomainResult<()> {
        let draft = self
            .store
            .get_draft(draft_id)
            .await?
            .ok_or_else(|| domain::errors::DomainError::NotFound(format!("draft {} not found", draft_id)))?;

        if draft.status != DraftStatus::InProgress {
            // Draft moved on (paused/completed/cancelled) between the event
            // being emitted and handled; nothing to schedule.
            return Ok(());
        }

        let deadline = base_time + ChronoDuration::seconds(draft.settings.time_per_pick_sec as i64);
        self.store.update_next_deadline(draft_id, deadline).await?;

        if let Some(next_pick) = self.store.get_next_pick_for_draft(draft_id).await? {
            let pick_started = EventPayload::PickStarted {
                pick_id: next_pick.id,
                team_id: next_pick.team_id,
                round: next_pick.round,
                pick: next_pick.pick,
                overall_pick: next_pick.overall_pick,
                started_at: base_time,
                timeout_at: deadline,
                time_per_pick_sec: draft.settings.time_per_pick_sec,
            };
            let payload_bytes = serde_json::to_vec(&pick_started).map_err(|e| {
                domain::errors::DomainError::Internal(format!("failed to serialize PickStarted: {}", e))
            })?;
            let record = OutboxRecord::new(draft_id, EventType::PickStarted, payload_bytes)?;
            self.outbox.enqueue(record).await?;
        }

        self.timers.schedule(draft_id, base_time, deadline);
        Ok(())
    }
}

/// Implements `HandleTimeout` (spec §4.5): ask the autopick strategy to
/// claim a slot and fill it, then check whether the draft is complete.
pub struct AutopickExecutor {
    store: Arc<DraftStoreService>,
    strategy: Arc<dyn AutopickStrategy>,
    timers: Arc<TimerRegistry>,
}

impl AutopickExecutor {
    pub fn new(
        store: Arc<DraftStoreService>,
        strategy: Arc<dyn AutopickStrategy>,
        timers: Arc<TimerRegistry>,
    ) -> Self {
        Self { store, strategy, timers }
    }

    async fn finish_or_await_next_pick(&self, draft_id: Uuid) -> DomainResult<()> {
        let remaining = self.store.count_remaining_picks(draft_id).await?;
        if remaining == 0 {
            // Transitioning to Completed emits DraftCompleted through the
            // outbox and clears next_deadline as a side effect (db layer).
            self.store
                .update_draft_status(draft_id, DraftStatus::Completed, None)
                .await?;
            self.timers.cancel(draft_id);
        }
        // Otherwise: MakePick already recorded PickMade, which will
        // re-enter DraftEventHandler::schedule_next_pick and rearm.
        Ok(())
    }
}

#[async_trait]
impl TimeoutHandler for AutopickExecutor {
    async fn handle_timeout(&self, draft_id: Uuid) -> DomainResult<()> {
        let claim = match self.strategy.select_claim(draft_id).await? {
            Some(claim) => claim,
            None => {
                // No players or no open slot: not an error (spec §4.5
                // step 1/§7). If picks remain, leave the timer's absence
                // alone — the draft will need an operator or a later
                // reconciliation pass; if none remain, complete it.
                return self.finish_or_await_next_pick(draft_id).await;
            }
        };

        match self.store.make_pick(claim.pick_id, claim.player_id).await? {
            MakePickOutcome::Applied(_) => self.finish_or_await_next_pick(draft_id).await,
            // Lost the race to another claimant/worker; benign, per spec §4.5
            // step 2 and §7 Conflict/Race. The winner's PickMade reschedules.
            MakePickOutcome::Lost => Ok(()),
        }
    }
}
