use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::DomainResult;
use crate::models::{Draft, DraftPick, DraftSettings, DraftStatus};

/// Result of `ClaimNextSlot`: the slot reserved for the caller, or nothing if
/// every slot is already filled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimedSlot {
    pub pick_id: Uuid,
    pub team_id: Uuid,
    pub overall_pick: i32,
}

/// Result of `MakePick`. `Lost` means another claimant already filled the
/// slot; callers must treat this as a benign lost race, not an error.
#[derive(Debug, Clone)]
pub enum MakePickOutcome {
    Applied(DraftPick),
    Lost,
}

/// Authoritative persistence for drafts and pick slots. Every operation is
/// atomic; operations that produce a domain event write the matching
/// `OutboxRecord` in the same transaction as the state mutation.
#[async_trait]
pub trait DraftRepository: Send + Sync {
    async fn create(&self, draft: &Draft) -> DomainResult<Draft>;

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Draft>>;

    async fn find_by_status(&self, status: DraftStatus) -> DomainResult<Vec<Draft>>;

    /// Permitted only while `NotStarted`; `scheduled_at` must be in the future.
    async fn update_settings(
        &self,
        id: Uuid,
        settings: DraftSettings,
        scheduled_at: Option<DateTime<Utc>>,
    ) -> DomainResult<Draft>;

    /// Permitted only while `NotStarted` and with no existing picks.
    async fn prepopulate_picks(&self, id: Uuid) -> DomainResult<Vec<DraftPick>>;

    /// Enforces the Draft FSM; stamps `started_at`/`completed_at` as needed
    /// and records the matching lifecycle event in the outbox. `reason` is
    /// only meaningful for a transition into `Paused`.
    async fn update_status(
        &self,
        id: Uuid,
        new_status: DraftStatus,
        reason: Option<String>,
    ) -> DomainResult<Draft>;

    /// Permitted only while `NotStarted`.
    async fn delete(&self, id: Uuid) -> DomainResult<()>;

    /// Atomically reserves the slot with the smallest `overall_pick` whose
    /// `player_id` is still null, skipping rows held by other claimants.
    async fn claim_next_slot(&self, draft_id: Uuid) -> DomainResult<Option<ClaimedSlot>>;

    /// Conditional update: fills `player_id`/`picked_at` only if the slot is
    /// still open, and records `PickMade` in the outbox when it succeeds.
    async fn make_pick(&self, pick_id: Uuid, player_id: Uuid) -> DomainResult<MakePickOutcome>;

    async fn count_remaining_picks(&self, draft_id: Uuid) -> DomainResult<i64>;

    async fn get_next_pick_for_draft(&self, draft_id: Uuid) -> DomainResult<Option<DraftPick>>;

    /// Player ids not yet taken in this draft, stable-ordered. The Store
    /// delegates the full candidate universe to an injected `PlayerPool`
    /// collaborator and subtracts already-taken ids.
    async fn list_available_players(&self, draft_id: Uuid) -> DomainResult<Vec<Uuid>>;

    async fn update_next_deadline(&self, draft_id: Uuid, at: DateTime<Utc>) -> DomainResult<()>;

    async fn clear_next_deadline(&self, draft_id: Uuid) -> DomainResult<()>;

    /// The single soonest `next_deadline` across all `InProgress` drafts.
    async fn fetch_next_deadline(&self) -> DomainResult<Option<DateTime<Utc>>>;

    /// Up to `limit` `InProgress` drafts whose deadline has passed, locked
    /// with skip-locked semantics so parallel consumers partition the work.
    async fn fetch_drafts_due_for_pick(&self, limit: i64) -> DomainResult<Vec<Uuid>>;
}

/// Narrow external collaborator standing in for the player/league/team
/// catalogs the core does not own. Satisfies `ListAvailablePlayers`'s need
/// for a candidate universe without the Store depending on a catalog schema.
#[async_trait]
pub trait PlayerPool: Send + Sync {
    async fn all_player_ids(&self) -> DomainResult<Vec<Uuid>>;
}
