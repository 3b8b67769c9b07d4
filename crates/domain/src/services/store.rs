use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::errors::DomainResult;
use crate::models::{Draft, DraftPick, DraftSettings, DraftStatus, DraftType};
use crate::repositories::{ClaimedSlot, DraftRepository, MakePickOutcome};

/// Thin façade over `DraftRepository` exposing the Store's operations as a
/// single service, the way RPC handlers or the Orchestrator consume it.
/// Validation that does not require persistence (settings shape, FSM
/// transitions) lives on the domain models; this service's job is wiring
/// those checks to the repository and nothing more.
pub struct DraftStoreService {
    repo: Arc<dyn DraftRepository>,
}

impl DraftStoreService {
    pub fn new(repo: Arc<dyn DraftRepository>) -> Self {
        Self { repo }
    }

    pub async fn create_draft(
        &self,
        league_id: Uuid,
        draft_type: DraftType,
        settings: DraftSettings,
    ) -> DomainResult<Draft> {
        let draft = Draft::new(league_id, draft_type, settings)?;
        self.repo.create(&draft).await
    }

    pub async fn update_draft_settings(
        &self,
        id: Uuid,
        settings: DraftSettings,
        scheduled_at: Option<DateTime<Utc>>,
    ) -> DomainResult<Draft> {
        self.repo.update_settings(id, settings, scheduled_at).await
    }

    pub async fn prepopulate_draft_picks(&self, id: Uuid) -> DomainResult<Vec<DraftPick>> {
        self.repo.prepopulate_picks(id).await
    }

    pub async fn update_draft_status(
        &self,
        id: Uuid,
        new_status: DraftStatus,
        reason: Option<String>,
    ) -> DomainResult<Draft> {
        self.repo.update_status(id, new_status, reason).await
    }

    pub async fn delete_draft(&self, id: Uuid) -> DomainResult<()> {
        self.repo.delete(id).await
    }

    pub async fn claim_next_slot(&self, draft_id: Uuid) -> DomainResult<Option<ClaimedSlot>> {
        self.repo.claim_next_slot(draft_id).await
    }

    pub async fn make_pick(&self, pick_id: Uuid, player_id: Uuid) -> DomainResult<MakePickOutcome> {
        self.repo.make_pick(pick_id, player_id).await
    }

    pub async fn count_remaining_picks(&self, draft_id: Uuid) -> DomainResult<i64> {
        self.repo.count_remaining_picks(draft_id).await
    }

    pub async fn get_next_pick_for_draft(&self, draft_id: Uuid) -> DomainResult<Option<DraftPick>> {
        self.repo.get_next_pick_for_draft(draft_id).await
    }

    pub async fn list_available_players(&self, draft_id: Uuid) -> DomainResult<Vec<Uuid>> {
        self.repo.list_available_players(draft_id).await
    }

    pub async fn update_next_deadline(&self, draft_id: Uuid, at: DateTime<Utc>) -> DomainResult<()> {
        self.repo.update_next_deadline(draft_id, at).await
    }

    pub async fn clear_next_deadline(&self, draft_id: Uuid) -> DomainResult<()> {
        self.repo.clear_next_deadline(draft_id).await
    }

    pub async fn fetch_next_deadline(&self) -> DomainResult<Option<DateTime<Utc>>> {
        self.repo.fetch_next_deadline().await
    }

    pub async fn fetch_drafts_due_for_pick(&self, limit: i64) -> DomainResult<Vec<Uuid>> {
        self.repo.fetch_drafts_due_for_pick(limit).await
    }

    pub async fn get_draft(&self, id: Uuid) -> DomainResult<Option<Draft>> {
        self.repo.find_by_id(id).await
    }
}
