use async_trait::async_trait;
use rand::seq::IndexedRandom;
use std::sync::Arc;
use uuid::Uuid;

use crate::errors::DomainResult;
use crate::repositories::DraftRepository;

/// The quadruple an autopick strategy hands back to the Orchestrator:
/// the claimed slot plus the player chosen to fill it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedClaim {
    pub pick_id: Uuid,
    pub team_id: Uuid,
    pub player_id: Uuid,
    pub overall_pick: i32,
}

/// A single-method capability: given a due draft, pick a player for the
/// next open slot. Deliberately narrow — this is the only point at which
/// autopick "intelligence" enters the core, and the core ships only the
/// uniform-random default below. Alternate strategies plug in as values of
/// this trait; they are not part of this core.
#[async_trait]
pub trait AutopickStrategy: Send + Sync {
    async fn select_claim(&self, draft_id: Uuid) -> DomainResult<Option<SelectedClaim>>;
}

/// Default strategy: claim the next open slot, then fill it with a
/// uniformly random player from those still available. Returns `None` when
/// there are no available players or no open slot — the Orchestrator treats
/// that as "nothing to do this tick", not an error.
pub struct UniformRandomStrategy {
    draft_repo: Arc<dyn DraftRepository>,
}

impl UniformRandomStrategy {
    pub fn new(draft_repo: Arc<dyn DraftRepository>) -> Self {
        Self { draft_repo }
    }
}

#[async_trait]
impl AutopickStrategy for UniformRandomStrategy {
    async fn select_claim(&self, draft_id: Uuid) -> DomainResult<Option<SelectedClaim>> {
        let available = self.draft_repo.list_available_players(draft_id).await?;
        if available.is_empty() {
            return Ok(None);
        }

        let claimed = match self.draft_repo.claim_next_slot(draft_id).await? {
            Some(claim) => claim,
            None => return Ok(None),
        };

        let player_id = *available
            .choose(&mut rand::rng())
            .expect("checked non-empty above");

        Ok(Some(SelectedClaim {
            pick_id: claimed.pick_id,
            team_id: claimed.team_id,
            player_id,
            overall_pick: claimed.overall_pick,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::DomainError;
    use crate::models::{Draft, DraftPick, DraftSettings, DraftStatus};
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use mockall::mock;

    mock! {
        Repo {}

        #[async_trait]
        impl DraftRepository for Repo {
            async fn create(&self, draft: &Draft) -> DomainResult<Draft>;
            async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Draft>>;
            async fn find_by_status(&self, status: DraftStatus) -> DomainResult<Vec<Draft>>;
            async fn update_settings(&self, id: Uuid, settings: DraftSettings, scheduled_at: Option<DateTime<Utc>>) -> DomainResult<Draft>;
            async fn prepopulate_picks(&self, id: Uuid) -> DomainResult<Vec<DraftPick>>;
            async fn update_status(&self, id: Uuid, new_status: DraftStatus, reason: Option<String>) -> DomainResult<Draft>;
            async fn delete(&self, id: Uuid) -> DomainResult<()>;
            async fn claim_next_slot(&self, draft_id: Uuid) -> DomainResult<Option<crate::repositories::ClaimedSlot>>;
            async fn make_pick(&self, pick_id: Uuid, player_id: Uuid) -> DomainResult<crate::repositories::MakePickOutcome>;
            async fn count_remaining_picks(&self, draft_id: Uuid) -> DomainResult<i64>;
            async fn get_next_pick_for_draft(&self, draft_id: Uuid) -> DomainResult<Option<DraftPick>>;
            async fn list_available_players(&self, draft_id: Uuid) -> DomainResult<Vec<Uuid>>;
            async fn update_next_deadline(&self, draft_id: Uuid, at: DateTime<Utc>) -> DomainResult<()>;
            async fn clear_next_deadline(&self, draft_id: Uuid) -> DomainResult<()>;
            async fn fetch_next_deadline(&self) -> DomainResult<Option<DateTime<Utc>>>;
            async fn fetch_drafts_due_for_pick(&self, limit: i64) -> DomainResult<Vec<Uuid>>;
        }
    }

    #[tokio::test]
    async fn returns_none_when_no_players_available() {
        let mut repo = MockRepo::new();
        repo.expect_list_available_players()
            .returning(|_| Ok(Vec::new()));
        let strategy = UniformRandomStrategy::new(Arc::new(repo));
        let result = strategy.select_claim(Uuid::new_v4()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn returns_none_when_no_slot_to_claim() {
        let player_id = Uuid::new_v4();
        let mut repo = MockRepo::new();
        repo.expect_list_available_players()
            .returning(move |_| Ok(vec![player_id]));
        repo.expect_claim_next_slot().returning(|_| Ok(None));
        let strategy = UniformRandomStrategy::new(Arc::new(repo));
        let result = strategy.select_claim(Uuid::new_v4()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn selects_the_only_available_player() {
        let player_id = Uuid::new_v4();
        let pick_id = Uuid::new_v4();
        let team_id = Uuid::new_v4();

        let mut repo = MockRepo::new();
        repo.expect_list_available_players()
            .returning(move |_| Ok(vec![player_id]));
        repo.expect_claim_next_slot().returning(move |_| {
            Ok(Some(crate::repositories::ClaimedSlot {
                pick_id,
                team_id,
                overall_pick: 1,
            }))
        });

        let strategy = UniformRandomStrategy::new(Arc::new(repo));
        let claim = strategy
            .select_claim(Uuid::new_v4())
            .await
            .unwrap()
            .expect("claim expected");

        assert_eq!(claim.player_id, player_id);
        assert_eq!(claim.pick_id, pick_id);
        assert_eq!(claim.team_id, team_id);
        assert_eq!(claim.overall_pick, 1);
    }

    #[tokio::test]
    async fn propagates_errors_from_repository() {
        let mut repo = MockRepo::new();
        repo.expect_list_available_players()
            .returning(|_| Err(DomainError::Transient("db down".into())));
        let strategy = UniformRandomStrategy::new(Arc::new(repo));
        let result = strategy.select_claim(Uuid::new_v4()).await;
        assert!(result.is_err());
    }
}
