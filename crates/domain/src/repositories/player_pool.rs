use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::DomainResult;
use crate::repositories::draft::PlayerPool;

/// Stand-in for the real player catalog (an explicit non-goal of this
/// core). Backs `ListAvailablePlayers` with a fixed, caller-supplied
/// universe of candidate player ids — enough to exercise the Store and
/// Orchestrator without depending on catalog schema this core doesn't own.
pub struct InMemoryPlayerPool {
    player_ids: Vec<Uuid>,
}

impl InMemoryPlayerPool {
    pub fn new(player_ids: Vec<Uuid>) -> Self {
        Self { player_ids }
    }
}

#[async_trait]
impl PlayerPool for InMemoryPlayerPool {
    async fn all_player_ids(&self) -> DomainResult<Vec<Uuid>> {
        Ok(self.player_ids.clone())
    }
}
