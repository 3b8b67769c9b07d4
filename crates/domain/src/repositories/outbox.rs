use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::DomainResult;
use crate::models::OutboxRecord;

/// Access to the transactional outbox table. Used directly by the
/// Orchestrator (to insert `PickStarted`, which is not a Draft Store
/// mutation) and by the Outbox Dispatcher (to claim and mark rows sent).
#[async_trait]
pub trait OutboxRepository: Send + Sync {
    /// Inserts a new, unsent record. Standalone insert — not wrapped in a
    /// Draft Store transaction, since the record does not itself mutate
    /// draft or pick state.
    async fn enqueue(&self, record: OutboxRecord) -> DomainResult<()>;

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<OutboxRecord>>;

    /// Up to `limit` unsent rows, oldest first, for the dispatcher's
    /// periodic sweep fallback.
    async fn list_unsent(&self, limit: i64) -> DomainResult<Vec<OutboxRecord>>;

    /// Idempotent: safe to call more than once for the same id.
    async fn mark_sent(&self, id: Uuid) -> DomainResult<()>;

    async fn mark_sent_batch(&self, ids: &[Uuid]) -> DomainResult<()>;
}
