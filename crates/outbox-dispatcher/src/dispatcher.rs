use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use db::notify::OutboxListener;
use domain::errors::DomainResult;
use domain::models::{DraftEvent, EventPayload, OutboxRecord};
use domain::repositories::OutboxRepository;
use domain::services::RetryPolicy;
use eventbus::EventPublisher;

use crate::config::DispatcherConfig;

/// Moves `OutboxRecord`s to the Event Bus exactly-once from the bus's
/// perspective (publish dedup is the bus's job; see `eventbus`) and
/// no-later-than `fallback_interval` (spec §4.3). Two concurrently-safe
/// paths feed it: `PgNOTIFY`-driven real-time dispatch and a periodic
/// sweep of unsent rows. Both converge on the same per-record publish
/// path, so publishing and mark-sent are idempotent regardless of which
/// path won the race.
pub struct OutboxDispatcher {
    repo: Arc<dyn OutboxRepository>,
    publisher: Arc<dyn EventPublisher>,
    config: DispatcherConfig,
}

impl OutboxDispatcher {
    pub fn new(
        repo: Arc<dyn OutboxRepository>,
        publisher: Arc<dyn EventPublisher>,
        config: DispatcherConfig,
    ) -> Self {
        Self { repo, publisher, config }
    }

    fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::linear(self.config.max_retries, self.config.retry_delay)
    }

    /// Runs the notification-driven path and the sweep path concurrently
    /// until `shutdown` is cancelled. Returns once both have drained.
    pub async fn run(self: Arc<Self>, listener: OutboxListener, shutdown: CancellationToken) {
        let notify_dispatcher = self.clone();
        let notify_shutdown = shutdown.clone();
        let notify_task = tokio::spawn(async move {
            notify_dispatcher.notification_loop(listener, notify_shutdown).await;
        });

        let sweep_dispatcher = self.clone();
        let sweep_shutdown = shutdown.clone();
        let sweep_task = tokio::spawn(async move {
            sweep_dispatcher.sweep_loop(sweep_shutdown).await;
        });

        let _ = tokio::join!(notify_task, sweep_task);
    }

    async fn notification_loop(&self, mut listener: OutboxListener, shutdown: CancellationToken) {
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("outbox notification loop shutting down");
                    return;
                }
                notification = listener.recv() => {
                    match notification {
                        Ok(Some(id)) => self.dispatch_by_id(id).await,
                        Ok(None) => continue,
                        Err(e) => {
                            error!(error = %e, "outbox listener error, continuing");
                        }
                    }
                }
            }
        }
    }

    async fn sweep_loop(&self, shutdown: CancellationToken) {
        let mut ticker = tokio::time::interval(self.config.fallback_interval);
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("outbox sweep loop shutting down");
                    return;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.sweep_once().await {
                        error!(error = %e, "outbox sweep failed, will retry next interval");
                    }
                }
            }
        }
    }

    /// A single notification: fetch the record (it may already be gone, if
    /// the sweep or another dispatcher instance got to it first) and
    /// publish it.
    async fn dispatch_by_id(&self, id: Uuid) {
        match self.repo.find_by_id(id).await {
            Ok(Some(record)) if !record.is_sent() => {
                if let Err(e) = self.publish_and_mark(&record).await {
                    warn!(event_id = %id, error = %e, "failed to publish outbox record after retries; sweep will retry");
                }
            }
            Ok(Some(_)) => debug!(event_id = %id, "record already sent, ignoring notification"),
            Ok(None) => debug!(event_id = %id, "notified record no longer exists, ignoring"),
            Err(e) => error!(event_id = %id, error = %e, "failed to fetch notified outbox record"),
        }
    }

    async fn sweep_once(&self) -> DomainResult<()> {
        let unsent = self.repo.list_unsent(self.config.batch_size).await?;
        if unsent.is_empty() {
            return Ok(());
        }

        let mut sent_ids = Vec::with_capacity(unsent.len());
        for record in &unsent {
            match self.publish_with_retry(record).await {
                Ok(()) => sent_ids.push(record.id),
                Err(e) => warn!(event_id = %record.id, error = %e, "sweep publish failed, will retry next sweep"),
            }
        }

        self.repo.mark_sent_batch(&sent_ids).await?;
        debug!(swept = unsent.len(), published = sent_ids.len(), "outbox sweep completed");
        Ok(())
    }

    /// Publishes then marks sent individually; used by the notification
    /// path, where latency to visibility matters more than batching.
    async fn publish_and_mark(&self, record: &OutboxRecord) -> DomainResult<()> {
        self.publish_with_retry(record).await?;
        self.repo.mark_sent(record.id).await?;
        Ok(())
    }

    async fn publish_with_retry(&self, record: &OutboxRecord) -> DomainResult<()> {
        let event = to_bus_event(record)?;
        let publisher = self.publisher.clone();
        self.retry_policy()
            .run(|| {
                let publisher = publisher.clone();
                let event = event.clone();
                async move { publisher.publish(&event).await }
            })
            .await
            .map_err(|e| domain::errors::DomainError::Transient(e.to_string()))
    }
}

fn to_bus_event(record: &OutboxRecord) -> DomainResult<DraftEvent> {
    let payload: EventPayload = serde_json::from_slice(&record.payload)
        .map_err(|e| domain::errors::DomainError::Internal(format!("malformed outbox payload: {}", e)))?;

    Ok(DraftEvent {
        event_id: record.id,
        event_type: payload.event_type(),
        draft_id: record.draft_id,
        timestamp: record.created_at,
        payload,
    })
}
