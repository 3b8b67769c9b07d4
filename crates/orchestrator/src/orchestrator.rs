use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use domain::errors::DomainResult;
use domain::repositories::OutboxRepository;
use domain::services::{AutopickStrategy, DraftStoreService};
use eventbus::{DeliveredEvent, EventConsumer};

use crate::config::OrchestratorConfig;
use crate::handlers::{AutopickExecutor, DraftEventHandler};
use crate::timers::TimerRegistry;
use crate::workers::WorkerPool;

/// Ties the bus consumer, the per-draft timer registry, and the autopick
/// worker pool into the single running process described in spec §4.5 and
/// §9. `run` does not return until `shutdown` is cancelled (or the bus
/// stream ends).
pub struct Orchestrator {
    store: Arc<DraftStoreService>,
    outbox: Arc<dyn OutboxRepository>,
    strategy: Arc<dyn AutopickStrategy>,
    config: OrchestratorConfig,
}

impl Orchestrator {
    pub fn new(
        store: Arc<DraftStoreService>,
        outbox: Arc<dyn OutboxRepository>,
        strategy: Arc<dyn AutopickStrategy>,
        config: OrchestratorConfig,
    ) -> Self {
        Self { store, outbox, strategy, config }
    }

    pub async fn run(self: Arc<Self>, consumer: Box<dyn EventConsumer>, shutdown: CancellationToken) {
        let (fire_tx, fire_rx) = mpsc::channel(self.config.work_queue_depth);
        let timers = Arc::new(TimerRegistry::new(fire_tx));
        let event_handler = Arc::new(DraftEventHandler::new(
            self.store.clone(),
            self.outbox.clone(),
            timers.clone(),
        ));
        let executor = Arc::new(AutopickExecutor::new(
            self.store.clone(),
            self.strategy.clone(),
            timers.clone(),
        ));

        let (worker_pool, worker_handles) = WorkerPool::spawn(
            self.config.num_workers,
            self.config.work_queue_depth,
            executor,
            shutdown.clone(),
        );

        let forward_handle = tokio::spawn(forward_fired_timers(fire_rx, worker_pool, shutdown.clone()));
        let consume_handle = tokio::spawn(consume_loop(consumer, event_handler, shutdown));

        let _ = tokio::join!(consume_handle, forward_handle);
        for handle in worker_handles {
            let _ = handle.await;
        }
    }
}

/// Drains timer-fire notifications and hands them to the worker pool. A
/// standalone loop rather than inline in `run` so `TimerRegistry` and
/// `WorkerPool` stay decoupled: the registry only knows it must report a
/// fired draft id somewhere, not who consumes it.
async fn forward_fired_timers(
    mut fire_rx: mpsc::Receiver<uuid::Uuid>,
    worker_pool: WorkerPool,
    shutdown: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => return,
            next = fire_rx.recv() => {
                match next {
                    Some(draft_id) => worker_pool.try_enqueue(draft_id),
                    None => return,
                }
            }
        }
    }
}

async fn consume_loop(
    mut consumer: Box<dyn EventConsumer>,
    handler: Arc<DraftEventHandler>,
    shutdown: CancellationToken,
) {
    loop {
        let delivered = tokio::select! {
            _ = shutdown.cancelled() => return,
            result = consumer.next() => result,
        };

        let delivered = match delivered {
            Ok(Some(delivered)) => delivered,
            Ok(None) => {
                tracing::info!("event stream ended");
                return;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to pull next event from bus");
                continue;
            }
        };

        let event = delivered.event();
        let result = handler.handle(event.draft_id, &event.payload).await;
        finish_delivery(delivered.as_ref(), result).await;
    }
}

/// Acks on success; naks (triggering JetStream redelivery) on a retryable
/// failure; logs and acks on a non-retryable one so a permanently-invalid
/// message does not loop forever (spec §7).
async fn finish_delivery(delivered: &dyn DeliveredEvent, result: DomainResult<()>) {
    match result {
        Ok(()) => {
            if let Err(e) = delivered.ack().await {
                tracing::warn!(error = %e, "failed to ack event");
            }
        }
        Err(e) if e.is_retryable() => {
            tracing::warn!(draft_id = %delivered.event().draft_id, error = %e, "retryable error, nak for redelivery");
            if let Err(e) = delivered.nak().await {
                tracing::warn!(error = %e, "failed to nak event");
            }
        }
        Err(e) => {
            tracing::error!(draft_id = %delivered.event().draft_id, error = %e, "non-retryable error, acking to avoid a redelivery loop");
            if let Err(e) = delivered.ack().await {
                tracing::warn!(error = %e, "failed to ack event");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use domain::errors::DomainError;
    use domain::models::{DraftEvent, EventPayload};
    use eventbus::EventBusResult;
    use std::sync::atomic::{AtomicBool, Ordering};
    use uuid::Uuid;

    struct StubDelivered {
        event: DraftEvent,
        acked: AtomicBool,
        naked: AtomicBool,
    }

    impl StubDelivered {
        fn new() -> Self {
            Self {
                event: DraftEvent::new(
                    Uuid::new_v4(),
                    Uuid::new_v4(),
                    EventPayload::DraftResumed { resumed_at: Utc::now() },
                ),
                acked: AtomicBool::new(false),
                naked: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl DeliveredEvent for StubDelivered {
        fn event(&self) -> &DraftEvent {
            &self.event
        }

        async fn ack(&self) -> EventBusResult<()> {
            self.acked.store(true, Ordering::SeqCst);
            Ok(())
        }

        async fn nak(&self) -> EventBusResult<()> {
            self.naked.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn success_acks() {
        let delivered = StubDelivered::new();
        finish_delivery(&delivered, Ok(())).await;
        assert!(delivered.acked.load(Ordering::SeqCst));
        assert!(!delivered.naked.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn retryable_error_naks() {
        let delivered = StubDelivered::new();
        finish_delivery(&delivered, Err(DomainError::Transient("db down".into()))).await;
        assert!(delivered.naked.load(Ordering::SeqCst));
        assert!(!delivered.acked.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn non_retryable_error_acks_to_avoid_a_redelivery_loop() {
        let delivered = StubDelivered::new();
        finish_delivery(&delivered, Err(DomainError::Validation("bad payload".into()))).await;
        assert!(delivered.acked.load(Ordering::SeqCst));
        assert!(!delivered.naked.load(Ordering::SeqCst));
    }
}
