use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashSet;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use domain::errors::DomainResult;

/// `HandleTimeout` (spec §4.5): given a due draft, perform one autopick
/// attempt and decide whether the draft is now complete.
#[async_trait]
pub trait TimeoutHandler: Send + Sync {
    async fn handle_timeout(&self, draft_id: Uuid) -> DomainResult<()>;
}

/// Bounded work queue plus a fixed worker pool (spec §4.5, §5). Timer
/// expiry enqueues a draft id; `in_flight` prevents two workers from
/// processing the same draft concurrently — a duplicate enqueue (e.g. a
/// stale timer racing a fresh one) is simply dropped rather than run twice.
pub struct WorkerPool {
    sender: mpsc::Sender<Uuid>,
}

impl WorkerPool {
    pub fn spawn(
        num_workers: usize,
        queue_depth: usize,
        handler: Arc<dyn TimeoutHandler>,
        shutdown: CancellationToken,
    ) -> (Self, Vec<JoinHandle<()>>) {
        let (sender, receiver) = mpsc::channel(queue_depth);
        let receiver = Arc::new(Mutex::new(receiver));
        let in_flight = Arc::new(DashSet::new());

        let handles = (0..num_workers)
            .map(|worker_id| {
                let receiver = receiver.clone();
                let handler = handler.clone();
                let in_flight = in_flight.clone();
                let shutdown = shutdown.clone();
                tokio::spawn(async move {
                    worker_loop(worker_id, receiver, handler, in_flight, shutdown).await;
                })
            })
            .collect();

        (Self { sender }, handles)
    }

    /// Enqueues `draft_id` for autopick. Per spec §4.5: if the channel is
    /// full, log and drop the enqueue rather than block the timer that
    /// fired it; sized at `2 * num_workers` to make this rare.
    pub fn try_enqueue(&self, draft_id: Uuid) {
        if let Err(e) = self.sender.try_send(draft_id) {
            tracing::warn!(draft_id = %draft_id, error = %e, "work queue full, dropping autopick enqueue");
        }
    }
}

async fn worker_loop(
    worker_id: usize,
    receiver: Arc<Mutex<mpsc::Receiver<Uuid>>>,
    handler: Arc<dyn TimeoutHandler>,
    in_flight: Arc<DashSet<Uuid>>,
    shutdown: CancellationToken,
) {
    loop {
        let next = {
            let mut receiver = receiver.lock().await;
            tokio::select! {
                _ = shutdown.cancelled() => None,
                item = receiver.recv() => item,
            }
        };

        let draft_id = match next {
            Some(id) => id,
            None => {
                tracing::debug!(worker_id, "worker shutting down");
                return;
            }
        };

        if !in_flight.insert(draft_id) {
            tracing::debug!(worker_id, draft_id = %draft_id, "draft already being processed, dropping duplicate enqueue");
            continue;
        }

        if let Err(e) = handler.handle_timeout(draft_id).await {
            tracing::warn!(worker_id, draft_id = %draft_id, error = %e, "autopick attempt failed");
        }

        in_flight.remove(&draft_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct CountingHandler {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl TimeoutHandler for CountingHandler {
        async fn handle_timeout(&self, _draft_id: Uuid) -> DomainResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn enqueued_draft_is_handled_by_a_worker() {
        let calls = Arc::new(AtomicUsize::new(0));
        let handler = Arc::new(CountingHandler { calls: calls.clone() });
        let shutdown = CancellationToken::new();
        let (pool, _handles) = WorkerPool::spawn(2, 4, handler, shutdown.clone());

        pool.try_enqueue(Uuid::new_v4());
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        shutdown.cancel();
    }

    #[tokio::test]
    async fn full_queue_drops_the_enqueue_instead_of_blocking() {
        struct SlowHandler;
        #[async_trait]
        impl TimeoutHandler for SlowHandler {
            async fn handle_timeout(&self, _draft_id: Uuid) -> DomainResult<()> {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok(())
            }
        }

        let shutdown = CancellationToken::new();
        let (pool, _handles) = WorkerPool::spawn(1, 1, Arc::new(SlowHandler), shutdown.clone());

        pool.try_enqueue(Uuid::new_v4());
        tokio::time::sleep(Duration::from_millis(20)).await;
        // worker is now blocked in the 10s sleep; queue depth 1 means this
        // one is buffered, and a third would be dropped.
        pool.try_enqueue(Uuid::new_v4());
        pool.try_enqueue(Uuid::new_v4());

        shutdown.cancel();
    }
}
