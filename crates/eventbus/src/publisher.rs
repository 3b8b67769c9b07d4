use async_nats::jetstream;
use async_trait::async_trait;
use tracing::debug;

use domain::models::DraftEvent;

use crate::envelope::{encode, headers_for, subject_for};
use crate::errors::{EventBusError, EventBusResult};

/// Publishes domain events onto the bus. The Outbox Dispatcher is the sole
/// caller; `event.event_id` (the originating `OutboxRecord.id`) doubles as
/// the JetStream publish-dedup key via the `Nats-Msg-Id` header, so
/// redelivering the same record id is idempotent at the broker.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: &DraftEvent) -> EventBusResult<()>;
}

pub struct NatsEventPublisher {
    jetstream: jetstream::Context,
    subject_prefix: String,
}

impl NatsEventPublisher {
    pub fn new(jetstream: jetstream::Context, subject_prefix: String) -> Self {
        Self { jetstream, subject_prefix }
    }
}

#[async_trait]
impl EventPublisher for NatsEventPublisher {
    async fn publish(&self, event: &DraftEvent) -> EventBusResult<()> {
        let subject = subject_for(&self.subject_prefix, event);
        let headers = headers_for(event);
        let payload = encode(event)?;

        let ack_future = self
            .jetstream
            .publish_with_headers(subject.clone(), headers, payload.into())
            .await
            .map_err(|e| EventBusError::Publish(e.to_string()))?;

        ack_future
            .await
            .map_err(|e| EventBusError::Publish(e.to_string()))?;

        debug!(event_id = %event.event_id, subject = %subject, "published event");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domain::models::EventPayload;
    use mockall::mock;
    use uuid::Uuid;

    mock! {
        Publisher {}

        #[async_trait]
        impl EventPublisher for Publisher {
            async fn publish(&self, event: &DraftEvent) -> EventBusResult<()>;
        }
    }

    #[tokio::test]
    async fn publish_is_called_with_the_given_event() {
        let event = DraftEvent::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            EventPayload::DraftResumed { resumed_at: Utc::now() },
        );
        let expected = event.clone();

        let mut publisher = MockPublisher::new();
        publisher
            .expect_publish()
            .withf(move |e| *e == expected)
            .returning(|_| Ok(()));

        publisher.publish(&event).await.unwrap();
    }
}
