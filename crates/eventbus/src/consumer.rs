use async_nats::jetstream::{self, consumer::AckPolicy, consumer::DeliverPolicy};
use async_trait::async_trait;
use futures::StreamExt;
use tracing::warn;

use domain::models::DraftEvent;

use crate::config::EventBusConfig;
use crate::envelope::decode;
use crate::errors::{EventBusError, EventBusResult};

/// A bus message handed to the Orchestrator, carrying both the decoded
/// domain event and the means to acknowledge or negative-acknowledge it.
/// Handlers ack after the message is fully handled and nak on failure so
/// JetStream redelivers it, per spec §4.5.
#[async_trait]
pub trait DeliveredEvent: Send + Sync {
    fn event(&self) -> &DraftEvent;
    async fn ack(&self) -> EventBusResult<()>;
    async fn nak(&self) -> EventBusResult<()>;
}

pub struct NatsDeliveredEvent {
    event: DraftEvent,
    message: jetstream::Message,
}

#[async_trait]
impl DeliveredEvent for NatsDeliveredEvent {
    fn event(&self) -> &DraftEvent {
        &self.event
    }

    async fn ack(&self) -> EventBusResult<()> {
        self.message
            .ack()
            .await
            .map_err(|e| EventBusError::Ack(e.to_string()))
    }

    async fn nak(&self) -> EventBusResult<()> {
        self.message
            .ack_with(jetstream::AckKind::Nak(None))
            .await
            .map_err(|e| EventBusError::Ack(e.to_string()))
    }
}

/// Subscription over draft-event subjects. Consumer (re)creation with
/// `DeliverPolicy::All` replays the stream's full retention, which is how
/// the Orchestrator recovers after a restart without a separate checkpoint
/// store (spec §4.5 Recovery).
#[async_trait]
pub trait EventConsumer: Send {
    async fn next(&mut self) -> EventBusResult<Option<Box<dyn DeliveredEvent>>>;
}

pub struct NatsEventConsumer {
    messages: jetstream::consumer::pull::Stream,
}

impl NatsEventConsumer {
    pub async fn connect(config: &EventBusConfig) -> EventBusResult<Self> {
        let client = async_nats::connect(&config.nats_url)
            .await
            .map_err(|e| EventBusError::Connect(e.to_string()))?;
        let jetstream = jetstream::new(client);

        let stream = ensure_stream(&jetstream, config).await?;
        let consumer = ensure_consumer(&stream, config).await?;

        let messages = consumer
            .messages()
            .await
            .map_err(|e| EventBusError::Provision(e.to_string()))?;

        Ok(Self { messages })
    }
}

#[async_trait]
impl EventConsumer for NatsEventConsumer {
    async fn next(&mut self) -> EventBusResult<Option<Box<dyn DeliveredEvent>>> {
        loop {
            let next = match self.messages.next().await {
                Some(result) => result,
                None => return Ok(None),
            };

            let message = match next {
                Ok(m) => m,
                Err(e) => return Err(EventBusError::Ack(e.to_string())),
            };

            match decode(&message.payload) {
                Ok(event) => return Ok(Some(Box::new(NatsDeliveredEvent { event, message }))),
                Err(e) => {
                    // Unparseable payload: ack so it is never redelivered and
                    // does not block the stream, and move on to the next one.
                    warn!(error = %e, "dropping unparseable bus message");
                    let _ = message.ack().await;
                    continue;
                }
            }
        }
    }
}

async fn ensure_stream(
    jetstream: &jetstream::Context,
    config: &EventBusConfig,
) -> EventBusResult<jetstream::stream::Stream> {
    jetstream
        .get_or_create_stream(jetstream::stream::Config {
            name: config.stream_name.clone(),
            subjects: vec![config.subject_wildcard()],
            max_age: config.stream_max_age,
            duplicate_window: config.duplicate_window,
            ..Default::default()
        })
        .await
        .map_err(|e| EventBusError::Provision(e.to_string()))
}

async fn ensure_consumer(
    stream: &jetstream::stream::Stream,
    config: &EventBusConfig,
) -> EventBusResult<jetstream::consumer::PullConsumer> {
    stream
        .get_or_create_consumer(
            &config.consumer_name,
            jetstream::consumer::pull::Config {
                durable_name: Some(config.consumer_name.clone()),
                deliver_policy: DeliverPolicy::All,
                ack_policy: AckPolicy::Explicit,
                max_deliver: config.max_deliver,
                ack_wait: config.ack_wait,
                ..Default::default()
            },
        )
        .await
        .map_err(|e| EventBusError::Provision(e.to_string()))
}
