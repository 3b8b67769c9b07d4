pub mod config;
pub mod consumer;
pub mod envelope;
pub mod errors;
pub mod publisher;

pub use config::EventBusConfig;
pub use consumer::{DeliveredEvent, EventConsumer, NatsEventConsumer};
pub use errors::{EventBusError, EventBusResult};
pub use publisher::{EventPublisher, NatsEventPublisher};

use async_nats::jetstream;

/// Connects to NATS and returns a JetStream context ready for
/// `NatsEventPublisher::new`. Kept separate from `NatsEventConsumer::connect`
/// since the Dispatcher and the Orchestrator each want their own client.
pub async fn connect_jetstream(nats_url: &str) -> EventBusResult<jetstream::Context> {
    let client = async_nats::connect(nats_url)
        .await
        .map_err(|e| EventBusError::Connect(e.to_string()))?;
    Ok(jetstream::new(client))
}
