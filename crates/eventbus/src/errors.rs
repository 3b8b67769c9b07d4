use thiserror::Error;

#[derive(Debug, Error)]
pub enum EventBusError {
    #[error("failed to connect to event bus: {0}")]
    Connect(String),

    #[error("failed to provision stream or consumer: {0}")]
    Provision(String),

    #[error("publish failed: {0}")]
    Publish(String),

    #[error("ack/nak failed: {0}")]
    Ack(String),

    #[error("malformed envelope: {0}")]
    Malformed(String),
}

pub type EventBusResult<T> = Result<T, EventBusError>;

impl From<EventBusError> for domain::errors::DomainError {
    fn from(err: EventBusError) -> Self {
        domain::errors::DomainError::Transient(err.to_string())
    }
}
