use std::time::Duration;

/// Binds the Event Bus contract of spec §4.4 to NATS JetStream: one stream
/// covering every `draft.events.*` subject, broker-side publish dedup
/// within `duplicate_window`, and durable pull consumers with an explicit
/// `max_deliver` cap.
#[derive(Debug, Clone)]
pub struct EventBusConfig {
    pub nats_url: String,
    pub stream_name: String,
    pub subject_prefix: String,
    pub stream_max_age: Duration,
    pub duplicate_window: Duration,
    pub max_deliver: i64,
    pub ack_wait: Duration,
    pub consumer_name: String,
}

impl EventBusConfig {
    pub fn subject_wildcard(&self) -> String {
        format!("{}.>", self.subject_prefix)
    }
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            nats_url: "nats://127.0.0.1:4222".to_string(),
            stream_name: "DRAFT_EVENTS".to_string(),
            subject_prefix: "draft.events".to_string(),
            stream_max_age: Duration::from_secs(7 * 24 * 3600),
            duplicate_window: Duration::from_secs(2 * 3600),
            max_deliver: 5,
            ack_wait: Duration::from_secs(30),
            consumer_name: "draft-orchestrator".to_string(),
        }
    }
}
