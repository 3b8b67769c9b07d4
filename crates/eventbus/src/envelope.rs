use async_nats::HeaderMap;

use domain::models::DraftEvent;

use crate::errors::{EventBusError, EventBusResult};

pub const HEADER_EVENT_ID: &str = "Event-ID";
pub const HEADER_EVENT_TYPE: &str = "Event-Type";
pub const HEADER_DRAFT_ID: &str = "Draft-ID";
/// JetStream's built-in publish-dedup header; set to the outbox record id
/// so redelivery of the same id is a broker-side no-op within the stream's
/// `duplicate_window`.
pub const HEADER_NATS_MSG_ID: &str = "Nats-Msg-Id";

pub fn subject_for(config_prefix: &str, event: &DraftEvent) -> String {
    format!("{}.{}", config_prefix, event.event_type)
}

pub fn headers_for(event: &DraftEvent) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(HEADER_EVENT_ID, event.event_id.to_string().as_str());
    headers.insert(HEADER_EVENT_TYPE, event.event_type.to_string().as_str());
    headers.insert(HEADER_DRAFT_ID, event.draft_id.to_string().as_str());
    headers.insert(HEADER_NATS_MSG_ID, event.event_id.to_string().as_str());
    headers
}

pub fn encode(event: &DraftEvent) -> EventBusResult<Vec<u8>> {
    serde_json::to_vec(event).map_err(|e| EventBusError::Malformed(e.to_string()))
}

pub fn decode(payload: &[u8]) -> EventBusResult<DraftEvent> {
    serde_json::from_slice(payload).map_err(|e| EventBusError::Malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domain::models::EventPayload;
    use uuid::Uuid;

    #[test]
    fn subject_is_namespaced_by_prefix_and_event_type() {
        let event = DraftEvent::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            EventPayload::DraftResumed { resumed_at: Utc::now() },
        );
        assert_eq!(subject_for("draft.events", &event), "draft.events.DraftResumed");
    }

    #[test]
    fn encode_then_decode_round_trips_to_an_equal_event() {
        let event = DraftEvent::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            EventPayload::PickMade {
                pick_id: Uuid::new_v4(),
                team_id: Uuid::new_v4(),
                player_id: Uuid::new_v4(),
                round: 1,
                pick: 1,
                overall_pick: 1,
                made_at: Utc::now(),
            },
        );
        let bytes = encode(&event).unwrap();
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded, event);
    }
}
