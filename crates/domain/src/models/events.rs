use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::DomainError;

/// The six domain events the core produces. Mirrors the bus subject suffix
/// `draft.events.<EventType>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    DraftStarted,
    DraftPaused,
    DraftResumed,
    DraftCompleted,
    PickStarted,
    PickMade,
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventType::DraftStarted => write!(f, "DraftStarted"),
            EventType::DraftPaused => write!(f, "DraftPaused"),
            EventType::DraftResumed => write!(f, "DraftResumed"),
            EventType::DraftCompleted => write!(f, "DraftCompleted"),
            EventType::PickStarted => write!(f, "PickStarted"),
            EventType::PickMade => write!(f, "PickMade"),
        }
    }
}

impl std::str::FromStr for EventType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DraftStarted" => Ok(EventType::DraftStarted),
            "DraftPaused" => Ok(EventType::DraftPaused),
            "DraftResumed" => Ok(EventType::DraftResumed),
            "DraftCompleted" => Ok(EventType::DraftCompleted),
            "PickStarted" => Ok(EventType::PickStarted),
            "PickMade" => Ok(EventType::PickMade),
            _ => Err(DomainError::Validation(format!("invalid event type: {}", s))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EventPayload {
    DraftStarted {
        started_at: DateTime<Utc>,
        draft_type: String,
        total_rounds: i32,
        total_picks: i32,
    },
    DraftPaused {
        paused_at: DateTime<Utc>,
        reason: Option<String>,
    },
    DraftResumed {
        resumed_at: DateTime<Utc>,
    },
    DraftCompleted {
        completed_at: DateTime<Utc>,
        duration_sec: i64,
        total_picks: i32,
    },
    PickStarted {
        pick_id: Uuid,
        team_id: Uuid,
        round: i32,
        pick: i32,
        overall_pick: i32,
        started_at: DateTime<Utc>,
        timeout_at: DateTime<Utc>,
        time_per_pick_sec: i32,
    },
    PickMade {
        pick_id: Uuid,
        team_id: Uuid,
        player_id: Uuid,
        round: i32,
        pick: i32,
        overall_pick: i32,
        made_at: DateTime<Utc>,
    },
}

impl EventPayload {
    pub fn event_type(&self) -> EventType {
        match self {
            EventPayload::DraftStarted { .. } => EventType::DraftStarted,
            EventPayload::DraftPaused { .. } => EventType::DraftPaused,
            EventPayload::DraftResumed { .. } => EventType::DraftResumed,
            EventPayload::DraftCompleted { .. } => EventType::DraftCompleted,
            EventPayload::PickStarted { .. } => EventType::PickStarted,
            EventPayload::PickMade { .. } => EventType::PickMade,
        }
    }
}

/// The bus-side envelope wrapping a domain event. `event_id` doubles as the
/// publish-side dedupe key and is always the originating `OutboxRecord.id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftEvent {
    pub event_id: Uuid,
    pub event_type: EventType,
    pub draft_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub payload: EventPayload,
}

impl DraftEvent {
    pub fn new(event_id: Uuid, draft_id: Uuid, payload: EventPayload) -> Self {
        Self {
            event_id,
            event_type: payload.event_type(),
            draft_id,
            timestamp: Utc::now(),
            payload,
        }
    }

    pub fn subject(&self) -> String {
        format!("draft.events.{}", self.event_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_type_round_trips_through_display_and_from_str() {
        use std::str::FromStr;
        for et in [
            EventType::DraftStarted,
            EventType::DraftPaused,
            EventType::DraftResumed,
            EventType::DraftCompleted,
            EventType::PickStarted,
            EventType::PickMade,
        ] {
            let s = et.to_string();
            assert_eq!(EventType::from_str(&s).unwrap(), et);
        }
    }

    #[test]
    fn payload_serializes_and_deserializes_to_equal_value() {
        let payload = EventPayload::PickMade {
            pick_id: Uuid::new_v4(),
            team_id: Uuid::new_v4(),
            player_id: Uuid::new_v4(),
            round: 1,
            pick: 1,
            overall_pick: 1,
            made_at: Utc::now(),
        };
        let json = serde_json::to_vec(&payload).unwrap();
        let decoded: EventPayload = serde_json::from_slice(&json).unwrap();
        assert_eq!(payload, decoded);
    }

    #[test]
    fn event_type_mismatch_rejected() {
        use std::str::FromStr;
        assert!(EventType::from_str("NotAnEvent").is_err());
    }

    #[test]
    fn subject_is_namespaced_per_event_type() {
        let event = DraftEvent::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            EventPayload::DraftResumed {
                resumed_at: Utc::now(),
            },
        );
        assert_eq!(event.subject(), "draft.events.DraftResumed");
    }
}
