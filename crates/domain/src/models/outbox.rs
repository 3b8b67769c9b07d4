use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{DomainError, DomainResult};
use crate::models::events::EventType;

/// A row in the transactional outbox. `id` is both the primary key and the
/// bus-side publish dedupe key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboxRecord {
    pub id: Uuid,
    pub draft_id: Uuid,
    pub event_type: EventType,
    pub payload: Vec<u8>,
    pub created_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
}

impl OutboxRecord {
    pub fn new(draft_id: Uuid, event_type: EventType, payload: Vec<u8>) -> DomainResult<Self> {
        if payload.is_empty() {
            return Err(DomainError::Validation("outbox payload must not be empty".into()));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            draft_id,
            event_type,
            payload,
            created_at: Utc::now(),
            sent_at: None,
        })
    }

    pub fn is_sent(&self) -> bool {
        self.sent_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_payload() {
        let result = OutboxRecord::new(Uuid::new_v4(), EventType::PickMade, Vec::new());
        assert!(result.is_err());
    }

    #[test]
    fn new_record_is_unsent() {
        let record = OutboxRecord::new(Uuid::new_v4(), EventType::PickMade, vec![1]).unwrap();
        assert!(!record.is_sent());
    }
}
