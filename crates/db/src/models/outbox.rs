use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::{EventType, OutboxRecord};

use crate::errors::{DbError, DbResult};

/// Row shape for the `draft_outbox` table.
#[derive(Debug, Clone, FromRow)]
pub struct OutboxRow {
    pub id: Uuid,
    pub draft_id: Uuid,
    pub event_type: String,
    pub payload: Vec<u8>,
    pub created_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
}

impl OutboxRow {
    pub fn to_domain(&self) -> DbResult<OutboxRecord> {
        let event_type: EventType = self
            .event_type
            .parse()
            .map_err(|e| DbError::MappingError(format!("{}", e)))?;

        Ok(OutboxRecord {
            id: self.id,
            draft_id: self.draft_id,
            event_type,
            payload: self.payload.clone(),
            created_at: self.created_at,
            sent_at: self.sent_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outbox_row_rejects_unknown_event_type() {
        let row = OutboxRow {
            id: Uuid::new_v4(),
            draft_id: Uuid::new_v4(),
            event_type: "NotAnEvent".to_string(),
            payload: vec![1, 2, 3],
            created_at: Utc::now(),
            sent_at: None,
        };
        assert!(row.to_domain().is_err());
    }
}
