use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::{Draft, DraftPick, DraftSettings, DraftStatus, DraftType};

use crate::errors::{DbError, DbResult};

/// Row shape for the `draft` table. `settings` is stored as JSON rather than
/// normalized columns since its shape varies by `draft_type`.
#[derive(Debug, Clone, FromRow)]
pub struct DraftRow {
    pub id: Uuid,
    pub league_id: Uuid,
    pub draft_type: String,
    pub status: String,
    pub settings: JsonValue,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub next_deadline: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DraftRow {
    pub fn to_domain(&self) -> DbResult<Draft> {
        let draft_type: DraftType = self
            .draft_type
            .parse()
            .map_err(|e| DbError::MappingError(format!("{}", e)))?;
        let status: DraftStatus = self
            .status
            .parse()
            .map_err(|e| DbError::MappingError(format!("{}", e)))?;
        let settings: DraftSettings = serde_json::from_value(self.settings.clone())
            .map_err(|e| DbError::MappingError(format!("invalid settings json: {}", e)))?;

        Ok(Draft {
            id: self.id,
            league_id: self.league_id,
            draft_type,
            status,
            settings,
            scheduled_at: self.scheduled_at,
            started_at: self.started_at,
            completed_at: self.completed_at,
            next_deadline: self.next_deadline,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Row shape for the `draft_picks` table.
#[derive(Debug, Clone, FromRow)]
pub struct DraftPickRow {
    pub id: Uuid,
    pub draft_id: Uuid,
    pub round: i32,
    pub pick: i32,
    pub overall_pick: i32,
    pub team_id: Uuid,
    pub player_id: Option<Uuid>,
    pub picked_at: Option<DateTime<Utc>>,
    pub auction_amount: Option<i32>,
    pub keeper_pick: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DraftPickRow {
    pub fn to_domain(&self) -> DraftPick {
        DraftPick {
            id: self.id,
            draft_id: self.draft_id,
            round: self.round,
            pick: self.pick,
            overall_pick: self.overall_pick,
            team_id: self.team_id,
            player_id: self.player_id,
            picked_at: self.picked_at,
            auction_amount: self.auction_amount,
            keeper_pick: self.keeper_pick,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_row_round_trips_through_domain_status_and_type() {
        let row = DraftRow {
            id: Uuid::new_v4(),
            league_id: Uuid::new_v4(),
            draft_type: "Snake".to_string(),
            status: "InProgress".to_string(),
            settings: serde_json::json!({
                "rounds": 3,
                "time_per_pick_sec": 60,
                "draft_order": [Uuid::new_v4(), Uuid::new_v4()],
                "third_round_reversal": null,
                "budget_per_team": null,
                "min_bid_increment": null,
                "time_per_nomination_sec": null,
            }),
            scheduled_at: None,
            started_at: Some(Utc::now()),
            completed_at: None,
            next_deadline: Some(Utc::now()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let draft = row.to_domain().unwrap();
        assert_eq!(draft.draft_type, DraftType::Snake);
        assert_eq!(draft.status, DraftStatus::InProgress);
        assert_eq!(draft.settings.rounds, 3);
    }

    #[test]
    fn draft_row_rejects_unknown_status() {
        let row = DraftRow {
            id: Uuid::new_v4(),
            league_id: Uuid::new_v4(),
            draft_type: "Snake".to_string(),
            status: "Bogus".to_string(),
            settings: serde_json::json!({
                "rounds": 1,
                "time_per_pick_sec": 0,
                "draft_order": [],
                "third_round_reversal": null,
                "budget_per_team": null,
                "min_bid_increment": null,
                "time_per_nomination_sec": null,
            }),
            scheduled_at: None,
            started_at: None,
            completed_at: None,
            next_deadline: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert!(row.to_domain().is_err());
    }
}
