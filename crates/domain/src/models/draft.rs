use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{DomainError, DomainResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DraftType {
    Snake,
    Auction,
    Rookie,
}

impl std::fmt::Display for DraftType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DraftType::Snake => write!(f, "Snake"),
            DraftType::Auction => write!(f, "Auction"),
            DraftType::Rookie => write!(f, "Rookie"),
        }
    }
}

impl std::str::FromStr for DraftType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Snake" => Ok(DraftType::Snake),
            "Auction" => Ok(DraftType::Auction),
            "Rookie" => Ok(DraftType::Rookie),
            _ => Err(DomainError::Validation(format!("invalid draft type: {}", s))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DraftStatus {
    NotStarted,
    InProgress,
    Paused,
    Completed,
    Cancelled,
}

impl std::fmt::Display for DraftStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DraftStatus::NotStarted => write!(f, "NotStarted"),
            DraftStatus::InProgress => write!(f, "InProgress"),
            DraftStatus::Paused => write!(f, "Paused"),
            DraftStatus::Completed => write!(f, "Completed"),
            DraftStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl std::str::FromStr for DraftStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NotStarted" => Ok(DraftStatus::NotStarted),
            "InProgress" => Ok(DraftStatus::InProgress),
            "Paused" => Ok(DraftStatus::Paused),
            "Completed" => Ok(DraftStatus::Completed),
            "Cancelled" => Ok(DraftStatus::Cancelled),
            _ => Err(DomainError::Validation(format!("invalid draft status: {}", s))),
        }
    }
}

impl DraftStatus {
    /// Validates a transition per the Draft FSM. Self-loops are permitted as no-ops.
    pub fn can_transition_to(&self, next: DraftStatus) -> bool {
        if *self == next {
            return true;
        }
        matches!(
            (self, next),
            (DraftStatus::NotStarted, DraftStatus::InProgress)
                | (DraftStatus::NotStarted, DraftStatus::Cancelled)
                | (DraftStatus::InProgress, DraftStatus::Paused)
                | (DraftStatus::InProgress, DraftStatus::Completed)
                | (DraftStatus::InProgress, DraftStatus::Cancelled)
                | (DraftStatus::Paused, DraftStatus::InProgress)
                | (DraftStatus::Paused, DraftStatus::Cancelled)
        )
    }
}

/// `settings` for a draft. Auction-only fields are required when `draft_type`
/// is `Auction` and otherwise unused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftSettings {
    pub rounds: i32,
    pub time_per_pick_sec: i32,
    pub draft_order: Vec<Uuid>,
    pub third_round_reversal: Option<bool>,
    pub budget_per_team: Option<i32>,
    pub min_bid_increment: Option<i32>,
    pub time_per_nomination_sec: Option<i32>,
}

impl DraftSettings {
    pub fn validate(&self, draft_type: DraftType) -> DomainResult<()> {
        if self.rounds <= 0 {
            return Err(DomainError::Validation("rounds must be > 0".into()));
        }
        if self.time_per_pick_sec < 0 {
            return Err(DomainError::Validation(
                "time_per_pick_sec must be >= 0".into(),
            ));
        }
        match draft_type {
            DraftType::Auction => {
                let budget = self.budget_per_team.ok_or_else(|| {
                    DomainError::Validation("auction drafts require budget_per_team".into())
                })?;
                let min_bid = self.min_bid_increment.ok_or_else(|| {
                    DomainError::Validation("auction drafts require min_bid_increment".into())
                })?;
                let nom_time = self.time_per_nomination_sec.ok_or_else(|| {
                    DomainError::Validation(
                        "auction drafts require time_per_nomination_sec".into(),
                    )
                })?;
                if budget <= 0 {
                    return Err(DomainError::Validation("budget_per_team must be > 0".into()));
                }
                if min_bid <= 0 {
                    return Err(DomainError::Validation(
                        "min_bid_increment must be > 0".into(),
                    ));
                }
                if nom_time < 0 {
                    return Err(DomainError::Validation(
                        "time_per_nomination_sec must be >= 0".into(),
                    ));
                }
            }
            DraftType::Snake | DraftType::Rookie => {
                if self.draft_order.is_empty() {
                    return Err(DomainError::Validation(
                        "snake/rookie drafts require a non-empty draft_order".into(),
                    ));
                }
                if draft_type == DraftType::Rookie && self.rounds > 5 {
                    return Err(DomainError::Validation(
                        "rookie drafts may not exceed 5 rounds".into(),
                    ));
                }
            }
        }
        Ok(())
    }

    pub fn team_count(&self) -> i32 {
        self.draft_order.len() as i32
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Draft {
    pub id: Uuid,
    pub league_id: Uuid,
    pub draft_type: DraftType,
    pub status: DraftStatus,
    pub settings: DraftSettings,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub next_deadline: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Draft {
    pub fn new(league_id: Uuid, draft_type: DraftType, settings: DraftSettings) -> DomainResult<Self> {
        settings.validate(draft_type)?;
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            league_id,
            draft_type,
            status: DraftStatus::NotStarted,
            settings,
            scheduled_at: None,
            started_at: None,
            completed_at: None,
            next_deadline: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn total_picks(&self) -> i32 {
        self.settings.rounds * self.settings.team_count()
    }

    /// Applies a status transition in memory, enforcing the FSM and the
    /// started_at/completed_at stamping side-effects. Persistence (and the
    /// matching outbox insert) is the repository's responsibility.
    pub fn transition_to(&mut self, next: DraftStatus) -> DomainResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(DomainError::Precondition(format!(
                "cannot transition draft from {:?} to {:?}",
                self.status, next
            )));
        }
        if next == DraftStatus::InProgress && self.started_at.is_none() {
            self.started_at = Some(Utc::now());
        }
        if next == DraftStatus::Completed {
            self.completed_at = Some(Utc::now());
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn update_settings(&mut self, settings: DraftSettings, scheduled_at: Option<DateTime<Utc>>) -> DomainResult<()> {
        if self.status != DraftStatus::NotStarted {
            return Err(DomainError::Precondition(
                "settings may only be updated while NotStarted".into(),
            ));
        }
        if let Some(at) = scheduled_at {
            if at <= Utc::now() {
                return Err(DomainError::Validation("scheduled_at must be in the future".into()));
            }
        }
        settings.validate(self.draft_type)?;
        self.settings = settings;
        self.scheduled_at = scheduled_at;
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// A slot in the prepopulated pick schedule, identified by `overall_pick`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftPick {
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

impl DraftPick {
    pub fn new(draft_id: Uuid, round: i32, pick: i32, overall_pick: i32, team_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            draft_id,
            round,
            pick,
            overall_pick,
            team_id,
            player_id: None,
            picked_at: None,
            auction_amount: None,
            keeper_pick: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_picked(&self) -> bool {
        self.player_id.is_some()
    }
}

/// Builds the prepopulated pick rows for a draft per the Store's
/// `PrepopulateDraftPicks` contract: Snake/Rookie alternate direction by
/// round parity (or from round 3 onward when `third_round_reversal` is
/// set); Auction always follows `draft_order`.
pub fn build_picks(draft_id: Uuid, draft_type: DraftType, settings: &DraftSettings) -> Vec<DraftPick> {
    let team_count = settings.team_count();
    let reversal = settings.third_round_reversal.unwrap_or(false);
    let mut picks = Vec::with_capacity((settings.rounds * team_count) as usize);
    let mut overall_pick = 1;

    for round in 1..=settings.rounds {
        let reversed = match draft_type {
            DraftType::Auction => false,
            DraftType::Snake | DraftType::Rookie => {
                if reversal {
                    round >= 3
                } else {
                    round % 2 == 0
                }
            }
        };

        for pick in 1..=team_count {
            let team_idx = if reversed {
                (team_count - pick) as usize
            } else {
                (pick - 1) as usize
            };
            let team_id = settings.draft_order[team_idx];
            picks.push(DraftPick::new(draft_id, round, pick, overall_pick, team_id));
            overall_pick += 1;
        }
    }

    picks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team_ids(n: usize) -> Vec<Uuid> {
        (0..n).map(|_| Uuid::new_v4()).collect()
    }

    fn snake_settings(order: Vec<Uuid>, rounds: i32, reversal: Option<bool>) -> DraftSettings {
        DraftSettings {
            rounds,
            time_per_pick_sec: 60,
            draft_order: order,
            third_round_reversal: reversal,
            budget_per_team: None,
            min_bid_increment: None,
            time_per_nomination_sec: None,
        }
    }

    #[test]
    fn fsm_allows_expected_paths() {
        assert!(DraftStatus::NotStarted.can_transition_to(DraftStatus::InProgress));
        assert!(DraftStatus::NotStarted.can_transition_to(DraftStatus::Cancelled));
        assert!(!DraftStatus::NotStarted.can_transition_to(DraftStatus::Completed));
        assert!(DraftStatus::InProgress.can_transition_to(DraftStatus::Paused));
        assert!(DraftStatus::Paused.can_transition_to(DraftStatus::InProgress));
        assert!(!DraftStatus::Completed.can_transition_to(DraftStatus::InProgress));
        assert!(!DraftStatus::Cancelled.can_transition_to(DraftStatus::NotStarted));
    }

    #[test]
    fn transition_stamps_started_and_completed_at() {
        let order = team_ids(4);
        let settings = snake_settings(order, 3, Some(false));
        let mut draft = Draft::new(Uuid::new_v4(), DraftType::Snake, settings).unwrap();
        assert!(draft.started_at.is_none());

        draft.transition_to(DraftStatus::InProgress).unwrap();
        assert!(draft.started_at.is_some());

        draft.transition_to(DraftStatus::Completed).unwrap();
        assert!(draft.completed_at.is_some());
    }

    #[test]
    fn auction_requires_budget_fields() {
        let settings = DraftSettings {
            rounds: 1,
            time_per_pick_sec: 30,
            draft_order: team_ids(4),
            third_round_reversal: None,
            budget_per_team: None,
            min_bid_increment: None,
            time_per_nomination_sec: None,
        };
        let result = Draft::new(Uuid::new_v4(), DraftType::Auction, settings);
        assert!(result.is_err());
    }

    #[test]
    fn rookie_rejects_more_than_five_rounds() {
        let settings = snake_settings(team_ids(4), 6, None);
        let result = Draft::new(Uuid::new_v4(), DraftType::Rookie, settings);
        assert!(result.is_err());
    }

    #[test]
    fn build_picks_dense_snake_4x3_no_reversal() {
        let order = team_ids(4);
        let settings = snake_settings(order.clone(), 3, Some(false));
        let picks = build_picks(Uuid::new_v4(), DraftType::Snake, &settings);

        assert_eq!(picks.len(), 12);
        let overalls: Vec<i32> = picks.iter().map(|p| p.overall_pick).collect();
        assert_eq!(overalls, (1..=12).collect::<Vec<_>>());

        let teams: Vec<Uuid> = picks.iter().map(|p| p.team_id).collect();
        let expected = [
            order[0], order[1], order[2], order[3], order[3], order[2], order[1], order[0],
            order[0], order[1], order[2], order[3],
        ];
        assert_eq!(teams, expected);
    }

    #[test]
    fn build_picks_third_round_reversal() {
        let order = team_ids(4);
        let settings = snake_settings(order.clone(), 4, Some(true));
        let picks = build_picks(Uuid::new_v4(), DraftType::Snake, &settings);

        let round_team = |r: i32| -> Vec<Uuid> {
            picks
                .iter()
                .filter(|p| p.round == r)
                .map(|p| p.team_id)
                .collect()
        };

        assert_eq!(round_team(1), order);
        assert_eq!(round_team(2), vec![order[3], order[2], order[1], order[0]]);
        assert_eq!(round_team(3), vec![order[3], order[2], order[1], order[0]]);
        assert_eq!(round_team(4), vec![order[3], order[2], order[1], order[0]]);
    }

    #[test]
    fn build_picks_auction_never_reverses() {
        let order = team_ids(3);
        let settings = DraftSettings {
            rounds: 3,
            time_per_pick_sec: 0,
            draft_order: order.clone(),
            third_round_reversal: None,
            budget_per_team: Some(200),
            min_bid_increment: Some(1),
            time_per_nomination_sec: Some(30),
        };
        let picks = build_picks(Uuid::new_v4(), DraftType::Auction, &settings);
        for round in 1..=3 {
            let teams: Vec<Uuid> = picks
                .iter()
                .filter(|p| p.round == round)
                .map(|p| p.team_id)
                .collect();
            assert_eq!(teams, order);
        }
    }
}
