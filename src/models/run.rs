use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Movement class a leaderboard is partitioned by. The wire values are the
/// class indices the game servers report (2 = Soldier, 4 = Demoman).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Discipline {
    Soldier,
    Demoman,
}

impl Discipline {
    pub const ALL: [Discipline; 2] = [Discipline::Soldier, Discipline::Demoman];

    pub fn class_index(self) -> i64 {
        match self {
            Discipline::Soldier => 2,
            Discipline::Demoman => 4,
        }
    }

    pub fn from_class_index(index: i64) -> Result<Self, EngineError> {
        match index {
            2 => Ok(Discipline::Soldier),
            4 => Ok(Discipline::Demoman),
            _ => Err(EngineError::Validation(format!(
                "unknown discipline class index: {}",
                index
            ))),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Discipline::Soldier => "soldier",
            Discipline::Demoman => "demoman",
        }
    }
}

/// A stored personal best. At most one row exists per
/// (map_id, player_id, discipline).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    pub id: i64,
    pub map_id: i64,
    pub player_id: i64,
    pub discipline: Discipline,
    pub start_time: f64,
    pub end_time: f64,
    pub duration: f64,
    pub rank: i64,
    pub points: i64,
    pub created_at: String,
}

/// Candidate row for insertion; the store assigns id and created_at.
#[derive(Debug, Clone)]
pub struct NewRun {
    pub map_id: i64,
    pub player_id: i64,
    pub discipline: Discipline,
    pub start_time: f64,
    pub end_time: f64,
    pub duration: f64,
}

/// One row of a bulk rank/points rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankUpdate {
    pub run_id: i64,
    pub rank: i64,
    pub points: i64,
}
