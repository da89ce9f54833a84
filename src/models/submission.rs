use serde::{Deserialize, Serialize};

use crate::models::run::Discipline;

#[derive(Debug, Clone, Deserialize)]
pub struct RunSubmission {
    pub map_id: i64,
    pub player_id: i64,
    pub discipline: Discipline,
    pub start_time: f64,
    pub end_time: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionOutcome {
    Added,
    Updated,
    Unchanged,
}

/// Current record-holder duration per discipline on one map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapRecords {
    pub soldier: Option<f64>,
    pub demoman: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmissionResult {
    pub outcome: SubmissionOutcome,
    /// Duration of the submitted run itself, accepted or not.
    pub duration: f64,
    pub completions: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<i64>,
    pub points_gained: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub improvement: Option<f64>,
    pub records: MapRecords,
}
