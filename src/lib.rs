//! Ranking and scoring engine for jump-run leaderboards: personal-best
//! replacement, rank recomputation, and record-relative points.

pub mod db;
pub mod error;
pub mod locks;
pub mod models;
pub mod points;
pub mod services;
pub mod store;
pub mod validation;

pub use db::Db;
pub use error::EngineError;
pub use models::run::{Discipline, NewRun, RankUpdate, Run};
pub use models::submission::{MapRecords, RunSubmission, SubmissionOutcome, SubmissionResult};
pub use services::submission::Engine;
pub use store::RecordStore;
