use std::sync::Arc;
use std::time::Duration;

use crate::error::EngineError;
use crate::locks::LeaderboardLocks;
use crate::models::run::{Discipline, NewRun, Run};
use crate::models::submission::{MapRecords, RunSubmission, SubmissionOutcome, SubmissionResult};
use crate::services::ranking;
use crate::store::RecordStore;
use crate::validation;

const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Submission gate for all leaderboards. One `submit` at a time per
/// (map, discipline) key; different keys run in parallel.
pub struct Engine<S: RecordStore> {
    store: Arc<S>,
    locks: LeaderboardLocks,
    lock_timeout: Duration,
}

impl<S: RecordStore> Engine<S> {
    pub fn new(store: Arc<S>) -> Self {
        Engine {
            store,
            locks: LeaderboardLocks::default(),
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    pub fn with_lock_timeout(store: Arc<S>, lock_timeout: Duration) -> Self {
        Engine {
            store,
            locks: LeaderboardLocks::default(),
            lock_timeout,
        }
    }

    /// Apply the replace-only-if-faster policy, rerank on any accepted
    /// change, and report the result. Blocks at most `lock_timeout` waiting
    /// for the leaderboard's serialization lock.
    pub async fn submit(&self, req: RunSubmission) -> Result<SubmissionResult, EngineError> {
        validation::validate_time_range(req.start_time, req.end_time)?;
        let duration = req.end_time - req.start_time;
        // A zero-length run can never be scored (it would become a
        // non-positive record): reject it before anything is written.
        if duration <= 0.0 {
            return Err(EngineError::Domain(format!(
                "run duration must be positive, got {}",
                duration
            )));
        }

        let lock = self.locks.for_key((req.map_id, req.discipline));
        let _guard = tokio::time::timeout(self.lock_timeout, lock.lock_owned())
            .await
            .map_err(|_| {
                EngineError::Busy(format!(
                    "timed out waiting for leaderboard map {} discipline {}",
                    req.map_id,
                    req.discipline.name()
                ))
            })?;

        let existing = self
            .store
            .personal_best(req.map_id, req.player_id, req.discipline)?;

        match existing {
            None => self.accept(&req, duration, SubmissionOutcome::Added, 0, None),
            Some(pb) if duration < pb.duration => {
                let improvement = pb.duration - duration;
                self.accept(
                    &req,
                    duration,
                    SubmissionOutcome::Updated,
                    pb.points,
                    Some(improvement),
                )
            }
            Some(_) => {
                // Slower than the standing PB: nothing in the store moves.
                let completions =
                    self.store.list_leaderboard(req.map_id, req.discipline)?.len() as i64;
                Ok(SubmissionResult {
                    outcome: SubmissionOutcome::Unchanged,
                    duration,
                    completions,
                    rank: None,
                    points_gained: 0,
                    improvement: None,
                    records: self.map_records(req.map_id)?,
                })
            }
        }
    }

    fn accept(
        &self,
        req: &RunSubmission,
        duration: f64,
        outcome: SubmissionOutcome,
        old_points: i64,
        improvement: Option<f64>,
    ) -> Result<SubmissionResult, EngineError> {
        self.store.replace_personal_best(&NewRun {
            map_id: req.map_id,
            player_id: req.player_id,
            discipline: req.discipline,
            start_time: req.start_time,
            end_time: req.end_time,
            duration,
        })?;

        let ranked = ranking::recompute(&*self.store, req.map_id, req.discipline)?;
        let own = ranked
            .iter()
            .find(|r| r.player_id == req.player_id)
            .ok_or_else(|| {
                EngineError::Domain(format!(
                    "player {} missing from leaderboard it was just written to",
                    req.player_id
                ))
            })?;

        tracing::info!(
            map_id = req.map_id,
            player_id = req.player_id,
            discipline = req.discipline.name(),
            duration,
            rank = own.rank,
            "run accepted"
        );

        Ok(SubmissionResult {
            outcome,
            duration,
            completions: ranked.len() as i64,
            rank: Some(own.rank),
            points_gained: own.points - old_points,
            improvement,
            records: self.map_records(req.map_id)?,
        })
    }

    /// Ranked runs for one leaderboard page, ascending by rank starting at
    /// `start_rank`. Read-only; takes no leaderboard lock.
    pub fn get_leaderboard(
        &self,
        map_id: i64,
        discipline: Discipline,
        start_rank: i64,
        limit: i64,
    ) -> Result<Vec<Run>, EngineError> {
        let start_rank = start_rank.max(1);
        let limit = validation::clamp_limit(limit);

        let mut rows = self.store.list_leaderboard(map_id, discipline)?;
        rows.sort_by_key(|r| r.rank);
        Ok(rows
            .into_iter()
            .filter(|r| r.rank >= start_rank)
            .take(limit as usize)
            .collect())
    }

    fn map_records(&self, map_id: i64) -> Result<MapRecords, EngineError> {
        let mut records = MapRecords {
            soldier: None,
            demoman: None,
        };
        for discipline in Discipline::ALL {
            let best = self
                .store
                .list_leaderboard(map_id, discipline)?
                .into_iter()
                .min_by(|a, b| a.duration.total_cmp(&b.duration).then(a.id.cmp(&b.id)))
                .map(|r| r.duration);
            match discipline {
                Discipline::Soldier => records.soldier = best,
                Discipline::Demoman => records.demoman = best,
            }
        }
        Ok(records)
    }
}
