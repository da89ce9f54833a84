use crate::error::EngineError;
use crate::models::run::{Discipline, NewRun, RankUpdate, Run};

/// Persistence contract the engine runs against. `Db` is the sqlite
/// implementation; tests and other backends can supply their own.
///
/// `replace_personal_best` and `bulk_update_rank_and_points` must be atomic:
/// either every row change commits or none does.
pub trait RecordStore: Send + Sync {
    fn personal_best(
        &self,
        map_id: i64,
        player_id: i64,
        discipline: Discipline,
    ) -> Result<Option<Run>, EngineError>;

    /// All runs for one (map, discipline) leaderboard, in storage order.
    /// Callers re-sort; no ordering is guaranteed here.
    fn list_leaderboard(&self, map_id: i64, discipline: Discipline)
        -> Result<Vec<Run>, EngineError>;

    /// Delete any existing PB for the candidate's (map, player, discipline)
    /// key and insert the candidate, as one unit.
    fn replace_personal_best(&self, candidate: &NewRun) -> Result<(), EngineError>;

    /// Apply every rank/points update as one unit. A leaderboard must never
    /// be observable half-rewritten.
    fn bulk_update_rank_and_points(
        &self,
        map_id: i64,
        discipline: Discipline,
        updates: &[RankUpdate],
    ) -> Result<(), EngineError>;
}
