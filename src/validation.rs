use crate::error::EngineError;
use crate::models::run::Discipline;

const MAX_LEADERBOARD_LIMIT: i64 = 100;

pub fn validate_time_range(start_time: f64, end_time: f64) -> Result<(), EngineError> {
    // Written so NaN in either endpoint also fails.
    if !(end_time >= start_time) {
        return Err(EngineError::Validation(format!(
            "end_time {} must not be earlier than start_time {}",
            end_time, start_time
        )));
    }
    Ok(())
}

pub fn validate_player_class(class_index: i64) -> Result<Discipline, EngineError> {
    Discipline::from_class_index(class_index)
}

pub fn clamp_limit(limit: i64) -> i64 {
    limit.clamp(1, MAX_LEADERBOARD_LIMIT)
}
