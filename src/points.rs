use crate::error::EngineError;

/// Record-relative point scaling. The record holder of an n-completion
/// leaderboard earns `200 * (5 + ln(n))`; slower runs are scaled down by
/// how far they trail the record, weighted by ln(n).
pub fn calc_points(
    record_duration: f64,
    run_duration: f64,
    completions: i64,
) -> Result<i64, EngineError> {
    if record_duration <= 0.0 {
        return Err(EngineError::Domain(format!(
            "record duration must be positive, got {}",
            record_duration
        )));
    }
    if run_duration < record_duration {
        return Err(EngineError::Domain(format!(
            "run duration {} is faster than the record {} it is scored against",
            run_duration, record_duration
        )));
    }

    let ln_n = (completions as f64).ln();
    let base = 200.0 * (5.0 + ln_n);
    let scale = record_duration / (record_duration + (run_duration - record_duration) * ln_n);
    Ok((base * scale).round() as i64)
}
