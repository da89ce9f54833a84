use crate::error::EngineError;
use crate::models::run::{Discipline, RankUpdate, Run};
use crate::points::calc_points;
use crate::store::RecordStore;

/// Re-sort and re-score one (map, discipline) leaderboard, writing every
/// rank/points pair back in a single bulk update. Returns the rows in rank
/// order so the caller can read the fresh rank of any player without another
/// store round trip.
///
/// Ties on duration break by ascending run id: replacement inserts a fresh
/// row, so ids order runs by when they became the current PB and the earlier
/// one keeps the better rank.
pub fn recompute<S: RecordStore + ?Sized>(
    store: &S,
    map_id: i64,
    discipline: Discipline,
) -> Result<Vec<Run>, EngineError> {
    let mut rows = store.list_leaderboard(map_id, discipline)?;
    if rows.is_empty() {
        tracing::error!(
            map_id,
            discipline = discipline.name(),
            "rank recomputation invoked on an empty leaderboard"
        );
        return Err(EngineError::Domain(format!(
            "no runs to rank for map {} discipline {}",
            map_id,
            discipline.name()
        )));
    }

    rows.sort_by(|a, b| a.duration.total_cmp(&b.duration).then(a.id.cmp(&b.id)));

    let completions = rows.len() as i64;
    let record_duration = rows[0].duration;
    let mut updates = Vec::with_capacity(rows.len());
    for (i, run) in rows.iter_mut().enumerate() {
        run.rank = i as i64 + 1;
        run.points = calc_points(record_duration, run.duration, completions)?;
        updates.push(RankUpdate {
            run_id: run.id,
            rank: run.rank,
            points: run.points,
        });
    }

    store.bulk_update_rank_and_points(map_id, discipline, &updates)?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Db;
    use crate::models::run::NewRun;
    use proptest::prelude::*;

    fn seed(db: &Db, player_id: i64, duration: f64) {
        db.replace_personal_best(&NewRun {
            map_id: 1,
            player_id,
            discipline: Discipline::Soldier,
            start_time: 0.0,
            end_time: duration,
            duration,
        })
        .unwrap();
    }

    #[test]
    fn ranks_are_contiguous_and_duration_ordered() {
        let db = Db::open_in_memory().unwrap();
        seed(&db, 1, 150.0);
        seed(&db, 2, 90.0);
        seed(&db, 3, 100.0);

        let ranked = recompute(&db, 1, Discipline::Soldier).unwrap();
        let by_player: Vec<(i64, i64, i64)> = ranked
            .iter()
            .map(|r| (r.player_id, r.rank, r.points))
            .collect();
        assert_eq!(
            by_player,
            vec![(2, 1, 1220), (3, 2, 1087), (1, 3, 704)]
        );

        // and the bulk write landed
        let stored = db.personal_best(1, 2, Discipline::Soldier).unwrap().unwrap();
        assert_eq!((stored.rank, stored.points), (1, 1220));
    }

    #[test]
    fn equal_durations_break_by_run_id() {
        let db = Db::open_in_memory().unwrap();
        seed(&db, 1, 100.0);
        seed(&db, 2, 100.0);

        let ranked = recompute(&db, 1, Discipline::Soldier).unwrap();
        assert_eq!(ranked[0].player_id, 1);
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[1].player_id, 2);
        assert_eq!(ranked[1].rank, 2);
        // worse rank, same duration: points still not above the record's
        assert!(ranked[1].points <= ranked[0].points);
    }

    #[test]
    fn empty_leaderboard_is_a_domain_error() {
        let db = Db::open_in_memory().unwrap();
        assert!(matches!(
            recompute(&db, 1, Discipline::Soldier),
            Err(EngineError::Domain(_))
        ));
    }

    proptest! {
        #[test]
        fn ranks_cover_1_to_n_and_points_never_increase(
            durations in proptest::collection::hash_set(1u32..1_000_000, 1..40)
        ) {
            let db = Db::open_in_memory().unwrap();
            for (i, d) in durations.iter().enumerate() {
                seed(&db, i as i64 + 1, *d as f64 / 10.0);
            }

            let ranked = recompute(&db, 1, Discipline::Soldier).unwrap();
            prop_assert_eq!(ranked.len(), durations.len());
            for (i, run) in ranked.iter().enumerate() {
                prop_assert_eq!(run.rank, i as i64 + 1);
                if i > 0 {
                    prop_assert!(run.duration >= ranked[i - 1].duration);
                    prop_assert!(run.points <= ranked[i - 1].points);
                }
            }
        }
    }
}
