use chrono::Utc;
use rusqlite::{params, Connection, Row};
use std::sync::Mutex;

use crate::error::EngineError;
use crate::models::run::{Discipline, NewRun, RankUpdate, Run};
use crate::store::RecordStore;

const SCHEMA: &str = include_str!("schema.sql");

pub struct Db {
    conn: Mutex<Connection>,
}

impl Db {
    pub fn open(path: &str) -> Result<Self, rusqlite::Error> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA busy_timeout=5000;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Db {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self, rusqlite::Error> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Db {
            conn: Mutex::new(conn),
        })
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T, rusqlite::Error>
    where
        F: FnOnce(&mut Connection) -> Result<T, rusqlite::Error>,
    {
        let mut conn = self.conn.lock().unwrap();
        f(&mut conn)
    }
}

fn run_from_row(row: &Row<'_>) -> Result<Run, rusqlite::Error> {
    let class_index: i64 = row.get(3)?;
    let discipline = Discipline::from_class_index(class_index).map_err(|_| {
        rusqlite::Error::IntegralValueOutOfRange(3, class_index)
    })?;
    Ok(Run {
        id: row.get(0)?,
        map_id: row.get(1)?,
        player_id: row.get(2)?,
        discipline,
        start_time: row.get(4)?,
        end_time: row.get(5)?,
        duration: row.get(6)?,
        rank: row.get(7)?,
        points: row.get(8)?,
        created_at: row.get(9)?,
    })
}

const RUN_COLUMNS: &str = "id, map_id, player_id, discipline, start_time, end_time, \
     duration, rank, points, created_at";

impl RecordStore for Db {
    fn personal_best(
        &self,
        map_id: i64,
        player_id: i64,
        discipline: Discipline,
    ) -> Result<Option<Run>, EngineError> {
        Ok(self.with_conn(|conn| {
            conn.query_row(
                &format!(
                    "SELECT {} FROM runs WHERE map_id = ?1 AND player_id = ?2 AND discipline = ?3",
                    RUN_COLUMNS
                ),
                params![map_id, player_id, discipline.class_index()],
                run_from_row,
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other),
            })
        })?)
    }

    fn list_leaderboard(
        &self,
        map_id: i64,
        discipline: Discipline,
    ) -> Result<Vec<Run>, EngineError> {
        Ok(self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM runs WHERE map_id = ?1 AND discipline = ?2",
                RUN_COLUMNS
            ))?;
            let rows = stmt.query_map(params![map_id, discipline.class_index()], run_from_row)?;
            rows.collect()
        })?)
    }

    fn replace_personal_best(&self, candidate: &NewRun) -> Result<(), EngineError> {
        let created_at = Utc::now().to_rfc3339();
        Ok(self.with_conn(|conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "DELETE FROM runs WHERE map_id = ?1 AND player_id = ?2 AND discipline = ?3",
                params![
                    candidate.map_id,
                    candidate.player_id,
                    candidate.discipline.class_index()
                ],
            )?;
            tx.execute(
                "INSERT INTO runs (map_id, player_id, discipline, start_time, end_time, \
                 duration, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    candidate.map_id,
                    candidate.player_id,
                    candidate.discipline.class_index(),
                    candidate.start_time,
                    candidate.end_time,
                    candidate.duration,
                    created_at,
                ],
            )?;
            tx.commit()
        })?)
    }

    fn bulk_update_rank_and_points(
        &self,
        map_id: i64,
        discipline: Discipline,
        updates: &[RankUpdate],
    ) -> Result<(), EngineError> {
        Ok(self.with_conn(|conn| {
            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare(
                    "UPDATE runs SET rank = ?1, points = ?2 \
                     WHERE id = ?3 AND map_id = ?4 AND discipline = ?5",
                )?;
                for update in updates {
                    stmt.execute(params![
                        update.rank,
                        update.points,
                        update.run_id,
                        map_id,
                        discipline.class_index(),
                    ])?;
                }
            }
            tx.commit()
        })?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_run(map_id: i64, player_id: i64, duration: f64) -> NewRun {
        NewRun {
            map_id,
            player_id,
            discipline: Discipline::Soldier,
            start_time: 1000.0,
            end_time: 1000.0 + duration,
            duration,
        }
    }

    #[test]
    fn schema_applies() {
        let db = Db::open_in_memory().unwrap();
        db.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='runs'",
                [],
                |row| row.get(0),
            )?;
            assert_eq!(count, 1);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn personal_best_absent_then_present() {
        let db = Db::open_in_memory().unwrap();
        assert!(db
            .personal_best(1, 7, Discipline::Soldier)
            .unwrap()
            .is_none());

        db.replace_personal_best(&new_run(1, 7, 120.0)).unwrap();
        let pb = db.personal_best(1, 7, Discipline::Soldier).unwrap().unwrap();
        assert_eq!(pb.duration, 120.0);
        assert_eq!(pb.player_id, 7);
        assert!(!pb.created_at.is_empty());
    }

    #[test]
    fn replace_keeps_one_row_per_key() {
        let db = Db::open_in_memory().unwrap();
        db.replace_personal_best(&new_run(1, 7, 120.0)).unwrap();
        db.replace_personal_best(&new_run(1, 7, 110.0)).unwrap();

        let rows = db.list_leaderboard(1, Discipline::Soldier).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].duration, 110.0);
    }

    #[test]
    fn replacement_rows_get_fresh_ids() {
        let db = Db::open_in_memory().unwrap();
        db.replace_personal_best(&new_run(1, 7, 120.0)).unwrap();
        let first = db.personal_best(1, 7, Discipline::Soldier).unwrap().unwrap();
        db.replace_personal_best(&new_run(1, 7, 110.0)).unwrap();
        let second = db.personal_best(1, 7, Discipline::Soldier).unwrap().unwrap();
        assert!(second.id > first.id);
    }

    #[test]
    fn disciplines_are_separate_keys() {
        let db = Db::open_in_memory().unwrap();
        db.replace_personal_best(&new_run(1, 7, 120.0)).unwrap();
        let mut demo = new_run(1, 7, 150.0);
        demo.discipline = Discipline::Demoman;
        db.replace_personal_best(&demo).unwrap();

        assert_eq!(db.list_leaderboard(1, Discipline::Soldier).unwrap().len(), 1);
        assert_eq!(db.list_leaderboard(1, Discipline::Demoman).unwrap().len(), 1);
    }

    #[test]
    fn bulk_update_applies_all_rows() {
        let db = Db::open_in_memory().unwrap();
        db.replace_personal_best(&new_run(1, 7, 120.0)).unwrap();
        db.replace_personal_best(&new_run(1, 8, 100.0)).unwrap();
        let rows = db.list_leaderboard(1, Discipline::Soldier).unwrap();

        let updates: Vec<RankUpdate> = rows
            .iter()
            .map(|r| RankUpdate {
                run_id: r.id,
                rank: if r.player_id == 8 { 1 } else { 2 },
                points: if r.player_id == 8 { 1139 } else { 846 },
            })
            .collect();
        db.bulk_update_rank_and_points(1, Discipline::Soldier, &updates)
            .unwrap();

        let rows = db.list_leaderboard(1, Discipline::Soldier).unwrap();
        let fastest = rows.iter().find(|r| r.player_id == 8).unwrap();
        assert_eq!((fastest.rank, fastest.points), (1, 1139));
    }
}
