use chrono::{DateTime, Local, SecondsFormat, Utc};
use log::debug;
use rusqlite::{params, Connection};
use std::path::Path;

use crate::error::Result;
use crate::practice::Run;

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS practice_runs (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        -- UTC, fixed width, so text order is time order
        started_at TEXT NOT NULL,
        total INTEGER NOT NULL,
        correct INTEGER NOT NULL,
        incorrect INTEGER NOT NULL,
        categories TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS practice_mistakes (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        run_id INTEGER NOT NULL REFERENCES practice_runs(id) ON DELETE CASCADE,
        hiragana TEXT NOT NULL,
        romaji TEXT NOT NULL,
        input TEXT NOT NULL,
        attempts INTEGER NOT NULL,
        time_spent_ms INTEGER NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_practice_mistakes_romaji ON practice_mistakes(romaji);
    CREATE INDEX IF NOT EXISTS idx_practice_runs_started_at ON practice_runs(started_at);
"#;

/// Sortable text form of a run start: UTC, microseconds, `Z` suffix
fn timestamp_key(at: &DateTime<Local>) -> String {
    at.with_timezone(&Utc)
        .to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// One stored run, without its mistakes
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub id: i64,
    pub started_at: DateTime<Local>,
    pub total: i64,
    pub correct: i64,
    pub incorrect: i64,
    pub categories: Vec<String>,
}

impl RunSummary {
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64 * 100.0
        }
    }
}

/// SQLite store of completed practice runs
#[derive(Debug)]
pub struct HistoryDb {
    conn: Connection,
}

impl HistoryDb {
    /// Open (creating if needed) the database file at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Store a run and its mistakes; returns the new run id
    pub fn record_run(&mut self, run: &Run) -> Result<i64> {
        let tx = self.conn.transaction()?;

        tx.execute(
            r#"
            INSERT INTO practice_runs (started_at, total, correct, incorrect, categories)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                timestamp_key(&run.started_at),
                run.total as i64,
                run.correct as i64,
                run.incorrect as i64,
                run.categories.join(","),
            ],
        )?;
        let run_id = tx.last_insert_rowid();

        for mistake in &run.mistakes {
            tx.execute(
                r#"
                INSERT INTO practice_mistakes
                (run_id, hiragana, romaji, input, attempts, time_spent_ms)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
                params![
                    run_id,
                    mistake.character.hiragana,
                    mistake.character.romaji,
                    mistake.input,
                    mistake.attempts,
                    mistake.time_spent.as_millis() as i64,
                ],
            )?;
        }

        tx.commit()?;
        Ok(run_id)
    }

    /// Store a run, then drop runs beyond the `keep` most recent
    pub fn record_and_prune(&mut self, run: &Run, keep: usize) -> Result<i64> {
        let id = self.record_run(run)?;
        let removed = self.prune(keep)?;
        if removed > 0 {
            debug!("pruned {removed} old practice runs");
        }
        Ok(id)
    }

    /// Most recent runs first
    pub fn recent_runs(&self, limit: usize) -> Result<Vec<RunSummary>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, started_at, total, correct, incorrect, categories
            FROM practice_runs
            ORDER BY started_at DESC, id DESC
            LIMIT ?1
            "#,
        )?;

        let rows = stmt.query_map([limit as i64], |row| {
            let started_at: String = row.get(1)?;
            let started_at = DateTime::parse_from_rfc3339(&started_at)
                .map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        1,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })?
                .with_timezone(&Local);
            let categories: String = row.get(5)?;

            Ok(RunSummary {
                id: row.get(0)?,
                started_at,
                total: row.get(2)?,
                correct: row.get(3)?,
                incorrect: row.get(4)?,
                categories: categories
                    .split(',')
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect(),
            })
        })?;

        let mut runs = Vec::new();
        for run in rows {
            runs.push(run?);
        }
        Ok(runs)
    }

    /// Stored mistakes per romaji, most missed first
    pub fn mistake_totals(&self) -> Result<Vec<(String, i64)>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT romaji, COUNT(*) AS misses
            FROM practice_mistakes
            GROUP BY romaji
            ORDER BY misses DESC, romaji ASC
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;
        let mut totals = Vec::new();
        for row in rows {
            totals.push(row?);
        }
        Ok(totals)
    }

    /// Delete all but the `keep` most recent runs
    pub fn prune(&self, keep: usize) -> Result<usize> {
        let removed = self.conn.execute(
            r#"
            DELETE FROM practice_runs WHERE id NOT IN (
                SELECT id FROM practice_runs ORDER BY started_at DESC, id DESC LIMIT ?1
            )
            "#,
            [keep as i64],
        )?;
        Ok(removed)
    }

    /// Delete every run and its mistakes; returns the number of runs removed
    pub fn clear(&self) -> Result<usize> {
        Ok(self.conn.execute("DELETE FROM practice_runs", [])?)
    }
}
