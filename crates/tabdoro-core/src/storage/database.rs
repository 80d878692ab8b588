//! SQLite-based phase history and key-value state.
//!
//! Provides persistent storage for:
//! - Completed Pomodoro phases
//! - Phase statistics (daily and all-time)
//! - Key-value store for session state

use chrono::{DateTime, Local, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::{CoreError, StoreError};
use crate::storage::store::KvStore;
use crate::timer::Phase;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseRecord {
    pub id: i64,
    pub phase: String,
    pub duration_secs: u64,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Stats {
    pub total_phases: u64,
    pub work_min: u64,
    pub break_min: u64,
    /// One per recorded completed work phase.
    pub completed_work_sessions: u64,
}

/// SQLite database for phase history and session state.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/tabdoro/tabdoro.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, CoreError> {
        let path = data_dir()?.join("tabdoro.db");
        let conn = Connection::open(&path).map_err(|source| StoreError::OpenFailed {
            path: path.clone(),
            source,
        })?;
        // Concurrent CLI invocations share this file; wait out short locks.
        conn.busy_timeout(std::time::Duration::from_secs(5))
            .map_err(|source| StoreError::OpenFailed {
                path: path.clone(),
                source,
            })?;
        let db = Self { conn };
        db.migrate().map_err(|source| StoreError::OpenFailed {
            path,
            source,
        })?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, CoreError> {
        let conn = Connection::open_in_memory().map_err(|source| StoreError::OpenFailed {
            path: ":memory:".into(),
            source,
        })?;
        let db = Self { conn };
        db.migrate().map_err(|source| StoreError::OpenFailed {
            path: ":memory:".into(),
            source,
        })?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS phases (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                phase         TEXT NOT NULL,
                duration_secs INTEGER NOT NULL,
                started_at    TEXT NOT NULL,
                completed_at  TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_phases_completed_at ON phases(completed_at);
            CREATE INDEX IF NOT EXISTS idx_phases_phase ON phases(phase);",
        )
    }

    /// Record a completed phase.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub fn record_phase(
        &self,
        phase: Phase,
        duration_secs: u64,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> Result<i64, rusqlite::Error> {
        self.conn.execute(
            "INSERT INTO phases (phase, duration_secs, started_at, completed_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                phase.as_str(),
                duration_secs,
                started_at.to_rfc3339(),
                completed_at.to_rfc3339(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// All-time statistics.
    pub fn stats_all(&self) -> Result<Stats, rusqlite::Error> {
        self.stats_since(None)
    }

    /// Statistics since local midnight.
    pub fn stats_today(&self) -> Result<Stats, rusqlite::Error> {
        let midnight = Local::now()
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .and_then(|t| t.and_local_timezone(Local).earliest())
            .map(|t| t.with_timezone(&Utc));
        self.stats_since(midnight)
    }

    fn stats_since(&self, cutoff: Option<DateTime<Utc>>) -> Result<Stats, rusqlite::Error> {
        let cutoff = cutoff
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| String::from(""));
        let mut stmt = self.conn.prepare(
            "SELECT
                COUNT(*),
                COALESCE(SUM(CASE WHEN phase = 'work' THEN duration_secs ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN phase != 'work' THEN duration_secs ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN phase = 'work' THEN 1 ELSE 0 END), 0)
             FROM phases WHERE completed_at >= ?1",
        )?;
        stmt.query_row(params![cutoff], |row| {
            Ok(Stats {
                total_phases: row.get::<_, i64>(0)? as u64,
                work_min: row.get::<_, i64>(1)? as u64 / 60,
                break_min: row.get::<_, i64>(2)? as u64 / 60,
                completed_work_sessions: row.get::<_, i64>(3)? as u64,
            })
        })
    }

    /// Most recent recorded phases, newest first.
    pub fn recent_phases(&self, limit: u32) -> Result<Vec<PhaseRecord>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT id, phase, duration_secs, started_at, completed_at
             FROM phases ORDER BY completed_at DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;
        let mut records = Vec::new();
        for row in rows {
            let (id, phase, duration_secs, started_at, completed_at) = row?;
            records.push(PhaseRecord {
                id,
                phase,
                duration_secs: duration_secs as u64,
                started_at: parse_timestamp(&started_at)?,
                completed_at: parse_timestamp(&completed_at)?,
            });
        }
        Ok(records)
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })
}

impl KvStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM kv WHERE key = ?1")
            .map_err(|e| StoreError::ReadFailed {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        match stmt.query_row(params![key], |row| row.get::<_, String>(0)) {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(StoreError::ReadFailed {
                key: key.to_string(),
                message: e.to_string(),
            }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
                params![key, value],
            )
            .map_err(|e| StoreError::WriteFailed {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }
}
