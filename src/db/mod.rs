//! Database module - SQLite storage for session slots and workout history

use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};

/// Finished workout record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedWorkout {
    pub id: Option<i64>,
    pub date: DateTime<Utc>,
    pub workout_id: String,
    pub workout_name: String,
    pub exercises: i32,
    pub elapsed_secs: Option<i64>, // None when the timer was never started
}

/// Database wrapper
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Throwaway database, nothing hits the disk
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Initialize database schema
    fn init_schema(&self) -> Result<()> {
        // Key-value slots, same role as the browser's local storage
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS storage (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS workout_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date TEXT NOT NULL,
                workout_id TEXT NOT NULL,
                workout_name TEXT NOT NULL,
                exercises INTEGER NOT NULL,
                elapsed_secs INTEGER
            )",
            [],
        )?;

        Ok(())
    }

    /// Read a slot
    pub fn get_item(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM storage WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Overwrite a slot wholesale
    pub fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO storage (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn remove_item(&self, key: &str) -> Result<()> {
        self.conn.execute("DELETE FROM storage WHERE key = ?1", params![key])?;
        Ok(())
    }

    /// Add finished workout
    pub fn add_completed_workout(&self, workout: &CompletedWorkout) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO workout_history (date, workout_id, workout_name, exercises, elapsed_secs) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                workout.date.to_rfc3339(),
                workout.workout_id,
                workout.workout_name,
                workout.exercises,
                workout.elapsed_secs,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Get all finished workouts, newest first
    pub fn get_completed_workouts(&self) -> Result<Vec<CompletedWorkout>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, date, workout_id, workout_name, exercises, elapsed_secs FROM workout_history ORDER BY date DESC"
        )?;

        let workouts = stmt.query_map([], |row| {
            let date_str: String = row.get(1)?;
            Ok(CompletedWorkout {
                id: Some(row.get(0)?),
                date: DateTime::parse_from_rfc3339(&date_str)
                    .map(|d| d.with_timezone(&Utc))
                    .unwrap_or_else(|_| Utc::now()),
                workout_id: row.get(2)?,
                workout_name: row.get(3)?,
                exercises: row.get(4)?,
                elapsed_secs: row.get(5)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

        Ok(workouts)
    }
}
