//! SQLite adapter: persisted implementation of `HistoryStore`.
//!
//! Reports are stored append-only in a single table; the rowid gives
//! insertion order, which is the ledger's chronological order. There is
//! deliberately no per-row delete — the only mutations are `append` and
//! the whole-table `clear_all`, matching the ledger contract.
//!
//! # Mutex Behavior
//!
//! The connection is protected by a `Mutex`. A poisoned mutex (from a
//! panic in another thread) surfaces as `StorageError::LockPoisoned`
//! rather than corrupting the ledger.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection};

use crate::domain::PatientReport;
use crate::ports::HistoryStore;

use super::StorageError;

/// SQLite-backed history store.
pub struct SqliteHistory {
    conn: Mutex<Connection>,
}

impl SqliteHistory {
    /// Open (or create) a history database at the given path.
    ///
    /// # Errors
    /// Returns error if the database cannot be opened or initialized.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory history database (for testing).
    ///
    /// # Errors
    /// Returns error if the database cannot be created.
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), StorageError> {
        let conn = self.conn.lock()?;

        conn.execute_batch(
            r"
            CREATE TABLE IF NOT EXISTS reports (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                report_id TEXT NOT NULL,
                risk_level TEXT NOT NULL,
                probability REAL NOT NULL,
                generated_at TEXT NOT NULL,
                report_json TEXT NOT NULL
            );
            ",
        )?;

        Ok(())
    }

    fn row_to_report(json: &str) -> Result<PatientReport, StorageError> {
        serde_json::from_str(json).map_err(|e| StorageError::Serialization(e.to_string()))
    }
}

impl HistoryStore for SqliteHistory {
    type Error = StorageError;

    fn append(&self, report: &PatientReport) -> Result<(), Self::Error> {
        let json = serde_json::to_string(report)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        let conn = self.conn.lock()?;
        conn.execute(
            r"
            INSERT INTO reports (report_id, risk_level, probability, generated_at, report_json)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ",
            params![
                report.id().as_str(),
                report.assessment().risk_tier().label(),
                report.assessment().positive_class_probability(),
                report.generated_at().to_rfc3339(),
                json,
            ],
        )?;

        tracing::debug!("Appended report {} to history", report.id().short());
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<PatientReport>, Self::Error> {
        let conn = self.conn.lock()?;

        let mut stmt =
            conn.prepare("SELECT report_json FROM reports ORDER BY seq ASC")?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        drop(stmt);
        drop(conn);

        rows.iter().map(|json| Self::row_to_report(json)).collect()
    }

    fn last(&self, n: usize) -> Result<Vec<PatientReport>, Self::Error> {
        let conn = self.conn.lock()?;

        let mut stmt = conn.prepare(
            "SELECT report_json FROM reports ORDER BY seq DESC LIMIT ?1",
        )?;
        let mut rows = stmt
            .query_map(params![n as i64], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        drop(stmt);
        drop(conn);

        // Query returned newest-first; the contract is chronological.
        rows.reverse();
        rows.iter().map(|json| Self::row_to_report(json)).collect()
    }

    fn count(&self) -> Result<usize, Self::Error> {
        let conn = self.conn.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM reports", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn clear_all(&self) -> Result<(), Self::Error> {
        let conn = self.conn.lock()?;
        conn.execute("DELETE FROM reports", [])?;
        tracing::warn!("Cleared all reports from history storage");
        Ok(())
    }
}
