//! Test utilities for seedline integration tests.
//!
//! Provides:
//! - Temporary database and script fixtures
//! - A connection wrapper that records commits and autocommit changes
//! - An observer that records every notification

#![allow(dead_code)]

use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use tempfile::TempDir;

use seedline::connection::{BatchError, Connection};
use seedline::{DriverError, Encoding, ScriptReport, SkippedStatement, SqliteConnection};

/// Test fixture that manages a temporary database directory.
///
/// The directory is automatically cleaned up when the fixture is dropped.
pub struct TestFixture {
    /// Temporary directory for test database and scripts
    pub temp_dir: TempDir,
    /// Path to the database file
    pub db_path: PathBuf,
}

impl TestFixture {
    /// Create a new test fixture with a temporary database directory.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");
        Self { temp_dir, db_path }
    }

    /// Write a script file into the fixture directory.
    pub fn write_script(&self, name: &str, lines: &[&str]) -> PathBuf {
        let mut content = lines.join("\n");
        content.push('\n');
        self.write_bytes(name, content.as_bytes())
    }

    /// Write raw script bytes into the fixture directory.
    pub fn write_bytes(&self, name: &str, bytes: &[u8]) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        fs::write(&path, bytes).expect("failed to write script");
        path
    }

    /// Open a connection to the fixture database.
    pub fn open(&self) -> SqliteConnection {
        SqliteConnection::open(&self.db_path).expect("failed to open database")
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Number of rows in `table`.
pub fn count_rows(conn: &SqliteConnection, table: &str) -> i64 {
    conn.inner()
        .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
        .expect("count query failed")
}

/// Whether `table` exists in the main schema.
pub fn table_exists(conn: &SqliteConnection, table: &str) -> bool {
    conn.inner()
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [table],
            |row| row.get::<_, i64>(0),
        )
        .expect("schema query failed")
        > 0
}

/// SQLite connection that counts the calls the populator makes.
pub struct RecordingConnection {
    pub inner: SqliteConnection,
    pub commits: usize,
    pub batches: Vec<usize>,
    pub autocommit_changes: Vec<bool>,
    pub opens: usize,
    pub closes: usize,
    pub fail_close: bool,
}

impl RecordingConnection {
    pub fn new(inner: SqliteConnection) -> Self {
        Self {
            inner,
            commits: 0,
            batches: Vec::new(),
            autocommit_changes: Vec::new(),
            opens: 0,
            closes: 0,
            fail_close: false,
        }
    }
}

impl Connection for RecordingConnection {
    fn autocommit(&self) -> Result<bool, DriverError> {
        self.inner.autocommit()
    }

    fn set_autocommit(&mut self, autocommit: bool) -> Result<(), DriverError> {
        self.autocommit_changes.push(autocommit);
        self.inner.set_autocommit(autocommit)
    }

    fn open_batch(&mut self) -> Result<(), DriverError> {
        self.opens += 1;
        self.inner.open_batch()
    }

    fn execute_batch(&mut self, statements: &[&str]) -> Result<(), BatchError> {
        self.batches.push(statements.len());
        self.inner.execute_batch(statements)
    }

    fn commit(&mut self) -> Result<(), DriverError> {
        self.commits += 1;
        self.inner.commit()
    }

    fn close_batch(&mut self) -> Result<(), DriverError> {
        self.closes += 1;
        if self.fail_close {
            return Err(DriverError::new("could not close statement"));
        }
        self.inner.close_batch()
    }
}

/// One notification received by [`RecordingObserver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Started { script: String, encoding: Encoding },
    Finished { script: String, statements: usize },
    Skipped { line: usize, statement: String },
    CleanupFailed { operation: String },
}

/// Observer that keeps every notification for later assertions.
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<Event>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

impl seedline::observability::PopulateObserver for RecordingObserver {
    fn script_started(&self, _run_id: &str, script: &str, encoding: Encoding) {
        self.push(Event::Started {
            script: script.to_string(),
            encoding,
        });
    }

    fn script_finished(&self, _run_id: &str, report: &ScriptReport) {
        self.push(Event::Finished {
            script: report.script.clone(),
            statements: report.statements,
        });
    }

    fn statement_skipped(&self, skipped: &SkippedStatement) {
        self.push(Event::Skipped {
            line: skipped.line,
            statement: skipped.statement.clone(),
        });
    }

    fn cleanup_failed(&self, _script: &str, operation: &str, _error: &dyn Error) {
        self.push(Event::CleanupFailed {
            operation: operation.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_creates_temp_dir() {
        let fixture = TestFixture::new();
        assert!(fixture.temp_dir.path().exists());
        let script = fixture.write_script("a.sql", &["select 1"]);
        assert_eq!(fs::read_to_string(script).unwrap(), "select 1\n");
    }
}
