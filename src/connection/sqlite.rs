//! SQLite connection backed by rusqlite.
//!
//! SQLite has no autocommit switch of its own: a connection is in
//! autocommit mode whenever no explicit transaction is open. Manual-commit
//! mode is emulated by opening a transaction lazily before each batch and
//! ending it on commit.

use rusqlite::OpenFlags;
use std::path::Path;

use super::{BatchError, Connection};
use crate::error::DriverError;

impl From<rusqlite::Error> for DriverError {
    fn from(err: rusqlite::Error) -> Self {
        let code = match &err {
            rusqlite::Error::SqliteFailure(failure, _) => Some(failure.extended_code),
            _ => None,
        };
        let driver_err = DriverError::new(err.to_string());
        match code {
            Some(code) => driver_err.with_code(code),
            None => driver_err,
        }
    }
}

/// Writable SQLite connection for populate runs.
pub struct SqliteConnection {
    conn: rusqlite::Connection,
    autocommit: bool,
}

impl SqliteConnection {
    /// Open (or create) the database file at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, DriverError> {
        let conn = rusqlite::Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self::new(conn))
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self, DriverError> {
        Ok(Self::new(rusqlite::Connection::open_in_memory()?))
    }

    /// Wrap an existing rusqlite connection.
    pub fn new(conn: rusqlite::Connection) -> Self {
        let autocommit = conn.is_autocommit();
        Self { conn, autocommit }
    }

    /// Borrow the underlying connection, e.g. to query populated data.
    pub fn inner(&self) -> &rusqlite::Connection {
        &self.conn
    }

    pub fn into_inner(self) -> rusqlite::Connection {
        self.conn
    }

    /// Whether a transaction is currently open on the database.
    pub fn in_transaction(&self) -> bool {
        !self.conn.is_autocommit()
    }

    fn ensure_transaction(&self) -> Result<(), rusqlite::Error> {
        if !self.autocommit && !self.in_transaction() {
            self.conn.execute_batch("BEGIN DEFERRED")?;
        }
        Ok(())
    }
}

impl Connection for SqliteConnection {
    fn autocommit(&self) -> Result<bool, DriverError> {
        Ok(self.autocommit)
    }

    fn set_autocommit(&mut self, autocommit: bool) -> Result<(), DriverError> {
        if autocommit && !self.autocommit && self.in_transaction() {
            self.conn.execute_batch("COMMIT")?;
        }
        self.autocommit = autocommit;
        Ok(())
    }

    fn execute_batch(&mut self, statements: &[&str]) -> Result<(), BatchError> {
        self.ensure_transaction()
            .map_err(|e| BatchError::Connection(e.into()))?;

        let managed = !self.autocommit;
        for (index, sql) in statements.iter().enumerate() {
            if let Err(e) = self.conn.execute_batch(sql) {
                let error = DriverError::from(e);
                // ROLLBACK conflict resolution, SQLITE_FULL and friends end
                // the transaction along with the statement.
                if managed && !self.in_transaction() {
                    return Err(BatchError::RolledBack { index, error });
                }
                return Err(BatchError::Statement { index, error });
            }
        }
        Ok(())
    }

    fn commit(&mut self) -> Result<(), DriverError> {
        if self.in_transaction() {
            self.conn.execute_batch("COMMIT")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn count(conn: &SqliteConnection, table: &str) -> i64 {
        conn.inner()
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn test_manual_commit_batches_into_one_transaction() {
        let mut conn = SqliteConnection::open_in_memory().unwrap();
        assert!(conn.autocommit().unwrap());

        conn.set_autocommit(false).unwrap();
        conn.execute_batch(&["create table t(id int)", "insert into t values (1)"])
            .unwrap();
        assert!(conn.in_transaction());

        conn.commit().unwrap();
        assert!(!conn.in_transaction());
        assert_eq!(count(&conn, "t"), 1);

        conn.set_autocommit(true).unwrap();
        assert!(conn.autocommit().unwrap());
    }

    #[test]
    fn test_failure_reports_index_and_keeps_earlier_statements() {
        let mut conn = SqliteConnection::open_in_memory().unwrap();
        conn.set_autocommit(false).unwrap();

        let result = conn.execute_batch(&[
            "create table t(id int)",
            "insert into t values (1)",
            "insert into missing values (1)",
            "insert into t values (2)",
        ]);

        match result {
            Err(BatchError::Statement { index, error }) => {
                assert_eq!(index, 2);
                assert!(error.message().contains("missing"));
                assert!(error.code().is_some());
            }
            other => panic!("expected statement failure, got {other:?}"),
        }

        conn.commit().unwrap();
        assert_eq!(count(&conn, "t"), 1);
    }

    #[test]
    fn test_rollback_conflict_reports_lost_transaction() {
        let mut conn = SqliteConnection::open_in_memory().unwrap();
        conn.set_autocommit(false).unwrap();

        let result = conn.execute_batch(&[
            "create table t(id int primary key)",
            "insert into t values (1)",
            "insert or rollback into t values (1)",
        ]);

        match result {
            Err(BatchError::RolledBack { index, error }) => {
                assert_eq!(index, 2);
                assert!(error.message().contains("UNIQUE"));
            }
            other => panic!("expected rolled back transaction, got {other:?}"),
        }
        assert!(!conn.in_transaction());
    }

    #[test]
    fn test_enabling_autocommit_commits_pending_work() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        {
            let mut conn = SqliteConnection::open(&db_path).unwrap();
            conn.set_autocommit(false).unwrap();
            conn.execute_batch(&["create table t(id int)", "insert into t values (7)"])
                .unwrap();
            conn.set_autocommit(true).unwrap();
        }

        let conn = SqliteConnection::open(&db_path).unwrap();
        assert_eq!(count(&conn, "t"), 1);
    }
}
