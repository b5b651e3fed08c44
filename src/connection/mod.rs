//! Database connection seam.
//!
//! The executor drives a [`Connection`] and never talks to a driver
//! directly. [`sqlite::SqliteConnection`] is the bundled implementation.

pub mod sqlite;

pub use sqlite::SqliteConnection;

use crate::error::DriverError;

/// Why a batch did not run to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchError {
    /// The statement at `index` failed. Statements before it took effect,
    /// statements after it were not executed.
    Statement { index: usize, error: DriverError },
    /// The statement at `index` failed and the database rolled back the
    /// whole open transaction, so uncommitted work before it is gone too.
    RolledBack { index: usize, error: DriverError },
    /// The batch could not run at all (no statement is to blame).
    Connection(DriverError),
}

/// A database connection that can run statement batches under manual commit.
///
/// Semantics follow the usual driver contract: while autocommit is off,
/// executed statements join the current transaction until [`commit`]
/// is called, and switching autocommit back on commits whatever is pending.
///
/// [`commit`]: Connection::commit
pub trait Connection {
    /// Current autocommit mode.
    fn autocommit(&self) -> Result<bool, DriverError>;

    /// Switch autocommit mode.
    fn set_autocommit(&mut self, autocommit: bool) -> Result<(), DriverError>;

    /// Acquire the execution context used for the batches of one script.
    fn open_batch(&mut self) -> Result<(), DriverError> {
        Ok(())
    }

    /// Execute statements in order, stopping at the first failure.
    fn execute_batch(&mut self, statements: &[&str]) -> Result<(), BatchError>;

    /// Commit the current transaction.
    fn commit(&mut self) -> Result<(), DriverError>;

    /// Release the execution context acquired by [`open_batch`].
    ///
    /// [`open_batch`]: Connection::open_batch
    fn close_batch(&mut self) -> Result<(), DriverError> {
        Ok(())
    }
}
