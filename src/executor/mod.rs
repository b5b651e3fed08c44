//! Batch execution of one script against a connection.
//!
//! A [`BatchExecutor`] lives for exactly one script:
//!
//! 1. [`begin`](BatchExecutor::begin) saves the autocommit mode, switches to
//!    manual commit and opens the execution context.
//! 2. [`submit`](BatchExecutor::submit) queues statements and flushes
//!    (execute + commit) every `batch_size` statements.
//! 3. [`close`](BatchExecutor::close) drains the tail, commits, restores
//!    autocommit and releases the context, whatever the outcome was.
//!
//! Dropping an executor that was never closed still restores autocommit
//! and releases the context.

pub mod batch;

pub use batch::{BatchAccumulator, DEFAULT_BATCH_SIZE};

use std::sync::Arc;

use crate::connection::{BatchError, Connection};
use crate::error::{DriverError, PopulateError};
use crate::observability::PopulateObserver;
use crate::policy::{Decision, ErrorPolicy};
use crate::report::SkippedStatement;
use crate::script::Statement;

/// Counters gathered while executing one script.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionStats {
    /// Statements processed, skipped failures included
    pub statements: usize,
    /// Threshold flushes plus the final drain
    pub flushes: usize,
    pub skipped: Vec<SkippedStatement>,
}

/// Executes the statements of one script in committed batches.
pub struct BatchExecutor<'a, C: Connection + ?Sized> {
    conn: &'a mut C,
    observer: &'a dyn PopulateObserver,
    script: Arc<str>,
    policy: ErrorPolicy,
    batch: BatchAccumulator<Statement>,
    saved_autocommit: bool,
    stats: ExecutionStats,
    closed: bool,
}

impl<'a, C: Connection + ?Sized> BatchExecutor<'a, C> {
    /// Suspend autocommit and open the execution context.
    pub fn begin(
        conn: &'a mut C,
        script: Arc<str>,
        batch_size: usize,
        policy: ErrorPolicy,
        observer: &'a dyn PopulateObserver,
    ) -> Result<Self, PopulateError> {
        if batch_size == 0 {
            return Err(PopulateError::InvalidConfig(
                "batch size must be greater than zero".into(),
            ));
        }

        let saved_autocommit = conn
            .autocommit()
            .map_err(|e| PopulateError::database("read autocommit", e))?;

        conn.set_autocommit(false)
            .map_err(|e| PopulateError::database("disable autocommit", e))?;

        if let Err(e) = conn.open_batch() {
            if let Err(restore) = conn.set_autocommit(saved_autocommit) {
                observer.cleanup_failed(&script, "restore autocommit", &restore);
            }
            return Err(PopulateError::database("open batch", e));
        }

        tracing::trace!(script = %script, batch_size, saved_autocommit, "Batch executor opened");

        Ok(Self {
            conn,
            observer,
            script,
            policy,
            batch: BatchAccumulator::new(batch_size),
            saved_autocommit,
            stats: ExecutionStats::default(),
            closed: false,
        })
    }

    /// Queue a statement, flushing when the batch is full.
    ///
    /// Queueing itself never fails; an error here comes from the flush.
    pub fn submit(&mut self, statement: Statement) -> Result<(), PopulateError> {
        self.stats.statements += 1;
        if self.batch.push(statement) {
            self.flush()?;
        }
        Ok(())
    }

    /// Number of statements queued since the script started.
    pub fn queued(&self) -> usize {
        self.batch.queued()
    }

    fn flush(&mut self) -> Result<(), PopulateError> {
        let pending = self.batch.drain();
        self.stats.flushes += 1;
        tracing::trace!(script = %self.script, size = pending.len(), "Flushing batch");

        self.execute(&pending)?;
        self.conn
            .commit()
            .map_err(|e| PopulateError::database("commit", e))
    }

    /// Run `pending` to the end, re-submitting the remainder after every
    /// skipped failure.
    fn execute(&mut self, pending: &[Statement]) -> Result<(), PopulateError> {
        let mut start = 0;
        while start < pending.len() {
            let sql: Vec<&str> = pending[start..].iter().map(|s| s.text.as_str()).collect();

            let (index, error) = match self.conn.execute_batch(&sql) {
                Ok(()) => return Ok(()),
                Err(BatchError::Statement { index, error }) => (start + index, error),
                Err(BatchError::RolledBack { index, error }) => {
                    return Err(self.rolled_back(pending, start + index, error));
                }
                Err(BatchError::Connection(e)) => {
                    return Err(PopulateError::database("execute batch", e))
                }
            };

            let Some(failed) = pending.get(index) else {
                return Err(PopulateError::database("execute batch", error));
            };
            let cause = error.into_effective_cause();

            match self.policy.decide(failed) {
                Decision::Skip => {
                    let skipped = SkippedStatement {
                        statement: failed.text.clone(),
                        line: failed.line,
                        script: failed.script.to_string(),
                        cause,
                    };
                    self.observer.statement_skipped(&skipped);
                    self.stats.skipped.push(skipped);
                    start = index + 1;
                }
                Decision::Abort => {
                    return Err(PopulateError::StatementFailure {
                        statement: failed.text.clone(),
                        line: failed.line,
                        script: failed.script.to_string(),
                        cause,
                    });
                }
            }
        }
        Ok(())
    }

    /// A failure that rolled back the open transaction. Fatal under any policy.
    fn rolled_back(&self, pending: &[Statement], index: usize, error: DriverError) -> PopulateError {
        let Some(failed) = pending.get(index) else {
            return PopulateError::database("execute batch", error);
        };
        tracing::debug!(
            script = %self.script,
            line = failed.line,
            "Statement failure rolled back the open transaction"
        );
        PopulateError::TransactionRolledBack {
            statement: failed.text.clone(),
            line: failed.line,
            script: failed.script.to_string(),
            cause: error.into_effective_cause(),
        }
    }

    /// Drain the tail, commit, restore autocommit and release the context.
    ///
    /// `outcome` is how the statement loop ended. An error in it always
    /// wins over anything that fails during cleanup; otherwise the first
    /// cleanup failure is returned.
    pub fn close(mut self, outcome: Result<(), PopulateError>) -> Result<ExecutionStats, PopulateError> {
        self.closed = true;
        let mut first_error = outcome.err();

        let pending = self.batch.drain();
        self.stats.flushes += 1;
        tracing::trace!(script = %self.script, size = pending.len(), "Draining batch");
        let drained = self.execute(&pending);
        self.settle(&mut first_error, "drain", drained);

        let committed = self
            .conn
            .commit()
            .map_err(|e| PopulateError::database("commit", e));
        self.settle(&mut first_error, "commit", committed);

        let restored = self
            .conn
            .set_autocommit(self.saved_autocommit)
            .map_err(|e| PopulateError::database("restore autocommit", e));
        self.settle(&mut first_error, "restore autocommit", restored);

        let released = self
            .conn
            .close_batch()
            .map_err(|e| PopulateError::database("close batch", e));
        self.settle(&mut first_error, "close batch", released);

        match first_error {
            Some(err) => Err(err),
            None => Ok(std::mem::take(&mut self.stats)),
        }
    }

    fn settle(
        &self,
        first_error: &mut Option<PopulateError>,
        operation: &str,
        result: Result<(), PopulateError>,
    ) {
        if let Err(err) = result {
            if first_error.is_some() {
                self.observer.cleanup_failed(&self.script, operation, &err);
            } else {
                *first_error = Some(err);
            }
        }
    }

    fn release_quietly(&mut self, operation: &str, result: Result<(), DriverError>) {
        if let Err(err) = result {
            self.observer.cleanup_failed(&self.script, operation, &err);
        }
    }
}

impl<C: Connection + ?Sized> Drop for BatchExecutor<'_, C> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        let discarded = self.batch.discard();
        tracing::debug!(script = %self.script, discarded, "Batch executor dropped without close");

        let restored = self.conn.set_autocommit(self.saved_autocommit);
        self.release_quietly("restore autocommit", restored);
        let released = self.conn.close_batch();
        self.release_quietly("close batch", released);
    }
}
