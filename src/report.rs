//! Execution reports produced by a populate run.

use serde::Serialize;
use std::time::Duration;

use crate::error::DriverError;

/// A failed statement that the error policy let through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedStatement {
    pub statement: String,
    pub line: usize,
    pub script: String,
    pub cause: DriverError,
}

/// Outcome of one fully executed script.
#[derive(Debug, Clone, Serialize)]
pub struct ScriptReport {
    pub script: String,
    pub encoding: String,
    pub elapsed_ms: u64,
    /// Statements processed, skipped failures included
    pub statements: usize,
    /// Batches executed and committed, the final drain included
    pub flushes: usize,
    pub skipped: Vec<SkippedStatement>,
}

impl ScriptReport {
    pub fn failures(&self) -> usize {
        self.skipped.len()
    }

    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.elapsed_ms)
    }
}

/// Outcome of a successful populate run.
#[derive(Debug, Clone, Serialize)]
pub struct PopulateReport {
    /// UUIDv7 identifying the run in logs
    pub run_id: String,
    /// Unix timestamp in milliseconds
    pub started_at: i64,
    pub scripts: Vec<ScriptReport>,
}

impl PopulateReport {
    pub fn total_statements(&self) -> usize {
        self.scripts.iter().map(|s| s.statements).sum()
    }

    pub fn total_failures(&self) -> usize {
        self.scripts.iter().map(ScriptReport::failures).sum()
    }

    /// Every statement skipped during the run, in execution order.
    pub fn skipped(&self) -> impl Iterator<Item = &SkippedStatement> {
        self.scripts.iter().flat_map(|s| s.skipped.iter())
    }
}
