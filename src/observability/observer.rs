//! Injected logging capability for populate runs.
//!
//! The populator never logs through a global handle of its own. It reports
//! to a [`PopulateObserver`] passed in by the caller; [`TracingObserver`]
//! turns those callbacks into `tracing` events.

use std::error::Error;

use crate::report::{ScriptReport, SkippedStatement};
use crate::script::Encoding;

/// Receives progress notifications from a populate run.
pub trait PopulateObserver {
    /// A script is about to be opened and executed.
    fn script_started(&self, run_id: &str, script: &str, encoding: Encoding);

    /// A script ran to completion.
    fn script_finished(&self, run_id: &str, report: &ScriptReport);

    /// A failed statement was tolerated by the error policy.
    fn statement_skipped(&self, skipped: &SkippedStatement);

    /// A cleanup step (drain, commit, autocommit restore, context release)
    /// failed while the script was being closed.
    fn cleanup_failed(&self, script: &str, operation: &str, error: &dyn Error);
}

/// Observer that emits structured `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl PopulateObserver for TracingObserver {
    fn script_started(&self, run_id: &str, script: &str, encoding: Encoding) {
        tracing::info!(run_id, script, %encoding, "Executing SQL script");
    }

    fn script_finished(&self, run_id: &str, report: &ScriptReport) {
        tracing::info!(
            run_id,
            script = %report.script,
            elapsed_ms = report.elapsed_ms,
            statements = report.statements,
            failures = report.failures(),
            "Done executing SQL script"
        );
    }

    fn statement_skipped(&self, skipped: &SkippedStatement) {
        tracing::debug!(
            script = %skipped.script,
            line = skipped.line,
            statement = %skipped.statement,
            error = %skipped.cause,
            "Failed to execute SQL script statement"
        );
    }

    fn cleanup_failed(&self, script: &str, operation: &str, error: &dyn Error) {
        tracing::debug!(script, operation, error = %error, "Cleanup step failed");
    }
}
