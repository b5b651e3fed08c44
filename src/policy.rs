//! Failure policy for statements rejected by the database.

use crate::script::Statement;

/// What to do after a statement fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Record the failure and keep going.
    Skip,
    /// Stop the run and report the failure.
    Abort,
}

/// Decides whether a failed statement aborts the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ErrorPolicy {
    pub continue_on_error: bool,
    pub ignore_failed_drops: bool,
}

impl ErrorPolicy {
    pub fn new(continue_on_error: bool, ignore_failed_drops: bool) -> Self {
        Self {
            continue_on_error,
            ignore_failed_drops,
        }
    }

    pub fn decide(&self, statement: &Statement) -> Decision {
        if self.continue_on_error || (self.ignore_failed_drops && statement.is_drop()) {
            Decision::Skip
        } else {
            Decision::Abort
        }
    }
}
