//! Error types for script population.
//!
//! [`PopulateError`] is the closed set of failure kinds a populate run can
//! end with. [`DriverError`] is what a [`Connection`](crate::connection::Connection)
//! reports when the database itself rejects an operation.

use serde::Serialize;
use std::io;
use thiserror::Error;

/// Error reported by a database connection.
///
/// Some drivers chain a more specific error behind the one they raise
/// (a batch failure wrapping the statement that actually failed). That
/// chained error is kept in `next`.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{message}")]
pub struct DriverError {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<i32>,
    #[source]
    #[serde(skip_serializing_if = "Option::is_none")]
    next: Option<Box<DriverError>>,
}

impl DriverError {
    /// Create an error with the given message and no vendor code.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            next: None,
        }
    }

    /// Attach a vendor-specific error code.
    #[must_use]
    pub fn with_code(mut self, code: i32) -> Self {
        self.code = Some(code);
        self
    }

    /// Chain a nested error behind this one.
    #[must_use]
    pub fn with_next(mut self, next: DriverError) -> Self {
        self.next = Some(Box::new(next));
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn code(&self) -> Option<i32> {
        self.code
    }

    pub fn next(&self) -> Option<&DriverError> {
        self.next.as_deref()
    }

    /// The error worth reporting: the chained one if present, else `self`.
    pub fn into_effective_cause(self) -> DriverError {
        match self.next {
            Some(next) => *next,
            None => self,
        }
    }
}

/// Error type for populate runs.
#[derive(Debug, Error)]
pub enum PopulateError {
    #[error("Failed to read SQL script {script}: {source}")]
    Read {
        script: String,
        #[source]
        source: io::Error,
    },

    #[error("SQL script {script} is not valid {encoding} at line {line}")]
    Decode {
        script: String,
        line: usize,
        encoding: String,
    },

    #[error("Unsupported encoding '{encoding}' for SQL script {script}")]
    UnsupportedEncoding { script: String, encoding: String },

    #[error("Failed to execute SQL script statement at line {line} of {script}: {statement}")]
    StatementFailure {
        statement: String,
        line: usize,
        script: String,
        #[source]
        cause: DriverError,
    },

    #[error(
        "SQL script statement at line {line} of {script} rolled back the open transaction: {statement}"
    )]
    TransactionRolledBack {
        statement: String,
        line: usize,
        script: String,
        #[source]
        cause: DriverError,
    },

    #[error("Database error during {operation}: {source}")]
    Database {
        operation: &'static str,
        #[source]
        source: DriverError,
    },

    #[error("Invalid populator configuration: {0}")]
    InvalidConfig(String),
}

impl PopulateError {
    pub(crate) fn database(operation: &'static str, source: DriverError) -> Self {
        Self::Database { operation, source }
    }

    /// Line number of the failing statement or undecodable line, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::StatementFailure { line, .. }
            | Self::TransactionRolledBack { line, .. }
            | Self::Decode { line, .. } => Some(*line),
            _ => None,
        }
    }

    /// Whether this error came from reading the script rather than running it.
    pub fn is_read_error(&self) -> bool {
        matches!(
            self,
            Self::Read { .. } | Self::Decode { .. } | Self::UnsupportedEncoding { .. }
        )
    }
}
