//! Seedline: batch SQL script populator.
//!
//! Loads SQL scripts and executes them against a database connection in
//! size-bounded, individually committed batches, with configurable
//! tolerance for failing statements.
//!
//! # Architecture
//!
//! - **Line-oriented**: one statement per line, no SQL parsing
//! - **Batched**: a commit every `batch_size` statements and at script end
//! - **Tolerant**: abort, skip everything, or skip only failed `DROP`s
//! - **Clean**: autocommit is restored on every exit path
//!
//! # Modules
//!
//! - [`config`]: CLI and environment configuration
//! - [`connection`]: Connection trait and the SQLite implementation
//! - [`error`]: Error taxonomy
//! - [`executor`]: Per-script batch execution
//! - [`observability`]: Observer, tracing and metrics setup
//! - [`policy`]: Failure policy for rejected statements
//! - [`populator`]: Run orchestration across scripts
//! - [`report`]: Execution reports
//! - [`script`]: Script resources, encodings and statement reading
//!
//! # Example
//!
//! ```
//! use seedline::{Populator, Script, SqliteConnection};
//!
//! let populator = Populator::builder()
//!     .add_script(Script::from_sql(
//!         "schema.sql",
//!         "create table t(id int)\ninsert into t values (1)\n",
//!     ))
//!     .batch_size(1)
//!     .build()
//!     .unwrap();
//!
//! let mut conn = SqliteConnection::open_in_memory().unwrap();
//! let report = populator.populate(&mut conn).unwrap();
//! assert_eq!(report.total_statements(), 2);
//! ```

// Lint configuration
#![warn(clippy::all)]
#![allow(
    clippy::module_name_repetitions, // populator::PopulatorBuilder is fine
    clippy::must_use_candidate,      // Not all functions need #[must_use]
    clippy::missing_errors_doc,      // Error docs can be verbose
    clippy::missing_panics_doc,      // Panic docs can be verbose
    clippy::struct_excessive_bools   // Config structs may have flags
)]

pub mod config;
pub mod connection;
pub mod error;
pub mod executor;
pub mod observability;
pub mod policy;
pub mod populator;
pub mod report;
pub mod script;

pub use connection::{Connection, SqliteConnection};
pub use error::{DriverError, PopulateError};
pub use populator::{Populator, PopulatorBuilder};
pub use report::{PopulateReport, ScriptReport, SkippedStatement};
pub use script::{Encoding, Script};

use uuid::Uuid;

/// Generate a new UUIDv7 (time-sortable) run ID.
///
/// # Example
///
/// ```
/// let id = seedline::generate_run_id();
/// assert!(id.len() == 36); // UUID string format
/// ```
#[must_use]
pub fn generate_run_id() -> String {
    Uuid::now_v7().to_string()
}

/// Get the current Unix timestamp in milliseconds.
#[must_use]
pub fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
