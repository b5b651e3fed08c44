//! Script population orchestration.
//!
//! A [`Populator`] is an immutable configuration value: the scripts to run,
//! their default encoding, the batch size and the error policy. It is built
//! once through [`PopulatorBuilder`] and can then populate any number of
//! connections.

use std::sync::Arc;
use std::time::Instant;

use crate::connection::Connection;
use crate::error::PopulateError;
use crate::executor::{BatchExecutor, DEFAULT_BATCH_SIZE};
use crate::observability::metrics::{record_script, record_script_failure};
use crate::observability::{PopulateObserver, TracingObserver};
use crate::policy::ErrorPolicy;
use crate::report::{PopulateReport, ScriptReport};
use crate::script::Script;
use crate::{generate_run_id, now_millis};

/// Builder for [`Populator`].
#[derive(Debug, Clone)]
pub struct PopulatorBuilder {
    scripts: Vec<Script>,
    sql_script_encoding: Option<String>,
    continue_on_error: bool,
    ignore_failed_drops: bool,
    batch_size: usize,
}

impl Default for PopulatorBuilder {
    fn default() -> Self {
        Self {
            scripts: Vec::new(),
            sql_script_encoding: None,
            continue_on_error: false,
            ignore_failed_drops: false,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl PopulatorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a script to run.
    #[must_use]
    pub fn add_script(mut self, script: Script) -> Self {
        self.scripts.push(script);
        self
    }

    /// Replace every registered script.
    #[must_use]
    pub fn scripts(mut self, scripts: impl IntoIterator<Item = Script>) -> Self {
        self.scripts = scripts.into_iter().collect();
        self
    }

    /// Encoding for scripts that do not carry their own.
    ///
    /// Applies to scripts registered before or after this call alike.
    #[must_use]
    pub fn sql_script_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.sql_script_encoding = Some(encoding.into());
        self
    }

    /// Log and skip every failed statement instead of aborting.
    #[must_use]
    pub fn continue_on_error(mut self, continue_on_error: bool) -> Self {
        self.continue_on_error = continue_on_error;
        self
    }

    /// Log and skip failed `DROP` statements instead of aborting.
    ///
    /// Useful for databases without `DROP ... IF EXISTS`. Off by default so
    /// that an accidental run against a live database fails fast.
    #[must_use]
    pub fn ignore_failed_drops(mut self, ignore_failed_drops: bool) -> Self {
        self.ignore_failed_drops = ignore_failed_drops;
        self
    }

    /// Number of statements per committed batch.
    #[must_use]
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn build(self) -> Result<Populator, PopulateError> {
        if self.batch_size == 0 {
            return Err(PopulateError::InvalidConfig(
                "batch size must be greater than zero".into(),
            ));
        }

        Ok(Populator {
            scripts: self.scripts,
            sql_script_encoding: self.sql_script_encoding,
            policy: ErrorPolicy::new(self.continue_on_error, self.ignore_failed_drops),
            batch_size: self.batch_size,
        })
    }
}

/// Runs SQL scripts against a connection in committed batches.
#[derive(Debug, Clone)]
pub struct Populator {
    scripts: Vec<Script>,
    sql_script_encoding: Option<String>,
    policy: ErrorPolicy,
    batch_size: usize,
}

impl Populator {
    pub fn builder() -> PopulatorBuilder {
        PopulatorBuilder::new()
    }

    pub fn scripts(&self) -> &[Script] {
        &self.scripts
    }

    pub fn sql_script_encoding(&self) -> Option<&str> {
        self.sql_script_encoding.as_deref()
    }

    pub fn policy(&self) -> ErrorPolicy {
        self.policy
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Run every script, logging through `tracing`.
    pub fn populate<C: Connection + ?Sized>(
        &self,
        conn: &mut C,
    ) -> Result<PopulateReport, PopulateError> {
        self.populate_with(conn, &TracingObserver)
    }

    /// Run every script in registration order, reporting to `observer`.
    ///
    /// Stops at the first fatal error; later scripts are not attempted.
    pub fn populate_with<C: Connection + ?Sized>(
        &self,
        conn: &mut C,
        observer: &dyn PopulateObserver,
    ) -> Result<PopulateReport, PopulateError> {
        let run_id = generate_run_id();
        let span = tracing::info_span!("populate", run_id = %run_id, scripts = self.scripts.len());
        let _enter = span.enter();

        let mut report = PopulateReport {
            run_id,
            started_at: now_millis(),
            scripts: Vec::with_capacity(self.scripts.len()),
        };

        for script in &self.scripts {
            let script_report = self
                .execute_script(conn, script, &report.run_id, observer)
                .inspect_err(|_| record_script_failure(&script.to_string()))?;
            report.scripts.push(script_report);
        }

        Ok(report)
    }

    fn execute_script<C: Connection + ?Sized>(
        &self,
        conn: &mut C,
        script: &Script,
        run_id: &str,
        observer: &dyn PopulateObserver,
    ) -> Result<ScriptReport, PopulateError> {
        let encoded = script.resolve(self.sql_script_encoding.as_deref())?;
        observer.script_started(run_id, encoded.name(), encoded.encoding());

        let start = Instant::now();
        let mut statements = encoded.open()?;

        let mut executor = BatchExecutor::begin(
            conn,
            Arc::from(encoded.name()),
            self.batch_size,
            self.policy,
            observer,
        )?;
        let outcome = statements.try_for_each(|statement| executor.submit(statement?));
        let stats = executor.close(outcome)?;

        let elapsed = start.elapsed();
        record_script(
            encoded.name(),
            elapsed.as_secs_f64(),
            stats.statements,
            stats.skipped.len(),
            stats.flushes,
        );

        let report = ScriptReport {
            script: encoded.name().to_string(),
            encoding: encoded.encoding().name().to_string(),
            elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            statements: stats.statements,
            flushes: stats.flushes,
            skipped: stats.skipped,
        };
        observer.script_finished(run_id, &report);

        Ok(report)
    }
}
