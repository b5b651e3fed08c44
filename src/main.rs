//! Seedline: populate a SQLite database from SQL scripts.
//!
//! # Usage
//!
//! ```bash
//! seedline --database bank.db --batch-size 100 schema.sql data.sql
//! ```
//!
//! Environment variables can also be used:
//! - `SEEDLINE_DATABASE`: Database file to populate
//! - `SEEDLINE_BATCH_SIZE`: Statements per committed batch
//! - `SEEDLINE_SQL_SCRIPT_ENCODING`: Default script encoding
//! - `RUST_LOG`: Log level (trace, debug, info, warn, error)

use anyhow::{Context, Result};
use seedline::config::{Config, OutputFormat};
use seedline::observability::metrics::init_metrics;
use seedline::observability::tracing::init_tracing;
use seedline::{PopulateReport, SqliteConnection};

fn print_report(report: &PopulateReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            println!(
                "{:<48} {:>10} {:>8} {:>8} {:>10}",
                "SCRIPT", "STATEMENTS", "SKIPPED", "FLUSHES", "ELAPSED"
            );
            println!("{}", "-".repeat(88));
            for script in &report.scripts {
                println!(
                    "{:<48} {:>10} {:>8} {:>8} {:>8}ms",
                    script.script,
                    script.statements,
                    script.failures(),
                    script.flushes,
                    script.elapsed_ms
                );
            }
            for skipped in report.skipped() {
                println!(
                    "skipped {} line {}: {} ({})",
                    skipped.script, skipped.line, skipped.statement, skipped.cause
                );
            }
            println!();
            println!(
                "Total: {} statement(s) in {} script(s), {} skipped",
                report.total_statements(),
                report.scripts.len(),
                report.total_failures()
            );
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    // Parse configuration from CLI arguments and environment
    let config = Config::parse_args();

    // Initialize tracing/logging
    init_tracing(&config.log_level);

    // Initialize metrics (recorded in-process only)
    init_metrics();

    let populator = config.to_populator()?;

    let mut conn = SqliteConnection::open(&config.database)
        .with_context(|| format!("failed to open database {}", config.database.display()))?;

    let report = populator
        .populate(&mut conn)
        .context("populate run failed")?;

    print_report(&report, config.output)?;

    tracing::info!(run_id = %report.run_id, "Seedline run complete");
    Ok(())
}
