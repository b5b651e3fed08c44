//! CLI integration tests.
//!
//! Runs the built `seedline` binary against temporary databases.

mod common;

use common::{count_rows, table_exists, TestFixture};
use std::process::{Command, Output};

fn seedline(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_seedline"))
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("SEEDLINE_DATABASE")
        .output()
        .expect("failed to run seedline")
}

/// CLI --help output should show expected options.
#[test]
fn test_cli_help_output() {
    let output = seedline(&["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    for flag in [
        "--database",
        "--batch-size",
        "--continue-on-error",
        "--ignore-failed-drops",
        "--encoding",
        "--log-level",
    ] {
        assert!(stdout.contains(flag), "help should mention {flag}");
    }
}

/// CLI --version should show version.
#[test]
fn test_cli_version_output() {
    let output = seedline(&["--version"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(
        stdout.contains("0.1.0"),
        "version output should contain version number: {}",
        stdout
    );
}

#[test]
fn test_cli_populates_database() {
    let fixture = TestFixture::new();
    let schema = fixture.write_script("schema.sql", &["create table account(id int, label text)"]);
    let data = fixture.write_script(
        "data.sql",
        &[
            "insert into account values (1, 'checking')",
            "insert into account values (2, 'savings')",
            "insert into account values (3, 'loan')",
        ],
    );

    let output = seedline(&[
        "--database",
        fixture.db_path.to_str().unwrap(),
        "--batch-size",
        "2",
        schema.to_str().unwrap(),
        data.to_str().unwrap(),
    ]);

    assert!(
        output.status.success(),
        "seedline failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Total: 4 statement(s) in 2 script(s), 0 skipped"), "{stdout}");

    let conn = fixture.open();
    assert_eq!(count_rows(&conn, "account"), 3);
}

#[test]
fn test_cli_json_report() {
    let fixture = TestFixture::new();
    let script = fixture.write_script(
        "seed.sql",
        &["drop table t", "create table t(id int)", "insert into t values (1)"],
    );

    let output = seedline(&[
        "--database",
        fixture.db_path.to_str().unwrap(),
        "--ignore-failed-drops",
        "--output",
        "json",
        script.to_str().unwrap(),
    ]);
    assert!(output.status.success());

    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    let scripts = report["scripts"].as_array().unwrap();
    assert_eq!(scripts.len(), 1);
    assert_eq!(scripts[0]["statements"], 3);
    assert_eq!(scripts[0]["skipped"][0]["line"], 1);
    assert_eq!(scripts[0]["skipped"][0]["statement"], "drop table t");
}

#[test]
fn test_cli_fails_on_statement_error() {
    let fixture = TestFixture::new();
    let script = fixture.write_script("seed.sql", &["drop table t", "create table t(id int)"]);

    let output = seedline(&[
        "--database",
        fixture.db_path.to_str().unwrap(),
        script.to_str().unwrap(),
    ]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("line 1"), "{stderr}");

    let conn = fixture.open();
    assert!(!table_exists(&conn, "t"));
}

#[test]
fn test_cli_rejects_zero_batch_size() {
    let fixture = TestFixture::new();
    let script = fixture.write_script("seed.sql", &["create table t(id int)"]);

    let output = seedline(&[
        "--database",
        fixture.db_path.to_str().unwrap(),
        "--batch-size",
        "0",
        script.to_str().unwrap(),
    ]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("batch size"));
}
