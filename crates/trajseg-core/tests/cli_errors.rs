//! CLI exit code and error output tests for trajseg.
//!
//! Every command runs with an isolated config home so a config.json on the
//! host cannot leak into the results.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const TRIPS: &str = "\
TripId,Time_Step,Speed,Acceleration,HeadingChange,Latitude,Longitude
a,0,10,0.5,90,41.10,-8.60
a,1,11,0.5,90,41.11,-8.60
a,2,12,0.5,90,41.12,-8.60
a,3,13,0.0,90,41.13,-8.60
a,4,13,0.0,90,41.14,-8.60
a,5,30,2.0,180,41.15,-8.61
a,6,32,2.0,180,41.16,-8.62
a,7,34,2.0,180,41.17,-8.63
";

/// Get a Command for the trajseg binary with an empty config home.
fn trajseg(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("trajseg").expect("trajseg binary should exist");
    cmd.env("XDG_CONFIG_HOME", home)
        .env_remove("TRAJSEG_CONFIG")
        .env_remove("TRAJSEG_CONFIG_DIR")
        .env_remove("TRAJSEG_LOG")
        .env_remove("RUST_LOG");
    cmd
}

fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("write fixture");
    path
}

// ============================================================================
// Argument errors
// ============================================================================

mod invalid_arguments {
    use super::*;

    #[test]
    fn unknown_command_is_args_error() {
        let home = TempDir::new().unwrap();
        trajseg(home.path())
            .arg("nonexistent-command")
            .assert()
            .code(10)
            .stderr(predicate::str::contains("error"));
    }

    #[test]
    fn missing_required_flag_is_args_error() {
        let home = TempDir::new().unwrap();
        trajseg(home.path())
            .args(["count", "--input", "trips.csv"])
            .assert()
            .code(10)
            .stderr(predicate::str::contains("--output"));
    }

    #[test]
    fn bad_format_value_is_args_error() {
        let home = TempDir::new().unwrap();
        trajseg(home.path())
            .args(["--format", "yaml", "config", "show"])
            .assert()
            .code(10);
    }

    #[test]
    fn help_exits_cleanly() {
        let home = TempDir::new().unwrap();
        trajseg(home.path())
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("segment"));
    }
}

// ============================================================================
// Config errors
// ============================================================================

mod config_errors {
    use super::*;

    #[test]
    fn missing_config_file_is_config_error() {
        let home = TempDir::new().unwrap();
        trajseg(home.path())
            .args(["--config", "/nonexistent/trajseg.json", "config", "show"])
            .assert()
            .code(11)
            .stderr(predicate::str::contains("not found"));
    }

    #[test]
    fn invalid_value_is_config_error() {
        let home = TempDir::new().unwrap();
        let cfg = write(home.path(), "bad.json", r#"{"segmentation": {"max_segments": 0}}"#);
        trajseg(home.path())
            .args(["config", "validate"])
            .arg(&cfg)
            .assert()
            .code(11)
            .stderr(predicate::str::contains("max_segments"));
    }

    #[test]
    fn unknown_key_is_config_error() {
        let home = TempDir::new().unwrap();
        let cfg = write(home.path(), "typo.json", r#"{"segmentaton": {}}"#);
        trajseg(home.path())
            .arg("--config")
            .arg(&cfg)
            .args(["config", "show"])
            .assert()
            .code(11);
    }

    #[test]
    fn config_error_aborts_stage_commands() {
        let home = TempDir::new().unwrap();
        let cfg = write(home.path(), "bad.json", r#"{"schema_version": "9.9.9"}"#);
        let input = write(home.path(), "trips.csv", TRIPS);
        trajseg(home.path())
            .arg("--config")
            .arg(&cfg)
            .args(["count", "--input"])
            .arg(&input)
            .arg("--output")
            .arg(home.path().join("transitions.csv"))
            .assert()
            .code(11);
        assert!(!home.path().join("transitions.csv").exists());
    }

    #[test]
    fn valid_config_validates() {
        let home = TempDir::new().unwrap();
        let cfg = write(home.path(), "ok.json", r#"{"transform": {"min_trip_length": 3}}"#);
        trajseg(home.path())
            .args(["config", "validate"])
            .arg(&cfg)
            .assert()
            .success()
            .stdout(predicate::str::contains("\"valid\""));
    }

    #[test]
    fn schema_and_show_succeed() {
        let home = TempDir::new().unwrap();
        trajseg(home.path())
            .args(["config", "schema"])
            .assert()
            .success()
            .stdout(predicate::str::contains("quantization"));
        trajseg(home.path())
            .args(["-f", "summary", "config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("source=builtin default"));
    }
}

// ============================================================================
// Input errors and operational outcomes
// ============================================================================

mod input_errors {
    use super::*;

    #[test]
    fn missing_input_is_input_error() {
        let home = TempDir::new().unwrap();
        trajseg(home.path())
            .args(["count", "--input", "/nonexistent/trips.csv", "--output"])
            .arg(home.path().join("transitions.csv"))
            .assert()
            .code(12)
            .stderr(predicate::str::contains("cannot open"));
    }

    #[test]
    fn header_only_input_is_nothing_to_process() {
        let home = TempDir::new().unwrap();
        let input = write(
            home.path(),
            "empty.csv",
            "TripId,Time_Step,Speed,Acceleration,HeadingChange,Latitude,Longitude\n",
        );
        trajseg(home.path())
            .args(["count", "--input"])
            .arg(&input)
            .arg("--output")
            .arg(home.path().join("transitions.csv"))
            .assert()
            .code(1)
            .stdout(predicate::str::contains("OK_NOTHING_TO_PROCESS"));
    }

    #[test]
    fn trailing_commas_are_accepted() {
        let home = TempDir::new().unwrap();
        let with_commas: String = TRIPS.lines().map(|l| format!("{l},\n")).collect();
        let input = write(home.path(), "trips.csv", &with_commas);
        trajseg(home.path())
            .args(["count", "--input"])
            .arg(&input)
            .arg("--output")
            .arg(home.path().join("transitions.csv"))
            .assert()
            .code(0)
            .stdout(
                predicate::str::contains("\"accepted\": 8")
                    .and(predicate::str::contains("\"skipped\": 0")),
            );
    }

    #[test]
    fn overflowing_probabilities_are_internal_error() {
        let home = TempDir::new().unwrap();
        let input = write(
            home.path(),
            "probabilities.csv",
            "10&0.5&90,11&0.5&90,1e308,2\n10&0.5&90,12&0.5&90,1e308,2\n",
        );
        trajseg(home.path())
            .args(["regularize", "--input"])
            .arg(&input)
            .arg("--output")
            .arg(home.path().join("regularized.csv"))
            .assert()
            .code(20)
            .stderr(predicate::str::contains("\"code\":30"));
    }

    #[test]
    fn exitcode_format_is_silent() {
        let home = TempDir::new().unwrap();
        trajseg(home.path())
            .args(["-f", "exitcode", "segment", "--input", "/nonexistent/d.csv"])
            .arg("--output")
            .arg(home.path().join("seg.csv"))
            .assert()
            .code(12)
            .stdout(predicate::str::is_empty());
    }
}

// ============================================================================
// Successful runs
// ============================================================================

mod runs {
    use super::*;

    #[test]
    fn run_prints_summary_and_writes_tables() {
        let home = TempDir::new().unwrap();
        let input = write(home.path(), "trips.csv", TRIPS);
        let out = home.path().join("out");
        let assert = trajseg(home.path())
            .args(["run", "--graph-input"])
            .arg(&input)
            .arg("--output-dir")
            .arg(&out)
            .assert()
            .success();

        let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
        let summary: serde_json::Value = serde_json::from_str(&stdout).unwrap();
        assert_eq!(summary["command"], "run");
        assert_eq!(summary["exit_code"], 0);
        assert_eq!(summary["artifacts"].as_array().map(Vec::len), Some(5));
        assert_eq!(summary["config"]["source"], "builtin_default");
        assert!(out.join("segmentation.csv").exists());
    }

    #[test]
    fn stage_commands_chain() {
        let home = TempDir::new().unwrap();
        let dir = home.path();
        let input = write(dir, "trips.csv", TRIPS);

        trajseg(dir)
            .args(["-f", "exitcode", "count", "--input"])
            .arg(&input)
            .arg("--output")
            .arg(dir.join("transitions.csv"))
            .assert()
            .success();
        trajseg(dir)
            .args(["-f", "exitcode", "probabilities", "--input"])
            .arg(dir.join("transitions.csv"))
            .arg("--output")
            .arg(dir.join("probabilities.csv"))
            .assert()
            .success();
        trajseg(dir)
            .args(["-f", "exitcode", "regularize", "--input"])
            .arg(dir.join("probabilities.csv"))
            .arg("--output")
            .arg(dir.join("regularized.csv"))
            .assert()
            .success();
        trajseg(dir)
            .args(["-f", "exitcode", "transform", "--input"])
            .arg(&input)
            .arg("--graph")
            .arg(dir.join("regularized.csv"))
            .arg("--output")
            .arg(dir.join("dissimilarities.csv"))
            .assert()
            .success();
        trajseg(dir)
            .args(["-f", "summary", "segment", "--input"])
            .arg(dir.join("dissimilarities.csv"))
            .arg("--output")
            .arg(dir.join("segmentation.csv"))
            .assert()
            .success()
            .stdout(predicate::str::contains("segment: OK_CLEAN"))
            .stdout(predicate::str::contains("segmented=1"));

        let table = fs::read_to_string(dir.join("segmentation.csv")).unwrap();
        // Header plus one row per point after the first.
        assert_eq!(table.lines().count(), 1 + 7);
    }

    #[test]
    fn jsonl_logs_go_to_stderr() {
        let home = TempDir::new().unwrap();
        let input = write(home.path(), "trips.csv", TRIPS);
        let assert = trajseg(home.path())
            .args(["--log-format", "jsonl", "-f", "jsonl", "build-graph", "--input"])
            .arg(&input)
            .arg("--output-dir")
            .arg(home.path().join("graph"))
            .assert()
            .success();

        let output = assert.get_output();
        let stdout = String::from_utf8(output.stdout.clone()).unwrap();
        assert_eq!(stdout.lines().count(), 1);
        let stderr = String::from_utf8(output.stderr.clone()).unwrap();
        let first = stderr.lines().next().expect("at least one log line");
        let event: serde_json::Value = serde_json::from_str(first).unwrap();
        assert!(event.get("run_id").is_some());
    }
}
