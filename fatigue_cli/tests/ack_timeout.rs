use assert_cmd::prelude::*;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

fn config(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let toml = r#"
[devices]
daq_port = "sim-daq"
actuator_port = "sim-actuator"

[acquisition]
record_rate_per_min = 60000
warmup_reads = 0

[safety]
stop_gap_ms = 1
ack_poll_ms = 1
daq_stop_settle_ms = 0
"#;
    let path = dir.path().join("cfg.toml");
    fs::write(&path, toml).unwrap();
    path
}

#[rstest]
fn silent_actuator_bubbles_to_exit_code_3() {
    let dir = tempdir().unwrap();
    let cfg = config(&dir);
    let out = dir.path().join("run.csv");

    Command::cargo_bin("fatigue")
        .unwrap()
        .env("FATIGUE_SIM_NO_ACK", "1")
        .env("FATIGUE_SIM_BREAK_EVERY", "1")
        .arg("--config")
        .arg(&cfg)
        .arg("monitor")
        .arg("--output")
        .arg(&out)
        .arg("--ack-timeout-ms")
        .arg("50")
        .arg("--quiet")
        .assert()
        .code(3)
        .stderr(predicate::str::contains(
            "What happened: The actuator did not acknowledge the stop command",
        ))
        .stdout(predicate::str::contains("Halted stretch tester").not());

    // the record is closed even though the handshake failed
    let text = fs::read_to_string(&out).unwrap();
    assert!(
        text.lines()
            .last()
            .is_some_and(|l| l.starts_with("Conductor broke after:"))
    );
}

#[rstest]
fn ack_timeout_json_error() {
    let dir = tempdir().unwrap();
    let cfg = config(&dir);
    let out = dir.path().join("run.csv");

    let output = Command::cargo_bin("fatigue")
        .unwrap()
        .env("FATIGUE_SIM_NO_ACK", "1")
        .env("FATIGUE_SIM_BREAK_EVERY", "1")
        .arg("--json")
        .arg("--log-level")
        .arg("error")
        .arg("--config")
        .arg(&cfg)
        .arg("monitor")
        .arg("--output")
        .arg(&out)
        .arg("--ack-timeout-ms")
        .arg("20")
        .assert()
        .code(3)
        .get_output()
        .stdout
        .clone();

    let stdout = String::from_utf8_lossy(&output);
    let line = stdout
        .lines()
        .find(|l| l.contains("\"reason\""))
        .unwrap_or_else(|| panic!("no JSON error line; stdout was: {stdout}"));
    let v: serde_json::Value = serde_json::from_str(line).expect("valid JSON");
    assert_eq!(v["reason"], "AckTimeout");
    assert_eq!(v["exit_code"], 3);
    assert!(v["details"]["waited_ms"].as_u64().is_some_and(|ms| ms >= 20));
}
