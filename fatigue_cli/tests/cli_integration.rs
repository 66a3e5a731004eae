use assert_cmd::prelude::*;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

// Minimal valid TOML for the sim backend, tuned so a run takes milliseconds
fn write_valid_config(dir: &tempfile::TempDir) -> PathBuf {
    let toml = r#"
[devices]
# ports are unused by the sim backend but must be present
daq_port = "sim-daq"
actuator_port = "sim-actuator"

[acquisition]
record_rate_per_min = 60000
warmup_reads = 0

[safety]
halt_bound_ohms = 30.0
stop_gap_ms = 1
ack_poll_ms = 1
daq_stop_settle_ms = 0
"#;
    let path = dir.path().join("cfg.toml");
    fs::write(&path, toml).unwrap();
    path
}

fn fatigue(cfg: &PathBuf) -> Command {
    let mut cmd = Command::cargo_bin("fatigue").unwrap();
    cmd.env_remove("FATIGUE_SIM_BREAK_EVERY")
        .env_remove("FATIGUE_SIM_GARBAGE_EVERY")
        .env_remove("FATIGUE_SIM_NO_ACK")
        .arg("--log-level")
        .arg("error")
        .arg("--config")
        .arg(cfg);
    cmd
}

#[rstest]
#[case(&["--help"], 0, "Usage:", "stdout")]
#[case(&["monitor"], 2, "--output", "stderr")]
#[case(&["plan", "--cycles", "2"], 0, "G0Z-45F3000;", "stdout")]
#[case(&["plan", "--stretch-pct", "100", "--offset-mm", "90"], 5, "beyond the machine travel", "stderr")]
#[case(&["self-check"], 0, "self-check passed", "stdout")]
fn cli_table_cases(
    #[case] args: &[&str],
    #[case] exit_code: i32,
    #[case] needle: &str,
    #[case] stream: &str,
) {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let mut cmd = fatigue(&cfg);
    for a in args {
        cmd.arg(a);
    }

    let assert = cmd.assert().code(exit_code);
    match stream {
        "stdout" => {
            assert.stdout(predicate::str::contains(needle));
        }
        "stderr" => {
            assert.stderr(predicate::str::contains(needle));
        }
        other => panic!("unknown stream: {other}"),
    }
}

#[rstest]
fn monitor_halts_and_reports_breaks() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);
    let out = dir.path().join("run.csv");

    fatigue(&cfg)
        .arg("monitor")
        .arg("--output")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Halted stretch tester"))
        .stdout(predicate::str::contains(
            "Test ended. Conductor has exceeded 30 ohms after 11.5 cycles.",
        ))
        .stdout(predicate::str::contains("Conductor 1 broke at 0 cycles"))
        .stdout(predicate::str::contains("Conductor 5 broke at 11.5 cycles"))
        .stdout(predicate::str::contains("conductors broken: 5"));

    let text = fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines[0],
        "Time (seconds),cycle #,Resistance (ohms),length of sample (cm)"
    );
    assert_eq!(lines.last().copied(), Some("Conductor broke after: 11.5 cycles."));
    // one row per scan before the halting one
    assert_eq!(lines.len(), 1 + 96 + 1);
    let second: Vec<&str> = lines[1].split(',').collect();
    assert_eq!(second.len(), 4);
    assert_eq!(second[1], "0");
}

#[rstest]
fn monitor_quiet_suppresses_status_lines() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);
    let out = dir.path().join("run.csv");

    fatigue(&cfg)
        .env("FATIGUE_SIM_BREAK_EVERY", "1")
        .arg("monitor")
        .arg("--output")
        .arg(&out)
        .arg("--quiet")
        .assert()
        .success()
        .stdout(predicate::str::contains("conductors broken").not())
        .stdout(predicate::str::contains("Halted stretch tester"));
}

#[rstest]
fn lower_halt_bound_stops_earlier() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);
    let out = dir.path().join("run.csv");

    fatigue(&cfg)
        .arg("monitor")
        .arg("--output")
        .arg(&out)
        .arg("--halt-bound")
        .arg("12")
        .arg("--quiet")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Test ended. Conductor has exceeded 12 ohms after 2.5 cycles.",
        ));

    let text = fs::read_to_string(&out).unwrap();
    assert_eq!(text.lines().count(), 1 + 24 + 1);
}

#[rstest]
fn garbage_scans_are_skipped() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);
    let out = dir.path().join("run.csv");

    fatigue(&cfg)
        .env("FATIGUE_SIM_GARBAGE_EVERY", "7")
        .arg("monitor")
        .arg("--output")
        .arg(&out)
        .arg("--quiet")
        .assert()
        .success()
        .stdout(predicate::str::contains("Halted stretch tester"));

    let text = fs::read_to_string(&out).unwrap();
    assert!(!text.contains("ERR"));
}

#[rstest]
fn plan_writes_program_file() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);
    let out = dir.path().join("cycle.gcode");

    fatigue(&cfg)
        .arg("plan")
        .arg("--cycles")
        .arg("2")
        .arg("--output")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Estimated duration:"));

    let text = fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 1 + 2 * 3 + 2);
    assert_eq!(lines[0], "G90;");
    assert_eq!(lines[1], "G0Z-18F3000;");
}

#[rstest]
fn refused_plan_leaves_no_file() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);
    let out = dir.path().join("cycle.gcode");

    fatigue(&cfg)
        .arg("plan")
        .arg("--stretch-pct")
        .arg("100")
        .arg("--offset-mm")
        .arg("90")
        .arg("--output")
        .arg(&out)
        .assert()
        .code(5);
    assert!(!out.exists());
}

#[rstest]
fn cli_reports_bad_calibration_header() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let bad_csv = dir.path().join("calib.csv");
    let mut f = fs::File::create(&bad_csv).unwrap();
    writeln!(f, "raw,ohms").unwrap();
    writeln!(f, "-5.9985,10.006").unwrap();
    writeln!(f, "-9.6143,0.964").unwrap();

    fatigue(&cfg)
        .arg("--resistance-calibration")
        .arg(&bad_csv)
        .arg("self-check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid headers"));
}

#[rstest]
fn calibration_csv_overrides_config() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let csv = dir.path().join("stretch.csv");
    fs::write(&csv, "raw,physical\n0,0\n1,10\n").unwrap();

    fatigue(&cfg)
        .arg("--stretch-calibration")
        .arg(&csv)
        .arg("self-check")
        .assert()
        .success()
        .stdout(predicate::str::contains("stretch 10.0000 cm/V"));
}

#[rstest]
fn missing_config_is_explained() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope.toml");

    fatigue(&missing)
        .arg("self-check")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("config file could not be read"));
}

#[rstest]
fn invalid_config_is_rejected() {
    let dir = tempdir().unwrap();
    let cfg = dir.path().join("cfg.toml");
    fs::write(
        &cfg,
        "[devices]\ndaq_port = \"a\"\nactuator_port = \"b\"\n[safety]\nhalt_bound_ohms = -1.0\n",
    )
    .unwrap();

    fatigue(&cfg)
        .arg("self-check")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Configuration is invalid"));
}
