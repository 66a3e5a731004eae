use fatigue_config::load_toml;
use rstest::rstest;

const MINIMAL: &str = r#"
[devices]
daq_port = "/dev/ttyACM0"
actuator_port = "/dev/ttyACM1"
"#;

#[test]
fn minimal_config_takes_bench_defaults() {
    let cfg = load_toml(MINIMAL).expect("parse TOML");
    cfg.validate().expect("defaults are valid");
    assert_eq!(cfg.devices.actuator_baud, 115_200);
    assert_eq!(cfg.acquisition.record_rate_per_min, 200);
    assert_eq!(cfg.acquisition.warmup_reads, 6);
    assert_eq!(cfg.acquisition.delimiter_char(), ',');
    assert_eq!(cfg.detection.jump_tolerance_ohms, 0.15);
    assert_eq!(cfg.detection.cycle_separation, 1.0);
    assert_eq!(cfg.detection.direction_tolerance_cm, 0.05);
    assert_eq!(cfg.safety.halt_bound_ohms, 30.0);
    assert_eq!(cfg.safety.stop_repeats, 2);
    assert_eq!(cfg.safety.ack_timeout_ms, 0);
    assert_eq!(cfg.calibration.stretch.phys_high, 20.0);
    assert_eq!(cfg.motion.cycles, 45_000);
}

#[test]
fn missing_devices_section_is_a_parse_error() {
    let err = load_toml("[safety]\nhalt_bound_ohms = 10.0\n").expect_err("devices required");
    assert!(format!("{err}").contains("devices"));
}

#[rstest]
#[case("[acquisition]\nrecord_rate_per_min = 0", "record_rate_per_min must be > 0")]
#[case("[acquisition]\ndelimiter = \";;\"", "delimiter must be exactly one character")]
#[case("[detection]\njump_tolerance_ohms = -0.1", "jump_tolerance_ohms")]
#[case("[detection]\ndirection_tolerance_cm = nan", "direction_tolerance_cm")]
#[case("[safety]\nhalt_bound_ohms = 0.0", "halt_bound_ohms")]
#[case("[safety]\nstop_repeats = 0", "stop_repeats must be >= 1")]
#[case("[safety]\nack_poll_ms = 0", "ack_poll_ms must be >= 1")]
#[case(
    "[calibration.stretch]\nraw_low = 1.0\nphys_low = 13.5\nraw_high = 1.0\nphys_high = 20.0",
    "raw_low and raw_high must differ"
)]
#[case("[motion]\nmin_length_mm = 300.0", "min_length_mm must be < motion.max_length_mm")]
#[case("[motion]\ncycles = 0", "motion.cycles must be >= 1")]
fn rejects_invalid_sections(#[case] extra: &str, #[case] needle: &str) {
    let toml = format!("{MINIMAL}\n{extra}\n");
    let cfg = load_toml(&toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should be rejected");
    assert!(
        format!("{err}").contains(needle),
        "expected '{needle}' in '{err}'"
    );
}

#[test]
fn accepts_semicolon_delimiter_and_bounded_ack() {
    let toml = format!(
        "{MINIMAL}\n[acquisition]\ndelimiter = \";\"\nrecord_rate_per_min = 600\n\n[safety]\nack_timeout_ms = 5000\n"
    );
    let cfg = load_toml(&toml).expect("parse TOML");
    cfg.validate().expect("valid");
    assert_eq!(cfg.acquisition.delimiter_char(), ';');
    assert_eq!(cfg.safety.ack_timeout_ms, 5000);
    // untouched safety fields keep their defaults
    assert_eq!(cfg.safety.stop_gap_ms, 100);
}
