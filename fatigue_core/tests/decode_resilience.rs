use fatigue_core::mocks::{MemorySink, ScriptedAcquisition, ScriptedActuator};
use fatigue_core::{AcquisitionCfg, CalibrationCurve, MonitorError, PollOutcome, Session};
use fatigue_traits::clock::test_clock::TestClock;
use rstest::rstest;

fn identity() -> CalibrationCurve {
    CalibrationCurve::new((0.0, 0.0), (1.0, 1.0)).expect("valid curve")
}

fn build(
    daq: ScriptedAcquisition,
    sink: MemorySink,
) -> Session<ScriptedAcquisition, ScriptedActuator, MemorySink> {
    Session::builder()
        .with_acquisition(daq)
        .with_actuator(ScriptedActuator::acking_after(0, "ok"))
        .with_sink(sink)
        .with_resistance_curve(identity())
        .with_stretch_curve(identity())
        .with_acquisition_cfg(AcquisitionCfg {
            warmup_reads: 0,
            ..AcquisitionCfg::default()
        })
        .with_clock(TestClock::new())
        .build()
        .expect("build")
}

#[rstest]
#[case::empty("")]
#[case::single_field("5")]
#[case::text("ERR,overflow")]
#[case::half_line("5,")]
#[case::nan("NaN,10")]
fn malformed_line_is_skipped(#[case] line: &str) {
    let daq = ScriptedAcquisition::new([line, "5,10"]);
    let mut s = build(daq, MemorySink::new());
    s.begin().expect("begin");

    match s.poll().expect("poll") {
        PollOutcome::Skipped(MonitorError::Decode(_)) => {}
        other => panic!("expected decode skip, got {other:?}"),
    }
    assert!(matches!(s.poll().expect("poll"), PollOutcome::Recorded(_)));
    assert_eq!(s.samples_skipped(), 1);
    assert_eq!(s.telemetry().sink().rows.len(), 1);
}

#[test]
fn read_failure_is_skipped_and_loop_continues() {
    let daq = ScriptedAcquisition::new(["5,10"])
        .then_error("framing error")
        .then_line("5,12")
        .then_line("31,12");
    let mut s = build(daq, MemorySink::new());

    let summary = s.run().expect("halts");
    assert_eq!(summary.samples_skipped, 1);
    assert_eq!(summary.rows_written, 2);
    assert_eq!(summary.final_resistance_ohms, 31.0);
}

#[test]
fn skipped_lines_leave_detector_state_alone() {
    let daq = ScriptedAcquisition::new(["5,10", "garbage", "5,8"]);
    let mut s = build(daq, MemorySink::new());
    s.begin().expect("begin");
    for _ in 0..3 {
        s.poll().expect("poll");
    }
    // the reversal is measured against the last decoded sample
    assert_eq!(s.monitor().cycles(), 0.5);
    assert_eq!(s.monitor().break_records().len(), 1);
}

#[test]
fn persistence_failures_are_counted_not_fatal() {
    let daq = ScriptedAcquisition::new(["5,10", "5,12", "35,12"]);
    let mut s = build(daq, MemorySink::failing());

    let summary = s.run().expect("halts despite sink failures");
    assert_eq!(summary.rows_written, 0);
    assert_eq!(summary.write_failures, 3);
    assert!(s.acquisition_device().stopped());
}
