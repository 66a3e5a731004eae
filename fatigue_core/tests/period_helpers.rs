use std::time::Duration;

use fatigue_core::util::{poll_period, warmup_percent};
use rstest::rstest;

#[rstest]
#[case(200, Duration::from_millis(300))]
#[case(60, Duration::from_secs(1))]
#[case(1, Duration::from_secs(60))]
#[case(0, Duration::from_secs(60))]
#[case(60_000, Duration::from_millis(1))]
#[case(u32::MAX, Duration::from_micros(1))]
fn poll_period_from_rate(#[case] per_min: u32, #[case] expected: Duration) {
    assert_eq!(poll_period(per_min), expected);
}

#[rstest]
#[case(0, 6, 0)]
#[case(1, 6, 20)]
#[case(5, 6, 100)]
#[case(0, 1, 100)]
#[case(9, 6, 100)]
fn warmup_progress(#[case] i: u32, #[case] n: u32, #[case] expected: u32) {
    assert_eq!(warmup_percent(i, n), expected);
}
