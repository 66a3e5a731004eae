//! `From` implementations bridging `fatigue_config` types to `fatigue_core` types.
//!
//! Calibration curves convert through `TryFrom` (see `calibration`) because a
//! degenerate curve is a configuration error.

use std::time::Duration;

use crate::config::{AcquisitionCfg, DetectionCfg, MotionCfg, SafetyCfg};

// ── AcquisitionCfg ───────────────────────────────────────────────────────────

impl From<&fatigue_config::AcquisitionCfg> for AcquisitionCfg {
    fn from(c: &fatigue_config::AcquisitionCfg) -> Self {
        Self {
            record_rate_per_min: c.record_rate_per_min,
            warmup_reads: c.warmup_reads,
            warmup_interval: Duration::from_millis(c.warmup_interval_ms),
            delimiter: c.delimiter_char(),
            echo: false,
        }
    }
}

// ── DetectionCfg ─────────────────────────────────────────────────────────────

impl From<&fatigue_config::DetectionCfg> for DetectionCfg {
    fn from(c: &fatigue_config::DetectionCfg) -> Self {
        Self {
            jump_tolerance_ohms: c.jump_tolerance_ohms,
            cycle_separation: c.cycle_separation,
            direction_tolerance_cm: c.direction_tolerance_cm,
        }
    }
}

// ── SafetyCfg ────────────────────────────────────────────────────────────────

impl From<&fatigue_config::Safety> for SafetyCfg {
    fn from(c: &fatigue_config::Safety) -> Self {
        Self {
            halt_bound_ohms: c.halt_bound_ohms,
            stop_repeats: c.stop_repeats,
            stop_gap: Duration::from_millis(c.stop_gap_ms),
            ack_poll: Duration::from_millis(c.ack_poll_ms),
            ack_timeout: (c.ack_timeout_ms > 0).then(|| Duration::from_millis(c.ack_timeout_ms)),
            daq_stop_settle: Duration::from_millis(c.daq_stop_settle_ms),
        }
    }
}

// ── MotionCfg ────────────────────────────────────────────────────────────────

impl From<&fatigue_config::Motion> for MotionCfg {
    fn from(c: &fatigue_config::Motion) -> Self {
        Self {
            offset_mm: c.offset_mm,
            stretch_pct: c.stretch_pct,
            cycles: c.cycles,
            feed_mm_per_min: c.feed_mm_per_min,
            approach_feed_mm_per_min: c.approach_feed_mm_per_min,
            min_length_mm: c.min_length_mm,
            max_length_mm: c.max_length_mm,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_ack_timeout_means_unbounded() {
        let cfg = fatigue_config::Safety::default();
        assert_eq!(SafetyCfg::from(&cfg).ack_timeout, None);
        let cfg = fatigue_config::Safety {
            ack_timeout_ms: 2500,
            ..fatigue_config::Safety::default()
        };
        assert_eq!(
            SafetyCfg::from(&cfg).ack_timeout,
            Some(Duration::from_millis(2500))
        );
    }

    #[test]
    fn acquisition_defaults_carry_over() {
        let core = AcquisitionCfg::from(&fatigue_config::AcquisitionCfg::default());
        assert_eq!(core.poll_period(), Duration::from_millis(300));
        assert_eq!(core.delimiter, ',');
        assert_eq!(core.warmup_reads, 6);
    }
}
