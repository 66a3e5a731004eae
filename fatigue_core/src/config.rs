//! Runtime configuration for the monitoring engine.
//!
//! These are the structs consumed by `Session` and `Monitor`. They are separate
//! from the TOML-deserialized config in `fatigue_config`.

use std::time::Duration;

/// Acquisition loop pacing and input framing.
#[derive(Debug, Clone)]
pub struct AcquisitionCfg {
    /// Samples per minute; the loop sleeps `60 / rate` seconds per poll.
    pub record_rate_per_min: u32,
    /// Stale lines discarded before data is trusted.
    pub warmup_reads: u32,
    /// Pause between warm-up reads.
    pub warmup_interval: Duration,
    pub delimiter: char,
    /// Print the per-sample status line on stdout.
    pub echo: bool,
}

impl Default for AcquisitionCfg {
    fn default() -> Self {
        Self {
            record_rate_per_min: 200,
            warmup_reads: 6,
            warmup_interval: Duration::from_millis(100),
            delimiter: ',',
            echo: false,
        }
    }
}

impl AcquisitionCfg {
    /// Sleep between polls.
    pub fn poll_period(&self) -> Duration {
        crate::util::poll_period(self.record_rate_per_min)
    }
}

/// Tolerances for direction and break classification.
#[derive(Debug, Clone, Copy)]
pub struct DetectionCfg {
    pub jump_tolerance_ohms: f64,
    pub cycle_separation: f64,
    pub direction_tolerance_cm: f64,
}

impl Default for DetectionCfg {
    fn default() -> Self {
        Self {
            jump_tolerance_ohms: 0.15,
            cycle_separation: 1.0,
            direction_tolerance_cm: 0.05,
        }
    }
}

/// Halt bound and stop handshake timing.
#[derive(Debug, Clone)]
pub struct SafetyCfg {
    pub halt_bound_ohms: f64,
    pub stop_repeats: u8,
    pub stop_gap: Duration,
    pub ack_poll: Duration,
    /// `None` waits for the acknowledgment indefinitely.
    pub ack_timeout: Option<Duration>,
    pub daq_stop_settle: Duration,
}

impl Default for SafetyCfg {
    fn default() -> Self {
        Self {
            halt_bound_ohms: 30.0,
            stop_repeats: 2,
            stop_gap: Duration::from_millis(100),
            ack_poll: Duration::from_millis(50),
            ack_timeout: None,
            daq_stop_settle: Duration::from_secs(1),
        }
    }
}

/// Motion program parameters (millimetres, mm/min).
#[derive(Debug, Clone)]
pub struct MotionCfg {
    pub offset_mm: f64,
    pub stretch_pct: f64,
    pub cycles: u32,
    pub feed_mm_per_min: f64,
    pub approach_feed_mm_per_min: f64,
    pub min_length_mm: f64,
    pub max_length_mm: f64,
}

impl Default for MotionCfg {
    fn default() -> Self {
        Self {
            offset_mm: 17.0,
            stretch_pct: 20.0,
            cycles: 45_000,
            feed_mm_per_min: 3000.0,
            approach_feed_mm_per_min: 500.0,
            min_length_mm: 135.0,
            max_length_mm: 236.0,
        }
    }
}
