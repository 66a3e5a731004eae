#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas and calibration parsing for the fatigue tester.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - Calibration CSV loader enforces headers and exactly two reference rows,
//!   since every instrument channel uses a two-point linear mapping.
use serde::Deserialize;

/// Calibration CSV schema.
///
/// Expected headers:
/// raw,physical
///
/// Example (resistance channel, volts -> ohms):
/// raw,physical
/// -5.9985,10.006
/// -9.6143,0.964
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct CalibrationRow {
    pub raw: f64,
    pub physical: f64,
}

/// Two reference points `(raw_low, phys_low)` and `(raw_high, phys_high)`.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct CurvePoints {
    pub raw_low: f64,
    pub phys_low: f64,
    pub raw_high: f64,
    pub phys_high: f64,
}

impl CurvePoints {
    /// Bench calibration of the resistance channel (volts -> ohms).
    pub const RESISTANCE: Self = Self {
        raw_low: -5.9985,
        phys_low: 10.006,
        raw_high: -9.6143,
        phys_high: 0.964,
    };

    /// Bench calibration of the stretch channel (volts -> cm).
    pub const STRETCH: Self = Self {
        raw_low: 0.793,
        phys_low: 13.5,
        raw_high: 1.126,
        phys_high: 20.0,
    };

    fn validate(&self, name: &str) -> eyre::Result<()> {
        let all = [self.raw_low, self.phys_low, self.raw_high, self.phys_high];
        if all.iter().any(|v| !v.is_finite()) {
            eyre::bail!("calibration.{name} points must be finite");
        }
        if self.raw_low == self.raw_high {
            eyre::bail!("calibration.{name} raw_low and raw_high must differ");
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Calibrations {
    pub resistance: CurvePoints,
    pub stretch: CurvePoints,
}

impl Default for Calibrations {
    fn default() -> Self {
        Self {
            resistance: CurvePoints::RESISTANCE,
            stretch: CurvePoints::STRETCH,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Devices {
    /// Serial port of the acquisition device (e.g. "/dev/ttyACM0", "COM8")
    pub daq_port: String,
    /// Serial port of the actuator controller
    pub actuator_port: String,
    #[serde(default = "default_actuator_baud")]
    pub actuator_baud: u32,
}

fn default_actuator_baud() -> u32 {
    115_200
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AcquisitionCfg {
    /// Polling cadence in samples per minute; the loop sleeps 60/rate seconds per poll.
    pub record_rate_per_min: u32,
    /// Stale lines discarded before data is trusted.
    pub warmup_reads: u32,
    pub warmup_interval_ms: u64,
    /// Field separator of the DAQ's ASCII output. Exactly one character.
    pub delimiter: String,
}

impl Default for AcquisitionCfg {
    fn default() -> Self {
        Self {
            record_rate_per_min: 200,
            warmup_reads: 6,
            warmup_interval_ms: 100,
            delimiter: ",".to_string(),
        }
    }
}

impl AcquisitionCfg {
    /// The configured delimiter as a char (',' if the field is empty).
    pub fn delimiter_char(&self) -> char {
        self.delimiter.chars().next().unwrap_or(',')
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DetectionCfg {
    /// Rise over the running maximum (ohms) that counts as a break candidate.
    pub jump_tolerance_ohms: f64,
    /// Cycles that must elapse after a break before a new one is recognized.
    pub cycle_separation: f64,
    /// Stretch dead-band (cm) below which direction changes are ignored.
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

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Safety {
    /// Resistance (ohms) above which the actuator is stopped and the run ends.
    pub halt_bound_ohms: f64,
    /// How many times the stop command is transmitted.
    pub stop_repeats: u8,
    /// Delay after each stop transmission.
    pub stop_gap_ms: u64,
    /// Poll interval while waiting for the actuator acknowledgment.
    pub ack_poll_ms: u64,
    /// Bound on the acknowledgment wait; 0 waits indefinitely.
    pub ack_timeout_ms: u64,
    /// Delay after stopping the DAQ before the run is finalized.
    pub daq_stop_settle_ms: u64,
}

impl Default for Safety {
    fn default() -> Self {
        Self {
            halt_bound_ohms: 30.0,
            stop_repeats: 2,
            stop_gap_ms: 100,
            ack_poll_ms: 50,
            ack_timeout_ms: 0,
            daq_stop_settle_ms: 1000,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

/// Parameters of the cyclic motion program.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Motion {
    /// Jog distance (mm) from home at which the clamped sample is straight.
    pub offset_mm: f64,
    /// Target elongation in percent of the sample's original length.
    pub stretch_pct: f64,
    pub cycles: u32,
    pub feed_mm_per_min: f64,
    /// Slow feed used for the final approach to the rest position.
    pub approach_feed_mm_per_min: f64,
    pub min_length_mm: f64,
    pub max_length_mm: f64,
}

impl Default for Motion {
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

#[derive(Debug, Deserialize)]
pub struct Config {
    pub devices: Devices,
    #[serde(default)]
    pub acquisition: AcquisitionCfg,
    #[serde(default)]
    pub calibration: Calibrations,
    #[serde(default)]
    pub detection: DetectionCfg,
    #[serde(default)]
    pub safety: Safety,
    #[serde(default)]
    pub logging: Logging,
    #[serde(default)]
    pub motion: Motion,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Load a two-point calibration from CSV with the exact header `raw,physical`.
pub fn load_calibration_csv(path: &std::path::Path) -> eyre::Result<CurvePoints> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open calibration CSV {:?}: {}", path, e))?;

    // Enforce exact headers
    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let expected = ["raw", "physical"];
    let actual: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
    if actual != expected {
        eyre::bail!(
            "calibration CSV must have headers 'raw,physical', got: {}",
            actual.join(",")
        );
    }

    let mut rows = Vec::new();
    for (idx, rec) in rdr.deserialize::<CalibrationRow>().enumerate() {
        match rec {
            Ok(row) => rows.push(row),
            Err(e) => {
                eyre::bail!("invalid CSV row {}: {}", idx + 2, e);
            }
        }
    }

    CurvePoints::try_from(rows.as_slice())
}

impl TryFrom<&[CalibrationRow]> for CurvePoints {
    type Error = eyre::Report;
    fn try_from(rows: &[CalibrationRow]) -> Result<Self, Self::Error> {
        let [low, high] = rows else {
            eyre::bail!(
                "calibration requires exactly two rows, got {}",
                rows.len()
            );
        };
        let points = CurvePoints {
            raw_low: low.raw,
            phys_low: low.physical,
            raw_high: high.raw,
            phys_high: high.physical,
        };
        points.validate("csv")?;
        Ok(points)
    }
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Devices
        if self.devices.daq_port.trim().is_empty() {
            eyre::bail!("devices.daq_port must not be empty");
        }
        if self.devices.actuator_port.trim().is_empty() {
            eyre::bail!("devices.actuator_port must not be empty");
        }
        if self.devices.actuator_baud == 0 {
            eyre::bail!("devices.actuator_baud must be > 0");
        }

        // Acquisition
        if self.acquisition.record_rate_per_min == 0 {
            eyre::bail!("acquisition.record_rate_per_min must be > 0");
        }
        if self.acquisition.record_rate_per_min > 60_000 {
            eyre::bail!("acquisition.record_rate_per_min is unreasonably large (>1 per ms)");
        }
        if self.acquisition.delimiter.chars().count() != 1 {
            eyre::bail!("acquisition.delimiter must be exactly one character");
        }

        // Calibration
        self.calibration.resistance.validate("resistance")?;
        self.calibration.stretch.validate("stretch")?;

        // Detection
        let d = &self.detection;
        if !d.jump_tolerance_ohms.is_finite() || d.jump_tolerance_ohms < 0.0 {
            eyre::bail!("detection.jump_tolerance_ohms must be a finite value >= 0");
        }
        if !d.cycle_separation.is_finite() || d.cycle_separation < 0.0 {
            eyre::bail!("detection.cycle_separation must be a finite value >= 0");
        }
        if !d.direction_tolerance_cm.is_finite() || d.direction_tolerance_cm < 0.0 {
            eyre::bail!("detection.direction_tolerance_cm must be a finite value >= 0");
        }

        // Safety
        let s = &self.safety;
        if !s.halt_bound_ohms.is_finite() || s.halt_bound_ohms <= 0.0 {
            eyre::bail!("safety.halt_bound_ohms must be a finite value > 0");
        }
        if s.stop_repeats == 0 {
            eyre::bail!("safety.stop_repeats must be >= 1");
        }
        if s.ack_poll_ms == 0 {
            eyre::bail!("safety.ack_poll_ms must be >= 1");
        }

        // Motion
        let m = &self.motion;
        if m.cycles == 0 {
            eyre::bail!("motion.cycles must be >= 1");
        }
        if !(m.feed_mm_per_min > 0.0) || !(m.approach_feed_mm_per_min > 0.0) {
            eyre::bail!("motion feed rates must be > 0");
        }
        if !(m.min_length_mm < m.max_length_mm) {
            eyre::bail!("motion.min_length_mm must be < motion.max_length_mm");
        }
        if !m.offset_mm.is_finite() || !m.stretch_pct.is_finite() || m.stretch_pct < 0.0 {
            eyre::bail!("motion.offset_mm and motion.stretch_pct must be finite (stretch >= 0)");
        }

        Ok(())
    }
}
