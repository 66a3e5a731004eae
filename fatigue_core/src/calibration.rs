//! Two-point linear calibration from instrument volts to physical units.

use crate::error::MonitorError;

/// Linear map through `(raw_low, phys_low)` and `(raw_high, phys_high)`.
///
/// Construction rejects coincident raw anchors, so `convert` never divides by zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationCurve {
    raw_low: f64,
    phys_low: f64,
    raw_high: f64,
    phys_high: f64,
    ratio: f64,
}

impl CalibrationCurve {
    pub fn new(
        (raw_low, phys_low): (f64, f64),
        (raw_high, phys_high): (f64, f64),
    ) -> Result<Self, MonitorError> {
        if ![raw_low, phys_low, raw_high, phys_high]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(MonitorError::Config(
                "calibration points must be finite".into(),
            ));
        }
        if raw_high == raw_low {
            return Err(MonitorError::Config(format!(
                "degenerate calibration: both raw anchors are {raw_low}"
            )));
        }
        let ratio = (phys_high - phys_low) / (raw_high - raw_low);
        Ok(Self {
            raw_low,
            phys_low,
            raw_high,
            phys_high,
            ratio,
        })
    }

    /// Convert a raw reading to physical units.
    #[inline]
    pub fn convert(&self, raw: f64) -> f64 {
        // Anchors map exactly, independent of rounding in `ratio`.
        if raw == self.raw_high {
            return self.phys_high;
        }
        (raw - self.raw_low) * self.ratio + self.phys_low
    }

    /// Physical units per raw unit.
    pub fn slope(&self) -> f64 {
        self.ratio
    }

    pub fn anchors(&self) -> ((f64, f64), (f64, f64)) {
        (
            (self.raw_low, self.phys_low),
            (self.raw_high, self.phys_high),
        )
    }
}

impl TryFrom<fatigue_config::CurvePoints> for CalibrationCurve {
    type Error = MonitorError;
    fn try_from(p: fatigue_config::CurvePoints) -> Result<Self, Self::Error> {
        Self::new((p.raw_low, p.phys_low), (p.raw_high, p.phys_high))
    }
}
