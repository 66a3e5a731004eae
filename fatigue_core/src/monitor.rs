//! The per-sample processing pipeline (`Monitor`).
//!
//! Pure state machine with no I/O: calibrate both channels, advance the cycle
//! tracker, classify breaks, then test the halt bound. `Session` feeds it
//! decoded samples and performs the logging and the stop handshake.

use crate::breaks::{BreakDetector, BreakEvent, BreakRecord};
use crate::calibration::CalibrationCurve;
use crate::config::DetectionCfg;
use crate::cycle::CycleTracker;
use crate::logger::RecordRow;
use crate::safety::SafetyController;
use crate::sample::Sample;

/// A fully processed sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub elapsed_s: f64,
    pub resistance_ohms: f64,
    pub stretch_cm: f64,
    pub cycles: f64,
    /// Breaks detected so far, including any opened by this sample.
    pub breaks: usize,
    pub event: Option<BreakEvent>,
    /// This sample crossed the halt bound.
    pub halt: bool,
}

impl Reading {
    pub fn row(&self) -> RecordRow {
        RecordRow {
            elapsed_s: self.elapsed_s,
            cycles: self.cycles,
            resistance_ohms: self.resistance_ohms,
            stretch_cm: self.stretch_cm,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Monitor {
    resistance: CalibrationCurve,
    stretch: CalibrationCurve,
    detection: DetectionCfg,
    cycles: CycleTracker,
    breaks: BreakDetector,
    safety: SafetyController,
}

impl Monitor {
    pub fn new(
        resistance: CalibrationCurve,
        stretch: CalibrationCurve,
        detection: DetectionCfg,
        halt_bound_ohms: f64,
    ) -> Self {
        Self {
            resistance,
            stretch,
            detection,
            cycles: CycleTracker::new(),
            breaks: BreakDetector::new(),
            safety: SafetyController::new(halt_bound_ohms),
        }
    }

    pub fn process(&mut self, sample: &Sample, elapsed_s: f64) -> Reading {
        let resistance_ohms = self.resistance.convert(sample.resistance_raw);
        let stretch_cm = self.stretch.convert(sample.stretch_raw);

        if self
            .cycles
            .observe(stretch_cm, self.detection.direction_tolerance_cm)
        {
            tracing::debug!(cycles = self.cycles.cycles(), stretch_cm, "direction reversal");
        }
        let cycles = self.cycles.cycles();

        let event = self.breaks.observe(
            resistance_ohms,
            cycles,
            self.detection.jump_tolerance_ohms,
            self.detection.cycle_separation,
        );
        match event {
            Some(BreakEvent::New(rec)) => tracing::info!(
                index = rec.index,
                cycle = rec.cycle,
                resistance_ohms = rec.resistance_ohms,
                "conductor break detected"
            ),
            Some(BreakEvent::Updated(rec)) => tracing::debug!(
                index = rec.index,
                cycle = rec.cycle,
                resistance_ohms = rec.resistance_ohms,
                "break refined"
            ),
            None => {}
        }

        let halt = self.safety.check(resistance_ohms);

        Reading {
            elapsed_s,
            resistance_ohms,
            stretch_cm,
            cycles,
            breaks: self.breaks.breaks_detected(),
            event,
            halt,
        }
    }

    pub fn cycles(&self) -> f64 {
        self.cycles.cycles()
    }

    pub fn break_records(&self) -> &[BreakRecord] {
        self.breaks.records()
    }

    pub fn halted(&self) -> bool {
        self.safety.halted()
    }

    pub fn halt_bound_ohms(&self) -> f64 {
        self.safety.bound_ohms()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> CalibrationCurve {
        CalibrationCurve::new((0.0, 0.0), (1.0, 1.0)).expect("valid")
    }

    fn sample(r: f64, s: f64) -> Sample {
        Sample {
            resistance_raw: r,
            stretch_raw: s,
        }
    }

    #[test]
    fn pipeline_orders_cycle_update_before_break_classification() {
        let mut m = Monitor::new(identity(), identity(), DetectionCfg::default(), 30.0);
        let a = m.process(&sample(5.0, 10.0), 0.0);
        assert_eq!(a.cycles, 0.0);
        assert_eq!(a.breaks, 1);
        assert!(!a.halt);

        let b = m.process(&sample(5.0, 12.0), 0.3);
        assert_eq!(b.event, None);

        let c = m.process(&sample(35.0, 8.0), 0.6);
        assert_eq!(c.cycles, 0.5);
        assert!(c.halt);
        assert_eq!(
            c.event,
            Some(BreakEvent::Updated(BreakRecord {
                index: 1,
                resistance_ohms: 35.0,
                cycle: 0.5
            }))
        );
        assert!(m.halted());
    }

    #[test]
    fn calibration_is_applied_to_both_channels() {
        let r = CalibrationCurve::new((0.0, 10.0), (1.0, 20.0)).expect("valid");
        let s = CalibrationCurve::new((0.0, 0.0), (2.0, 1.0)).expect("valid");
        let mut m = Monitor::new(r, s, DetectionCfg::default(), 100.0);
        let reading = m.process(&sample(0.5, 1.0), 2.0);
        assert_eq!(reading.resistance_ohms, 15.0);
        assert_eq!(reading.stretch_cm, 0.5);
        assert_eq!(
            reading.row(),
            RecordRow {
                elapsed_s: 2.0,
                cycles: 0.0,
                resistance_ohms: 15.0,
                stretch_cm: 0.5
            }
        );
    }
}
