//! Cyclic motion program for the stretching rig.
//!
//! The machine homes at the top of its travel; Z is negative downwards. A sample
//! clamped at `offset_mm` below home has an original length of
//! `min_length + offset - 2` mm. Each cycle retracts to the rest position,
//! creeps the last millimetre at the approach feed, then pulls to the target.

use std::fmt;
use std::io::{self, Write};

use crate::config::MotionCfg;
use crate::error::PlanError;

#[derive(Debug, Clone, PartialEq)]
pub struct MotionPlan {
    pub original_length_mm: f64,
    /// Rest depth of the clamp below the minimum length position.
    pub base_mm: f64,
    /// Depth at full stretch.
    pub target_mm: f64,
    pub stretch_pct: f64,
    pub cycles: u32,
    pub feed_mm_per_min: f64,
    pub approach_feed_mm_per_min: f64,
}

impl MotionPlan {
    pub fn compute(cfg: &MotionCfg) -> Result<Self, PlanError> {
        if cfg.cycles == 0 {
            return Err(PlanError::Invalid("cycles must be >= 1"));
        }
        if !(cfg.feed_mm_per_min > 0.0 && cfg.approach_feed_mm_per_min > 0.0) {
            return Err(PlanError::Invalid("feed rates must be > 0"));
        }
        if !(cfg.stretch_pct.is_finite() && cfg.stretch_pct >= 0.0) {
            return Err(PlanError::Invalid("stretch must be a finite percentage >= 0"));
        }
        if ![cfg.offset_mm, cfg.min_length_mm, cfg.max_length_mm]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(PlanError::Invalid("machine geometry must be finite"));
        }
        let original_length_mm = cfg.min_length_mm + cfg.offset_mm - 2.0;
        let base_mm = original_length_mm - cfg.min_length_mm;
        let target_mm = original_length_mm * cfg.stretch_pct / 100.0 + base_mm;
        if !target_mm.is_finite() {
            return Err(PlanError::Invalid("target position is not a finite number"));
        }
        if target_mm > cfg.max_length_mm {
            return Err(PlanError::ExceedsTravel {
                target_mm,
                max_mm: cfg.max_length_mm,
            });
        }
        Ok(Self {
            original_length_mm,
            base_mm,
            target_mm,
            stretch_pct: cfg.stretch_pct,
            cycles: cfg.cycles,
            feed_mm_per_min: cfg.feed_mm_per_min,
            approach_feed_mm_per_min: cfg.approach_feed_mm_per_min,
        })
    }

    fn retract(&self) -> [String; 2] {
        [
            format!("G0Z{}F{};", -(self.base_mm + 3.0), self.feed_mm_per_min),
            format!(
                "G0Z{}F{};",
                -(self.base_mm + 2.0),
                self.approach_feed_mm_per_min
            ),
        ]
    }

    /// Program lines: absolute mode, `cycles` stretch cycles, final retract.
    pub fn program(&self) -> impl Iterator<Item = String> + '_ {
        let pull = format!("G0Z-{}F{};", self.target_mm, self.feed_mm_per_min);
        let cycle = {
            let [a, b] = self.retract();
            [a, b, pull]
        };
        std::iter::once("G90;".to_string())
            .chain((0..self.cycles).flat_map(move |_| cycle.clone()))
            .chain(self.retract())
    }

    pub fn write_program<W: Write>(&self, w: &mut W) -> io::Result<()> {
        for line in self.program() {
            writeln!(w, "{line}")?;
        }
        w.flush()
    }

    /// Travel time plus the 1 mm approach and a one-second reversal per cycle.
    pub fn estimated_minutes(&self) -> f64 {
        let cycles = f64::from(self.cycles);
        let travelled = (self.target_mm - (self.base_mm + 3.0)) * cycles;
        travelled / self.feed_mm_per_min + cycles / self.approach_feed_mm_per_min + cycles / 60.0
    }

    pub fn estimated_duration(&self) -> EstimatedDuration {
        EstimatedDuration::from_minutes(self.estimated_minutes())
    }
}

/// Job duration in the largest sensible unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EstimatedDuration {
    Minutes(f64),
    Hours(f64),
    Days(f64),
}

impl EstimatedDuration {
    pub fn from_minutes(minutes: f64) -> Self {
        if minutes <= 100.0 {
            return Self::Minutes(minutes);
        }
        let hours = minutes / 60.0;
        if hours <= 50.0 {
            Self::Hours(hours)
        } else {
            Self::Days(hours / 24.0)
        }
    }
}

impl fmt::Display for EstimatedDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Minutes(v) => write!(f, "{v:.2} minutes"),
            Self::Hours(v) => write!(f, "{v:.2} hours"),
            Self::Days(v) => write!(f, "{v:.2} days"),
        }
    }
}
