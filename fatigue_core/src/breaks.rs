//! Sequential conductor-break classification.
//!
//! A break candidate is a rise of more than `jump_tolerance` over the highest
//! resistance seen so far. Candidates further than `cycle_separation` cycles
//! from the previous break open a new record; closer ones belong to the break
//! still in progress and overwrite its most recent record. With no record yet
//! the candidate opens record #1, so the first reading above the 0 Ω baseline
//! always does.

use std::fmt;

/// One detected break. `index` is 1-based and never reused.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreakRecord {
    pub index: u32,
    pub resistance_ohms: f64,
    pub cycle: f64,
}

impl fmt::Display for BreakRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Conductor {} broke at {} cycles, reaching {:.3} ohms.",
            self.index, self.cycle, self.resistance_ohms
        )
    }
}

/// Outcome of a classified candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BreakEvent {
    /// A distinct break was appended.
    New(BreakRecord),
    /// The latest break was refined in place.
    Updated(BreakRecord),
}

impl BreakEvent {
    pub fn record(&self) -> &BreakRecord {
        match self {
            BreakEvent::New(r) | BreakEvent::Updated(r) => r,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BreakDetector {
    max_resistance: f64,
    cycle_of_last_break: f64,
    records: Vec<BreakRecord>,
}

impl BreakDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(
        &mut self,
        resistance: f64,
        cycles: f64,
        jump_tolerance: f64,
        cycle_separation: f64,
    ) -> Option<BreakEvent> {
        let delta = resistance - self.max_resistance;
        if !(delta > jump_tolerance) {
            return None;
        }
        self.max_resistance = resistance;

        let distinct = cycles > self.cycle_of_last_break + cycle_separation;
        match self.records.last_mut() {
            Some(latest) if !distinct => {
                latest.resistance_ohms = resistance;
                latest.cycle = cycles;
                Some(BreakEvent::Updated(*latest))
            }
            _ => {
                let record = BreakRecord {
                    index: self.records.len() as u32 + 1,
                    resistance_ohms: resistance,
                    cycle: cycles,
                };
                self.records.push(record);
                self.cycle_of_last_break = cycles;
                Some(BreakEvent::New(record))
            }
        }
    }

    /// Number of distinct breaks detected.
    pub fn breaks_detected(&self) -> usize {
        self.records.len()
    }

    pub fn records(&self) -> &[BreakRecord] {
        &self.records
    }

    pub fn max_resistance(&self) -> f64 {
        self.max_resistance
    }

    pub fn cycle_of_last_break(&self) -> f64 {
        self.cycle_of_last_break
    }
}
