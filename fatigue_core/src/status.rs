//! Outcomes of a single poll and of a whole run.

use std::fmt;

use crate::breaks::BreakRecord;
use crate::error::MonitorError;
use crate::monitor::Reading;

/// Public status of a single iteration of the acquisition loop.
#[derive(Debug)]
pub enum PollOutcome {
    /// Nothing buffered on the acquisition link.
    Idle,
    /// A line was read but could not be used; the loop keeps polling.
    Skipped(MonitorError),
    /// Sample processed and persisted.
    Recorded(Reading),
    /// Halt bound exceeded, actuator acknowledged, run finalized.
    Halted(RunSummary),
}

/// Final account of a halted run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub halt_bound_ohms: f64,
    pub final_resistance_ohms: f64,
    pub cycles: f64,
    pub elapsed_s: f64,
    pub breaks: Vec<BreakRecord>,
    pub rows_written: u64,
    pub samples_skipped: u64,
    pub write_failures: u64,
    /// Acknowledgment line returned by the actuator.
    pub ack: String,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Test ended. Conductor has exceeded {} ohms after {} cycles.",
            self.halt_bound_ohms, self.cycles
        )?;
        for rec in &self.breaks {
            write!(f, "\n{rec}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_enumerates_breaks_in_order() {
        let summary = RunSummary {
            halt_bound_ohms: 30.0,
            final_resistance_ohms: 31.2,
            cycles: 12.5,
            elapsed_s: 60.0,
            breaks: vec![
                BreakRecord {
                    index: 1,
                    resistance_ohms: 10.0,
                    cycle: 0.0,
                },
                BreakRecord {
                    index: 2,
                    resistance_ohms: 31.2,
                    cycle: 12.5,
                },
            ],
            rows_written: 200,
            samples_skipped: 0,
            write_failures: 0,
            ack: "stopped".into(),
        };
        let text = summary.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Test ended. Conductor has exceeded 30 ohms after 12.5 cycles.",
                "Conductor 1 broke at 0 cycles, reaching 10.000 ohms.",
                "Conductor 2 broke at 12.5 cycles, reaching 31.200 ohms.",
            ]
        );
    }
}
