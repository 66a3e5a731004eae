pub mod error;
pub mod util;

#[cfg(feature = "hardware")]
pub mod serial;

use std::io;

use fatigue_traits::{Acquisition, Actuator};

type DynError = Box<dyn std::error::Error + Send + Sync>;

/// Resistance channel voltage at the lower calibration anchor (about 10 ohms).
const SIM_RESISTANCE_BASE_V: f64 = -5.9985;
/// Stretch channel voltage span (13.5 cm to 20 cm on the bench calibration).
const SIM_STRETCH_LOW_V: f64 = 0.793;
const SIM_STRETCH_HIGH_V: f64 = 1.126;

/// Knobs for the simulated acquisition device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimConfig {
    /// Scans between the two stretch extremes.
    pub samples_per_half_cycle: u32,
    /// Half-cycles between simulated conductor breaks.
    pub break_every_half_cycles: u32,
    /// Resistance-channel rise per break, in volts.
    pub break_step_v: f64,
    /// Replace every n-th scan with an unparseable line.
    pub garbage_every: Option<u32>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            samples_per_half_cycle: 4,
            break_every_half_cycles: 6,
            break_step_v: 2.0,
            garbage_every: None,
        }
    }
}

/// Deterministic DAQ: triangle-wave stretch, resistance stepping up at every break.
#[derive(Debug)]
pub struct SimulatedDaq {
    cfg: SimConfig,
    scanning: bool,
    scans: u64,
}

impl SimulatedDaq {
    pub fn new(cfg: SimConfig) -> Self {
        Self {
            cfg,
            scanning: false,
            scans: 0,
        }
    }

    pub fn scans(&self) -> u64 {
        self.scans
    }

    pub fn scanning(&self) -> bool {
        self.scanning
    }

    /// Scan line at index `k`: eight comma-separated channels, 0 and 1 live.
    pub fn line_at(&self, k: u64) -> String {
        let garbage = self
            .cfg
            .garbage_every
            .is_some_and(|n| n > 0 && (k + 1) % u64::from(n) == 0);
        if garbage {
            return "ERR overrun".to_string();
        }
        let n = u64::from(self.cfg.samples_per_half_cycle.max(1));
        let phase = k % (2 * n);
        let frac = if phase <= n {
            phase as f64 / n as f64
        } else {
            (2 * n - phase) as f64 / n as f64
        };
        let stretch_v = SIM_STRETCH_LOW_V + (SIM_STRETCH_HIGH_V - SIM_STRETCH_LOW_V) * frac;
        let half_cycles = k / n;
        let breaks = half_cycles / u64::from(self.cfg.break_every_half_cycles.max(1));
        let resistance_v = SIM_RESISTANCE_BASE_V + self.cfg.break_step_v * breaks as f64;
        format!("{resistance_v:.4},{stretch_v:.4},0.0000,0.0000,0.0000,0.0000,0.0000,0.0000")
    }
}

impl Default for SimulatedDaq {
    fn default() -> Self {
        Self::new(SimConfig::default())
    }
}

impl Acquisition for SimulatedDaq {
    fn start(&mut self) -> Result<(), DynError> {
        tracing::debug!(cfg = ?self.cfg, "simulated DAQ scanning");
        self.scanning = true;
        Ok(())
    }

    fn bytes_waiting(&mut self) -> Result<usize, DynError> {
        if !self.scanning {
            return Ok(0);
        }
        Ok(self.line_at(self.scans).len() + 1)
    }

    fn read_line(&mut self) -> Result<String, DynError> {
        if !self.scanning {
            return Err(Box::new(error::HwError::Timeout));
        }
        let line = self.line_at(self.scans);
        self.scans += 1;
        Ok(line)
    }

    fn stop(&mut self) -> Result<(), DynError> {
        self.scanning = false;
        Ok(())
    }
}

/// Actuator that answers its first stop with `ok` (or never, when silent).
#[derive(Debug, Default)]
pub struct SimulatedActuator {
    silent: bool,
    stops: u32,
    acked: bool,
}

impl SimulatedActuator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn silent() -> Self {
        Self {
            silent: true,
            ..Self::default()
        }
    }

    pub fn stops(&self) -> u32 {
        self.stops
    }
}

impl Actuator for SimulatedActuator {
    fn send_stop(&mut self) -> Result<(), DynError> {
        self.stops += 1;
        tracing::debug!(stops = self.stops, "simulated actuator received stop");
        Ok(())
    }

    fn bytes_waiting(&mut self) -> Result<usize, DynError> {
        if self.silent || self.acked || self.stops == 0 {
            return Ok(0);
        }
        Ok(3)
    }

    fn read_line(&mut self) -> Result<String, DynError> {
        if self.silent || self.acked || self.stops == 0 {
            return Err(Box::new(io::Error::new(
                io::ErrorKind::WouldBlock,
                "no reply pending",
            )));
        }
        self.acked = true;
        Ok("ok".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn daq_is_quiet_until_started() {
        let mut daq = SimulatedDaq::default();
        assert_eq!(daq.bytes_waiting().unwrap(), 0);
        daq.start().unwrap();
        assert!(daq.bytes_waiting().unwrap() > 0);
        daq.stop().unwrap();
        assert_eq!(daq.bytes_waiting().unwrap(), 0);
    }

    #[test]
    fn actuator_acks_once_after_stop() {
        let mut act = SimulatedActuator::new();
        assert_eq!(act.bytes_waiting().unwrap(), 0);
        act.send_stop().unwrap();
        assert_eq!(act.bytes_waiting().unwrap(), 3);
        assert_eq!(act.read_line().unwrap(), "ok");
        assert_eq!(act.bytes_waiting().unwrap(), 0);
    }

    #[test]
    fn silent_actuator_never_answers() {
        let mut act = SimulatedActuator::silent();
        act.send_stop().unwrap();
        act.send_stop().unwrap();
        assert_eq!(act.stops(), 2);
        assert_eq!(act.bytes_waiting().unwrap(), 0);
        assert!(act.read_line().is_err());
    }
}
