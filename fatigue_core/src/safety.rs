//! Resistance halt bound and the stop/acknowledge handshake with the actuator.

use fatigue_traits::{Actuator, Clock};

use crate::config::SafetyCfg;
use crate::error::MonitorError;
use crate::hw_error::map_hw_error;

/// One-shot halt latch.
#[derive(Debug, Clone)]
pub struct SafetyController {
    bound_ohms: f64,
    halted: bool,
}

impl SafetyController {
    pub fn new(bound_ohms: f64) -> Self {
        Self {
            bound_ohms,
            halted: false,
        }
    }

    /// True exactly once: on the first reading strictly above the bound.
    pub fn check(&mut self, resistance: f64) -> bool {
        if self.halted || !(resistance > self.bound_ohms) {
            return false;
        }
        self.halted = true;
        true
    }

    pub fn halted(&self) -> bool {
        self.halted
    }

    pub fn bound_ohms(&self) -> f64 {
        self.bound_ohms
    }
}

/// Transmit the stop command `stop_repeats` times, then block until the actuator
/// answers with a non-blank line.
///
/// With `ack_timeout` unset the wait is unbounded; `cancelled` is the only way out
/// short of an acknowledgment.
pub fn request_stop<T, C>(
    actuator: &mut T,
    clock: &C,
    cfg: &SafetyCfg,
    cancelled: &dyn Fn() -> bool,
) -> Result<String, MonitorError>
where
    T: Actuator + ?Sized,
    C: Clock + ?Sized,
{
    let mut sent = 0u8;
    let mut last_err = None;
    for attempt in 1..=cfg.stop_repeats {
        match actuator.send_stop() {
            Ok(()) => sent += 1,
            Err(e) => {
                let err = map_hw_error(&*e);
                tracing::warn!(attempt, error = %err, "stop transmission failed");
                last_err = Some(err);
            }
        }
        clock.sleep(cfg.stop_gap);
    }
    if sent == 0 {
        return Err(last_err.unwrap_or_else(|| {
            MonitorError::Config("safety.stop_repeats must be >= 1".into())
        }));
    }
    tracing::info!(sent, "stop command sent; awaiting acknowledgment");

    let started = clock.now();
    loop {
        if cancelled() {
            return Err(MonitorError::Interrupted);
        }
        match poll_ack(actuator) {
            Ok(Some(ack)) => {
                tracing::info!(ack = %ack, waited_ms = clock.ms_since(started), "stop acknowledged");
                return Ok(ack);
            }
            Ok(None) => {}
            Err(err) => tracing::warn!(error = %err, "actuator read failed while awaiting ack"),
        }
        if let Some(limit) = cfg.ack_timeout {
            let waited = clock.now().saturating_duration_since(started);
            if waited >= limit {
                return Err(MonitorError::AckTimeout {
                    waited_ms: waited.as_millis().min(u128::from(u64::MAX)) as u64,
                });
            }
        }
        clock.sleep(cfg.ack_poll);
    }
}

fn poll_ack<T: Actuator + ?Sized>(actuator: &mut T) -> Result<Option<String>, MonitorError> {
    let waiting = actuator.bytes_waiting().map_err(|e| map_hw_error(&*e))?;
    if waiting == 0 {
        return Ok(None);
    }
    let line = actuator.read_line().map_err(|e| map_hw_error(&*e))?;
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    Ok(Some(line.to_string()))
}
