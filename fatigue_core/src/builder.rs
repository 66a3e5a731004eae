//! Builder for `Session`.
//!
//! Devices and the record sink are mandatory; calibration curves default to the
//! bench calibration and every config block to its documented default.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use fatigue_traits::clock::{Clock, MonotonicClock};

use crate::calibration::CalibrationCurve;
use crate::config::{AcquisitionCfg, DetectionCfg, SafetyCfg};
use crate::error::{BuildError, MonitorError, Result};
use crate::logger::{RecordSink, TelemetryLogger};
use crate::monitor::Monitor;
use crate::session::Session;

pub struct SessionBuilder<A, T, K> {
    daq: Option<A>,
    actuator: Option<T>,
    sink: Option<K>,
    resistance: Option<CalibrationCurve>,
    stretch: Option<CalibrationCurve>,
    acquisition: AcquisitionCfg,
    detection: DetectionCfg,
    safety: SafetyCfg,
    clock: Option<Arc<dyn Clock + Send + Sync>>,
    shutdown: Option<Arc<AtomicBool>>,
}

impl<A, T, K> Default for SessionBuilder<A, T, K> {
    fn default() -> Self {
        Self {
            daq: None,
            actuator: None,
            sink: None,
            resistance: None,
            stretch: None,
            acquisition: AcquisitionCfg::default(),
            detection: DetectionCfg::default(),
            safety: SafetyCfg::default(),
            clock: None,
            shutdown: None,
        }
    }
}

impl<A, T, K> Session<A, T, K> {
    /// Start building a Session.
    pub fn builder() -> SessionBuilder<A, T, K> {
        SessionBuilder::default()
    }
}

impl<A, T, K: RecordSink> SessionBuilder<A, T, K> {
    pub fn with_acquisition(mut self, daq: A) -> Self {
        self.daq = Some(daq);
        self
    }

    pub fn with_actuator(mut self, actuator: T) -> Self {
        self.actuator = Some(actuator);
        self
    }

    pub fn with_sink(mut self, sink: K) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn with_resistance_curve(mut self, curve: CalibrationCurve) -> Self {
        self.resistance = Some(curve);
        self
    }

    pub fn with_stretch_curve(mut self, curve: CalibrationCurve) -> Self {
        self.stretch = Some(curve);
        self
    }

    pub fn with_acquisition_cfg(mut self, cfg: AcquisitionCfg) -> Self {
        self.acquisition = cfg;
        self
    }

    pub fn with_detection(mut self, cfg: DetectionCfg) -> Self {
        self.detection = cfg;
        self
    }

    pub fn with_safety(mut self, cfg: SafetyCfg) -> Self {
        self.safety = cfg;
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + Send + Sync + 'static) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    /// Flag polled every iteration (and during the ack wait) to abandon the run.
    pub fn with_shutdown(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown = Some(flag);
        self
    }

    pub fn build(self) -> Result<Session<A, T, K>> {
        let daq = self
            .daq
            .ok_or_else(|| eyre::Report::new(BuildError::MissingAcquisition))?;
        let actuator = self
            .actuator
            .ok_or_else(|| eyre::Report::new(BuildError::MissingActuator))?;
        let sink = self
            .sink
            .ok_or_else(|| eyre::Report::new(BuildError::MissingSink))?;

        if self.acquisition.record_rate_per_min == 0 {
            return Err(BuildError::InvalidConfig("record rate must be > 0").into());
        }
        let d = &self.detection;
        let tolerances = [
            d.jump_tolerance_ohms,
            d.cycle_separation,
            d.direction_tolerance_cm,
        ];
        if !tolerances.iter().all(|t| t.is_finite() && *t >= 0.0) {
            return Err(BuildError::InvalidConfig("tolerances must be finite and >= 0").into());
        }
        let bound = self.safety.halt_bound_ohms;
        if !(bound.is_finite() && bound > 0.0) {
            return Err(BuildError::InvalidConfig("halt bound must be finite and > 0").into());
        }
        if self.safety.stop_repeats == 0 {
            return Err(BuildError::InvalidConfig("stop must be sent at least once").into());
        }

        let resistance = match self.resistance {
            Some(c) => c,
            None => bench_curve(fatigue_config::CurvePoints::RESISTANCE)?,
        };
        let stretch = match self.stretch {
            Some(c) => c,
            None => bench_curve(fatigue_config::CurvePoints::STRETCH)?,
        };

        let monitor = Monitor::new(resistance, stretch, self.detection, bound);
        let echo = self.acquisition.echo;
        Ok(Session {
            daq,
            actuator,
            telemetry: TelemetryLogger::new(sink, echo),
            monitor,
            acquisition: self.acquisition,
            safety: self.safety,
            clock: self
                .clock
                .unwrap_or_else(|| Arc::new(MonotonicClock::new())),
            shutdown: self.shutdown,
            started_at: None,
            samples_skipped: 0,
        })
    }
}

fn bench_curve(points: fatigue_config::CurvePoints) -> Result<CalibrationCurve> {
    CalibrationCurve::try_from(points).map_err(|e: MonitorError| eyre::Report::new(e))
}
