use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use fatigue_traits::clock::MonotonicClock;
use fatigue_traits::{Acquisition, Actuator, Clock};

use crate::calibration::CalibrationCurve;
use crate::config::{AcquisitionCfg, DetectionCfg, SafetyCfg};
use crate::error::Result;
use crate::logger::RecordSink;
use crate::session::Session;
use crate::status::RunSummary;

/// Everything a run needs besides the devices.
#[derive(Debug, Clone)]
pub struct RunParams {
    pub acquisition: AcquisitionCfg,
    pub detection: DetectionCfg,
    pub safety: SafetyCfg,
    pub resistance: CalibrationCurve,
    pub stretch: CalibrationCurve,
}

/// Monitor a test on the real-time clock until the halt bound is exceeded.
pub fn run<A, T, K>(
    daq: A,
    actuator: T,
    sink: K,
    params: RunParams,
    shutdown: Option<Arc<AtomicBool>>,
) -> Result<RunSummary>
where
    A: Acquisition,
    T: Actuator,
    K: RecordSink,
{
    run_with_clock(daq, actuator, sink, params, shutdown, MonotonicClock::new())
}

/// Same as `run`, on a caller-provided clock.
pub fn run_with_clock<A, T, K, C>(
    daq: A,
    actuator: T,
    sink: K,
    params: RunParams,
    shutdown: Option<Arc<AtomicBool>>,
    clock: C,
) -> Result<RunSummary>
where
    A: Acquisition,
    T: Actuator,
    K: RecordSink,
    C: Clock + Send + Sync + 'static,
{
    let mut builder = Session::builder()
        .with_acquisition(daq)
        .with_actuator(actuator)
        .with_sink(sink)
        .with_resistance_curve(params.resistance)
        .with_stretch_curve(params.stretch)
        .with_acquisition_cfg(params.acquisition)
        .with_detection(params.detection)
        .with_safety(params.safety)
        .with_clock(clock);
    if let Some(flag) = shutdown {
        builder = builder.with_shutdown(flag);
    }
    let mut session = builder.build()?;
    session.run()
}
