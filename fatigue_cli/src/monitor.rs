//! `fatigue monitor`: config mapping, device assembly, and the monitored run.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use eyre::WrapErr;
use fatigue_core::runner::RunParams;
use fatigue_core::{CalibrationCurve, CsvRecordLog, RunSummary};
use fatigue_traits::{Acquisition, Actuator};

/// Command-line overrides for the monitor subcommand.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonitorOverrides {
    pub halt_bound: Option<f64>,
    pub record_rate: Option<u32>,
    pub ack_timeout_ms: Option<u64>,
    pub quiet: bool,
}

/// Calibration curves after CSV overrides.
#[derive(Debug, Clone, Copy)]
pub struct Curves {
    pub resistance: fatigue_config::CurvePoints,
    pub stretch: fatigue_config::CurvePoints,
}

pub fn run_params(
    cfg: &fatigue_config::Config,
    curves: Curves,
    ov: MonitorOverrides,
    json: bool,
) -> eyre::Result<RunParams> {
    let mut acquisition: fatigue_core::AcquisitionCfg = (&cfg.acquisition).into();
    if let Some(rate) = ov.record_rate {
        acquisition.record_rate_per_min = rate;
    }
    acquisition.echo = !ov.quiet && !json;

    let mut safety: fatigue_core::SafetyCfg = (&cfg.safety).into();
    if let Some(bound) = ov.halt_bound {
        safety.halt_bound_ohms = bound;
    }
    if let Some(ms) = ov.ack_timeout_ms {
        safety.ack_timeout = (ms > 0).then(|| Duration::from_millis(ms));
    }

    Ok(RunParams {
        acquisition,
        detection: (&cfg.detection).into(),
        safety,
        resistance: CalibrationCurve::try_from(curves.resistance)
            .wrap_err("resistance calibration")?,
        stretch: CalibrationCurve::try_from(curves.stretch).wrap_err("stretch calibration")?,
    })
}

type Devices = (Box<dyn Acquisition>, Box<dyn Actuator>);

#[cfg(feature = "hardware")]
pub fn open_devices(cfg: &fatigue_config::Config) -> eyre::Result<Devices> {
    use fatigue_hardware::serial::{SerialActuator, SerialDaq};
    let daq = SerialDaq::open(&cfg.devices.daq_port)
        .wrap_err_with(|| format!("open acquisition device {}", cfg.devices.daq_port))?;
    let actuator = SerialActuator::open(&cfg.devices.actuator_port, cfg.devices.actuator_baud)
        .wrap_err_with(|| format!("open actuator link {}", cfg.devices.actuator_port))?;
    Ok((Box::new(daq), Box::new(actuator)))
}

#[cfg(not(feature = "hardware"))]
pub fn open_devices(cfg: &fatigue_config::Config) -> eyre::Result<Devices> {
    use fatigue_hardware::{SimulatedActuator, SimulatedDaq};
    let sim = sim_config_from_env();
    tracing::info!(
        daq_port = %cfg.devices.daq_port,
        actuator_port = %cfg.devices.actuator_port,
        break_every = sim.break_every_half_cycles,
        "using simulated devices"
    );
    let actuator = if env_flag("FATIGUE_SIM_NO_ACK") {
        SimulatedActuator::silent()
    } else {
        SimulatedActuator::new()
    };
    Ok((Box::new(SimulatedDaq::new(sim)), Box::new(actuator)))
}

#[cfg(not(feature = "hardware"))]
fn sim_config_from_env() -> fatigue_hardware::SimConfig {
    let mut sim = fatigue_hardware::SimConfig::default();
    if let Some(n) = env_u32("FATIGUE_SIM_BREAK_EVERY") {
        sim.break_every_half_cycles = n.max(1);
    }
    if let Some(n) = env_u32("FATIGUE_SIM_GARBAGE_EVERY") {
        sim.garbage_every = (n > 0).then_some(n);
    }
    sim
}

#[cfg(not(feature = "hardware"))]
fn env_u32(key: &str) -> Option<u32> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(not(feature = "hardware"))]
fn env_flag(key: &str) -> bool {
    std::env::var(key).is_ok_and(|v| matches!(v.trim(), "1" | "true" | "yes"))
}

pub fn run_monitor(
    cfg: &fatigue_config::Config,
    curves: Curves,
    output: &Path,
    ov: MonitorOverrides,
    json: bool,
    shutdown: Arc<AtomicBool>,
) -> eyre::Result<RunSummary> {
    let params = run_params(cfg, curves, ov, json)?;
    let (daq, actuator) = open_devices(cfg)?;
    let sink = CsvRecordLog::create(output)
        .wrap_err_with(|| format!("create record file {}", output.display()))?;

    tracing::info!(
        output = %output.display(),
        halt_bound_ohms = params.safety.halt_bound_ohms,
        record_rate_per_min = params.acquisition.record_rate_per_min,
        ack_timeout_ms = params.safety.ack_timeout.map(|d| d.as_millis() as u64),
        "monitor start"
    );
    let summary = fatigue_core::runner::run(daq, actuator, sink, params, Some(shutdown))?;
    tracing::info!(
        cycles = summary.cycles,
        breaks = summary.breaks.len(),
        rows = summary.rows_written,
        skipped = summary.samples_skipped,
        "monitor halted"
    );
    Ok(summary)
}

/// Single JSON line describing a halted run.
pub fn summary_json(summary: &RunSummary) -> serde_json::Value {
    let breaks: Vec<serde_json::Value> = summary
        .breaks
        .iter()
        .map(|b| {
            serde_json::json!({
                "index": b.index,
                "cycle": b.cycle,
                "resistance_ohms": b.resistance_ohms,
            })
        })
        .collect();
    serde_json::json!({
        "halted": true,
        "cycles": summary.cycles,
        "halt_bound_ohms": summary.halt_bound_ohms,
        "final_resistance_ohms": summary.final_resistance_ohms,
        "elapsed_s": summary.elapsed_s,
        "rows": summary.rows_written,
        "skipped": summary.samples_skipped,
        "write_failures": summary.write_failures,
        "ack": summary.ack,
        "breaks": breaks,
    })
}
