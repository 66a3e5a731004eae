mod cli;
mod error_fmt;
mod monitor;
mod plan;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use eyre::WrapErr;

use crate::cli::{Cli, Commands, FILE_GUARD, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};
use crate::monitor::{Curves, MonitorOverrides};
use crate::plan::PlanOverrides;

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    if let Err(e) = real_main(cli) {
        let code = exit_code_for_error(&e);
        tracing::error!(error = %e, code, "fatigue exited with error");
        if JSON_MODE.get().copied().unwrap_or(false) {
            println!("{}", format_error_json(&e));
        } else {
            eprintln!("{}", humanize(&e));
        }
        std::process::exit(code);
    }
}

fn real_main(cli: Cli) -> eyre::Result<()> {
    color_eyre::install()?;

    let cfg = load_config(&cli.config);
    init_tracing(
        cli.json,
        &cli.log_level,
        cfg.as_ref().ok().map(|c| &c.logging),
    )?;
    let cfg = cfg?;
    let curves = resolve_curves(&cfg, &cli)?;

    match cli.cmd {
        Commands::Monitor {
            output,
            halt_bound,
            record_rate,
            ack_timeout_ms,
            quiet,
        } => {
            let shutdown = Arc::new(AtomicBool::new(false));
            {
                let flag = shutdown.clone();
                ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))
                    .wrap_err("install Ctrl-C handler")?;
            }
            let ov = MonitorOverrides {
                halt_bound,
                record_rate,
                ack_timeout_ms,
                quiet,
            };
            let summary = monitor::run_monitor(&cfg, curves, &output, ov, cli.json, shutdown)?;
            if cli.json {
                println!("{}", monitor::summary_json(&summary));
            } else {
                println!("Halted stretch tester");
                println!("{summary}");
            }
        }
        Commands::Plan {
            output,
            cycles,
            stretch_pct,
            offset_mm,
        } => {
            let ov = PlanOverrides {
                cycles,
                stretch_pct,
                offset_mm,
            };
            let plan = plan::run_plan(&cfg, ov, output.as_deref())?;
            // the program itself owns stdout when no file was given
            if let Some(path) = &output {
                if cli.json {
                    println!("{}", plan::plan_json(&plan));
                } else {
                    println!("Program written to {}", path.display());
                    println!(
                        "Stretching {:.1} mm sample to {:.1} mm depth, {} cycles",
                        plan.original_length_mm, plan.target_mm, plan.cycles
                    );
                    println!("Estimated duration: {}", plan.estimated_duration());
                }
            }
        }
        Commands::SelfCheck => self_check(&cfg, curves)?,
    }
    Ok(())
}

fn load_config(path: &Path) -> eyre::Result<fatigue_config::Config> {
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("read config {}", path.display()))?;
    let cfg: fatigue_config::Config = toml::from_str(&text)
        .wrap_err_with(|| format!("parse config {}", path.display()))?;
    cfg.validate().wrap_err("invalid config")?;
    Ok(cfg)
}

fn resolve_curves(cfg: &fatigue_config::Config, cli: &Cli) -> eyre::Result<Curves> {
    let mut curves = Curves {
        resistance: cfg.calibration.resistance,
        stretch: cfg.calibration.stretch,
    };
    if let Some(path) = &cli.resistance_calibration {
        curves.resistance = fatigue_config::load_calibration_csv(path)?;
        tracing::info!(path = %path.display(), "resistance calibration loaded from CSV");
    }
    if let Some(path) = &cli.stretch_calibration {
        curves.stretch = fatigue_config::load_calibration_csv(path)?;
        tracing::info!(path = %path.display(), "stretch calibration loaded from CSV");
    }
    Ok(curves)
}

fn init_tracing(
    json: bool,
    level: &str,
    logging: Option<&fatigue_config::Logging>,
) -> eyre::Result<()> {
    use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};

    let console_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let console = if json {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_filter(console_filter)
            .boxed()
    } else {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_filter(console_filter)
            .boxed()
    };

    let file = match logging.and_then(|l| l.file.as_deref().map(|f| (l, f))) {
        Some((l, file)) => {
            let path = Path::new(file);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .ok_or_else(|| eyre::eyre!("logging.file must name a file: {file}"))?;
            let appender = match l.rotation.as_deref() {
                Some("daily") => tracing_appender::rolling::daily(dir, name),
                Some("hourly") => tracing_appender::rolling::hourly(dir, name),
                _ => tracing_appender::rolling::never(dir, name),
            };
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = FILE_GUARD.set(guard);
            let file_filter = EnvFilter::try_new(l.level.as_deref().unwrap_or("info"))
                .unwrap_or_else(|_| EnvFilter::new("info"));
            Some(
                fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(writer)
                    .with_filter(file_filter)
                    .boxed(),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .try_init()
        .map_err(|e| eyre::eyre!("install tracing subscriber: {e}"))
}

/// Validate calibration, open both devices and decode one scan.
fn self_check(cfg: &fatigue_config::Config, curves: Curves) -> eyre::Result<()> {
    use fatigue_traits::Acquisition;

    let resistance = fatigue_core::CalibrationCurve::try_from(curves.resistance)
        .wrap_err("resistance calibration")?;
    let stretch =
        fatigue_core::CalibrationCurve::try_from(curves.stretch).wrap_err("stretch calibration")?;
    println!("config: ok");
    println!(
        "calibration: resistance {:.4} ohm/V, stretch {:.4} cm/V",
        resistance.slope(),
        stretch.slope()
    );

    let (mut daq, _actuator) = monitor::open_devices(cfg)?;
    daq.start()
        .map_err(|e| eyre::eyre!("start acquisition device: {e}"))?;
    let delimiter = cfg.acquisition.delimiter_char();
    let mut scan = None;
    for _ in 0..50 {
        let waiting = daq
            .bytes_waiting()
            .map_err(|e| eyre::eyre!("poll acquisition device: {e}"))?;
        if waiting > 0 {
            let line = daq
                .read_line()
                .map_err(|e| eyre::eyre!("read acquisition device: {e}"))?;
            if let Ok(sample) = fatigue_core::Sample::parse(&line, delimiter) {
                scan = Some(sample);
                break;
            }
        }
        std::thread::sleep(std::time::Duration::from_millis(20));
    }
    if let Err(e) = daq.stop() {
        tracing::warn!(error = %e, "failed to stop acquisition device");
    }
    let sample = scan.ok_or_else(|| eyre::Report::new(fatigue_core::MonitorError::Timeout))?;
    println!(
        "acquisition: ok ({:.3} ohms, {:.3} cm)",
        resistance.convert(sample.resistance_raw),
        stretch.convert(sample.stretch_raw)
    );
    println!("self-check passed");
    Ok(())
}
