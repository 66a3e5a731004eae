//! The acquisition loop (`Session`).
//!
//! INIT discards stale scans, then each poll either idles, skips a bad line,
//! or processes one sample through `Monitor` and persists it. The first sample
//! above the halt bound triggers the stop handshake and ends the run; that is
//! the only way out of `run` short of cancellation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use eyre::WrapErr;
use fatigue_traits::{Acquisition, Actuator, Clock};

use crate::config::{AcquisitionCfg, SafetyCfg};
use crate::error::{MonitorError, Result};
use crate::hw_error::map_hw_error;
use crate::logger::{RecordSink, TelemetryLogger};
use crate::monitor::{Monitor, Reading};
use crate::safety::request_stop;
use crate::sample::Sample;
use crate::status::{PollOutcome, RunSummary};

pub struct Session<A, T, K> {
    pub(crate) daq: A,
    pub(crate) actuator: T,
    pub(crate) telemetry: TelemetryLogger<K>,
    pub(crate) monitor: Monitor,
    pub(crate) acquisition: AcquisitionCfg,
    pub(crate) safety: SafetyCfg,
    pub(crate) clock: Arc<dyn Clock + Send + Sync>,
    pub(crate) shutdown: Option<Arc<AtomicBool>>,
    pub(crate) started_at: Option<Instant>,
    pub(crate) samples_skipped: u64,
}

impl<A, T, K> core::fmt::Debug for Session<A, T, K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Session")
            .field("cycles", &self.monitor.cycles())
            .field("breaks", &self.monitor.break_records().len())
            .field("halted", &self.monitor.halted())
            .field("samples_skipped", &self.samples_skipped)
            .finish()
    }
}

impl<A: Acquisition, T: Actuator, K: RecordSink> Session<A, T, K> {
    /// Start scanning, discard the initial burst, and start the run clock.
    pub fn begin(&mut self) -> Result<()> {
        self.daq
            .start()
            .map_err(|e| map_hw_error(&*e))
            .wrap_err("start acquisition device")?;
        self.warm_up();
        self.started_at = Some(self.clock.now());
        tracing::info!(
            record_rate_per_min = self.acquisition.record_rate_per_min,
            halt_bound_ohms = self.monitor.halt_bound_ohms(),
            "monitoring started"
        );
        Ok(())
    }

    fn warm_up(&mut self) {
        let n = self.acquisition.warmup_reads;
        if self.acquisition.echo && n > 0 {
            println!("initializing...");
        }
        for i in 0..n {
            if matches!(self.daq.bytes_waiting(), Ok(w) if w > 0) {
                match self.daq.read_line() {
                    Ok(line) => tracing::debug!(line = %line.trim(), "discarded stale scan"),
                    Err(e) => tracing::debug!(error = %e, "stale scan unreadable"),
                }
            }
            if self.acquisition.echo {
                println!("{}%", crate::util::warmup_percent(i, n));
            }
            self.clock.sleep(self.acquisition.warmup_interval);
        }
    }

    /// One iteration of the loop. Never fails on bad input; errors are only
    /// returned by a halt whose handshake could not complete.
    pub fn poll(&mut self) -> Result<PollOutcome> {
        if self.monitor.halted() {
            return Err(MonitorError::State("session already halted".into()).into());
        }
        let waiting = match self.daq.bytes_waiting() {
            Ok(n) => n,
            Err(e) => return Ok(self.skip(map_hw_error(&*e))),
        };
        if waiting == 0 {
            return Ok(PollOutcome::Idle);
        }
        let line = match self.daq.read_line() {
            Ok(line) => line,
            Err(e) => return Ok(self.skip(map_hw_error(&*e))),
        };
        let sample = match Sample::parse(&line, self.acquisition.delimiter) {
            Ok(s) => s,
            Err(e) => return Ok(self.skip(e)),
        };

        let elapsed_s = self
            .started_at
            .map(|t0| self.clock.secs_since(t0))
            .unwrap_or(0.0);
        let reading = self.monitor.process(&sample, elapsed_s);
        self.telemetry.status(&reading);

        if reading.halt {
            return self.halt(&reading).map(PollOutcome::Halted);
        }
        self.telemetry.record(&reading.row());
        Ok(PollOutcome::Recorded(reading))
    }

    fn skip(&mut self, err: MonitorError) -> PollOutcome {
        self.samples_skipped += 1;
        tracing::warn!(error = %err, skipped = self.samples_skipped, "sample skipped");
        PollOutcome::Skipped(err)
    }

    fn cancelled(&self) -> bool {
        self.shutdown
            .as_ref()
            .is_some_and(|f| f.load(Ordering::Relaxed))
    }

    /// Stop the actuator, wait for its acknowledgment, stop the DAQ and close the record.
    fn halt(&mut self, reading: &Reading) -> Result<RunSummary> {
        tracing::warn!(
            resistance_ohms = reading.resistance_ohms,
            bound_ohms = self.monitor.halt_bound_ohms(),
            cycles = reading.cycles,
            "halt bound exceeded; stopping actuator"
        );
        let shutdown = self.shutdown.clone();
        let cancelled = move || shutdown.as_ref().is_some_and(|f| f.load(Ordering::Relaxed));
        let ack = request_stop(&mut self.actuator, &*self.clock, &self.safety, &cancelled);

        self.stop_daq();
        self.telemetry.finish(reading.cycles);

        let ack = ack.wrap_err("actuator stop handshake")?;
        Ok(RunSummary {
            halt_bound_ohms: self.monitor.halt_bound_ohms(),
            final_resistance_ohms: reading.resistance_ohms,
            cycles: reading.cycles,
            elapsed_s: reading.elapsed_s,
            breaks: self.monitor.break_records().to_vec(),
            rows_written: self.telemetry.rows_written(),
            samples_skipped: self.samples_skipped,
            write_failures: self.telemetry.write_failures(),
            ack,
        })
    }

    fn stop_daq(&mut self) {
        if let Err(e) = self.daq.stop() {
            tracing::warn!(error = %map_hw_error(&*e), "failed to stop acquisition device");
        }
        self.clock.sleep(self.safety.daq_stop_settle);
    }

    /// Run until the halt bound is exceeded (or the shutdown flag is raised).
    pub fn run(&mut self) -> Result<RunSummary> {
        self.begin()?;
        let period = self.acquisition.poll_period();
        loop {
            if self.cancelled() {
                tracing::warn!(
                    cycles = self.monitor.cycles(),
                    breaks = self.monitor.break_records().len(),
                    "run interrupted"
                );
                self.stop_daq();
                return Err(MonitorError::Interrupted.into());
            }
            if let PollOutcome::Halted(summary) = self.poll()? {
                return Ok(summary);
            }
            self.clock.sleep(period);
        }
    }

    pub fn monitor(&self) -> &Monitor {
        &self.monitor
    }

    pub fn telemetry(&self) -> &TelemetryLogger<K> {
        &self.telemetry
    }

    pub fn acquisition_device(&self) -> &A {
        &self.daq
    }

    pub fn actuator(&self) -> &T {
        &self.actuator
    }

    pub fn samples_skipped(&self) -> u64 {
        self.samples_skipped
    }
}
