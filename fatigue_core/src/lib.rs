#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core monitoring logic for cyclic fatigue tests (hardware-agnostic).
//!
//! All device interactions go through `fatigue_traits::Acquisition` and
//! `fatigue_traits::Actuator`; time goes through `fatigue_traits::Clock`.
//!
//! ## Architecture
//!
//! - **Calibration**: two-point linear volts → ohms / cm (`calibration`)
//! - **Cycle tracking**: reversal counting with a dead-band (`cycle`)
//! - **Break detection**: sequential breaks with in-place refinement (`breaks`)
//! - **Safety**: one-shot halt bound and stop/ack handshake (`safety`)
//! - **Telemetry**: append-only CSV record and status line (`logger`)
//! - **Acquisition loop**: polling state machine (`session`, `runner`)
//! - **Motion**: stretch program arithmetic for the rig (`motion`)

pub mod breaks;
pub mod builder;
pub mod calibration;
pub mod config;
pub mod conversions;
pub mod cycle;
pub mod error;
pub mod hw_error;
pub mod logger;
pub mod mocks;
pub mod monitor;
pub mod motion;
pub mod runner;
pub mod safety;
pub mod sample;
pub mod session;
pub mod status;
pub mod util;

pub use breaks::{BreakDetector, BreakEvent, BreakRecord};
pub use builder::SessionBuilder;
pub use calibration::CalibrationCurve;
pub use config::{AcquisitionCfg, DetectionCfg, MotionCfg, SafetyCfg};
pub use cycle::{CycleTracker, Direction};
pub use error::{BuildError, MonitorError, PlanError};
pub use logger::{CsvRecordLog, RecordRow, RecordSink, TelemetryLogger};
pub use monitor::{Monitor, Reading};
pub use motion::{EstimatedDuration, MotionPlan};
pub use safety::SafetyController;
pub use sample::Sample;
pub use session::Session;
pub use status::{PollOutcome, RunSummary};
