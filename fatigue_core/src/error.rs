use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MonitorError {
    #[error("hardware error: {0}")]
    Hardware(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("record store error: {0}")]
    Persist(String),
    #[error("timeout waiting for device")]
    Timeout,
    #[error("stop not acknowledged after {waited_ms} ms")]
    AckTimeout { waited_ms: u64 },
    #[error("run interrupted by operator")]
    Interrupted,
    #[error("invalid state: {0}")]
    State(String),
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing acquisition device")]
    MissingAcquisition,
    #[error("missing actuator link")]
    MissingActuator,
    #[error("missing record sink")]
    MissingSink,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

/// Motion-program generation refusals.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PlanError {
    #[error("target {target_mm} mm exceeds the maximum travel of {max_mm} mm")]
    ExceedsTravel { target_mm: f64, max_mm: f64 },
    #[error("invalid motion parameters: {0}")]
    Invalid(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
