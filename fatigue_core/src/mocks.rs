//! Test and helper mocks for fatigue_core.
//!
//! Scripted devices replay fixed input so the acquisition loop can be driven
//! deterministically together with a manual clock.

use std::collections::VecDeque;
use std::io;

use fatigue_traits::{Acquisition, Actuator};

use crate::error::MonitorError;
use crate::logger::{RecordRow, RecordSink};

type DynError = Box<dyn std::error::Error + Send + Sync>;

/// Acquisition device replaying a script of lines (`Ok`) and read failures (`Err`).
#[derive(Debug, Default)]
pub struct ScriptedAcquisition {
    script: VecDeque<Result<String, String>>,
    started: bool,
    stopped: bool,
}

impl ScriptedAcquisition {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: lines.into_iter().map(|l| Ok(l.into())).collect(),
            ..Self::default()
        }
    }

    /// Append a read failure carrying `msg`.
    pub fn then_error(mut self, msg: &str) -> Self {
        self.script.push_back(Err(msg.to_string()));
        self
    }

    /// Append a line.
    pub fn then_line(mut self, line: &str) -> Self {
        self.script.push_back(Ok(line.to_string()));
        self
    }

    pub fn started(&self) -> bool {
        self.started
    }

    pub fn stopped(&self) -> bool {
        self.stopped
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl Acquisition for ScriptedAcquisition {
    fn start(&mut self) -> Result<(), DynError> {
        self.started = true;
        Ok(())
    }

    fn bytes_waiting(&mut self) -> Result<usize, DynError> {
        Ok(match self.script.front() {
            Some(Ok(line)) => line.len() + 1,
            Some(Err(_)) => 1,
            None => 0,
        })
    }

    fn read_line(&mut self) -> Result<String, DynError> {
        match self.script.pop_front() {
            Some(Ok(line)) => Ok(line),
            Some(Err(msg)) => Err(Box::new(io::Error::other(msg))),
            None => Err(Box::new(io::Error::new(
                io::ErrorKind::WouldBlock,
                "no scan buffered",
            ))),
        }
    }

    fn stop(&mut self) -> Result<(), DynError> {
        self.stopped = true;
        Ok(())
    }
}

/// Actuator link that answers a stop command from a script.
#[derive(Debug, Default)]
pub struct ScriptedActuator {
    replies: VecDeque<String>,
    silent_polls: usize,
    stops_sent: usize,
    broken: bool,
}

impl ScriptedActuator {
    /// Acknowledges with `ack` after `polls` empty polls.
    pub fn acking_after(polls: usize, ack: &str) -> Self {
        Self {
            replies: VecDeque::from([ack.to_string()]),
            silent_polls: polls,
            ..Self::default()
        }
    }

    /// Replies with `lines` in order once a stop has been sent.
    pub fn with_replies<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: lines.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Never answers.
    pub fn silent() -> Self {
        Self::default()
    }

    /// Every transmission fails.
    pub fn broken() -> Self {
        Self {
            broken: true,
            ..Self::default()
        }
    }

    pub fn stops_sent(&self) -> usize {
        self.stops_sent
    }
}

impl Actuator for ScriptedActuator {
    fn send_stop(&mut self) -> Result<(), DynError> {
        if self.broken {
            return Err(Box::new(io::Error::other("actuator port closed")));
        }
        self.stops_sent += 1;
        Ok(())
    }

    fn bytes_waiting(&mut self) -> Result<usize, DynError> {
        if self.stops_sent == 0 {
            return Ok(0);
        }
        if self.silent_polls > 0 {
            self.silent_polls -= 1;
            return Ok(0);
        }
        Ok(self.replies.front().map_or(0, |r| r.len() + 1))
    }

    fn read_line(&mut self) -> Result<String, DynError> {
        self.replies
            .pop_front()
            .ok_or_else(|| Box::new(io::Error::new(io::ErrorKind::WouldBlock, "no reply")) as DynError)
    }
}

/// In-memory record sink; `failing()` rejects every write.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub rows: Vec<RecordRow>,
    pub terminal: Vec<String>,
    fail: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

impl RecordSink for MemorySink {
    fn append(&mut self, row: &RecordRow) -> Result<(), MonitorError> {
        if self.fail {
            return Err(MonitorError::Persist("disk full".into()));
        }
        self.rows.push(*row);
        Ok(())
    }

    fn append_terminal(&mut self, line: &str) -> Result<(), MonitorError> {
        if self.fail {
            return Err(MonitorError::Persist("disk full".into()));
        }
        self.terminal.push(line.to_string());
        Ok(())
    }
}
