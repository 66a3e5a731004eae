//! Append-only record store for processed samples, and the operator status line.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::MonitorError;
use crate::monitor::Reading;

/// Column header of the record file.
pub const RECORD_HEADER: [&str; 4] = [
    "Time (seconds)",
    "cycle #",
    "Resistance (ohms)",
    "length of sample (cm)",
];

/// One persisted sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordRow {
    pub elapsed_s: f64,
    pub cycles: f64,
    pub resistance_ohms: f64,
    pub stretch_cm: f64,
}

/// Durable, append-only destination for record rows.
pub trait RecordSink {
    fn append(&mut self, row: &RecordRow) -> Result<(), MonitorError>;

    /// Free-text closing line written once when the run halts.
    fn append_terminal(&mut self, line: &str) -> Result<(), MonitorError>;
}

impl<K: RecordSink + ?Sized> RecordSink for Box<K> {
    fn append(&mut self, row: &RecordRow) -> Result<(), MonitorError> {
        (**self).append(row)
    }
    fn append_terminal(&mut self, line: &str) -> Result<(), MonitorError> {
        (**self).append_terminal(line)
    }
}

/// Comma-separated record file. Every row is flushed before `append` returns.
pub struct CsvRecordLog {
    path: PathBuf,
    writer: csv::Writer<File>,
}

impl std::fmt::Debug for CsvRecordLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsvRecordLog")
            .field("path", &self.path)
            .finish()
    }
}

impl CsvRecordLog {
    /// Create (or truncate) `path` and write the header.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, MonitorError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)
            .map_err(|e| persist_err(&path, e))?;
        let mut writer = csv::WriterBuilder::new().from_writer(file);
        writer
            .write_record(RECORD_HEADER)
            .and_then(|()| writer.flush().map_err(csv::Error::from))
            .map_err(|e| persist_err(&path, e))?;
        Ok(Self { path, writer })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn persist_err(path: &Path, e: impl std::fmt::Display) -> MonitorError {
    MonitorError::Persist(format!("{}: {e}", path.display()))
}

impl RecordSink for CsvRecordLog {
    fn append(&mut self, row: &RecordRow) -> Result<(), MonitorError> {
        self.writer
            .write_record([
                row.elapsed_s.to_string(),
                row.cycles.to_string(),
                row.resistance_ohms.to_string(),
                row.stretch_cm.to_string(),
            ])
            .map_err(|e| persist_err(&self.path, e))?;
        self.writer
            .flush()
            .map_err(|e| persist_err(&self.path, e))
    }

    fn append_terminal(&mut self, line: &str) -> Result<(), MonitorError> {
        self.writer
            .flush()
            .map_err(|e| persist_err(&self.path, e))?;
        let mut file = self.writer.get_ref();
        writeln!(file, "{line}")
            .and_then(|()| file.flush())
            .map_err(|e| persist_err(&self.path, e))
    }
}

/// Record sink wrapper that never fails the caller: write errors are logged
/// and counted, and the sample still counts as processed.
#[derive(Debug)]
pub struct TelemetryLogger<K> {
    sink: K,
    echo: bool,
    rows_written: u64,
    write_failures: u64,
}

impl<K: RecordSink> TelemetryLogger<K> {
    pub fn new(sink: K, echo: bool) -> Self {
        Self {
            sink,
            echo,
            rows_written: 0,
            write_failures: 0,
        }
    }

    /// Print the operator status line for a processed reading.
    pub fn status(&self, reading: &Reading) {
        if self.echo {
            println!("{}", status_line(reading));
        }
    }

    pub fn record(&mut self, row: &RecordRow) -> bool {
        match self.sink.append(row) {
            Ok(()) => {
                self.rows_written += 1;
                true
            }
            Err(e) => {
                self.write_failures += 1;
                tracing::error!(error = %e, elapsed_s = row.elapsed_s, "failed to persist sample");
                false
            }
        }
    }

    /// Append the closing line recording the final cycle count.
    pub fn finish(&mut self, cycles: f64) {
        let line = format!("Conductor broke after: {cycles} cycles.");
        if let Err(e) = self.sink.append_terminal(&line) {
            self.write_failures += 1;
            tracing::error!(error = %e, "failed to persist terminal line");
        }
    }

    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    pub fn write_failures(&self) -> u64 {
        self.write_failures
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }
}

/// Live status line: time, resistance, stretch, cycle count, breaks so far.
pub fn status_line(r: &Reading) -> String {
    format!(
        "t={:.2}s\tresistance: {:.3} ohms\tstretch: {:.3} cm\tcycle #{}\tconductors broken: {}",
        r.elapsed_s, r.resistance_ohms, r.stretch_cm, r.cycles, r.breaks
    )
}
