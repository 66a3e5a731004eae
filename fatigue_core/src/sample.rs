//! Decoding of one DAQ scan line.

use crate::error::MonitorError;

/// One raw reading: channel 0 (resistance volts) and channel 1 (stretch volts).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub resistance_raw: f64,
    pub stretch_raw: f64,
}

impl Sample {
    /// Parse `"<ch0><d><ch1>[<d>...]"`. Extra channels are ignored.
    pub fn parse(line: &str, delimiter: char) -> Result<Self, MonitorError> {
        let mut fields = line.trim().split(delimiter);
        let resistance_raw = field(fields.next(), 0, line)?;
        let stretch_raw = field(fields.next(), 1, line)?;
        Ok(Self {
            resistance_raw,
            stretch_raw,
        })
    }
}

fn field(raw: Option<&str>, idx: usize, line: &str) -> Result<f64, MonitorError> {
    let text = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| MonitorError::Decode(format!("missing field {idx} in {line:?}")))?;
    let v: f64 = text
        .parse()
        .map_err(|_| MonitorError::Decode(format!("field {idx} is not numeric: {text:?}")))?;
    if !v.is_finite() {
        return Err(MonitorError::Decode(format!("field {idx} is not finite: {text:?}")));
    }
    Ok(v)
}
