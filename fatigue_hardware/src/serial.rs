//! Serial-port backends for the DATAQ-style acquisition device and the
//! microcontroller guarding the actuator.

use std::io::{self, Read, Write};
use std::time::Duration;

use fatigue_traits::{Acquisition, Actuator};
use serialport::{ClearBuffer, DataBits, FlowControl, Parity, SerialPort, StopBits};

use crate::error::{HwError, Result};
use crate::util::read_line_with_timeout;

type DynError = Box<dyn std::error::Error + Send + Sync>;

/// USB CDC ignores the line rate; 9600 is what the device enumerates with.
const DAQ_BAUD: u32 = 9600;
const LINE_TIMEOUT: Duration = Duration::from_secs(1);
const BYTE_POLL: Duration = Duration::from_millis(1);
const SETUP_SETTLE: Duration = Duration::from_secs(1);

fn serial_err(e: serialport::Error) -> HwError {
    HwError::Serial(e.to_string())
}

fn open_8n1(path: &str, baud: u32) -> Result<Box<dyn SerialPort>> {
    serialport::new(path, baud)
        .data_bits(DataBits::Eight)
        .parity(Parity::None)
        .stop_bits(StopBits::One)
        .flow_control(FlowControl::None)
        .timeout(LINE_TIMEOUT)
        .open()
        .map_err(serial_err)
}

fn pending(port: &dyn SerialPort) -> Result<usize> {
    port.bytes_to_read()
        .map(|n| n as usize)
        .map_err(serial_err)
}

fn read_line(port: &mut Box<dyn SerialPort>) -> Result<String> {
    read_line_with_timeout(
        || {
            if port.bytes_to_read().map_err(io::Error::from)? == 0 {
                return Ok(None);
            }
            let mut b = [0u8; 1];
            match port.read(&mut b)? {
                0 => Ok(None),
                _ => Ok(Some(b[0])),
            }
        },
        LINE_TIMEOUT,
        BYTE_POLL,
    )
}

/// Acquisition device speaking the ASCII command protocol (`\r`-terminated commands).
pub struct SerialDaq {
    port: Box<dyn SerialPort>,
}

impl SerialDaq {
    /// Open the port and configure ASCII scanning of channels 0 to 7.
    pub fn open(path: &str) -> Result<Self> {
        let port = open_8n1(path, DAQ_BAUD)?;
        let mut daq = Self { port };
        daq.configure()?;
        tracing::info!(port = path, "acquisition device configured");
        Ok(daq)
    }

    fn command(&mut self, cmd: &str) -> Result<()> {
        tracing::trace!(cmd, "daq command");
        self.port.write_all(cmd.as_bytes())?;
        self.port.write_all(b"\r")?;
        Ok(())
    }

    fn configure(&mut self) -> Result<()> {
        // in case the device was left scanning
        self.command("stop")?;
        self.command("eol 1")?;
        self.command("encode 1")?;
        for slot in 0..8 {
            self.command(&format!("slist {slot} {slot}"))?;
        }
        self.command("srate 6000")?;
        self.command("dec 500")?;
        self.command("deca 3")?;
        self.port.flush()?;
        std::thread::sleep(SETUP_SETTLE);
        self.port.clear(ClearBuffer::Input).map_err(serial_err)
    }
}

impl Acquisition for SerialDaq {
    fn start(&mut self) -> std::result::Result<(), DynError> {
        self.command("start")?;
        Ok(())
    }

    fn bytes_waiting(&mut self) -> std::result::Result<usize, DynError> {
        Ok(pending(&*self.port)?)
    }

    fn read_line(&mut self) -> std::result::Result<String, DynError> {
        Ok(read_line(&mut self.port)?)
    }

    fn stop(&mut self) -> std::result::Result<(), DynError> {
        self.command("stop")?;
        Ok(())
    }
}

/// Limit-switch microcontroller link; `stop` halts the actuator.
pub struct SerialActuator {
    port: Box<dyn SerialPort>,
}

impl SerialActuator {
    pub fn open(path: &str, baud: u32) -> Result<Self> {
        let port = open_8n1(path, baud)?;
        port.clear(ClearBuffer::Input).map_err(serial_err)?;
        tracing::info!(port = path, baud, "actuator link open");
        Ok(Self { port })
    }
}

impl Actuator for SerialActuator {
    fn send_stop(&mut self) -> std::result::Result<(), DynError> {
        self.port.write_all(b"stop").map_err(HwError::from)?;
        self.port.flush().map_err(HwError::from)?;
        Ok(())
    }

    fn bytes_waiting(&mut self) -> std::result::Result<usize, DynError> {
        Ok(pending(&*self.port)?)
    }

    fn read_line(&mut self) -> std::result::Result<String, DynError> {
        Ok(read_line(&mut self.port)?)
    }
}
