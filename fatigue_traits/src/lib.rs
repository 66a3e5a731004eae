//! Device seams shared by the monitoring core and the hardware backends.
//!
//! Both instruments are line-oriented serial links. The traits keep the
//! error type open (`Box<dyn Error + Send + Sync>`) so backends can surface
//! their own typed errors; `fatigue_core::hw_error` maps them back.
pub mod clock;

pub use clock::{Clock, MonotonicClock};

/// Multi-channel voltage acquisition device streaming one text line per scan.
pub trait Acquisition {
    /// Begin scanning.
    fn start(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Number of bytes buffered and ready to read (0 means "nothing yet").
    fn bytes_waiting(&mut self) -> Result<usize, Box<dyn std::error::Error + Send + Sync>>;

    /// Read one line, without its terminator.
    fn read_line(&mut self) -> Result<String, Box<dyn std::error::Error + Send + Sync>>;

    /// Stop scanning and release the device.
    fn stop(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Controller link wired to the actuator limit switch.
pub trait Actuator {
    /// Transmit one plain-text stop command.
    fn send_stop(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    fn bytes_waiting(&mut self) -> Result<usize, Box<dyn std::error::Error + Send + Sync>>;

    /// Read one acknowledgment line, without its terminator.
    fn read_line(&mut self) -> Result<String, Box<dyn std::error::Error + Send + Sync>>;
}

impl<T: Acquisition + ?Sized> Acquisition for Box<T> {
    fn start(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).start()
    }
    fn bytes_waiting(&mut self) -> Result<usize, Box<dyn std::error::Error + Send + Sync>> {
        (**self).bytes_waiting()
    }
    fn read_line(&mut self) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        (**self).read_line()
    }
    fn stop(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).stop()
    }
}

impl<T: Actuator + ?Sized> Actuator for Box<T> {
    fn send_stop(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).send_stop()
    }
    fn bytes_waiting(&mut self) -> Result<usize, Box<dyn std::error::Error + Send + Sync>> {
        (**self).bytes_waiting()
    }
    fn read_line(&mut self) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        (**self).read_line()
    }
}
