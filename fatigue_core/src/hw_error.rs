//! Maps `Box<dyn Error>` from trait boundaries to typed `MonitorError`.
//!
//! The traits in `fatigue_traits` use `Box<dyn Error + Send + Sync>` for maximum
//! flexibility; this module converts those to our typed error enum, with an
//! optional feature-gated path for `fatigue_hardware::HwError` downcasting.

use crate::error::MonitorError;

/// Map a trait-boundary error to a typed `MonitorError`.
///
/// Attempts to downcast known hardware error types first, then falls back
/// to string-based heuristics.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> MonitorError {
    #[cfg(feature = "hardware-errors")]
    {
        if let Some(hw) = e.downcast_ref::<fatigue_hardware::error::HwError>() {
            return match hw {
                fatigue_hardware::error::HwError::Timeout => MonitorError::Timeout,
                fatigue_hardware::error::HwError::Utf8 => {
                    MonitorError::Decode("line is not valid UTF-8".into())
                }
                other => MonitorError::Hardware(other.to_string()),
            };
        }
    }

    // Fallback: string-based detection
    let s = e.to_string();
    if s.to_lowercase().contains("timeout") || s.to_lowercase().contains("timed out") {
        MonitorError::Timeout
    } else {
        MonitorError::Hardware(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_timeout_maps_to_timeout() {
        let e = std::io::Error::new(std::io::ErrorKind::TimedOut, "read timed out");
        assert_eq!(map_hw_error(&e), MonitorError::Timeout);
    }

    #[test]
    fn other_errors_keep_their_message() {
        let e = std::io::Error::other("port vanished");
        assert_eq!(
            map_hw_error(&e),
            MonitorError::Hardware("port vanished".into())
        );
    }

    #[cfg(feature = "hardware-errors")]
    #[test]
    fn typed_hardware_errors_are_downcast() {
        use fatigue_hardware::error::HwError;
        assert_eq!(map_hw_error(&HwError::Timeout), MonitorError::Timeout);
        assert!(matches!(
            map_hw_error(&HwError::Utf8),
            MonitorError::Decode(_)
        ));
    }
}
