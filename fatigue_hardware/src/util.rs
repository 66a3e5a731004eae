use std::time::{Duration, Instant};

use crate::error::{HwError, Result};

/// Assemble one `\n`-terminated line from `next_byte`, which yields `None` while
/// nothing is buffered. A trailing `\r` is dropped. Sleeps `poll_interval` between
/// empty reads. Once `timeout` has elapsed the bytes gathered so far are returned
/// as an unterminated line; `HwError::Timeout` only when nothing arrived.
pub fn read_line_with_timeout(
    mut next_byte: impl FnMut() -> std::io::Result<Option<u8>>,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<String> {
    let deadline = Instant::now() + timeout;
    let mut buf = Vec::new();
    loop {
        match next_byte()? {
            Some(b'\n') => break,
            Some(b) => buf.push(b),
            None => {
                if Instant::now() >= deadline {
                    if buf.is_empty() {
                        return Err(HwError::Timeout);
                    }
                    break;
                }
                std::thread::sleep(poll_interval);
            }
        }
    }
    if buf.last() == Some(&b'\r') {
        buf.pop();
    }
    String::from_utf8(buf).map_err(|_| HwError::Utf8)
}
