use std::io::{self, Write};
use std::sync::{Mutex, MutexGuard};

static BUFFER: Mutex<Option<Vec<String>>> = Mutex::new(None);

fn buffer() -> MutexGuard<'static, Option<Vec<String>>> {
    BUFFER.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Activate buffering. While active, diagnostics are stored instead of
/// printed, so they don't corrupt the TUI.
pub fn activate() {
    *buffer() = Some(Vec::new());
}

/// Deactivate buffering and return all collected messages.
pub fn drain() -> Vec<String> {
    buffer().take().unwrap_or_default()
}

pub fn is_active() -> bool {
    buffer().is_some()
}

/// Write a message. If buffering is active the message is stored;
/// otherwise it is printed to stderr immediately.
pub fn warn(msg: String) {
    let mut guard = buffer();
    if let Some(buf) = guard.as_mut() {
        buf.push(msg);
    } else {
        drop(guard);
        eprintln!("{}", msg);
    }
}

/// Convenience macro that works like `eprintln!` but routes through the
/// stderr buffer when it is active.
#[macro_export]
macro_rules! buffered_eprintln {
    ($($arg:tt)*) => {
        $crate::stderr_buffer::warn(format!($($arg)*))
    };
}

/// Writer handed to the tracing subscriber. Collects one formatted event and
/// routes it through [`warn`] when dropped.
#[derive(Default)]
pub struct BufferedStderr {
    pending: Vec<u8>,
}

impl BufferedStderr {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Write for BufferedStderr {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for BufferedStderr {
    fn drop(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let text = String::from_utf8_lossy(&self.pending);
        warn(text.trim_end_matches('\n').to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // One test so the global buffer is not shared between parallel tests
    #[test]
    fn test_buffering_lifecycle() {
        activate();
        assert!(is_active());

        crate::buffered_eprintln!("first {}", 1);
        {
            let mut writer = BufferedStderr::new();
            writer.write_all(b"WARN college_compare: second\n").unwrap();
        }
        // Empty writers record nothing
        drop(BufferedStderr::new());

        let messages = drain();
        assert_eq!(
            messages,
            vec![
                "first 1".to_string(),
                "WARN college_compare: second".to_string()
            ]
        );
        assert!(!is_active());
        assert!(drain().is_empty());
    }
}
