//! Debug log ring buffer.
//!
//! The shared application logic has no logger of its own. Notable events
//! (asset decode failures, terminal actions) are recorded here and the
//! platform drains the buffer once per loop iteration: the firmware prints
//! entries with `defmt`, the simulator with `println!`.
//!
//! # Usage
//!
//! ```ignore
//! let mut log = DebugLog::new();
//! log.record(LogLevel::Warn, now_ms, format_args!("decode failed: {}", err));
//!
//! while let Some(entry) = log.pop() {
//!     println!("{}", entry);
//! }
//! ```

use core::fmt::{self, Write};

use heapless::{Deque, String};

// =============================================================================
// Debug Log Configuration
// =============================================================================

/// Maximum number of entries kept before the oldest is dropped.
pub const LOG_ENTRIES: usize = 8;

/// Maximum characters per log message.
pub const LOG_MSG_LEN: usize = 48;

// =============================================================================
// Entries
// =============================================================================

/// Log severity level.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum LogLevel {
    Debug = 1,
    #[default]
    Info = 2,
    Warn = 3,
    Error = 4,
}

impl LogLevel {
    /// Single-character prefix for printed lines.
    pub const fn prefix(self) -> char {
        match self {
            Self::Debug => 'D',
            Self::Info => 'I',
            Self::Warn => 'W',
            Self::Error => 'E',
        }
    }
}

/// A single log line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEntry {
    pub level: LogLevel,
    /// Message, truncated to [`LOG_MSG_LEN`].
    pub message: String<LOG_MSG_LEN>,
    /// Milliseconds since start.
    pub timestamp_ms: u64,
}

impl LogEntry {
    /// Message text.
    #[inline]
    pub fn message(&self) -> &str { self.message.as_str() }
}

impl fmt::Display for LogEntry {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "[{:>8}] {} {}", self.timestamp_ms, self.level.prefix(), self.message)
    }
}

/// Writer that fills a fixed string and silently stops when it is full.
struct Truncating<'a>(&'a mut String<LOG_MSG_LEN>);

impl Write for Truncating<'_> {
    fn write_str(
        &mut self,
        s: &str,
    ) -> fmt::Result {
        for c in s.chars() {
            if self.0.push(c).is_err() {
                break;
            }
        }
        Ok(())
    }
}

// =============================================================================
// Debug Log Ring Buffer
// =============================================================================

/// Ring buffer of log entries. Old entries are dropped when full.
pub struct DebugLog {
    buffer: Deque<LogEntry, LOG_ENTRIES>,
}

impl DebugLog {
    /// Create a new empty debug log.
    pub const fn new() -> Self { Self { buffer: Deque::new() } }

    /// Record a formatted message.
    pub fn record(
        &mut self,
        level: LogLevel,
        timestamp_ms: u64,
        args: fmt::Arguments<'_>,
    ) {
        let mut message = String::new();
        Truncating(&mut message).write_fmt(args).ok();

        if self.buffer.is_full() {
            self.buffer.pop_front();
        }
        self.buffer
            .push_back(LogEntry {
                level,
                message,
                timestamp_ms,
            })
            .ok();
    }

    /// Record a plain message.
    pub fn push(
        &mut self,
        level: LogLevel,
        timestamp_ms: u64,
        msg: &str,
    ) {
        self.record(level, timestamp_ms, format_args!("{msg}"));
    }

    /// Remove and return the oldest entry.
    #[inline]
    pub fn pop(&mut self) -> Option<LogEntry> { self.buffer.pop_front() }

    /// Number of entries.
    #[inline]
    pub fn len(&self) -> usize { self.buffer.len() }

    /// Check if log is empty.
    #[inline]
    pub fn is_empty(&self) -> bool { self.buffer.is_empty() }
}

impl Default for DebugLog {
    fn default() -> Self { Self::new() }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_log_push() {
        let mut log = DebugLog::new();
        assert!(log.is_empty());

        log.push(LogLevel::Info, 0, "Test message");
        assert_eq!(log.len(), 1);

        log.push(LogLevel::Warn, 5, "Another message");
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_debug_log_ring_buffer() {
        let mut log = DebugLog::new();

        for i in 0..LOG_ENTRIES {
            log.record(LogLevel::Info, i as u64, format_args!("{i}"));
        }
        assert_eq!(log.len(), LOG_ENTRIES);

        // Push one more - should drop oldest
        log.push(LogLevel::Info, 99, "New");
        assert_eq!(log.len(), LOG_ENTRIES);
        assert_eq!(log.pop().unwrap().message(), "1");
    }

    #[test]
    fn test_debug_log_truncation() {
        let mut log = DebugLog::new();
        let long_msg = "This is a very long message that exceeds the maximum line length limit";
        log.push(LogLevel::Error, 0, long_msg);

        let stored = log.pop().unwrap();
        assert_eq!(stored.message().len(), LOG_MSG_LEN);
        assert!(long_msg.starts_with(stored.message()));
    }

    #[test]
    fn test_pop_drains_oldest_first() {
        let mut log = DebugLog::new();
        log.push(LogLevel::Info, 1, "first");
        log.push(LogLevel::Warn, 2, "second");

        assert_eq!(log.pop().unwrap().message(), "first");
        let second = log.pop().unwrap();
        assert_eq!(second.level, LogLevel::Warn);
        assert!(log.pop().is_none());
    }

    #[test]
    fn test_entry_display() {
        let mut log = DebugLog::new();
        log.push(LogLevel::Warn, 1234, "gear decode failed");
        let line = std::format!("{}", log.pop().unwrap());
        assert_eq!(line, "[    1234] W gear decode failed");
    }
}
