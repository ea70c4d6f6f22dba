//! Owned, fixed-capacity log destination that travels with a task.

use std::fmt;

use crate::logger::{LogCursor, Logger};

/// A caller-owned byte block for zero-allocation logging.
///
/// The submission side allocates it once (or recycles one) and moves it
/// into a task; the worker appends a record through [`logger`](Self::logger)
/// and hands the buffer back inside the task's result. The storage is
/// allocated in full at construction and never reallocated.
pub struct LogBuffer {
    storage: Box<[u8]>,
    cursor: LogCursor,
}

impl LogBuffer {
    /// Allocate a zeroed buffer of exactly `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: vec![0u8; capacity].into_boxed_slice(),
            cursor: LogCursor::new(),
        }
    }

    /// Borrow a writer that appends after any bytes already in the buffer.
    pub fn logger(&mut self) -> Logger<'_> {
        Logger::new(&mut self.storage, &mut self.cursor)
    }

    /// The accumulated record bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.storage[..self.cursor.len()]
    }

    /// Number of bytes written.
    pub fn len(&self) -> usize {
        self.cursor.len()
    }

    /// Whether nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.cursor.is_empty()
    }

    /// Total capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Bytes still available.
    pub fn remaining(&self) -> usize {
        self.storage.len() - self.cursor.len()
    }

    /// Whether an append was dropped because the buffer is too small.
    pub fn is_truncated(&self) -> bool {
        self.cursor.is_truncated()
    }

    /// Forget the contents so the buffer can be reused for another task.
    pub fn clear(&mut self) {
        self.cursor.clear();
    }
}

impl AsRef<[u8]> for LogBuffer {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl fmt::Debug for LogBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogBuffer")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .field("truncated", &self.is_truncated())
            .field("text", &String::from_utf8_lossy(self.as_bytes()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_lands_in_buffer() {
        let mut buf = LogBuffer::with_capacity(1024);
        buf.logger().int("ts", 7).str("type", "order").msg("processed");
        assert_eq!(buf.as_bytes(), b"ts=7 type=order msg=processed\n");
        assert_eq!(buf.capacity(), 1024);
        assert_eq!(buf.remaining(), 1024 - buf.len());
    }

    #[test]
    fn records_accumulate_until_cleared() {
        let mut buf = LogBuffer::with_capacity(64);
        buf.logger().msg("one");
        buf.logger().msg("two");
        assert_eq!(buf.as_bytes(), b"msg=one\nmsg=two\n");
        buf.clear();
        assert!(buf.is_empty());
        buf.logger().msg("three");
        assert_eq!(buf.as_bytes(), b"msg=three\n");
    }

    #[test]
    fn capacity_is_never_exceeded() {
        let mut buf = LogBuffer::with_capacity(8);
        buf.logger().str("key", "a value that will not fit");
        assert!(buf.is_truncated());
        assert!(buf.is_empty());
        assert_eq!(buf.capacity(), 8);
    }

    #[test]
    fn debug_shows_text() {
        let mut buf = LogBuffer::with_capacity(16);
        buf.logger().msg("hi");
        let rendered = format!("{buf:?}");
        assert!(rendered.contains("msg=hi"));
        assert!(rendered.contains("truncated: false"));
    }
}
