//! Chainable key/value writer over a caller-supplied byte slice.
//!
//! [`Logger`] borrows the destination and a [`LogCursor`] that remembers how
//! far previous writers got, so one destination can accumulate several
//! records across separate `Logger` instances.

use crate::digits::Digits;

/// Write position and truncation state for one log destination.
///
/// Kept separate from the bytes so that any slice can serve as a
/// destination: a [`LogBuffer`](crate::LogBuffer) pairs one with its own
/// storage, arena-backed callers keep one on the stack.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LogCursor {
    len: usize,
    truncated: bool,
}

impl LogCursor {
    /// An empty, untruncated cursor.
    pub const fn new() -> Self {
        Self {
            len: 0,
            truncated: false,
        }
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether an append was dropped for lack of space.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Rewind to the start and clear the truncation flag.
    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

/// Zero-allocation structured log writer.
///
/// Every append copies bytes straight into the destination; integers are
/// formatted in a stack scratch array first. Tokens are all-or-nothing: if
/// a token does not fit, nothing of it is written, the cursor is marked
/// truncated, and all subsequent appends become no-ops.
pub struct Logger<'a> {
    dst: &'a mut [u8],
    cursor: &'a mut LogCursor,
}

impl<'a> Logger<'a> {
    /// Resume writing into `dst` at `cursor.len()`.
    ///
    /// A cursor that points past the end of `dst` is clamped to its length
    /// and marked truncated.
    pub fn new(dst: &'a mut [u8], cursor: &'a mut LogCursor) -> Self {
        if cursor.len > dst.len() {
            cursor.len = dst.len();
            cursor.truncated = true;
        }
        Self { dst, cursor }
    }

    /// Append `key=<value> ` with a signed integer value.
    pub fn int(&mut self, key: &str, value: i64) -> &mut Self {
        let mut digits = Digits::new();
        let text = digits.signed(value);
        self.field(key, text)
    }

    /// Append `key=<value> ` with an unsigned integer value.
    pub fn uint(&mut self, key: &str, value: u64) -> &mut Self {
        let mut digits = Digits::new();
        let text = digits.unsigned(value);
        self.field(key, text)
    }

    /// Append `key=<value> ` with a string value, copied verbatim.
    pub fn str(&mut self, key: &str, value: &str) -> &mut Self {
        self.field(key, value.as_bytes())
    }

    /// Append `key=true ` or `key=false `.
    pub fn bool(&mut self, key: &str, value: bool) -> &mut Self {
        let text: &[u8] = if value { b"true" } else { b"false" };
        self.field(key, text)
    }

    /// Close the record with `msg=<text>\n`.
    pub fn msg(&mut self, text: &str) {
        self.token(&[b"msg=", text.as_bytes(), b"\n"]);
    }

    /// Bytes written to the destination so far, including earlier writers.
    pub fn bytes(&self) -> &[u8] {
        &self.dst[..self.cursor.len]
    }

    /// Number of bytes written.
    pub fn len(&self) -> usize {
        self.cursor.len
    }

    /// Whether nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.cursor.len == 0
    }

    /// Bytes still available in the destination.
    pub fn remaining(&self) -> usize {
        self.dst.len() - self.cursor.len
    }

    /// Whether any append has been dropped for lack of space.
    pub fn is_truncated(&self) -> bool {
        self.cursor.truncated
    }

    fn field(&mut self, key: &str, value: &[u8]) -> &mut Self {
        self.token(&[key.as_bytes(), b"=", value, b" "]);
        self
    }

    fn token(&mut self, parts: &[&[u8]]) {
        if self.cursor.truncated {
            return;
        }
        let needed: usize = parts.iter().map(|p| p.len()).sum();
        if needed > self.remaining() {
            self.cursor.truncated = true;
            return;
        }
        let mut at = self.cursor.len;
        for part in parts {
            self.dst[at..at + part.len()].copy_from_slice(part);
            at += part.len();
        }
        self.cursor.len = at;
    }
}
