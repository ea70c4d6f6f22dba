//! Epoch-tagged handles into an arena region.
//!
//! A [`Span`] records where an allocation lives and which epoch issued it.
//! The epoch makes staleness an O(1) comparison: after a reset the arena's
//! epoch moves on and every outstanding handle is refused.

use std::fmt;
use std::marker::PhantomData;

use crate::scalar::Scalar;

/// Location of a raw byte allocation within an arena region.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[must_use]
pub struct Span {
    pub(crate) epoch: u32,
    pub(crate) offset: usize,
    pub(crate) len: usize,
}

impl Span {
    pub(crate) fn new(epoch: u32, offset: usize, len: usize) -> Self {
        Self { epoch, offset, len }
    }

    /// The epoch this span was allocated in.
    pub fn epoch(&self) -> u32 {
        self.epoch
    }

    /// Byte offset from the start of the region.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether this is a zero-length allocation.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// One past the last byte of the span.
    pub fn end(&self) -> usize {
        self.offset + self.len
    }

    /// Whether two spans share any byte. Empty spans share none.
    pub fn overlaps(&self, other: &Span) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.offset < other.end()
            && other.offset < self.end()
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Span(epoch={}, {}..{})",
            self.epoch,
            self.offset,
            self.end()
        )
    }
}

/// Handle to a single [`Scalar`] value stored in an arena.
#[must_use]
pub struct Typed<T: Scalar> {
    pub(crate) span: Span,
    _marker: PhantomData<T>,
}

impl<T: Scalar> Typed<T> {
    pub(crate) fn new(span: Span) -> Self {
        Self {
            span,
            _marker: PhantomData,
        }
    }

    /// The underlying byte span.
    pub fn span(&self) -> Span {
        self.span
    }
}

// Manual impls: deriving would require `T: Clone`/`T: Debug` on the marker.
impl<T: Scalar> Clone for Typed<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Scalar> Copy for Typed<T> {}

impl<T: Scalar> fmt::Debug for Typed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Typed").field(&self.span).finish()
    }
}

/// Handle to a contiguous array of [`Scalar`] values stored in an arena.
#[must_use]
pub struct ArraySpan<T: Scalar> {
    pub(crate) span: Span,
    len: usize,
    _marker: PhantomData<T>,
}

impl<T: Scalar> ArraySpan<T> {
    pub(crate) fn new(span: Span, len: usize) -> Self {
        Self {
            span,
            len,
            _marker: PhantomData,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the array has no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The underlying byte span.
    pub fn span(&self) -> Span {
        self.span
    }
}

impl<T: Scalar> Clone for ArraySpan<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Scalar> Copy for ArraySpan<T> {}

impl<T: Scalar> fmt::Debug for ArraySpan<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArraySpan")
            .field("span", &self.span)
            .field("len", &self.len)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_accessors() {
        let s = Span::new(3, 16, 8);
        assert_eq!(s.epoch(), 3);
        assert_eq!(s.offset(), 16);
        assert_eq!(s.len(), 8);
        assert_eq!(s.end(), 24);
        assert!(!s.is_empty());
        assert_eq!(s.to_string(), "Span(epoch=3, 16..24)");
    }

    #[test]
    fn overlap_is_half_open() {
        let a = Span::new(0, 0, 8);
        let b = Span::new(0, 8, 8);
        let c = Span::new(0, 4, 8);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(c.overlaps(&b));
    }

    #[test]
    fn empty_span_overlaps_nothing() {
        let empty = Span::new(0, 4, 0);
        let around = Span::new(0, 0, 8);
        assert!(empty.is_empty());
        assert!(!empty.overlaps(&around));
    }
}
