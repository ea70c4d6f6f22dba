//! The bump allocator itself.
//!
//! [`Arena`] is a single fixed region with a monotonically advancing cursor.
//! It never grows: a request that does not fit fails with
//! [`ArenaError::CapacityExceeded`] and leaves the cursor where it was.

use std::fmt;

use crate::error::ArenaError;
use crate::handle::{ArraySpan, Span, Typed};
use crate::scalar::Scalar;

/// Fixed-capacity bump allocator with epoch-based bulk reset.
///
/// All allocations made between two calls to [`reset`](Self::reset) form
/// one epoch. Borrowed slices cannot outlive the epoch (reset takes
/// `&mut self`); handles can, but resolving them afterwards fails with
/// [`ArenaError::StaleHandle`].
///
/// The epoch counter is a `u32` and wraps; a handle kept across exactly
/// 2^32 resets would resolve again. Handles are meant to live for one task.
pub struct Arena {
    region: Box<[u8]>,
    cursor: usize,
    epoch: u32,
    high_water: usize,
}

impl Arena {
    /// Allocate a zeroed region of `capacity` bytes.
    ///
    /// This is the only heap allocation an arena ever performs.
    pub fn new(capacity: usize) -> Self {
        Self {
            region: vec![0u8; capacity].into_boxed_slice(),
            cursor: 0,
            epoch: 0,
            high_water: 0,
        }
    }

    /// Reserve `size` zero-filled bytes aligned to `align`.
    ///
    /// Returns an epoch-tagged [`Span`]; resolve it with
    /// [`bytes`](Self::bytes) or [`bytes_mut`](Self::bytes_mut).
    pub fn allocate(&mut self, size: usize, align: usize) -> Result<Span, ArenaError> {
        let offset = self.reserve(size, align)?;
        Ok(Span::new(self.epoch, offset, size))
    }

    /// Reserve `len` zero-filled bytes aligned to `align` and borrow them
    /// directly.
    pub fn alloc_bytes(&mut self, len: usize, align: usize) -> Result<&mut [u8], ArenaError> {
        let offset = self.reserve(len, align)?;
        Ok(&mut self.region[offset..offset + len])
    }

    /// Store `value` in a freshly allocated, correctly aligned slot.
    pub fn alloc<T: Scalar>(&mut self, value: T) -> Result<Typed<T>, ArenaError> {
        let offset = self.reserve(T::SIZE, T::ALIGN)?;
        value.encode(&mut self.region[offset..offset + T::SIZE]);
        Ok(Typed::new(Span::new(self.epoch, offset, T::SIZE)))
    }

    /// Allocate a slot holding the all-zero value of `T`.
    pub fn alloc_zeroed<T: Scalar>(&mut self) -> Result<Typed<T>, ArenaError> {
        let span = self.allocate(T::SIZE, T::ALIGN)?;
        Ok(Typed::new(span))
    }

    /// Read the value behind a typed handle.
    pub fn get<T: Scalar>(&self, handle: Typed<T>) -> Result<T, ArenaError> {
        self.bytes(handle.span).map(T::decode)
    }

    /// Overwrite the value behind a typed handle.
    pub fn set<T: Scalar>(&mut self, handle: Typed<T>, value: T) -> Result<(), ArenaError> {
        value.encode(self.bytes_mut(handle.span)?);
        Ok(())
    }

    /// Allocate `len` zeroed elements of `T`.
    pub fn alloc_array<T: Scalar>(&mut self, len: usize) -> Result<ArraySpan<T>, ArenaError> {
        let size = T::SIZE
            .checked_mul(len)
            .ok_or(ArenaError::CapacityExceeded {
                requested: usize::MAX,
                padding: 0,
                remaining: self.remaining(),
                capacity: self.capacity(),
            })?;
        let span = self.allocate(size, T::ALIGN)?;
        Ok(ArraySpan::new(span, len))
    }

    /// Read element `index` of an array handle.
    pub fn read_at<T: Scalar>(&self, array: &ArraySpan<T>, index: usize) -> Result<T, ArenaError> {
        let range = Self::element_range(array, index)?;
        let bytes = self.bytes(array.span)?;
        Ok(T::decode(&bytes[range]))
    }

    /// Overwrite element `index` of an array handle.
    pub fn write_at<T: Scalar>(
        &mut self,
        array: &ArraySpan<T>,
        index: usize,
        value: T,
    ) -> Result<(), ArenaError> {
        let range = Self::element_range(array, index)?;
        let bytes = self.bytes_mut(array.span)?;
        value.encode(&mut bytes[range]);
        Ok(())
    }

    /// Resolve a span issued in the current epoch.
    pub fn bytes(&self, span: Span) -> Result<&[u8], ArenaError> {
        self.check(span)?;
        Ok(&self.region[span.offset..span.end()])
    }

    /// Resolve a span issued in the current epoch, mutably.
    pub fn bytes_mut(&mut self, span: Span) -> Result<&mut [u8], ArenaError> {
        self.check(span)?;
        Ok(&mut self.region[span.offset..span.end()])
    }

    /// Rewind the cursor and start a new epoch.
    ///
    /// Memory contents are left as they are; every allocation zero-fills
    /// its own bytes before handing them out.
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.epoch = self.epoch.wrapping_add(1);
    }

    /// Bytes allocated in the current epoch, including padding.
    pub fn used(&self) -> usize {
        self.cursor
    }

    /// Bytes still available in the current epoch.
    pub fn remaining(&self) -> usize {
        self.region.len() - self.cursor
    }

    /// Total region size in bytes.
    pub fn capacity(&self) -> usize {
        self.region.len()
    }

    /// The current epoch.
    pub fn epoch(&self) -> u32 {
        self.epoch
    }

    /// Largest `used()` observed over the arena's lifetime.
    pub fn high_water(&self) -> usize {
        self.high_water
    }

    fn reserve(&mut self, size: usize, align: usize) -> Result<usize, ArenaError> {
        if align == 0 || !align.is_power_of_two() {
            return Err(ArenaError::InvalidAlignment { align });
        }
        // Pad against the real address so the bytes themselves are aligned,
        // not just the offset.
        let addr = (self.region.as_ptr() as usize).wrapping_add(self.cursor);
        let padding = addr.wrapping_neg() & (align - 1);
        let remaining = self.remaining();
        let fits = padding
            .checked_add(size)
            .is_some_and(|total| total <= remaining);
        if !fits {
            return Err(ArenaError::CapacityExceeded {
                requested: size,
                padding,
                remaining,
                capacity: self.capacity(),
            });
        }

        let offset = self.cursor + padding;
        self.cursor = offset + size;
        self.high_water = self.high_water.max(self.cursor);
        // The region is reused across epochs and may hold stale bytes.
        self.region[offset..self.cursor].fill(0);
        Ok(offset)
    }

    fn check(&self, span: Span) -> Result<(), ArenaError> {
        if span.epoch != self.epoch {
            return Err(ArenaError::StaleHandle {
                handle_epoch: span.epoch,
                current_epoch: self.epoch,
            });
        }
        if span.end() > self.cursor {
            return Err(ArenaError::InvalidSpan {
                offset: span.offset,
                len: span.len,
                cursor: self.cursor,
            });
        }
        Ok(())
    }

    fn element_range<T: Scalar>(
        array: &ArraySpan<T>,
        index: usize,
    ) -> Result<std::ops::Range<usize>, ArenaError> {
        if index >= array.len() {
            return Err(ArenaError::IndexOutOfBounds {
                index,
                len: array.len(),
            });
        }
        let start = index * T::SIZE;
        Ok(start..start + T::SIZE)
    }
}

impl fmt::Debug for Arena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("capacity", &self.capacity())
            .field("used", &self.cursor)
            .field("epoch", &self.epoch)
            .field("high_water", &self.high_water)
            .finish()
    }
}
