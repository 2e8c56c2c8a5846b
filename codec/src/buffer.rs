//! A byte buffer with independent read and write cursors.
//!
//! [ByteBuf] is the only buffer type codecs operate on. Bytes between the read cursor and the
//! write cursor are readable; bytes between the write cursor and the capacity are writable.
//!
//! ```text
//! +-------------------+------------------+------------------+
//! | discardable bytes |  readable bytes  |  writable bytes  |
//! +-------------------+------------------+------------------+
//! 0        <=    reader_index   <=   writer_index   <=   capacity
//! ```
//!
//! Heap buffers grow on demand (up to their maximum capacity) when a codec calls
//! [ByteBuf::ensure_writable]. Wrapped buffers are read-only views over [Bytes] and are what the
//! byte-slice decode forms hand to codecs.

use crate::Error;
use bytes::{buf::UninitSlice, Buf, BufMut, Bytes};
use std::fmt;
use tracing::debug;

/// Initial capacity of a buffer created with [ByteBuf::new].
pub const DEFAULT_CAPACITY: usize = 256;

/// Maximum capacity of a buffer unless configured otherwise.
///
/// Matches the largest length a 32-bit size field can describe.
pub const DEFAULT_MAX_CAPACITY: usize = i32::MAX as usize;

enum Storage {
    /// Zero-filled, writable, contiguous storage. `len()` is the capacity.
    Heap(Vec<u8>),
    /// Read-only storage.
    Shared(Bytes),
}

impl Storage {
    fn as_slice(&self) -> &[u8] {
        match self {
            Storage::Heap(v) => v,
            Storage::Shared(b) => b,
        }
    }
}

/// A mutable byte sequence with a read cursor, a write cursor, and a bounded capacity.
pub struct ByteBuf {
    storage: Storage,
    reader: usize,
    writer: usize,
    max_capacity: usize,
}

impl ByteBuf {
    /// Creates an empty heap buffer with [DEFAULT_CAPACITY].
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates an empty heap buffer that may grow up to [DEFAULT_MAX_CAPACITY].
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_max_capacity(capacity, DEFAULT_MAX_CAPACITY)
    }

    /// Creates an empty heap buffer that may grow up to `max_capacity`.
    ///
    /// If `max_capacity` is smaller than `capacity`, the buffer cannot grow.
    pub fn with_max_capacity(capacity: usize, max_capacity: usize) -> Self {
        Self {
            storage: Storage::Heap(vec![0; capacity]),
            reader: 0,
            writer: 0,
            max_capacity: max_capacity.max(capacity),
        }
    }

    /// Creates an empty heap buffer that never grows.
    pub fn fixed(capacity: usize) -> Self {
        Self::with_max_capacity(capacity, capacity)
    }

    /// Wraps `bytes` in a read-only buffer whose readable span is the entire input.
    pub fn wrap(bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        let len = bytes.len();
        Self {
            storage: Storage::Shared(bytes),
            reader: 0,
            writer: len,
            max_capacity: len,
        }
    }

    /// Returns the number of bytes currently allocated.
    pub fn capacity(&self) -> usize {
        self.storage.as_slice().len()
    }

    /// Returns the capacity the buffer may grow to.
    pub fn max_capacity(&self) -> usize {
        self.max_capacity
    }

    /// Returns true if the buffer wraps shared, read-only storage.
    pub fn is_read_only(&self) -> bool {
        matches!(self.storage, Storage::Shared(_))
    }

    pub fn reader_index(&self) -> usize {
        self.reader
    }

    pub fn writer_index(&self) -> usize {
        self.writer
    }

    /// Moves the read cursor. Fails if `index` is past the write cursor.
    pub fn set_reader_index(&mut self, index: usize) -> Result<(), Error> {
        if index > self.writer {
            return Err(Error::IndexOutOfBounds(index));
        }
        self.reader = index;
        Ok(())
    }

    /// Moves the write cursor. Fails if `index` is before the read cursor or past the capacity.
    pub fn set_writer_index(&mut self, index: usize) -> Result<(), Error> {
        if index < self.reader || index > self.capacity() {
            return Err(Error::IndexOutOfBounds(index));
        }
        self.writer = index;
        Ok(())
    }

    /// Returns `writer_index - reader_index`.
    pub fn readable_bytes(&self) -> usize {
        self.writer - self.reader
    }

    /// Returns the number of bytes that can be written without growing.
    pub fn writable_bytes(&self) -> usize {
        match &self.storage {
            Storage::Heap(v) => v.len() - self.writer,
            Storage::Shared(_) => 0,
        }
    }

    /// Returns the readable span.
    pub fn readable(&self) -> &[u8] {
        &self.storage.as_slice()[self.reader..self.writer]
    }

    /// Returns a copy of the readable span without moving the read cursor.
    pub fn to_bytes(&self) -> Bytes {
        Bytes::copy_from_slice(self.readable())
    }

    /// Resets both cursors to zero. Capacity is retained.
    pub fn clear(&mut self) {
        self.reader = 0;
        self.writer = 0;
    }

    /// Returns the entire backing storage, if it is writable and contiguous.
    ///
    /// Offsets into the returned slice are absolute buffer indices (the array offset is zero).
    pub fn array_mut(&mut self) -> Option<&mut [u8]> {
        match &mut self.storage {
            Storage::Heap(v) => Some(v.as_mut_slice()),
            Storage::Shared(_) => None,
        }
    }

    /// Ensures at least `len` bytes can be written at the write cursor, growing the storage if
    /// necessary.
    pub fn ensure_writable(&mut self, len: usize) -> Result<(), Error> {
        let max = self.max_capacity;
        let Storage::Heap(vec) = &mut self.storage else {
            return Err(Error::ReadOnly);
        };
        let required = self
            .writer
            .checked_add(len)
            .ok_or(Error::CapacityExceeded {
                requested: usize::MAX,
                max,
            })?;
        if required <= vec.len() {
            return Ok(());
        }
        if required > max {
            return Err(Error::CapacityExceeded {
                requested: required,
                max,
            });
        }
        let grown = required
            .checked_next_power_of_two()
            .unwrap_or(max)
            .min(max);
        debug!(from = vec.len(), to = grown, "growing buffer");
        vec.resize(grown, 0);
        Ok(())
    }

    /// Runs `f` with the write cursor temporarily moved back to `index`, then restores it.
    ///
    /// Used to backpatch fixed-width fields whose value is only known after the bytes following
    /// them have been written. `f` must not write past the original write cursor.
    pub fn rewrite_at<R>(
        &mut self,
        index: usize,
        f: impl FnOnce(&mut Self) -> Result<R, Error>,
    ) -> Result<R, Error> {
        let end = self.writer;
        if index < self.reader || index > end {
            return Err(Error::IndexOutOfBounds(index));
        }
        self.writer = index;
        let result = f(self);
        self.writer = end;
        result
    }

    /// Runs `f` with the readable span restricted to the next `len` bytes, then moves the read
    /// cursor to the end of that span regardless of how much `f` consumed.
    ///
    /// Reads inside `f` that go past the window fail with [Error::EndOfBuffer].
    pub fn read_window<R>(
        &mut self,
        len: usize,
        f: impl FnOnce(&mut Self) -> Result<R, Error>,
    ) -> Result<R, Error> {
        if self.readable_bytes() < len {
            return Err(Error::EndOfBuffer);
        }
        let end = self.reader + len;
        let limit = self.writer;
        self.writer = end;
        let result = f(self);
        self.writer = limit;
        self.reader = end;
        result
    }
}

impl Default for ByteBuf {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ByteBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteBuf")
            .field("reader", &self.reader)
            .field("writer", &self.writer)
            .field("capacity", &self.capacity())
            .field("max_capacity", &self.max_capacity)
            .field("read_only", &self.is_read_only())
            .finish()
    }
}

impl Buf for ByteBuf {
    fn remaining(&self) -> usize {
        self.readable_bytes()
    }

    fn chunk(&self) -> &[u8] {
        self.readable()
    }

    fn advance(&mut self, cnt: usize) {
        assert!(
            cnt <= self.readable_bytes(),
            "cannot advance past the write cursor"
        );
        self.reader += cnt;
    }
}

// SAFETY: `chunk_mut` only exposes initialized heap storage between the write cursor and the
// capacity, and `advance_mut` never moves the write cursor past the capacity.
unsafe impl BufMut for ByteBuf {
    fn remaining_mut(&self) -> usize {
        self.writable_bytes()
    }

    unsafe fn advance_mut(&mut self, cnt: usize) {
        assert!(
            cnt <= self.writable_bytes(),
            "cannot advance past the capacity"
        );
        self.writer += cnt;
    }

    fn chunk_mut(&mut self) -> &mut UninitSlice {
        let writer = self.writer;
        match &mut self.storage {
            Storage::Heap(v) => UninitSlice::new(&mut v[writer..]),
            Storage::Shared(_) => UninitSlice::new(&mut []),
        }
    }
}
