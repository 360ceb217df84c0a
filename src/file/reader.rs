//! Sequential cursor over a byte slice.
//!
//! [`Reader`] walks the fixed-layout records of PE and Shell Link files field by field. It offers
//! two flavours of every integer read:
//!
//! - [`Reader::read_le`] / [`Reader::read_be`] return a [`crate::Result`] and only advance on
//!   success, for reads where the caller must know that the data was there (signatures, record
//!   counts that gate further parsing).
//! - [`Reader::field`] never fails: a read past the end of the data yields the type's zero value
//!   and the cursor still moves by the width of the field. This is how a truncated header
//!   degrades into zeroed fields instead of an error.
//!
//! # Examples
//!
//! ```rust
//! use bottlescope::file::reader::Reader;
//!
//! // A COFF header cut off after the section count
//! let data = [0x4C, 0x01, 0x03, 0x00];
//! let mut reader = Reader::new(&data, 0);
//!
//! let machine: u16 = reader.field();
//! let sections: u16 = reader.field();
//! let timestamp: u32 = reader.field();
//!
//! assert_eq!(machine, 0x014C);
//! assert_eq!(sections, 3);
//! assert_eq!(timestamp, 0);
//! assert_eq!(reader.pos(), 8);
//! ```

use widestring::U16Str;

use crate::{
    file::io::{read_be_at, read_le_at, PeIO},
    Error::OutOfBounds,
    Result,
};

/// A bounds-checked cursor over a byte slice.
///
/// The position may be moved anywhere, including past the end of the data; reads from such a
/// position fail (or degrade to zero for [`Reader::field`]) instead of panicking.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> Reader<'a> {
    /// Create a new `Reader` over `data`, positioned at `position`.
    #[must_use]
    pub fn new(data: &'a [u8], position: usize) -> Self {
        Reader { data, position }
    }

    /// Returns the length of the underlying data.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the underlying data is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the current position.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.position
    }

    /// Returns the number of bytes between the position and the end of the data.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Moves the cursor to an absolute position.
    pub fn seek(&mut self, pos: usize) {
        self.position = pos;
    }

    /// Moves the cursor forward by `step` bytes.
    pub fn advance_by(&mut self, step: usize) {
        self.position = self.position.saturating_add(step);
    }

    /// Read a little-endian `T` and advance past it.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `T` does not fit in the remaining data. The
    /// position is left unchanged in that case.
    pub fn read_le<T: PeIO>(&mut self) -> Result<T> {
        read_le_at::<T>(self.data, &mut self.position)
    }

    /// Read a big-endian `T` and advance past it.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `T` does not fit in the remaining data.
    pub fn read_be<T: PeIO>(&mut self) -> Result<T> {
        read_be_at::<T>(self.data, &mut self.position)
    }

    /// Peek at a little-endian `T` without advancing.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `T` does not fit in the remaining data.
    pub fn peek_le<T: PeIO>(&self) -> Result<T> {
        let mut position = self.position;
        read_le_at::<T>(self.data, &mut position)
    }

    /// Read a little-endian `T`, or `T::default()` if it is not fully contained in the data.
    ///
    /// The position always advances by `size_of::<T>()` so that subsequent fields of the same
    /// record keep their layout offsets.
    pub fn field<T: PeIO + Default>(&mut self) -> T {
        let value = self.peek_le::<T>().unwrap_or_default();
        self.advance_by(std::mem::size_of::<T>());
        value
    }

    /// Read `length` raw bytes and advance past them.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if fewer than `length` bytes remain.
    pub fn read_bytes(&mut self, length: usize) -> Result<&'a [u8]> {
        let Some(end) = self.position.checked_add(length) else {
            return Err(OutOfBounds);
        };
        if end > self.data.len() {
            return Err(OutOfBounds);
        }

        let bytes = &self.data[self.position..end];
        self.position = end;
        Ok(bytes)
    }

    /// Execute `f`, restoring the position if it fails.
    ///
    /// # Errors
    /// Returns whatever error `f` returns.
    pub fn transactional<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        let saved_position = self.position;
        let result = f(self);
        if result.is_err() {
            self.position = saved_position;
        }
        result
    }

    /// Read bytes up to (excluding) the next NUL and advance past the terminator.
    ///
    /// Data that ends without a terminator yields everything up to the end.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the position is at or past the end of the data.
    pub fn read_bytes_nul(&mut self) -> Result<&'a [u8]> {
        if self.position >= self.data.len() {
            return Err(OutOfBounds);
        }

        let rest = &self.data[self.position..];
        match rest.iter().position(|&b| b == 0) {
            Some(end) => {
                self.position += end + 1;
                Ok(&rest[..end])
            }
            None => {
                self.position = self.data.len();
                Ok(rest)
            }
        }
    }

    /// Read a NUL-terminated UTF-16LE string and advance past the terminator.
    ///
    /// Unpaired surrogates are replaced with U+FFFD. Data that ends without a terminator (or
    /// with a dangling odd byte) yields the complete code units read so far.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if not even one code unit can be read.
    pub fn read_utf16_nul(&mut self) -> Result<String> {
        let first = self.read_le::<u16>()?;
        let mut units = Vec::new();
        let mut unit = first;
        while unit != 0 {
            units.push(unit);
            match self.read_le::<u16>() {
                Ok(next) => unit = next,
                Err(_) => break,
            }
        }

        Ok(U16Str::from_slice(&units).to_string_lossy())
    }

    /// Read `count` UTF-16LE code units and advance past them.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if fewer than `count * 2` bytes remain.
    pub fn read_utf16(&mut self, count: usize) -> Result<String> {
        let Some(byte_len) = count.checked_mul(2) else {
            return Err(OutOfBounds);
        };
        let bytes = self.read_bytes(byte_len)?;
        let units: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();

        Ok(U16Str::from_slice(&units).to_string_lossy())
    }

    /// Read a UTF-16LE string prefixed by its length in code units as a little-endian `u16`.
    ///
    /// This is the layout of resource directory names and of Shell Link `StringData` entries.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the prefix or the string do not fit.
    pub fn read_prefixed_utf16(&mut self) -> Result<String> {
        self.transactional(|reader| {
            let count = reader.read_le::<u16>()?;
            reader.read_utf16(count as usize)
        })
    }
}
