//! Endian-aware, bounds-checked integer extraction from byte slices.
//!
//! Everything bottlescope reads from a PE image or a Shell Link file is a fixed-width
//! little-endian integer, with a single exception: the `PE\0\0` signature, which is compared as
//! a big-endian `u32`. This module provides both directions on top of the [`PeIO`] trait.
//!
//! # Key Components
//!
//! - [`PeIO`] - Conversion trait implemented for all fixed-width integer types
//! - [`read_le`] / [`read_le_at`] - Little-endian reads, the latter advancing an offset
//! - [`read_be`] / [`read_be_at`] - Big-endian reads, the latter advancing an offset
//!
//! # Examples
//!
//! ```rust
//! use bottlescope::file::io::{read_be, read_le_at};
//!
//! let data = [0x50, 0x45, 0x00, 0x00, 0x4C, 0x01];
//! let signature: u32 = read_be(&data)?;
//! assert_eq!(signature, 0x5045_0000);
//!
//! let mut offset = 4;
//! let machine: u16 = read_le_at(&data, &mut offset)?;
//! assert_eq!(machine, 0x014C);
//! assert_eq!(offset, 6);
//! # Ok::<(), bottlescope::Error>(())
//! ```
//!
//! # Error Handling
//!
//! Every function returns [`crate::Error::OutOfBounds`] when the buffer does not hold enough
//! bytes for the requested type, including when `offset + size` would overflow `usize`.

use crate::{Error::OutOfBounds, Result};

/// Trait for types that can be decoded from a fixed number of bytes in either byte order.
///
/// The associated `Bytes` type is the exact-size array for the type (e.g. `[u8; 4]` for
/// `u32`), so a successful slice conversion guarantees the right length.
pub trait PeIO: Sized {
    /// Byte array type matching the size of `Self`
    type Bytes: Sized + for<'a> TryFrom<&'a [u8]>;

    /// Decode from little-endian bytes
    fn from_le_bytes(bytes: Self::Bytes) -> Self;
    /// Decode from big-endian bytes
    fn from_be_bytes(bytes: Self::Bytes) -> Self;
}

macro_rules! impl_pe_io {
    ($($ty:ty => $len:literal),+ $(,)?) => {
        $(
            impl PeIO for $ty {
                type Bytes = [u8; $len];

                fn from_le_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_le_bytes(bytes)
                }

                fn from_be_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_be_bytes(bytes)
                }
            }
        )+
    };
}

impl_pe_io! {
    u8 => 1,
    i8 => 1,
    u16 => 2,
    i16 => 2,
    u32 => 4,
    i32 => 4,
    u64 => 8,
    i64 => 8,
}

/// Returns the `size_of::<T>()` bytes starting at `offset`, or `OutOfBounds`.
fn window<T: PeIO>(data: &[u8], offset: usize) -> Result<T::Bytes> {
    let type_len = std::mem::size_of::<T>();
    let Some(end) = offset.checked_add(type_len) else {
        return Err(OutOfBounds);
    };
    if end > data.len() {
        return Err(OutOfBounds);
    }

    data[offset..end].try_into().map_err(|_| OutOfBounds)
}

/// Reads a little-endian `T` from the start of `data`.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if `data` is shorter than `T`.
pub fn read_le<T: PeIO>(data: &[u8]) -> Result<T> {
    let mut offset = 0_usize;
    read_le_at(data, &mut offset)
}

/// Reads a little-endian `T` at `offset` and advances `offset` past it.
///
/// On failure the offset is left untouched.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the read would extend past the end of `data`.
///
/// # Examples
///
/// ```rust
/// use bottlescope::file::io::read_le_at;
///
/// let data = [0x0B, 0x01, 0x0E, 0x00];
/// let mut offset = 0;
/// let magic: u16 = read_le_at(&data, &mut offset)?;
/// assert_eq!(magic, 0x10B);
/// assert_eq!(offset, 2);
///
/// let mut past_end = 3;
/// assert!(read_le_at::<u16>(&data, &mut past_end).is_err());
/// assert_eq!(past_end, 3);
/// # Ok::<(), bottlescope::Error>(())
/// ```
pub fn read_le_at<T: PeIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let bytes = window::<T>(data, *offset)?;
    *offset += std::mem::size_of::<T>();

    Ok(T::from_le_bytes(bytes))
}

/// Reads a big-endian `T` from the start of `data`.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if `data` is shorter than `T`.
pub fn read_be<T: PeIO>(data: &[u8]) -> Result<T> {
    let mut offset = 0_usize;
    read_be_at(data, &mut offset)
}

/// Reads a big-endian `T` at `offset` and advances `offset` past it.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the read would extend past the end of `data`.
pub fn read_be_at<T: PeIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let bytes = window::<T>(data, *offset)?;
    *offset += std::mem::size_of::<T>();

    Ok(T::from_be_bytes(bytes))
}
