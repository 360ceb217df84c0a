//! Random-access byte source shared by every parser in the crate.
//!
//! Both the PE parser and the Shell Link parser read their input through [`File`], a thin owner
//! of a [`Backend`]. Files on disk are memory-mapped ([`physical::Physical`]), buffers handed in
//! by the caller are kept as they are ([`memory::Memory`]); the parsing code above this layer is
//! identical for both.
//!
//! # Key Components
//!
//! - [`File`] - Owns the data source and the path it was loaded from
//! - [`Backend`] - Trait for data sources (disk files, memory buffers)
//! - [`io`] - Endian-aware integer decoding on byte slices
//! - [`reader::Reader`] - Sequential cursor with explicit degrade-to-zero reads
//!
//! # Bounds checking
//!
//! Every access goes through [`Backend::data_slice`], which validates `offset + len` against the
//! data length (including overflow of the addition). Offsets in PE and LNK files come straight
//! from untrusted bytes, so no code above this layer indexes the raw slice directly.
//!
//! # Examples
//!
//! ```rust
//! use bottlescope::File;
//!
//! let mut data = vec![0u8; 0x84];
//! data[0x3C..0x40].copy_from_slice(&0x80_u32.to_le_bytes());
//! data[0x80..0x84].copy_from_slice(b"PE\0\0");
//!
//! let file = File::from_mem(data);
//! let pe_offset: u32 = file.read_le_at(0x3C)?;
//! let signature: u32 = file.read_be_at(pe_offset as usize)?;
//! assert_eq!(signature, 0x5045_0000);
//! # Ok::<(), bottlescope::Error>(())
//! ```

pub mod io;
pub mod memory;
pub mod physical;
pub mod reader;

use std::path::{Path, PathBuf};

use crate::Result;
use io::PeIO;
pub use memory::Memory;
pub use physical::Physical;
use reader::Reader;

/// Backend trait for file data sources.
///
/// This trait abstracts over the source of the bytes, allowing for both in-memory and on-disk
/// representations. All implementations must be thread-safe, batch scans hand files to
/// `rayon` worker threads.
pub trait Backend: Send + Sync {
    /// Returns a slice of the data at the given offset and length.
    ///
    /// # Arguments
    ///
    /// * `offset` - The starting offset within the data.
    /// * `len` - The length of the slice in bytes.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OutOfBounds`] if the requested range is out of bounds.
    fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]>;

    /// Returns the entire data buffer.
    fn data(&self) -> &[u8];

    /// Returns the total length of the data buffer.
    fn len(&self) -> usize;
}

/// A loaded input file, either memory-mapped from disk or owned in memory.
///
/// `File` owns nothing but its data source and, when loaded from disk, the path it came from.
/// It carries no parsing state: [`crate::PeFile`] and [`crate::ShellLink`] build on top of it.
pub struct File {
    data: Box<dyn Backend>,
    path: Option<PathBuf>,
}

impl File {
    /// Opens and memory-maps the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::FileError`] if the file cannot be opened or
    /// [`crate::Error::Error`] if it cannot be mapped.
    pub fn from_file(path: &Path) -> Result<File> {
        let input = Physical::new(path)?;

        Ok(Self::load(input, Some(path.to_path_buf())))
    }

    /// Wraps a byte buffer.
    ///
    /// An empty buffer is accepted; every read from it reports
    /// [`crate::Error::OutOfBounds`].
    #[must_use]
    pub fn from_mem(data: Vec<u8>) -> File {
        Self::load(Memory::new(data), None)
    }

    fn load<T: Backend + 'static>(data: T, path: Option<PathBuf>) -> File {
        File {
            data: Box::new(data),
            path,
        }
    }

    /// Returns the total size of the loaded file in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the file has a length of zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the path this file was loaded from, `None` for in-memory buffers.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns the complete file content.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        self.data.data()
    }

    /// Returns `len` bytes starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OutOfBounds`] if the range does not lie within the file.
    pub fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        self.data.data_slice(offset, len)
    }

    /// Reads a little-endian `T` at an absolute file offset.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OutOfBounds`] if `T` does not fit between `offset` and the end
    /// of the file.
    pub fn read_le_at<T: PeIO>(&self, offset: usize) -> Result<T> {
        let bytes = self.data_slice(offset, std::mem::size_of::<T>())?;
        io::read_le(bytes)
    }

    /// Reads a big-endian `T` at an absolute file offset.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OutOfBounds`] if `T` does not fit between `offset` and the end
    /// of the file.
    pub fn read_be_at<T: PeIO>(&self, offset: usize) -> Result<T> {
        let bytes = self.data_slice(offset, std::mem::size_of::<T>())?;
        io::read_be(bytes)
    }

    /// Creates a sequential [`Reader`] positioned at `offset`.
    #[must_use]
    pub fn reader(&self, offset: usize) -> Reader<'_> {
        Reader::new(self.data(), offset)
    }
}

impl std::fmt::Debug for File {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("File")
            .field("len", &self.len())
            .field("path", &self.path)
            .finish()
    }
}
