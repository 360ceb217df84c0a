//! Memory-mapped file backend.
//!
//! [`Physical`] maps an executable or shortcut from disk into the address space with `memmap2`
//! instead of reading it into a buffer. Installed programs in a bottle are often hundreds of
//! megabytes large while only the headers and the `.rsrc` section are ever touched, so only the
//! pages that the parsers actually visit get loaded.
//!
//! # Examples
//!
//! ```rust,no_run
//! use bottlescope::file::{Backend, Physical};
//!
//! let physical = Physical::new("drive_c/windows/notepad.exe")?;
//! let dos_magic = physical.data_slice(0, 2)?;
//! assert_eq!(dos_magic, b"MZ");
//! # Ok::<(), bottlescope::Error>(())
//! ```

use std::{fs, path::Path};

use memmap2::Mmap;

use super::Backend;
use crate::{
    Error::{Error, FileError, OutOfBounds},
    Result,
};

/// Input file backed by a read-only memory map
#[derive(Debug)]
pub struct Physical(Mmap);

impl Physical {
    /// Opens `path` and maps it into memory.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be opened or
    /// [`crate::Error::Error`] if memory mapping fails.
    pub fn new(path: impl AsRef<Path>) -> Result<Physical> {
        let file = fs::File::open(path).map_err(FileError)?;

        // Read-only map, no slice handed out outlives `self`
        let map = unsafe { Mmap::map(&file) }.map_err(|error| Error(error.to_string()))?;
        Ok(Physical(map))
    }
}

impl Backend for Physical {
    fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        let end = offset.checked_add(len).ok_or(OutOfBounds)?;
        self.0.get(offset..end).ok_or(OutOfBounds)
    }

    fn data(&self) -> &[u8] {
        &self.0
    }

    fn len(&self) -> usize {
        self.0.len()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn physical() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"MZ\x90\x00\x03\x00\x00\x00").unwrap();
        file.flush().unwrap();

        let physical = Physical::new(file.path()).unwrap();

        assert_eq!(physical.len(), 8);
        assert_eq!(physical.data()[0], b'M');
        assert_eq!(physical.data_slice(0, 2).unwrap(), b"MZ");
        assert!(physical.data_slice(4, 8).is_err());
        assert!(physical.data_slice(usize::MAX, 1).is_err());
    }

    #[test]
    fn physical_invalid_file_path() {
        let result = Physical::new("/nonexistent/drive_c/Program Files/game.exe");
        match result {
            Err(FileError(io_error)) => {
                assert_eq!(io_error.kind(), std::io::ErrorKind::NotFound);
            }
            _ => panic!("Expected FileError"),
        }
    }

    #[test]
    fn physical_empty_file() {
        let file = tempfile::NamedTempFile::new().unwrap();

        let physical = Physical::new(file.path()).unwrap();
        assert_eq!(physical.len(), 0);
        assert!(physical.data_slice(0, 1).is_err());
        let empty_slice: &[u8] = &[];
        assert_eq!(physical.data_slice(0, 0).unwrap(), empty_slice);
    }
}
