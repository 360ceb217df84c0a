//! In-memory file backend.

use super::Backend;
use crate::{Error::OutOfBounds, Result};

/// Owned byte buffer, used for files handed in with [`crate::File::from_mem`]
#[derive(Debug)]
pub struct Memory(Vec<u8>);

impl Memory {
    /// Takes ownership of `data`.
    pub fn new(data: Vec<u8>) -> Memory {
        Memory(data)
    }
}

impl Backend for Memory {
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
    use super::*;

    #[test]
    fn memory_slices() {
        let mut data = vec![0u8; 0x100];
        data[0x3C..0x40].copy_from_slice(&0x80_u32.to_le_bytes());
        data[0x80..0x84].copy_from_slice(b"PE\0\0");

        let memory = Memory::new(data);

        assert_eq!(memory.len(), 0x100);
        assert_eq!(memory.data()[0x3C], 0x80);
        assert_eq!(memory.data_slice(0x80, 4).unwrap(), b"PE\0\0");
        assert!(memory.data_slice(0xFE, 4).is_err());
        assert!(memory
            .data_slice(u32::MAX as usize, u32::MAX as usize)
            .is_err());
    }

    #[test]
    fn memory_empty_buffer() {
        let memory = Memory::new(vec![]);

        assert_eq!(memory.len(), 0);
        assert!(memory.data_slice(0, 1).is_err());
        assert!(memory.data_slice(1, 0).is_err());
        let empty_slice: &[u8] = &[];
        assert_eq!(memory.data_slice(0, 0).unwrap(), empty_slice);
    }

    #[test]
    fn memory_offset_overflow() {
        let memory = Memory::new(vec![0x00; 100]);

        assert!(matches!(memory.data_slice(usize::MAX, 1), Err(OutOfBounds)));
        assert!(matches!(memory.data_slice(100, 1), Err(OutOfBounds)));
        assert!(matches!(memory.data_slice(99, 2), Err(OutOfBounds)));
        assert_eq!(memory.data_slice(99, 1).unwrap(), &[0x00]);
    }
}
