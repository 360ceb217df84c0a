//! COFF file header.
//!
//! The 20-byte header that directly follows the `PE\0\0` signature. It names the target machine,
//! the number of section headers and the size of the optional header that sits between the two.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use bitflags::bitflags;
use strum::{Display, FromRepr};

use crate::file::reader::Reader;

/// Size of the COFF file header in bytes.
pub const COFF_HEADER_SIZE: usize = 20;

bitflags! {
    /// Image characteristics flags of the COFF header
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CoffCharacteristics: u16 {
        /// The file has no base relocations and must be loaded at its preferred base
        const RELOCS_STRIPPED = 0x0001;
        /// The image file is valid and can be run
        const EXECUTABLE_IMAGE = 0x0002;
        /// The application can handle addresses above 2 GB
        const LARGE_ADDRESS_AWARE = 0x0020;
        /// The machine is based on a 32-bit-word architecture
        const MACHINE_32BIT = 0x0100;
        /// Debugging information is removed from the image file
        const DEBUG_STRIPPED = 0x0200;
        /// The image file is a system file, not a user program
        const SYSTEM = 0x1000;
        /// The image file is a dynamic-link library
        const DLL = 0x2000;
    }
}

/// Machine types a Wine bottle is likely to contain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, Display)]
#[repr(u16)]
pub enum Machine {
    /// Intel 386 and compatible
    #[strum(serialize = "i386")]
    I386 = 0x014C,
    /// ARM Thumb-2 little endian
    #[strum(serialize = "armnt")]
    ArmNt = 0x01C4,
    /// x64
    #[strum(serialize = "amd64")]
    Amd64 = 0x8664,
    /// ARM64 little endian
    #[strum(serialize = "arm64")]
    Arm64 = 0xAA64,
}

/// COFF File Header (Object and Image)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CoffHeader {
    /// Raw machine type
    pub machine: u16,
    /// Number of entries in the section table
    pub number_of_sections: u16,
    /// Seconds since the Unix epoch at which the linker created the file
    pub time_date_stamp: u32,
    /// File offset of the COFF symbol table, zero for images
    pub pointer_to_symbol_table: u32,
    /// Number of entries in the symbol table
    pub number_of_symbols: u32,
    /// Size of the optional header, zero for object files
    pub size_of_optional_header: u16,
    /// Raw characteristics flags, see [`CoffHeader::flags`]
    pub characteristics: u16,
}

impl CoffHeader {
    /// Reads the header at the reader's position. Fields past the end of the data are zero.
    pub fn read(reader: &mut Reader<'_>) -> CoffHeader {
        CoffHeader {
            machine: reader.field(),
            number_of_sections: reader.field(),
            time_date_stamp: reader.field(),
            pointer_to_symbol_table: reader.field(),
            number_of_symbols: reader.field(),
            size_of_optional_header: reader.field(),
            characteristics: reader.field(),
        }
    }

    /// The machine type, if it is one of the known [`Machine`] values.
    #[must_use]
    pub fn machine_type(&self) -> Option<Machine> {
        Machine::from_repr(self.machine)
    }

    /// The characteristics as flags; unknown bits are dropped.
    #[must_use]
    pub fn flags(&self) -> CoffCharacteristics {
        CoffCharacteristics::from_bits_truncate(self.characteristics)
    }

    /// The link time stamp.
    #[must_use]
    pub fn timestamp(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(u64::from(self.time_date_stamp))
    }
}
