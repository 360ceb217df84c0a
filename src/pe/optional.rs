//! Optional header of an image file.
//!
//! The layout after the first 24 bytes depends on the 16-bit magic value at its start: PE32 images
//! carry a `BaseOfData` field and 4-byte image base and stack/heap sizes, PE32+ images drop
//! `BaseOfData` and widen those fields to 8 bytes. [`OptionalHeader`] models this as one variant
//! per layout, so the fields that only exist in one of them cannot be read from the other.
//!
//! # Examples
//!
//! ```rust
//! use bottlescope::file::reader::Reader;
//! use bottlescope::pe::optional::{Magic, OptionalHeader};
//!
//! let mut data = vec![0u8; 0xF0];
//! data[0..2].copy_from_slice(&0x20B_u16.to_le_bytes());
//! data[24..32].copy_from_slice(&0x1_4000_0000_u64.to_le_bytes());
//!
//! let header = OptionalHeader::read(&mut Reader::new(&data, 0));
//! assert_eq!(header.magic(), Some(Magic::Pe32Plus));
//! assert_eq!(header.windows().map(|w| w.image_base), Some(0x1_4000_0000));
//! assert_eq!(header.base_of_data(), None);
//! ```

use strum::{Display, EnumIter, FromRepr};

use crate::file::reader::Reader;

/// Number of data directories defined by the format. Larger counts in a file are clamped.
pub const MAX_DATA_DIRECTORIES: usize = 16;

/// Optional header magic values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, Display)]
#[repr(u16)]
pub enum Magic {
    /// 32-bit image
    #[strum(serialize = "PE32")]
    Pe32 = 0x10B,
    /// 64-bit image
    #[strum(serialize = "PE32+")]
    Pe32Plus = 0x20B,
}

/// Index of a data directory entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, EnumIter, Display)]
#[repr(usize)]
#[allow(missing_docs)]
pub enum DataDirectoryType {
    ExportTable = 0,
    ImportTable = 1,
    ResourceTable = 2,
    ExceptionTable = 3,
    CertificateTable = 4,
    BaseRelocationTable = 5,
    Debug = 6,
    Architecture = 7,
    GlobalPtr = 8,
    TlsTable = 9,
    LoadConfigTable = 10,
    BoundImport = 11,
    ImportAddressTable = 12,
    DelayImportDescriptor = 13,
    ClrRuntimeHeader = 14,
    Reserved = 15,
}

/// An (RVA, size) pair of the data directory array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DataDirectory {
    /// Relative virtual address of the table
    pub virtual_address: u32,
    /// Size of the table in bytes
    pub size: u32,
}

impl DataDirectory {
    /// `true` if the entry does not point anywhere
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.virtual_address == 0 || self.size == 0
    }
}

/// Fields shared by every optional header layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[allow(missing_docs)]
pub struct StandardFields {
    pub magic: u16,
    pub major_linker_version: u8,
    pub minor_linker_version: u8,
    pub size_of_code: u32,
    pub size_of_initialized_data: u32,
    pub size_of_uninitialized_data: u32,
    pub address_of_entry_point: u32,
    pub base_of_code: u32,
}

/// Windows-specific fields, widened to the PE32+ sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[allow(missing_docs)]
pub struct WindowsFields {
    pub image_base: u64,
    pub section_alignment: u32,
    pub file_alignment: u32,
    pub major_operating_system_version: u16,
    pub minor_operating_system_version: u16,
    pub major_image_version: u16,
    pub minor_image_version: u16,
    pub major_subsystem_version: u16,
    pub minor_subsystem_version: u16,
    pub win32_version_value: u32,
    pub size_of_image: u32,
    pub size_of_headers: u32,
    pub check_sum: u32,
    pub subsystem: u16,
    pub dll_characteristics: u16,
    pub size_of_stack_reserve: u64,
    pub size_of_stack_commit: u64,
    pub size_of_heap_reserve: u64,
    pub size_of_heap_commit: u64,
    pub loader_flags: u32,
    pub number_of_rva_and_sizes: u32,
}

/// The optional header, one variant per layout
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OptionalHeader {
    /// PE32 layout
    Pe32 {
        /// Standard fields
        standard: StandardFields,
        /// RVA of the beginning of the data section
        base_of_data: u32,
        /// Windows-specific fields
        windows: WindowsFields,
        /// Data directories, at most [`MAX_DATA_DIRECTORIES`]
        data_directories: Vec<DataDirectory>,
    },
    /// PE32+ layout
    Pe32Plus {
        /// Standard fields
        standard: StandardFields,
        /// Windows-specific fields
        windows: WindowsFields,
        /// Data directories, at most [`MAX_DATA_DIRECTORIES`]
        data_directories: Vec<DataDirectory>,
    },
    /// Unrecognized magic; nothing past the standard fields can be interpreted
    Unknown {
        /// Standard fields, including the unrecognized magic
        standard: StandardFields,
    },
}

impl OptionalHeader {
    /// Reads the optional header at the reader's position.
    ///
    /// Fields past the end of the data are zero. A truncated header that still holds the magic
    /// keeps its layout variant.
    pub fn read(reader: &mut Reader<'_>) -> OptionalHeader {
        let standard = StandardFields {
            magic: reader.field(),
            major_linker_version: reader.field(),
            minor_linker_version: reader.field(),
            size_of_code: reader.field(),
            size_of_initialized_data: reader.field(),
            size_of_uninitialized_data: reader.field(),
            address_of_entry_point: reader.field(),
            base_of_code: reader.field(),
        };

        match Magic::from_repr(standard.magic) {
            Some(Magic::Pe32) => {
                let base_of_data = reader.field();
                let windows = read_windows_fields::<u32>(reader);
                let data_directories = read_data_directories(reader, &windows);
                OptionalHeader::Pe32 {
                    standard,
                    base_of_data,
                    windows,
                    data_directories,
                }
            }
            Some(Magic::Pe32Plus) => {
                let windows = read_windows_fields::<u64>(reader);
                let data_directories = read_data_directories(reader, &windows);
                OptionalHeader::Pe32Plus {
                    standard,
                    windows,
                    data_directories,
                }
            }
            None => OptionalHeader::Unknown { standard },
        }
    }

    /// The layout magic, `None` for an unrecognized value.
    #[must_use]
    pub fn magic(&self) -> Option<Magic> {
        Magic::from_repr(self.standard().magic)
    }

    /// The standard fields.
    #[must_use]
    pub fn standard(&self) -> &StandardFields {
        match self {
            OptionalHeader::Pe32 { standard, .. }
            | OptionalHeader::Pe32Plus { standard, .. }
            | OptionalHeader::Unknown { standard } => standard,
        }
    }

    /// The Windows-specific fields, `None` for an unknown layout.
    #[must_use]
    pub fn windows(&self) -> Option<&WindowsFields> {
        match self {
            OptionalHeader::Pe32 { windows, .. } | OptionalHeader::Pe32Plus { windows, .. } => {
                Some(windows)
            }
            OptionalHeader::Unknown { .. } => None,
        }
    }

    /// `BaseOfData`, present only in PE32 images.
    #[must_use]
    pub fn base_of_data(&self) -> Option<u32> {
        match self {
            OptionalHeader::Pe32 { base_of_data, .. } => Some(*base_of_data),
            _ => None,
        }
    }

    /// All data directory entries that were read.
    #[must_use]
    pub fn data_directories(&self) -> &[DataDirectory] {
        match self {
            OptionalHeader::Pe32 {
                data_directories, ..
            }
            | OptionalHeader::Pe32Plus {
                data_directories, ..
            } => data_directories,
            OptionalHeader::Unknown { .. } => &[],
        }
    }

    /// A single data directory entry, `None` if absent or empty.
    #[must_use]
    pub fn data_directory(&self, kind: DataDirectoryType) -> Option<DataDirectory> {
        self.data_directories()
            .get(kind as usize)
            .copied()
            .filter(|directory| !directory.is_empty())
    }
}

/// The stack and heap size fields are the only Windows fields whose width depends on the layout.
trait SizeField: Default + crate::file::io::PeIO + Into<u64> {}

impl SizeField for u32 {}
impl SizeField for u64 {}

fn read_windows_fields<S: SizeField>(reader: &mut Reader<'_>) -> WindowsFields {
    WindowsFields {
        image_base: reader.field::<S>().into(),
        section_alignment: reader.field(),
        file_alignment: reader.field(),
        major_operating_system_version: reader.field(),
        minor_operating_system_version: reader.field(),
        major_image_version: reader.field(),
        minor_image_version: reader.field(),
        major_subsystem_version: reader.field(),
        minor_subsystem_version: reader.field(),
        win32_version_value: reader.field(),
        size_of_image: reader.field(),
        size_of_headers: reader.field(),
        check_sum: reader.field(),
        subsystem: reader.field(),
        dll_characteristics: reader.field(),
        size_of_stack_reserve: reader.field::<S>().into(),
        size_of_stack_commit: reader.field::<S>().into(),
        size_of_heap_reserve: reader.field::<S>().into(),
        size_of_heap_commit: reader.field::<S>().into(),
        loader_flags: reader.field(),
        number_of_rva_and_sizes: reader.field(),
    }
}

fn read_data_directories(reader: &mut Reader<'_>, windows: &WindowsFields) -> Vec<DataDirectory> {
    let count = (windows.number_of_rva_and_sizes as usize).min(MAX_DATA_DIRECTORIES);
    (0..count)
        .map(|_| DataDirectory {
            virtual_address: reader.field(),
            size: reader.field(),
        })
        .collect()
}
