//! Portable Executable image parsing.
//!
//! [`PeFile`] reads the handful of structures needed to classify an executable and pull its icon
//! out of the resource section: the `PE\0\0` signature, the COFF header, the optional header and
//! the section table. Everything else in the image is left untouched.
//!
//! # Layout
//!
//! ```text
//! 0x00        DOS header, e_lfanew (u32) at 0x3C
//! e_lfanew    "PE\0\0"
//! +4          COFF header (20 bytes)
//! +24         optional header (SizeOfOptionalHeader bytes, may be 0)
//! +24+size    section table (40 bytes per section)
//! ```
//!
//! # Error policy
//!
//! Only a missing signature (or an unreadable file) fails the parse. Truncated headers yield zeroed
//! fields, sections past the end of the file are dropped, and resource or icon problems are logged
//! and turn into missing data.
//!
//! # Examples
//!
//! ```rust,no_run
//! use bottlescope::PeFile;
//!
//! let pe = PeFile::from_file("drive_c/Program Files/Game/game.exe")?;
//! println!("{} image with {} sections", pe.architecture(), pe.sections().len());
//!
//! if let Some(icon) = pe.best_icon() {
//!     println!("icon {}x{} ({})", icon.width(), icon.height(), icon.source());
//! }
//! # Ok::<(), bottlescope::Error>(())
//! ```

pub mod coff;
pub mod optional;
pub mod section;

use std::path::Path;

use log::{debug, trace};
use strum::Display;

use crate::{
    bitmap::IconImage,
    config::ParseOptions,
    file::File,
    icon::select_best_icon,
    resources::{ResourceTree, ResourceType},
    Error::InvalidFormat,
    Result,
};
use coff::{CoffHeader, COFF_HEADER_SIZE};
use optional::{DataDirectoryType, Magic, OptionalHeader};
use section::SectionTable;

/// Offset of the `e_lfanew` field in the DOS header.
pub const PE_POINTER_OFFSET: usize = 0x3C;

/// `PE\0\0` read as a big-endian `u32`.
pub const PE_SIGNATURE: u32 = 0x5045_0000;

/// Word size of an image, derived from the optional header magic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Architecture {
    /// PE32 image
    #[strum(serialize = "32-bit")]
    Bit32,
    /// PE32+ image
    #[strum(serialize = "64-bit")]
    Bit64,
    /// Missing optional header or unrecognized magic
    #[strum(serialize = "unknown")]
    Unknown,
}

/// A parsed PE image.
///
/// Owns its data source and the headers read from it. The resource tree and the icons are decoded
/// on demand.
#[derive(Debug)]
pub struct PeFile {
    file: File,
    coff: CoffHeader,
    optional: Option<OptionalHeader>,
    sections: SectionTable,
    options: ParseOptions,
}

impl PeFile {
    /// Parses the image at `path` with the default [`ParseOptions`].
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] or [`crate::Error::Error`] if the file cannot be
    /// opened or mapped, and [`crate::Error::InvalidFormat`] if it has no PE signature.
    pub fn from_file(path: impl AsRef<Path>) -> Result<PeFile> {
        Self::from_file_with_options(path, ParseOptions::default())
    }

    /// Parses the image at `path`.
    ///
    /// # Errors
    /// See [`PeFile::from_file`].
    pub fn from_file_with_options(path: impl AsRef<Path>, options: ParseOptions) -> Result<PeFile> {
        Self::parse(File::from_file(path.as_ref())?, options)
    }

    /// Parses an image held in memory with the default [`ParseOptions`].
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidFormat`] if the buffer has no PE signature.
    pub fn from_mem(data: Vec<u8>) -> Result<PeFile> {
        Self::from_mem_with_options(data, ParseOptions::default())
    }

    /// Parses an image held in memory.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidFormat`] if the buffer has no PE signature.
    pub fn from_mem_with_options(data: Vec<u8>, options: ParseOptions) -> Result<PeFile> {
        Self::parse(File::from_mem(data), options)
    }

    /// Parses the headers of an already loaded [`File`].
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidFormat`] if the file has no PE signature.
    pub fn parse(file: File, options: ParseOptions) -> Result<PeFile> {
        let pe_offset = file
            .read_le_at::<u32>(PE_POINTER_OFFSET)
            .map_err(|_| InvalidFormat("file too small for a DOS header".to_string()))?
            as usize;

        match file.read_be_at::<u32>(pe_offset) {
            Ok(PE_SIGNATURE) => {}
            Ok(signature) => {
                return Err(InvalidFormat(format!(
                    "expected PE signature at 0x{pe_offset:x}, found 0x{signature:08x}"
                )))
            }
            Err(_) => {
                return Err(InvalidFormat(format!(
                    "PE signature offset 0x{pe_offset:x} is past the end of the file"
                )))
            }
        }

        let optional_offset = pe_offset + 4 + COFF_HEADER_SIZE;
        let coff = CoffHeader::read(&mut file.reader(pe_offset + 4));
        let optional = (coff.size_of_optional_header > 0)
            .then(|| OptionalHeader::read(&mut file.reader(optional_offset)));

        let sections_offset = optional_offset + usize::from(coff.size_of_optional_header);
        let sections = SectionTable::read(&file, sections_offset, coff.number_of_sections);
        trace!(
            "PE header at 0x{pe_offset:x}: machine 0x{:04x}, {} of {} sections read",
            coff.machine,
            sections.len(),
            coff.number_of_sections
        );

        Ok(PeFile {
            file,
            coff,
            optional,
            sections,
            options,
        })
    }

    /// The image word size.
    #[must_use]
    pub fn architecture(&self) -> Architecture {
        match self.optional.as_ref().and_then(OptionalHeader::magic) {
            Some(Magic::Pe32) => Architecture::Bit32,
            Some(Magic::Pe32Plus) => Architecture::Bit64,
            None => Architecture::Unknown,
        }
    }

    /// The COFF file header.
    #[must_use]
    pub fn coff_header(&self) -> &CoffHeader {
        &self.coff
    }

    /// The optional header, `None` if `SizeOfOptionalHeader` is zero.
    #[must_use]
    pub fn optional_header(&self) -> Option<&OptionalHeader> {
        self.optional.as_ref()
    }

    /// The section table.
    #[must_use]
    pub fn sections(&self) -> &SectionTable {
        &self.sections
    }

    /// The options the image was parsed with.
    #[must_use]
    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// The path the image was loaded from, `None` for in-memory images.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.file.path()
    }

    /// The underlying data source.
    #[must_use]
    pub fn file(&self) -> &File {
        &self.file
    }

    /// File offset of the resource section.
    ///
    /// The raw data of a section named `.rsrc` if there is one, otherwise the resource table
    /// data directory translated through the section table.
    #[must_use]
    pub fn resource_base(&self) -> Option<usize> {
        if let Some(section) = self.sections.by_name(".rsrc") {
            return Some(section.pointer_to_raw_data as usize);
        }

        let directory = self
            .optional
            .as_ref()?
            .data_directory(DataDirectoryType::ResourceTable)?;
        let base = self.sections.resolve_rva(directory.virtual_address);
        if base.is_none() {
            debug!(
                "Resource directory RVA 0x{:x} is not mapped by any section",
                directory.virtual_address
            );
        }
        base
    }

    /// Walks the resource tree, expanding only the root types in `filter` (all if `None`).
    ///
    /// Returns `None` if the image has no resource section.
    #[must_use]
    pub fn resources(&self, filter: Option<&[ResourceType]>) -> Option<ResourceTree> {
        let base = self.resource_base()?;
        Some(ResourceTree::parse(&self.file, base, filter, &self.options))
    }

    /// Every `RT_ICON` resource that decodes to an image, in resource tree order.
    #[must_use]
    pub fn icons(&self) -> Vec<IconImage> {
        let Some(tree) = self.resources(Some(&[ResourceType::Icon])) else {
            return Vec::new();
        };

        tree.all_entries()
            .into_iter()
            .filter_map(|entry| entry.decode_icon(&self.file, &self.sections, &self.options))
            .collect()
    }

    /// The tallest decodable icon, see [`select_best_icon`].
    #[must_use]
    pub fn best_icon(&self) -> Option<IconImage> {
        select_best_icon(self.icons())
    }
}
