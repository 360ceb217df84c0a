use std::fmt;

use log::debug;

use crate::{
    bitmap::{self, IconImage},
    config::ParseOptions,
    file::File,
    pe::section::SectionTable,
    resources::ResourceType,
    Result,
};

/// Size of a resource data entry record in bytes.
pub const DATA_ENTRY_SIZE: usize = 16;

/// Identifier of a resource directory entry: a 16-bit integer or a UTF-16 name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceId {
    /// Numeric id; at the root level this is the resource type
    Id(u16),
    /// Name read from the resource string area
    Name(String),
}

impl ResourceId {
    /// The well known resource type this id stands for, if any.
    #[must_use]
    pub fn resource_type(&self) -> Option<ResourceType> {
        match self {
            ResourceId::Id(id) => ResourceType::from_repr(*id),
            ResourceId::Name(_) => None,
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceId::Id(id) => write!(f, "#{id}"),
            ResourceId::Name(name) => f.write_str(name),
        }
    }
}

/// A resource directory table, one node of the [`crate::resources::ResourceTree`] arena.
///
/// Children are referenced by their index in the arena; see
/// [`crate::resources::ResourceTree::subtables`] and
/// [`crate::resources::ResourceTree::entries`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDirectoryTable {
    /// Resource flags, reserved
    pub characteristics: u32,
    /// Time the resource data was created by the resource compiler
    pub time_date_stamp: u32,
    /// Major version number
    pub major_version: u16,
    /// Minor version number
    pub minor_version: u16,
    /// Number of entries that use strings as identifiers
    pub number_of_named_entries: u16,
    /// Number of entries that use numeric identifiers
    pub number_of_id_entries: u16,
    /// File offset of the table
    pub offset: usize,
    /// Distance from the root table, which is at depth 0
    pub depth: usize,
    /// Id of the directory entry that points to this table, `None` for the root
    pub id: Option<ResourceId>,
    pub(crate) subtables: Vec<usize>,
    pub(crate) entries: Vec<usize>,
}

impl ResourceDirectoryTable {
    /// Number of directory entries declared by the table header.
    #[must_use]
    pub fn declared_entries(&self) -> usize {
        usize::from(self.number_of_named_entries) + usize::from(self.number_of_id_entries)
    }
}

/// A leaf of the resource tree, describing one unit of raw resource data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDataEntry {
    /// RVA of the resource data
    pub data_rva: u32,
    /// Size of the resource data in bytes
    pub size: u32,
    /// Code page used to decode code point values within the data
    pub code_page: u32,
    /// Reserved, always zero for entries kept in the tree
    pub reserved: u32,
    /// Id of the directory entry that referenced this record
    pub id: ResourceId,
    /// Id of the root-level entry this record descends from (the resource type)
    pub type_id: Option<ResourceId>,
    /// File offset of this record
    pub offset: usize,
}

impl ResourceDataEntry {
    /// Parses the 16-byte record at `offset`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the record does not fit in the file, or
    /// [`crate::Error::Malformed`] if its reserved field is not zero.
    pub fn read(
        file: &File,
        offset: usize,
        id: ResourceId,
        type_id: Option<ResourceId>,
    ) -> Result<ResourceDataEntry> {
        let mut reader = file.reader(offset);
        let data_rva = reader.read_le::<u32>()?;
        let size = reader.read_le::<u32>()?;
        let code_page = reader.read_le::<u32>()?;
        let reserved = reader.read_le::<u32>()?;

        if reserved != 0 {
            return Err(malformed_error!(
                "Resource data entry at 0x{:x} has reserved value 0x{:x}",
                offset,
                reserved
            ));
        }

        Ok(ResourceDataEntry {
            data_rva,
            size,
            code_page,
            reserved,
            id,
            type_id,
            offset,
        })
    }

    /// The resource type this entry belongs to, if it is a well known one.
    #[must_use]
    pub fn resource_type(&self) -> Option<ResourceType> {
        self.type_id.as_ref().and_then(ResourceId::resource_type)
    }

    /// File offset of the resource data, `None` if no section maps its RVA.
    #[must_use]
    pub fn resolve(&self, sections: &SectionTable) -> Option<usize> {
        sections.resolve_rva(self.data_rva)
    }

    /// The raw resource data, `None` if it cannot be located within the file.
    #[must_use]
    pub fn data<'a>(&self, file: &'a File, sections: &SectionTable) -> Option<&'a [u8]> {
        let offset = self.resolve(sections)?;
        file.data_slice(offset, self.size as usize).ok()
    }

    /// Decodes the entry as an `RT_ICON` image (DIB or PNG).
    ///
    /// Returns `None` for unresolvable RVAs and for any payload the bitmap decoder rejects.
    #[must_use]
    pub fn decode_icon(
        &self,
        file: &File,
        sections: &SectionTable,
        options: &ParseOptions,
    ) -> Option<IconImage> {
        let Some(offset) = self.resolve(sections) else {
            debug!(
                "Icon {} at RVA 0x{:x} is not mapped by any section",
                self.id, self.data_rva
            );
            return None;
        };

        bitmap::decode_icon(file, offset, self.size as usize, options)
    }
}
