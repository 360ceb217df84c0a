//! Section table and RVA resolution.
//!
//! Each section header maps a range of relative virtual addresses onto a range of the file.
//! [`SectionTable::resolve_rva`] uses these mappings to turn the RVAs stored in resource entries
//! into file offsets.

use log::trace;

use crate::file::{reader::Reader, File};

/// Size of one section header in bytes.
pub const SECTION_HEADER_SIZE: usize = 40;

/// A section header
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Section {
    /// Section name with NUL padding removed, empty if not valid UTF-8
    pub name: String,
    /// Size of the section when loaded into memory
    pub virtual_size: u32,
    /// RVA of the first byte of the section when loaded
    pub virtual_address: u32,
    /// Size of the initialized data on disk
    pub size_of_raw_data: u32,
    /// File offset of the section data
    pub pointer_to_raw_data: u32,
    /// File offset of the relocation entries
    pub pointer_to_relocations: u32,
    /// File offset of the line-number entries
    pub pointer_to_linenumbers: u32,
    /// Number of relocation entries
    pub number_of_relocations: u16,
    /// Number of line-number entries
    pub number_of_linenumbers: u16,
    /// Section flags
    pub characteristics: u32,
}

impl Section {
    /// Reads a section header at the reader's position.
    ///
    /// Returns `None` if the record starts at or past the end of the data. A record that is cut
    /// off part way keeps whatever fields are present and zeroes the rest.
    pub fn read(reader: &mut Reader<'_>) -> Option<Section> {
        if reader.remaining() == 0 {
            return None;
        }

        let name_len = reader.remaining().min(8);
        let name = reader
            .read_bytes(name_len)
            .ok()
            .and_then(|raw| std::str::from_utf8(raw).ok())
            .map(|name| name.replace('\0', ""))
            .unwrap_or_default();
        reader.advance_by(8 - name_len);

        Some(Section {
            name,
            virtual_size: reader.field(),
            virtual_address: reader.field(),
            size_of_raw_data: reader.field(),
            pointer_to_raw_data: reader.field(),
            pointer_to_relocations: reader.field(),
            pointer_to_linenumbers: reader.field(),
            number_of_relocations: reader.field(),
            number_of_linenumbers: reader.field(),
            characteristics: reader.field(),
        })
    }

    /// `true` if `virtual_address <= rva < virtual_address + virtual_size`.
    #[must_use]
    pub fn contains_rva(&self, rva: u32) -> bool {
        let start = u64::from(self.virtual_address);
        let end = start + u64::from(self.virtual_size);
        (start..end).contains(&u64::from(rva))
    }
}

/// The ordered section headers of an image
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SectionTable {
    sections: Vec<Section>,
}

impl SectionTable {
    /// Reads up to `count` consecutive section headers starting at `offset`.
    ///
    /// Reading stops at the end of the file, so a bogus count in a short file does not produce
    /// thousands of empty sections.
    pub fn read(file: &File, offset: usize, count: u16) -> SectionTable {
        let mut reader = file.reader(offset);
        let mut sections = Vec::with_capacity(usize::from(count).min(96));

        for index in 0..count {
            reader.seek(offset.saturating_add(usize::from(index) * SECTION_HEADER_SIZE));
            match Section::read(&mut reader) {
                Some(section) => sections.push(section),
                None => {
                    trace!(
                        "SectionTable::read stopped at {index} of {count}, end of file at 0x{:x}",
                        file.len()
                    );
                    break;
                }
            }
        }

        SectionTable { sections }
    }

    /// Translates an RVA into a file offset.
    ///
    /// The first section (in table order) that contains `rva` wins. Returns `None` if no section
    /// contains it, which is normal for addresses that only exist once the image is loaded.
    #[must_use]
    pub fn resolve_rva(&self, rva: u32) -> Option<usize> {
        let section = self.sections.iter().find(|s| s.contains_rva(rva))?;
        let delta = (rva - section.virtual_address) as usize;
        (section.pointer_to_raw_data as usize).checked_add(delta)
    }

    /// The first section with the given name.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// Iterate over the sections in table order.
    pub fn iter(&self) -> std::slice::Iter<'_, Section> {
        self.sections.iter()
    }

    /// Number of sections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// `true` if the image has no sections.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

impl From<Vec<Section>> for SectionTable {
    fn from(sections: Vec<Section>) -> Self {
        SectionTable { sections }
    }
}

impl<'a> IntoIterator for &'a SectionTable {
    type Item = &'a Section;
    type IntoIter = std::slice::Iter<'a, Section>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::section_header;

    fn section(virtual_address: u32, virtual_size: u32, pointer_to_raw_data: u32) -> Section {
        Section {
            name: String::from(".rsrc"),
            virtual_address,
            virtual_size,
            pointer_to_raw_data,
            ..Section::default()
        }
    }

    #[test]
    fn resolve_rva_inside_section() {
        let table = SectionTable::from(vec![section(0x1000, 0x200, 0x400)]);

        assert_eq!(table.resolve_rva(0x1050), Some(0x450));
        assert_eq!(table.resolve_rva(0x1000), Some(0x400));
        assert_eq!(table.resolve_rva(0x11FF), Some(0x5FF));
    }

    #[test]
    fn resolve_rva_outside_sections() {
        let table = SectionTable::from(vec![section(0x1000, 0x200, 0x400)]);

        assert_eq!(table.resolve_rva(0x1200), None);
        assert_eq!(table.resolve_rva(0x2000), None);
        assert_eq!(table.resolve_rva(0x0FFF), None);
    }

    #[test]
    fn resolve_rva_first_section_wins() {
        let table = SectionTable::from(vec![
            section(0x1000, 0x1000, 0x400),
            section(0x1800, 0x1000, 0x2000),
        ]);

        assert_eq!(table.resolve_rva(0x1900), Some(0xD00));
        assert_eq!(table.resolve_rva(0x2100), Some(0x2900));
    }

    #[test]
    fn contains_rva_without_overflow() {
        let high = section(0xFFFF_F000, 0x2000, 0);
        assert!(high.contains_rva(u32::MAX));
        assert!(!high.contains_rva(0x10));
    }

    #[test]
    fn read_sections() {
        let mut data = section_header(".text", 0x1000, 0x800, 0x400);
        data.extend(section_header(".rsrc", 0x2000, 0x200, 0xC00));

        let file = File::from_mem(data);
        let table = SectionTable::read(&file, 0, 5);

        assert_eq!(table.len(), 2);
        assert_eq!(table.by_name(".rsrc").unwrap().pointer_to_raw_data, 0xC00);
        assert_eq!(
            table.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
            vec![".text", ".rsrc"]
        );
    }

    #[test]
    fn read_invalid_name() {
        let mut data = section_header(".text", 0x1000, 0x800, 0x400);
        data[1] = 0xFF;
        data[2] = 0xFE;

        let table = SectionTable::read(&File::from_mem(data), 0, 1);
        assert_eq!(table.len(), 1);
        assert_eq!(table.iter().next().unwrap().name, "");
        assert_eq!(table.iter().next().unwrap().virtual_address, 0x1000);
    }

    #[test]
    fn read_truncated_section() {
        let data = section_header(".rsrc", 0x2000, 0x200, 0xC00);
        let file = File::from_mem(data[..14].to_vec());
        let table = SectionTable::read(&file, 0, 1);

        let section = table.iter().next().unwrap();
        assert_eq!(section.name, ".rsrc");
        assert_eq!(section.virtual_size, 0x200);
        assert_eq!(section.virtual_address, 0);
    }
}
