//! Byte builders for synthetic PE, DIB and Shell Link files
//!
//! The parsers only ever look at a handful of structures, so the tests construct minimal files
//! from scratch instead of shipping binary samples.

/// RVA at which [`PeBuilder`] maps its resource section
pub const RSRC_RVA: u32 = 0x2000;
/// File offset at which [`PeBuilder`] places its resource section
pub const RSRC_RAW: u32 = 0x200;

/// The class id every Shell Link file carries
pub const LINK_CLSID: [u8; 16] = [
    0x01, 0x14, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x46,
];

fn put_u16(data: &mut [u8], offset: usize, value: u16) {
    data[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

fn put_u32(data: &mut [u8], offset: usize, value: u32) {
    data[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

/// A 40-byte section header
pub fn section_header(
    name: &str,
    virtual_address: u32,
    virtual_size: u32,
    pointer_to_raw_data: u32,
) -> Vec<u8> {
    let mut data = vec![0u8; 40];
    let name = name.as_bytes();
    data[..name.len().min(8)].copy_from_slice(&name[..name.len().min(8)]);
    put_u32(&mut data, 8, virtual_size);
    put_u32(&mut data, 12, virtual_address);
    put_u32(&mut data, 16, virtual_size);
    put_u32(&mut data, 20, pointer_to_raw_data);
    put_u32(&mut data, 36, 0x4000_0040);
    data
}

/// Key of a resource directory entry
pub enum ResourceKey {
    Id(u16),
    Name(&'static str),
}

/// A node of a resource tree handed to [`ResourceBuilder`]
pub enum ResourceNode {
    Directory(Vec<(ResourceKey, ResourceNode)>),
    Leaf(Vec<u8>),
    /// A data entry with a non-zero reserved field and no payload
    ReservedLeaf(u32),
}

/// Serializes a [`ResourceNode`] tree into the bytes of a `.rsrc` section
pub struct ResourceBuilder {
    rva: u32,
}

impl ResourceBuilder {
    pub fn new() -> Self {
        ResourceBuilder { rva: RSRC_RVA }
    }

    pub fn with_rva(mut self, rva: u32) -> Self {
        self.rva = rva;
        self
    }

    pub fn build(&self, root: &ResourceNode) -> Vec<u8> {
        let mut out = Vec::new();
        match root {
            ResourceNode::Directory(entries) => {
                self.write_directory(&mut out, entries);
            }
            _ => panic!("resource root must be a directory"),
        }
        out
    }

    /// The usual icon layout: `Icon -> id n -> 0x409 -> payload`
    pub fn icons(&self, payloads: Vec<Vec<u8>>) -> Vec<u8> {
        let names = payloads
            .into_iter()
            .enumerate()
            .map(|(index, payload)| {
                (
                    ResourceKey::Id(index as u16 + 1),
                    ResourceNode::Directory(vec![(
                        ResourceKey::Id(0x409),
                        ResourceNode::Leaf(payload),
                    )]),
                )
            })
            .collect();

        self.build(&ResourceNode::Directory(vec![(
            ResourceKey::Id(3),
            ResourceNode::Directory(names),
        )]))
    }

    fn write_directory(&self, out: &mut Vec<u8>, entries: &[(ResourceKey, ResourceNode)]) -> u32 {
        let table = out.len();
        let named = entries
            .iter()
            .filter(|(key, _)| matches!(key, ResourceKey::Name(_)))
            .count();

        out.resize(table + 16 + entries.len() * 8, 0);
        put_u16(out, table + 12, named as u16);
        put_u16(out, table + 14, (entries.len() - named) as u16);

        for (index, (key, node)) in entries.iter().enumerate() {
            let name_field = match key {
                ResourceKey::Id(id) => u32::from(*id),
                ResourceKey::Name(name) => {
                    let offset = out.len() as u32;
                    let units: Vec<u16> = name.encode_utf16().collect();
                    out.extend_from_slice(&(units.len() as u16).to_le_bytes());
                    for unit in units {
                        out.extend_from_slice(&unit.to_le_bytes());
                    }
                    0x8000_0000 | offset
                }
            };

            let offset_field = match node {
                ResourceNode::Directory(children) => {
                    0x8000_0000 | self.write_directory(out, children)
                }
                ResourceNode::Leaf(payload) => self.write_leaf(out, payload, 0),
                ResourceNode::ReservedLeaf(reserved) => self.write_leaf(out, &[], *reserved),
            };

            let entry = table + 16 + index * 8;
            put_u32(out, entry, name_field);
            put_u32(out, entry + 4, offset_field);
        }

        table as u32
    }

    fn write_leaf(&self, out: &mut Vec<u8>, payload: &[u8], reserved: u32) -> u32 {
        let entry = out.len();
        out.resize(entry + 16, 0);
        let data = out.len() as u32;
        out.extend_from_slice(payload);

        put_u32(out, entry, self.rva + data);
        put_u32(out, entry + 4, payload.len() as u32);
        put_u32(out, entry + 12, reserved);
        entry as u32
    }
}

/// Builds a minimal image: DOS stub, signature, COFF header, optional header, one section
pub struct PeBuilder {
    magic: Option<u16>,
    section_name: &'static str,
    resources: Vec<u8>,
    resource_directory: bool,
}

impl PeBuilder {
    pub fn new() -> Self {
        PeBuilder {
            magic: Some(0x10B),
            section_name: ".rsrc",
            resources: Vec::new(),
            resource_directory: true,
        }
    }

    /// Optional header magic; `None` omits the optional header entirely
    pub fn with_magic(mut self, magic: Option<u16>) -> Self {
        self.magic = magic;
        self
    }

    pub fn with_section_name(mut self, name: &'static str) -> Self {
        self.section_name = name;
        self
    }

    pub fn with_resources(mut self, resources: Vec<u8>) -> Self {
        self.resources = resources;
        self
    }

    /// Whether data directory 2 points at the resource section
    pub fn with_resource_directory(mut self, present: bool) -> Self {
        self.resource_directory = present;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut data = vec![0u8; 0x40];
        data[0..2].copy_from_slice(b"MZ");
        put_u32(&mut data, 0x3C, 0x40);
        data.extend_from_slice(b"PE\0\0");

        let optional_size: usize = match self.magic {
            Some(0x20B) => 0xF0,
            Some(_) => 0xE0,
            None => 0,
        };

        let mut coff = vec![0u8; 20];
        let machine = if self.magic == Some(0x20B) { 0x8664 } else { 0x014C };
        put_u16(&mut coff, 0, machine);
        put_u16(&mut coff, 2, 1);
        put_u16(&mut coff, 16, optional_size as u16);
        put_u16(&mut coff, 18, 0x0102);
        data.extend_from_slice(&coff);

        if let Some(magic) = self.magic {
            let mut optional = vec![0u8; optional_size];
            put_u16(&mut optional, 0, magic);
            let directories = match magic {
                0x10B => Some(96),
                0x20B => Some(112),
                _ => None,
            };
            if let Some(directories) = directories {
                put_u32(&mut optional, directories - 4, 16);
                if self.resource_directory && !self.resources.is_empty() {
                    put_u32(&mut optional, directories + 16, RSRC_RVA);
                    put_u32(&mut optional, directories + 20, self.resources.len() as u32);
                }
            }
            data.extend_from_slice(&optional);
        }

        data.extend(section_header(
            self.section_name,
            RSRC_RVA,
            self.resources.len().max(1) as u32,
            RSRC_RAW,
        ));

        data.resize(RSRC_RAW as usize, 0);
        data.extend_from_slice(&self.resources);
        data
    }
}

/// Builds a DIB icon resource: info header, palette and pixel rows
pub struct DibBuilder {
    width: i32,
    height: i32,
    bit_count: u16,
    compression: u32,
    palette: Vec<[u8; 4]>,
    pixels: Vec<u8>,
}

impl DibBuilder {
    /// `height` is the stored value, twice the visible rows
    pub fn new(width: i32, height: i32, bit_count: u16) -> Self {
        DibBuilder {
            width,
            height,
            bit_count,
            compression: 0,
            palette: Vec::new(),
            pixels: Vec::new(),
        }
    }

    pub fn with_compression(mut self, compression: u32) -> Self {
        self.compression = compression;
        self
    }

    /// Palette entries as stored: blue, green, red, reserved
    pub fn with_palette(mut self, palette: Vec<[u8; 4]>) -> Self {
        self.palette = palette;
        self
    }

    pub fn with_pixels(mut self, pixels: Vec<u8>) -> Self {
        self.pixels = pixels;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut data = vec![0u8; 40];
        put_u32(&mut data, 0, 40);
        data[4..8].copy_from_slice(&self.width.to_le_bytes());
        data[8..12].copy_from_slice(&self.height.to_le_bytes());
        put_u16(&mut data, 12, 1);
        put_u16(&mut data, 14, self.bit_count);
        put_u32(&mut data, 16, self.compression);
        put_u32(&mut data, 32, self.palette.len() as u32);

        for entry in &self.palette {
            data.extend_from_slice(entry);
        }
        data.extend_from_slice(&self.pixels);
        data
    }
}

/// A 32-bit DIB of `size x size` pixels where every pixel is opaque `blue`
pub fn solid_dib(size: i32, blue: u8) -> Vec<u8> {
    let pixels = (0..size * size)
        .flat_map(|_| [blue, 0x00, 0x00, 0xFF])
        .collect();
    DibBuilder::new(size, size * 2, 32)
        .with_pixels(pixels)
        .build()
}

/// An RGBA PNG image of the given size
pub fn png_icon(width: u32, height: u32) -> Vec<u8> {
    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().unwrap();
        let pixels: Vec<u8> = (0..width * height)
            .flat_map(|i| [0x10, 0x20, (i % 256) as u8, 0xFF])
            .collect();
        writer.write_image_data(&pixels).unwrap();
    }
    out
}

/// Layout of the local base path inside a LinkInfo block
pub enum BasePath {
    /// Single-byte path at the offset stored at block+16, header size 0x1C
    Ansi(Vec<u8>),
    /// UTF-16 path at the offset stored at block+28, header size 0x24
    Unicode(&'static str),
}

/// Builds a Shell Link file
pub struct LinkBuilder {
    flags: u32,
    id_list: Option<Vec<u8>>,
    base_path: Option<BasePath>,
    strings: Vec<&'static str>,
}

impl LinkBuilder {
    pub fn new() -> Self {
        LinkBuilder {
            flags: 0,
            id_list: None,
            base_path: None,
            strings: Vec::new(),
        }
    }

    pub fn with_id_list(mut self, payload: Vec<u8>) -> Self {
        self.flags |= 0x01;
        self.id_list = Some(payload);
        self
    }

    pub fn with_base_path(mut self, base_path: BasePath) -> Self {
        self.flags |= 0x02;
        self.base_path = Some(base_path);
        self
    }

    /// StringData entries in order, the matching flags must be set with [`Self::with_flags`]
    pub fn with_strings(mut self, strings: Vec<&'static str>) -> Self {
        self.strings = strings;
        self
    }

    pub fn with_flags(mut self, flags: u32) -> Self {
        self.flags |= flags;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut data = vec![0u8; 0x4C];
        put_u32(&mut data, 0, 0x4C);
        data[4..20].copy_from_slice(&LINK_CLSID);
        put_u32(&mut data, 20, self.flags);
        put_u32(&mut data, 24, 0x20);
        put_u32(&mut data, 52, 4096);
        put_u32(&mut data, 60, 1);

        if let Some(id_list) = &self.id_list {
            data.extend_from_slice(&(id_list.len() as u16).to_le_bytes());
            data.extend_from_slice(id_list);
        }

        if let Some(base_path) = &self.base_path {
            data.extend(link_info(base_path));
        }

        let unicode = self.flags & 0x80 != 0;
        for string in &self.strings {
            if unicode {
                let units: Vec<u16> = string.encode_utf16().collect();
                data.extend_from_slice(&(units.len() as u16).to_le_bytes());
                for unit in units {
                    data.extend_from_slice(&unit.to_le_bytes());
                }
            } else {
                data.extend_from_slice(&(string.len() as u16).to_le_bytes());
                data.extend_from_slice(string.as_bytes());
            }
        }

        data
    }
}

/// A LinkInfo block with only a local base path
pub fn link_info(base_path: &BasePath) -> Vec<u8> {
    let header_size: usize = match base_path {
        BasePath::Ansi(_) => 0x1C,
        BasePath::Unicode(_) => 0x24,
    };
    let mut block = vec![0u8; header_size];
    put_u32(&mut block, 4, header_size as u32);
    put_u32(&mut block, 8, 0x01);

    // An empty VolumeID
    let offset = block.len() as u32;
    put_u32(&mut block, 12, offset);
    block.extend_from_slice(&[0x10, 0, 0, 0, 3, 0, 0, 0, 0, 0, 0, 0, 0x10, 0, 0, 0]);

    match base_path {
        BasePath::Ansi(path) => {
            let offset = block.len() as u32;
            put_u32(&mut block, 16, offset);
            block.extend_from_slice(path);
            block.push(0);
        }
        BasePath::Unicode(path) => {
            // The ANSI path a real writer would emit as well
            let offset = block.len() as u32;
            put_u32(&mut block, 16, offset);
            block.extend_from_slice(b"C:\\WRONG.EXE\0");
            let offset = block.len() as u32;
            put_u32(&mut block, 28, offset);
            for unit in path.encode_utf16() {
                block.extend_from_slice(&unit.to_le_bytes());
            }
            block.extend_from_slice(&[0, 0]);
        }
    }

    let size = block.len() as u32;
    put_u32(&mut block, 0, size);
    block
}
