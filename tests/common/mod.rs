//! Synthetic files and bottles shared by the integration tests.
#![allow(dead_code)]

use std::{fs, path::Path};

pub const RSRC_RVA: u32 = 0x3000;
pub const RSRC_RAW: usize = 0x400;

fn put_u16(data: &mut [u8], offset: usize, value: u16) {
    data[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

fn put_u32(data: &mut [u8], offset: usize, value: u32) {
    data[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

/// A 32-bit top-down DIB icon where every pixel is `bgra`
pub fn dib(size: u32, bgra: [u8; 4]) -> Vec<u8> {
    let mut data = vec![0u8; 40];
    put_u32(&mut data, 0, 40);
    put_u32(&mut data, 4, size);
    data[8..12].copy_from_slice(&(-(size as i32) * 2).to_le_bytes());
    put_u16(&mut data, 12, 1);
    put_u16(&mut data, 14, 32);
    for _ in 0..size * size {
        data.extend_from_slice(&bgra);
    }
    data
}

/// An 8-bit DIB with a two-color palette, left column black, the rest `bgr`
pub fn indexed_dib(size: u32, bgr: [u8; 3]) -> Vec<u8> {
    let mut data = vec![0u8; 40];
    put_u32(&mut data, 0, 40);
    put_u32(&mut data, 4, size);
    put_u32(&mut data, 8, size * 2);
    put_u16(&mut data, 12, 1);
    put_u16(&mut data, 14, 8);
    put_u32(&mut data, 32, 2);
    data.extend_from_slice(&[0, 0, 0, 0]);
    data.extend_from_slice(&[bgr[0], bgr[1], bgr[2], 0]);
    for _ in 0..size {
        data.push(0);
        data.extend(std::iter::repeat(1).take(size as usize - 1));
    }
    data
}

/// An RGBA PNG of the given size
pub fn png(width: u32, height: u32) -> Vec<u8> {
    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().unwrap();
        writer
            .write_image_data(&vec![0xC0; (width * height * 4) as usize])
            .unwrap();
    }
    out
}

/// `.rsrc` content with the given icon payloads under `Icon -> n -> 0x409`, plus a version
/// resource that must not be decoded as an icon
pub fn icon_resources(icons: &[Vec<u8>]) -> Vec<u8> {
    let mut out = vec![0u8; 16 + 2 * 8];
    put_u16(&mut out, 14, 2);

    // RT_ICON
    let icon_table = out.len();
    put_u32(&mut out, 16, 3);
    put_u32(&mut out, 20, 0x8000_0000 | icon_table as u32);
    out.resize(icon_table + 16 + icons.len() * 8, 0);
    put_u16(&mut out, icon_table + 14, icons.len() as u16);

    for (index, payload) in icons.iter().enumerate() {
        let language_table = out.len();
        let entry = icon_table + 16 + index * 8;
        put_u32(&mut out, entry, index as u32 + 1);
        put_u32(&mut out, entry + 4, 0x8000_0000 | language_table as u32);

        out.resize(language_table + 24, 0);
        put_u16(&mut out, language_table + 14, 1);
        put_u32(&mut out, language_table + 16, 0x409);
        let leaf = out.len();
        put_u32(&mut out, language_table + 20, leaf as u32);

        out.resize(leaf + 16, 0);
        let data = out.len();
        out.extend_from_slice(payload);
        put_u32(&mut out, leaf, RSRC_RVA + data as u32);
        put_u32(&mut out, leaf + 4, payload.len() as u32);
    }

    // RT_VERSION, a leaf directly below the type
    let leaf = out.len();
    put_u32(&mut out, 24, 16);
    put_u32(&mut out, 28, leaf as u32);
    out.resize(leaf + 16, 0);
    let data = out.len();
    out.extend_from_slice(&dib(4, [1, 2, 3, 4]));
    put_u32(&mut out, leaf, RSRC_RVA + data as u32);
    let size = (out.len() - data) as u32;
    put_u32(&mut out, leaf + 4, size);

    out
}

/// A PE32 (`magic` 0x10B) or PE32+ (0x20B) image with a `.text` and a `.rsrc` section
pub fn executable(magic: u16, resources: &[u8]) -> Vec<u8> {
    let mut data = vec![0u8; 0x80];
    data[0..2].copy_from_slice(b"MZ");
    put_u32(&mut data, 0x3C, 0x80);
    data.extend_from_slice(b"PE\0\0");

    let optional_size: u16 = if magic == 0x20B { 0xF0 } else { 0xE0 };
    let mut coff = [0u8; 20];
    put_u16(&mut coff, 0, if magic == 0x20B { 0x8664 } else { 0x014C });
    put_u16(&mut coff, 2, 2);
    put_u16(&mut coff, 16, optional_size);
    put_u16(&mut coff, 18, 0x0102);
    data.extend_from_slice(&coff);

    let mut optional = vec![0u8; optional_size as usize];
    put_u16(&mut optional, 0, magic);
    let directories = if magic == 0x20B { 112 } else { 96 };
    put_u32(&mut optional, directories - 4, 16);
    put_u32(&mut optional, directories + 16, RSRC_RVA);
    put_u32(&mut optional, directories + 20, resources.len() as u32);
    data.extend_from_slice(&optional);

    for (name, rva, raw, size) in [
        (".text", 0x1000_u32, 0x200_u32, 0x200_u32),
        (".rsrc", RSRC_RVA, RSRC_RAW as u32, resources.len() as u32),
    ] {
        let mut header = [0u8; 40];
        header[..name.len()].copy_from_slice(name.as_bytes());
        put_u32(&mut header, 8, size);
        put_u32(&mut header, 12, rva);
        put_u32(&mut header, 16, size);
        put_u32(&mut header, 20, raw);
        data.extend_from_slice(&header);
    }

    data.resize(0x200, 0);
    data.extend_from_slice(&[0xC3; 0x200]);
    data.resize(RSRC_RAW, 0);
    data.extend_from_slice(resources);
    data
}

/// A Shell Link whose LinkInfo stores `target` as an ANSI base path, optionally with arguments
pub fn shortcut(target: &str, arguments: Option<&str>) -> Vec<u8> {
    let mut flags = 0x02_u32;
    if arguments.is_some() {
        flags |= 0x20 | 0x80;
    }

    let mut data = vec![0u8; 0x4C];
    put_u32(&mut data, 0, 0x4C);
    data[4..20].copy_from_slice(&[
        0x01, 0x14, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x46,
    ]);
    put_u32(&mut data, 20, flags);

    let mut info = vec![0u8; 0x1C];
    put_u32(&mut info, 4, 0x1C);
    put_u32(&mut info, 8, 1);
    put_u32(&mut info, 12, 0x1C);
    info.extend_from_slice(&[0x10, 0, 0, 0, 3, 0, 0, 0, 0, 0, 0, 0, 0x10, 0, 0, 0]);
    let offset = info.len() as u32;
    put_u32(&mut info, 16, offset);
    info.extend_from_slice(target.as_bytes());
    info.push(0);
    let size = info.len() as u32;
    put_u32(&mut info, 0, size);
    data.extend_from_slice(&info);

    if let Some(arguments) = arguments {
        let units: Vec<u16> = arguments.encode_utf16().collect();
        data.extend_from_slice(&(units.len() as u16).to_le_bytes());
        for unit in units {
            data.extend_from_slice(&unit.to_le_bytes());
        }
    }

    data
}

/// Writes `data` to `path`, creating parent directories
pub fn write(path: &Path, data: &[u8]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, data).unwrap();
}
