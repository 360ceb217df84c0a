//! Icon resource decoding.
//!
//! An `RT_ICON` resource holds either a classic device independent bitmap (a 40-byte
//! `BITMAPINFOHEADER`, an optional palette and the pixel rows) or, for large icons, a complete PNG
//! stream. [`decode_icon`] tells them apart by the header size field and produces an
//! [`IconImage`] with RGBA8 pixels in both cases.
//!
//! # DIB layout in icon resources
//!
//! The stored height covers both the color bitmap and the 1-bit AND mask that follows it, so
//! only `|height| / 2` rows are color data. Rows are read tightly packed. A negative height means
//! the first row in the file is the top row; otherwise the first row is the bottom one.
//!
//! | Bit count | Decoding                                                      |
//! |-----------|---------------------------------------------------------------|
//! | 1, 2, 4   | not decoded, no image                                         |
//! | 8         | palette lookup, black palette entries are transparent         |
//! | 16        | 5-bit channels from masks `0x001F`, `0x03E0`, `0x7C00`, opaque |
//! | 24        | blue, green, red, opaque                                      |
//! | 32        | blue, green, red, alpha                                       |

mod embedded;
mod image;

pub use embedded::{is_png, PNG_SIGNATURE};
pub use image::{ColorQuad, IconImage, ImageSource};

use log::debug;
use strum::{Display, FromRepr};

use crate::{config::ParseOptions, file::File};

/// Size of a `BITMAPINFOHEADER`.
pub const BITMAP_INFO_HEADER_SIZE: u32 = 40;

/// Most palette entries an 8-bit bitmap can address.
pub const MAX_PALETTE_ENTRIES: usize = 256;

/// Pixel layout derived from the bit count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, Display)]
#[repr(u16)]
#[allow(missing_docs)]
pub enum ColorFormat {
    Unknown = 0,
    Indexed1 = 1,
    Indexed2 = 2,
    Indexed4 = 4,
    Indexed8 = 8,
    Sampled16 = 16,
    Sampled24 = 24,
    Sampled32 = 32,
}

/// Position of the first stored row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Origin {
    /// First row in the file is the top row (negative height)
    TopDown,
    /// First row in the file is the bottom row (positive height)
    BottomUp,
}

/// `biCompression` values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, Display)]
#[repr(u32)]
#[allow(missing_docs)]
pub enum Compression {
    Rgb = 0x0000,
    Rle8 = 0x0001,
    Rle4 = 0x0002,
    Bitfields = 0x0003,
    Jpeg = 0x0004,
    Png = 0x0005,
    AlphaBitfields = 0x0006,
    Cmyk = 0x000B,
    CmykRle8 = 0x000C,
    CmykRle4 = 0x000D,
}

/// `BITMAPINFOHEADER`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[allow(missing_docs)]
pub struct BitmapInfoHeader {
    pub size: u32,
    pub width: i32,
    pub height: i32,
    pub planes: u16,
    pub bit_count: u16,
    pub compression: u32,
    pub size_image: u32,
    pub x_pels_per_meter: i32,
    pub y_pels_per_meter: i32,
    pub clr_used: u32,
    pub clr_important: u32,
}

impl BitmapInfoHeader {
    /// Reads the header at `offset`; fields past the end of the file are zero.
    #[must_use]
    pub fn read(file: &File, offset: usize) -> BitmapInfoHeader {
        let mut reader = file.reader(offset);
        BitmapInfoHeader {
            size: reader.field(),
            width: reader.field(),
            height: reader.field(),
            planes: reader.field(),
            bit_count: reader.field(),
            compression: reader.field(),
            size_image: reader.field(),
            x_pels_per_meter: reader.field(),
            y_pels_per_meter: reader.field(),
            clr_used: reader.field(),
            clr_important: reader.field(),
        }
    }

    /// Pixel layout, [`ColorFormat::Unknown`] for unsupported bit counts.
    #[must_use]
    pub fn color_format(&self) -> ColorFormat {
        ColorFormat::from_repr(self.bit_count).unwrap_or(ColorFormat::Unknown)
    }

    /// Row order of the pixel data.
    #[must_use]
    pub fn origin(&self) -> Origin {
        if self.height < 0 {
            Origin::TopDown
        } else {
            Origin::BottomUp
        }
    }

    /// The compression, `None` for values outside of the known set.
    #[must_use]
    pub fn compression_kind(&self) -> Option<Compression> {
        Compression::from_repr(self.compression)
    }

    /// Number of color rows; the other half of the stored height is the AND mask.
    #[must_use]
    pub fn rows(&self) -> u32 {
        self.height.unsigned_abs() / 2
    }

    /// Reads the color table that starts at `offset`.
    ///
    /// Entries are stored blue, green, red, reserved. Pure black becomes fully transparent,
    /// everything else opaque. Only the first [`MAX_PALETTE_ENTRIES`] entries are kept.
    #[must_use]
    pub fn palette(&self, file: &File, offset: usize) -> Vec<ColorQuad> {
        let count = (self.clr_used as usize).min(MAX_PALETTE_ENTRIES);
        let mut reader = file.reader(offset);

        (0..count)
            .map(|_| {
                let blue = reader.field::<u8>();
                let green = reader.field::<u8>();
                let red = reader.field::<u8>();
                reader.advance_by(1);

                let alpha = if red == 0 && green == 0 && blue == 0 {
                    0
                } else {
                    0xFF
                };
                ColorQuad::new(red, green, blue, alpha)
            })
            .collect()
    }

    /// Decodes the color bitmap whose palette (or pixels, without palette) start at `offset`.
    ///
    /// Returns `None` for unsupported formats and compressions, for dimensions that are zero or
    /// larger than [`ParseOptions::max_icon_dimension`], and when no pixel could be produced.
    #[must_use]
    pub fn decode(&self, file: &File, offset: usize, options: &ParseOptions) -> Option<IconImage> {
        match self.compression_kind() {
            Some(Compression::Rgb | Compression::Bitfields | Compression::AlphaBitfields) => {}
            other => {
                debug!("Bitmap compression {other:?} ({}) not supported", self.compression);
                return None;
            }
        }

        let format = self.color_format();
        match format {
            ColorFormat::Indexed8
            | ColorFormat::Sampled16
            | ColorFormat::Sampled24
            | ColorFormat::Sampled32 => {}
            ColorFormat::Indexed1 | ColorFormat::Indexed2 | ColorFormat::Indexed4 => {
                debug!("Sub-byte bitmap format {format} yields no pixels");
                return None;
            }
            ColorFormat::Unknown => {
                debug!("Bitmap bit count {} not supported", self.bit_count);
                return None;
            }
        }

        let Ok(width) = u32::try_from(self.width) else {
            debug!("Bitmap width {} is negative", self.width);
            return None;
        };
        let rows = self.rows();
        if width == 0 || rows == 0 {
            return None;
        }
        if width > options.max_icon_dimension || rows > options.max_icon_dimension {
            debug!(
                "Bitmap {width}x{rows} exceeds {} pixels",
                options.max_icon_dimension
            );
            return None;
        }

        let palette_len = (self.clr_used as usize).checked_mul(4)?;
        let pixel_offset = offset.checked_add(palette_len)?;
        if pixel_offset > file.len() {
            debug!(
                "Bitmap palette of {} entries runs past the end of the file",
                self.clr_used
            );
            return None;
        }

        let palette = self.palette(file, offset);
        let mut reader = file.reader(pixel_offset);
        let row_len = width as usize * 4;
        let mut pixels = vec![0u8; row_len * rows as usize];

        for row in 0..rows as usize {
            let target = match self.origin() {
                Origin::TopDown => row,
                Origin::BottomUp => rows as usize - 1 - row,
            };
            let line = &mut pixels[target * row_len..(target + 1) * row_len];

            for pixel in line.chunks_exact_mut(4) {
                let quad = match format {
                    ColorFormat::Indexed8 => {
                        let index = reader.field::<u8>();
                        palette.get(usize::from(index)).copied().unwrap_or_default()
                    }
                    ColorFormat::Sampled16 => {
                        let sample = reader.field::<u16>();
                        ColorQuad::new(
                            (sample & 0x001F) as u8,
                            ((sample & 0x03E0) >> 5) as u8,
                            ((sample & 0x7C00) >> 10) as u8,
                            0xFF,
                        )
                    }
                    ColorFormat::Sampled24 => {
                        let blue = reader.field::<u8>();
                        let green = reader.field::<u8>();
                        let red = reader.field::<u8>();
                        ColorQuad::new(red, green, blue, 0xFF)
                    }
                    ColorFormat::Sampled32 => {
                        let blue = reader.field::<u8>();
                        let green = reader.field::<u8>();
                        let red = reader.field::<u8>();
                        let alpha = reader.field::<u8>();
                        ColorQuad::new(red, green, blue, alpha)
                    }
                    // Rejected before any pixel is read
                    ColorFormat::Indexed1
                    | ColorFormat::Indexed2
                    | ColorFormat::Indexed4
                    | ColorFormat::Unknown => ColorQuad::default(),
                };
                pixel.copy_from_slice(&quad.to_rgba());
            }
        }

        IconImage::new(width, rows, pixels, ImageSource::Dib)
    }
}

/// Decodes the `RT_ICON` resource of `size` bytes at file offset `offset`.
///
/// A header size of 40 selects the DIB path. Anything else is treated as an encoded image: PNG
/// streams are decoded, other payloads yield `None`.
#[must_use]
pub fn decode_icon(
    file: &File,
    offset: usize,
    size: usize,
    options: &ParseOptions,
) -> Option<IconImage> {
    let header = BitmapInfoHeader::read(file, offset);

    if header.size != BITMAP_INFO_HEADER_SIZE {
        let available = file.len().saturating_sub(offset).min(size);
        let data = file.data_slice(offset, available).ok()?;
        if !is_png(data) {
            debug!(
                "Icon at 0x{offset:x} is neither a DIB nor a PNG (header size {})",
                header.size
            );
            return None;
        }

        return match embedded::decode(data, options.max_icon_dimension) {
            Ok(image) => image,
            Err(error) => {
                debug!("PNG icon at 0x{offset:x} failed to decode - {error}");
                None
            }
        };
    }

    header.decode(file, offset + BITMAP_INFO_HEADER_SIZE as usize, options)
}
