use log::debug;
use png::{ColorType, Decoder, Transformations};

use crate::{
    bitmap::{IconImage, ImageSource},
    Result,
};

/// The 8-byte signature every PNG stream starts with.
pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// `true` if `data` starts with [`PNG_SIGNATURE`].
#[must_use]
pub fn is_png(data: &[u8]) -> bool {
    data.starts_with(&PNG_SIGNATURE)
}

/// Decodes a PNG icon resource into RGBA8.
///
/// Palette and low bit depth images are expanded, 16-bit channels are stripped to 8 bits. Images
/// larger than `max_dimension` in either direction are rejected before any pixel data is
/// decoded.
///
/// # Errors
/// Returns [`crate::Error::PngError`] if the stream is not a valid PNG.
pub fn decode(data: &[u8], max_dimension: u32) -> Result<Option<IconImage>> {
    let mut decoder = Decoder::new(data);
    decoder.set_transformations(Transformations::EXPAND | Transformations::STRIP_16);
    let mut reader = decoder.read_info()?;

    let (width, height) = {
        let info = reader.info();
        (info.width, info.height)
    };
    if width > max_dimension || height > max_dimension {
        debug!("PNG icon {width}x{height} exceeds {max_dimension} pixels");
        return Ok(None);
    }

    let mut buffer = vec![0; reader.output_buffer_size()];
    let frame = reader.next_frame(&mut buffer)?;
    let samples = &buffer[..frame.buffer_size()];

    let rgba: Vec<u8> = match frame.color_type {
        ColorType::Rgba => samples.to_vec(),
        ColorType::Rgb => samples
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], 0xFF])
            .collect(),
        ColorType::GrayscaleAlpha => samples
            .chunks_exact(2)
            .flat_map(|p| [p[0], p[0], p[0], p[1]])
            .collect(),
        ColorType::Grayscale => samples.iter().flat_map(|&g| [g, g, g, 0xFF]).collect(),
        ColorType::Indexed => {
            debug!("PNG icon still indexed after expansion");
            return Ok(None);
        }
    };

    Ok(IconImage::new(frame.width, frame.height, rgba, ImageSource::Png))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{test::png_icon, Error};

    #[test]
    fn decode_rgba() {
        let data = png_icon(4, 3);
        assert!(is_png(&data));

        let image = decode(&data, 256).unwrap().unwrap();
        assert_eq!(image.width(), 4);
        assert_eq!(image.height(), 3);
        assert_eq!(image.source(), ImageSource::Png);
        assert_eq!(image.pixel(2, 0).unwrap().to_rgba(), [0x10, 0x20, 2, 0xFF]);
    }

    #[test]
    fn decode_rgb_expands_alpha() {
        let mut data = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut data, 1, 1);
            encoder.set_color(png::ColorType::Rgb);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(&[1, 2, 3]).unwrap();
        }

        let image = decode(&data, 256).unwrap().unwrap();
        assert_eq!(image.pixels(), &[1, 2, 3, 0xFF]);
    }

    #[test]
    fn decode_too_large() {
        let data = png_icon(64, 64);
        assert!(decode(&data, 32).unwrap().is_none());
    }

    #[test]
    fn decode_garbage() {
        let mut data = PNG_SIGNATURE.to_vec();
        data.extend_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]);
        assert!(matches!(decode(&data, 256), Err(Error::PngError(_))));
        assert!(!is_png(&data[1..]));
    }
}
