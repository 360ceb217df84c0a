use strum::Display;

/// One RGBA pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ColorQuad {
    /// Red channel
    pub red: u8,
    /// Green channel
    pub green: u8,
    /// Blue channel
    pub blue: u8,
    /// Alpha channel, 0 is fully transparent
    pub alpha: u8,
}

impl ColorQuad {
    /// Build a pixel from its channels.
    #[must_use]
    pub const fn new(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        ColorQuad {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// The pixel as `[r, g, b, a]`.
    #[must_use]
    pub const fn to_rgba(self) -> [u8; 4] {
        [self.red, self.green, self.blue, self.alpha]
    }
}

/// Encoding an [`IconImage`] was decoded from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ImageSource {
    /// Uncompressed device independent bitmap
    #[strum(serialize = "dib")]
    Dib,
    /// Embedded PNG stream
    #[strum(serialize = "png")]
    Png,
}

/// A decoded icon: `width x height` pixels, 8-bit RGBA, rows top to bottom.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IconImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    source: ImageSource,
}

impl IconImage {
    /// Wraps an RGBA buffer.
    ///
    /// Returns `None` unless `pixels` holds exactly `width * height * 4` bytes and neither
    /// dimension is zero.
    #[must_use]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>, source: ImageSource) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(4)?;
        if width == 0 || height == 0 || pixels.len() != expected {
            return None;
        }

        Some(IconImage {
            width,
            height,
            pixels,
            source,
        })
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The RGBA buffer, `width * height * 4` bytes.
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Consumes the image, returning its RGBA buffer.
    #[must_use]
    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// The encoding the image was decoded from.
    #[must_use]
    pub fn source(&self) -> ImageSource {
        self.source
    }

    /// The pixel at column `x` of row `y`, counted from the top left.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<ColorQuad> {
        if x >= self.width || y >= self.height {
            return None;
        }

        let start = (y as usize * self.width as usize + x as usize) * 4;
        let quad = self.pixels.get(start..start + 4)?;
        Some(ColorQuad::new(quad[0], quad[1], quad[2], quad[3]))
    }

    /// `true` if the image has no pixels to show.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }
}
