//! Format types for PPTX presentations.

use std::io::Cursor;

/// Image format types that can be embedded as pictures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
    Tiff,
}

impl ImageFormat {
    /// Get the MIME type for this image format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::Bmp => "image/bmp",
            Self::Tiff => "image/tiff",
        }
    }

    /// Get the file extension used for media partnames.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Gif => "gif",
            Self::Bmp => "bmp",
            Self::Tiff => "tiff",
        }
    }

    fn from_decoder_format(format: image::ImageFormat) -> Option<Self> {
        match format {
            image::ImageFormat::Png => Some(Self::Png),
            image::ImageFormat::Jpeg => Some(Self::Jpeg),
            image::ImageFormat::Gif => Some(Self::Gif),
            image::ImageFormat::Bmp => Some(Self::Bmp),
            image::ImageFormat::Tiff => Some(Self::Tiff),
            _ => None,
        }
    }
}

/// Format and native pixel size of an image blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub format: ImageFormat,
    pub width_px: u32,
    pub height_px: u32,
}

impl ImageInfo {
    /// Sniff the format and read the pixel dimensions from the image header.
    ///
    /// Only the header is decoded. Formats PowerPoint cannot display are
    /// reported as unsupported.
    pub fn probe(data: &[u8]) -> image::ImageResult<Self> {
        let decoder_format = image::guess_format(data)?;
        let format = Self::supported(decoder_format)?;
        let (width_px, height_px) =
            image::ImageReader::with_format(Cursor::new(data), decoder_format).into_dimensions()?;
        Ok(Self {
            format,
            width_px,
            height_px,
        })
    }

    fn supported(format: image::ImageFormat) -> image::ImageResult<ImageFormat> {
        ImageFormat::from_decoder_format(format).ok_or_else(|| {
            image::ImageError::Unsupported(image::error::UnsupportedError::from_format_and_kind(
                format.into(),
                image::error::UnsupportedErrorKind::Format(format.into()),
            ))
        })
    }
}

/// An sRGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    pub const WHITE: RgbColor = RgbColor::new(0xFF, 0xFF, 0xFF);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Six-digit uppercase hex, as used by `a:srgbClr/@val`.
    pub fn hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Horizontal paragraph alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl Alignment {
    /// Value of `a:pPr/@algn`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "l",
            Self::Center => "ctr",
            Self::Right => "r",
            Self::Justify => "just",
        }
    }
}

/// Character formatting applied to a whole paragraph run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextFormat {
    /// Latin typeface name
    pub font: Option<String>,
    /// Size in points
    pub size: Option<f64>,
    pub bold: bool,
    pub italic: bool,
    pub color: Option<RgbColor>,
}

impl TextFormat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn font(mut self, font: &str) -> Self {
        self.font = Some(font.to_string());
        self
    }

    pub fn size(mut self, points: f64) -> Self {
        self.size = Some(points);
        self
    }

    pub fn bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    pub fn color(mut self, color: RgbColor) -> Self {
        self.color = Some(color);
        self
    }
}
