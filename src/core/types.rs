//! Core value types that flow through the splice pipeline.
//!
//! Choices the user makes (layout, watermark color, export format) are closed
//! enums rather than strings so every dispatch is an exhaustive `match`.
//! Rasters move by value from one stage to the next; a stage that changes
//! pixels produces a new image instead of mutating a shared one.

use image::{ColorType, DynamicImage, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::core::error::{DecodeError, UsageError};

// ============================================================================
// Rasters
// ============================================================================

/// Pixel layout of a decoded raster.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum PixelFormat {
    /// 8-bit RGB
    Rgb,
    /// 8-bit RGB with straight alpha
    Rgba,
    /// 8-bit luma
    Grayscale,
    /// 8-bit luma with alpha
    GrayscaleAlpha,
    /// Indexed pixels resolved through an RGBA palette
    Palette,
}

/// An indexed raster: one palette index per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedRaster {
    width: u32,
    height: u32,
    indices: Vec<u8>,
    palette: Vec<Rgba<u8>>,
}

impl IndexedRaster {
    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Palette index of every pixel, row-major.
    pub fn indices(&self) -> &[u8] {
        &self.indices
    }

    /// Palette entries. Transparent entries carry alpha below 255.
    pub fn palette(&self) -> &[Rgba<u8>] {
        &self.palette
    }
}

#[derive(Debug, Clone)]
pub(crate) enum Raster {
    Decoded(DynamicImage),
    Indexed(IndexedRaster),
}

/// A decoded image as it came out of a decoder.
///
/// Immutable once created. The normalizer consumes it.
#[derive(Debug, Clone)]
pub struct ImageHandle {
    pub(crate) raster: Raster,
    label: String,
}

impl ImageHandle {
    /// Wrap a decoded image.
    pub fn from_dynamic(image: DynamicImage, label: impl Into<String>) -> Self {
        Self {
            raster: Raster::Decoded(image),
            label: label.into(),
        }
    }

    /// Build a palette image from raw indices.
    ///
    /// Fails when the index buffer does not match the dimensions or an
    /// index points past the end of the palette.
    pub fn indexed(
        width: u32,
        height: u32,
        indices: Vec<u8>,
        palette: Vec<Rgba<u8>>,
        label: impl Into<String>,
    ) -> Result<Self, DecodeError> {
        let expected = width as usize * height as usize;
        if indices.len() != expected {
            return Err(DecodeError::InvalidRaster(format!(
                "expected {} palette indices for {}x{}, got {}",
                expected,
                width,
                height,
                indices.len()
            )));
        }
        if let Some(bad) = indices.iter().find(|&&i| i as usize >= palette.len()) {
            return Err(DecodeError::InvalidRaster(format!(
                "palette index {} out of range for {} entries",
                bad,
                palette.len()
            )));
        }

        Ok(Self {
            raster: Raster::Indexed(IndexedRaster {
                width,
                height,
                indices,
                palette,
            }),
            label: label.into(),
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        match &self.raster {
            Raster::Decoded(image) => image.width(),
            Raster::Indexed(raster) => raster.width,
        }
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        match &self.raster {
            Raster::Decoded(image) => image.height(),
            Raster::Indexed(raster) => raster.height,
        }
    }

    /// (width, height) in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    /// Pixel layout of the underlying raster.
    pub fn pixel_format(&self) -> PixelFormat {
        match &self.raster {
            Raster::Indexed(_) => PixelFormat::Palette,
            Raster::Decoded(image) => match image.color() {
                ColorType::L8 | ColorType::L16 => PixelFormat::Grayscale,
                ColorType::La8 | ColorType::La16 => PixelFormat::GrayscaleAlpha,
                ColorType::Rgb8 | ColorType::Rgb16 | ColorType::Rgb32F => PixelFormat::Rgb,
                ColorType::Rgba8 | ColorType::Rgba16 | ColorType::Rgba32F => PixelFormat::Rgba,
                other if other.has_alpha() => PixelFormat::Rgba,
                _ => PixelFormat::Rgb,
            },
        }
    }

    /// Where the image came from, for logs and error messages.
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// An RGBA8 raster. Every pixel has an explicit alpha channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalImage(RgbaImage);

impl CanonicalImage {
    /// Wrap an RGBA buffer.
    pub fn from_rgba(image: RgbaImage) -> Self {
        Self(image)
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.0.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.0.height()
    }

    /// (width, height) in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        self.0.dimensions()
    }

    /// Borrow the pixel buffer.
    pub fn as_rgba(&self) -> &RgbaImage {
        &self.0
    }

    /// Take the pixel buffer.
    pub fn into_rgba(self) -> RgbaImage {
        self.0
    }

    /// True when no pixel is even partly transparent.
    pub fn is_opaque(&self) -> bool {
        self.0.pixels().all(|p| p[3] == 255)
    }
}

// ============================================================================
// Color
// ============================================================================

/// RGBA color value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Color {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
    /// Alpha channel, 255 is opaque
    pub a: u8,
}

impl Color {
    /// Create a new color from RGBA components.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create a color from RGB components (alpha = 255).
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Convert to image crate's Rgba type.
    pub fn to_rgba(&self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, self.a])
    }

    /// Opaque white.
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    /// Opaque black.
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    /// Opaque red.
    pub const RED: Color = Color::rgb(255, 0, 0);
}

// ============================================================================
// User choices
// ============================================================================

/// How images are arranged on the canvas.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutMode {
    /// Side by side, vertically centered
    #[default]
    Horizontal,
    /// Stacked, horizontally centered
    Vertical,
    /// Rows of two, packed flush left and top-aligned
    #[serde(alias = "grid")]
    TwoColumnFlow,
}

impl LayoutMode {
    /// All modes in display order.
    pub const ALL: [LayoutMode; 3] = [
        LayoutMode::Horizontal,
        LayoutMode::Vertical,
        LayoutMode::TwoColumnFlow,
    ];

    /// Stable identifier used on the command line and in config files.
    pub fn as_str(self) -> &'static str {
        match self {
            LayoutMode::Horizontal => "horizontal",
            LayoutMode::Vertical => "vertical",
            LayoutMode::TwoColumnFlow => "two-column-flow",
        }
    }

    /// One-line description for listings.
    pub fn description(self) -> &'static str {
        match self {
            LayoutMode::Horizontal => "left to right, each image vertically centered",
            LayoutMode::Vertical => "top to bottom, each image horizontally centered",
            LayoutMode::TwoColumnFlow => "rows of two, packed flush left and top-aligned",
        }
    }
}

impl FromStr for LayoutMode {
    type Err = UsageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "horizontal" | "h" | "横向拼接" => Ok(LayoutMode::Horizontal),
            "vertical" | "v" | "纵向拼接" => Ok(LayoutMode::Vertical),
            "grid" | "two-column" | "two-column-flow" | "2xn" | "2xn网格" => {
                Ok(LayoutMode::TwoColumnFlow)
            }
            _ => Err(UsageError::UnknownLayoutMode(s.to_string())),
        }
    }
}

impl fmt::Display for LayoutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text color of the sequence watermark.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum WatermarkColor {
    /// Red text, dark shadow
    #[default]
    Red,
    /// White text, dark shadow
    White,
    /// Black text, light shadow
    Black,
}

impl WatermarkColor {
    /// Color of the label itself.
    pub fn text(self) -> Color {
        match self {
            WatermarkColor::Red => Color::RED,
            WatermarkColor::White => Color::WHITE,
            WatermarkColor::Black => Color::BLACK,
        }
    }

    /// Half-transparent outline drawn one pixel down-right of the label.
    pub fn shadow(self) -> Color {
        match self {
            WatermarkColor::Red | WatermarkColor::White => Color::new(0, 0, 0, 128),
            WatermarkColor::Black => Color::new(255, 255, 255, 128),
        }
    }
}

impl FromStr for WatermarkColor {
    type Err = UsageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "red" | "红色" => Ok(WatermarkColor::Red),
            "white" | "白色" => Ok(WatermarkColor::White),
            "black" | "黑色" => Ok(WatermarkColor::Black),
            _ => Err(UsageError::UnknownColor(s.to_string())),
        }
    }
}

impl fmt::Display for WatermarkColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WatermarkColor::Red => write!(f, "red"),
            WatermarkColor::White => write!(f, "white"),
            WatermarkColor::Black => write!(f, "black"),
        }
    }
}

/// File container used when saving a composite.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Lossless, keeps alpha
    #[default]
    Png,
    /// Lossy, flattened onto white
    #[serde(alias = "jpg")]
    Jpeg,
}

impl ExportFormat {
    /// Determine the export format from a file path extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("");

        match ext.to_lowercase().as_str() {
            "png" => Some(ExportFormat::Png),
            "jpg" | "jpeg" => Some(ExportFormat::Jpeg),
            _ => None,
        }
    }

    /// Get the typical file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = UsageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "png" => Ok(ExportFormat::Png),
            "jpg" | "jpeg" => Ok(ExportFormat::Jpeg),
            _ => Err(UsageError::UnknownFormat(s.to_string())),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Png => write!(f, "PNG"),
            ExportFormat::Jpeg => write!(f, "JPEG"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, RgbImage};

    #[test]
    fn test_pixel_format_detection() {
        let rgb = ImageHandle::from_dynamic(DynamicImage::ImageRgb8(RgbImage::new(2, 2)), "rgb");
        assert_eq!(rgb.pixel_format(), PixelFormat::Rgb);

        let gray = ImageHandle::from_dynamic(DynamicImage::ImageLuma8(GrayImage::new(2, 2)), "l");
        assert_eq!(gray.pixel_format(), PixelFormat::Grayscale);

        let rgba = ImageHandle::from_dynamic(DynamicImage::new_rgba8(3, 1), "rgba");
        assert_eq!(rgba.pixel_format(), PixelFormat::Rgba);
        assert_eq!(rgba.dimensions(), (3, 1));
    }

    #[test]
    fn test_indexed_rejects_bad_input() {
        let palette = vec![Rgba([0, 0, 0, 255])];
        assert!(ImageHandle::indexed(2, 2, vec![0; 3], palette.clone(), "short").is_err());
        assert!(ImageHandle::indexed(1, 1, vec![1], palette.clone(), "oob").is_err());

        let ok = ImageHandle::indexed(1, 2, vec![0, 0], palette, "ok").unwrap();
        assert_eq!(ok.pixel_format(), PixelFormat::Palette);
        assert_eq!(ok.dimensions(), (1, 2));
    }

    #[test]
    fn test_layout_mode_parsing() {
        assert_eq!("horizontal".parse::<LayoutMode>().unwrap(), LayoutMode::Horizontal);
        assert_eq!("V".parse::<LayoutMode>().unwrap(), LayoutMode::Vertical);
        assert_eq!("2xN网格".parse::<LayoutMode>().unwrap(), LayoutMode::TwoColumnFlow);
        assert_eq!("grid".parse::<LayoutMode>().unwrap(), LayoutMode::TwoColumnFlow);
        assert_eq!(
            "diagonal".parse::<LayoutMode>(),
            Err(UsageError::UnknownLayoutMode("diagonal".to_string()))
        );
    }

    #[test]
    fn test_watermark_color_pairs() {
        assert_eq!(WatermarkColor::Red.text(), Color::RED);
        assert_eq!(WatermarkColor::Red.shadow(), Color::new(0, 0, 0, 128));
        assert_eq!(WatermarkColor::Black.shadow(), Color::new(255, 255, 255, 128));
        assert_eq!("白色".parse::<WatermarkColor>().unwrap(), WatermarkColor::White);
        assert!("blue".parse::<WatermarkColor>().is_err());
    }

    #[test]
    fn test_export_format_from_path() {
        assert_eq!(ExportFormat::from_path(Path::new("out.JPG")), Some(ExportFormat::Jpeg));
        assert_eq!(ExportFormat::from_path(Path::new("out.png")), Some(ExportFormat::Png));
        assert_eq!(ExportFormat::from_path(Path::new("out.tiff")), None);
        assert_eq!("jpeg".parse::<ExportFormat>().unwrap(), ExportFormat::Jpeg);
    }
}
