//! Splice configuration.
//!
//! All tunable behavior lives in [`SpliceConfig`]. Defaults reproduce the
//! interactive tool; a TOML file given explicitly by the caller may override
//! any subset of fields. Nothing is ever written back.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::error::ConfigError;
use crate::core::types::{ExportFormat, LayoutMode, WatermarkColor};

/// Everything a splice needs besides the images.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SpliceConfig {
    /// Arrangement of images on the canvas.
    pub layout: LayoutMode,
    /// Sequence-number stamping.
    pub watermark: WatermarkConfig,
    /// File export settings.
    pub export: ExportConfig,
}

/// Largest accepted watermark font size, in pixels.
pub const MAX_FONT_SIZE: f32 = 512.0;

/// Largest accepted distance of the label or its shadow from the image
/// corner, in pixels, in either direction.
pub const MAX_OFFSET: i32 = 1 << 16;

/// Watermark settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WatermarkConfig {
    /// Stamp `图N` onto each image before splicing.
    pub enabled: bool,
    /// Label color; the shadow color follows from it.
    pub color: WatermarkColor,
    /// Font size in pixels for outline fonts.
    pub font_size: f32,
    /// Top-left corner of the label, relative to the image.
    pub offset: (i32, i32),
    /// Distance of the shadow down and right of the label.
    pub shadow_offset: i32,
    /// Font files tried in order; the first that loads wins.
    pub font_candidates: Vec<String>,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            color: WatermarkColor::Red,
            font_size: 20.0,
            offset: (10, 10),
            shadow_offset: 1,
            font_candidates: vec![
                "msyh.ttc".to_string(),
                "msyh.ttf".to_string(),
                "simsun.ttc".to_string(),
                "arial.ttf".to_string(),
                "DejaVuSans.ttf".to_string(),
            ],
        }
    }
}

impl WatermarkConfig {
    /// Pull sizes and offsets into the ranges the stamper can draw.
    ///
    /// A non-finite font size falls back to the default.
    pub fn clamp_ranges(&mut self) {
        self.font_size = if self.font_size.is_finite() {
            self.font_size.clamp(1.0, MAX_FONT_SIZE)
        } else {
            Self::default().font_size
        };
        self.offset = (
            self.offset.0.clamp(-MAX_OFFSET, MAX_OFFSET),
            self.offset.1.clamp(-MAX_OFFSET, MAX_OFFSET),
        );
        self.shadow_offset = self.shadow_offset.clamp(-MAX_OFFSET, MAX_OFFSET);
    }
}

/// Export settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    /// Used when the output path has no recognised extension.
    pub format: ExportFormat,
    /// JPEG quality, 1-100.
    pub jpeg_quality: u8,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: ExportFormat::Png,
            jpeg_quality: 95,
        }
    }
}

impl SpliceConfig {
    /// Parse a configuration from TOML text.
    ///
    /// # Example
    /// ```rust
    /// use splicer::core::config::SpliceConfig;
    /// use splicer::core::types::LayoutMode;
    ///
    /// let config = SpliceConfig::from_toml_str("layout = \"vertical\"").unwrap();
    /// assert_eq!(config.layout, LayoutMode::Vertical);
    /// ```
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let mut config: SpliceConfig = toml::from_str(text)?;
        config.export.jpeg_quality = config.export.jpeg_quality.clamp(1, 100);
        config.watermark.clamp_ranges();
        Ok(config)
    }

    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }
}
