//! Core types for the Splicer pipeline.
//!
//! This module contains the foundational pieces every stage shares:
//! - Raster types (ImageHandle, CanonicalImage)
//! - User choices (LayoutMode, WatermarkColor, ExportFormat)
//! - Configuration
//! - Error types

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{ExportConfig, SpliceConfig, WatermarkConfig};
pub use error::{ConfigError, DecodeError, EncodeError, SplicerError, SplicerResult, UsageError};
pub use types::{
    CanonicalImage, Color, ExportFormat, ImageHandle, LayoutMode, PixelFormat, WatermarkColor,
};
