//! # Splicer - Image splicing
//!
//! Splicer assembles several images into one composite: a horizontal strip,
//! a vertical strip, or a two-column flow grid. Images can be stamped with
//! sequence-number watermarks before they are laid out, and the result can
//! be saved as PNG or JPEG or copied to the clipboard.
//!
//! ## Features
//!
//! - **Three layouts**: strips centered on their cross axis, and a
//!   two-column grid packed row by row
//! - **Alpha-aware compositing**: every input is normalized to RGBA and
//!   blended source-over onto a transparent canvas
//! - **Watermarks**: `图1`, `图2`, ... with a drop shadow, using a system
//!   font or a built-in bitmap font
//! - **Flexible input**: file paths, drag-and-drop payloads, pasted paths
//!   and pasted pixels
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use splicer::prelude::*;
//!
//! let mut session = Session::new(SpliceConfig::default());
//! session.add_paths(["left.png", "right.jpg"])?;
//! session.config_mut().layout = LayoutMode::Vertical;
//! session.config_mut().watermark.enabled = true;
//!
//! session.splice()?;
//! session.save(Path::new("out.jpg"), None)?;
//! ```
//!
//! ## Architecture
//!
//! - [`core`]: image types, configuration and errors
//! - [`source`]: turning user input into decoded images
//! - [`pipeline`]: normalization, font selection and watermarking
//! - [`layout`]: layout plans and compositing
//! - [`export`]: file and clipboard encoders
//! - [`session`]: the image list and last composite of one user session

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod core;
pub mod export;
pub mod layout;
pub mod pipeline;
pub mod session;
pub mod source;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use splicer::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use crate::core::types::{
        CanonicalImage, Color, ExportFormat, ImageHandle, LayoutMode, PixelFormat, WatermarkColor,
    };

    // Configuration
    pub use crate::core::config::{ExportConfig, SpliceConfig, WatermarkConfig};

    // Errors
    pub use crate::core::error::{
        ConfigError, DecodeError, EncodeError, SplicerError, SplicerResult, UsageError,
    };

    // Layout
    pub use crate::layout::{splice, CompositeImage, LayoutPlan, Placement};

    // Pipeline
    pub use crate::pipeline::{FontLookup, SystemFonts, WatermarkFont};

    // Export
    pub use crate::export::{ClipboardBitmap, ClipboardSink, ClipboardSource, UnsupportedClipboard};
    #[cfg(feature = "clipboard")]
    pub use crate::export::SystemClipboard;

    // Session
    pub use crate::session::{Session, SessionEntry};

    pub use std::path::Path;
}

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
        assert_eq!(super::NAME, "splicer");
    }

    #[test]
    fn test_prelude_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.png");
        image::RgbImage::from_pixel(30, 20, image::Rgb([1, 2, 3]))
            .save(&a)
            .unwrap();

        let mut config = SpliceConfig::default();
        config.layout = LayoutMode::TwoColumnFlow;
        let mut session = Session::with_fonts(config, Box::new(SystemFonts::with_dirs(Vec::new())));
        session.add_paths([&a, &a]).unwrap();
        assert_eq!(session.len(), 1);

        let composite = session.splice().unwrap();
        assert!(composite.plan.is_none());
        assert_eq!(composite.dimensions(), (30, 20));
    }
}
