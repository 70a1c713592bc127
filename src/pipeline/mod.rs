//! The splice pipeline: decode, normalize, stamp and composite.
//!
//! Each stage owns its output and hands it to the next; nothing is shared
//! between runs.

pub mod font;
pub mod normalize;
pub mod watermark;

pub use font::{bitmap_glyph, select_font, FontLookup, SystemFonts, WatermarkFont};
pub use normalize::{normalize, normalize_all};
pub use watermark::{label_for, stamp, stamp_all};

use std::path::Path;
use std::time::Instant;

use crate::core::config::SpliceConfig;
use crate::core::error::{SplicerResult, UsageError};
use crate::layout::{splice, CompositeImage};
use crate::source::decode_all;

/// Run the whole pipeline over `paths` in order.
///
/// Fonts are only looked up when the watermark is enabled.
pub fn run<P: AsRef<Path>>(
    paths: &[P],
    config: &SpliceConfig,
    fonts: &dyn FontLookup,
) -> SplicerResult<CompositeImage> {
    if paths.is_empty() {
        return Err(UsageError::NoImages.into());
    }

    let start = Instant::now();

    let handles = decode_all(paths)?;
    log::debug!("Decoded {} image(s) in {:?}", handles.len(), start.elapsed());

    let images = normalize_all(handles);

    let images = if config.watermark.enabled {
        let font = select_font(&config.watermark.font_candidates, fonts);
        stamp_all(images, &config.watermark, &font)
    } else {
        images
    };

    let composite = splice(images, config.layout)?;
    let (width, height) = composite.dimensions();
    log::info!(
        "Spliced {} image(s) {} into {}x{} in {:?}",
        paths.len(),
        config.layout,
        width,
        height,
        start.elapsed()
    );

    Ok(composite)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::SplicerError;
    use crate::core::types::LayoutMode;
    use image::{Rgb, RgbImage, Rgba};

    struct NoFonts;

    impl FontLookup for NoFonts {
        fn load(&self, _candidate: &str) -> Option<Vec<u8>> {
            None
        }
    }

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> std::path::PathBuf {
        let path = dir.join(name);
        RgbImage::from_pixel(width, height, Rgb([50, 60, 70]))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn test_run_vertical() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_png(dir.path(), "a.png", 100, 50);
        let b = write_png(dir.path(), "b.png", 100, 50);

        let config = SpliceConfig {
            layout: LayoutMode::Vertical,
            ..SpliceConfig::default()
        };
        let out = run(&[a, b], &config, &NoFonts).unwrap();

        assert_eq!(out.dimensions(), (100, 100));
        assert_eq!(*out.image.as_rgba().get_pixel(0, 99), Rgba([50, 60, 70, 255]));
    }

    #[test]
    fn test_run_with_watermark_falls_back_to_bitmap_font() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_png(dir.path(), "a.png", 60, 40);

        let mut config = SpliceConfig::default();
        config.watermark.enabled = true;
        let out = run(&[a], &config, &NoFonts).unwrap();

        assert_eq!(*out.image.as_rgba().get_pixel(10, 10), Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_run_requires_inputs() {
        let paths: [&str; 0] = [];
        let err = run(&paths, &SpliceConfig::default(), &NoFonts).unwrap_err();
        assert!(matches!(err, SplicerError::Usage(UsageError::NoImages)));
    }

    #[test]
    fn test_run_reports_decode_failure() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("bad.png");
        std::fs::write(&bad, b"not an image").unwrap();

        let err = run(&[bad], &SpliceConfig::default(), &NoFonts).unwrap_err();
        assert!(matches!(err, SplicerError::Decode(_)));
    }
}
