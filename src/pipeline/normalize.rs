//! Color-mode normalization: every raster becomes RGBA8.

use image::{DynamicImage, RgbaImage};

use crate::core::types::{CanonicalImage, ImageHandle, IndexedRaster, Raster};

/// Convert any decoded raster to RGBA.
///
/// - RGBA passes through unchanged
/// - palette images resolve each index, including transparent entries
/// - everything else gets alpha = 255 on every pixel
pub fn normalize(handle: ImageHandle) -> CanonicalImage {
    let label = handle.label().to_string();
    let format = handle.pixel_format();

    let rgba = match handle.raster {
        Raster::Decoded(DynamicImage::ImageRgba8(rgba)) => rgba,
        Raster::Decoded(other) => other.to_rgba8(),
        Raster::Indexed(indexed) => expand_palette(&indexed),
    };

    log::debug!("Normalized {} from {:?} to RGBA", label, format);
    CanonicalImage::from_rgba(rgba)
}

/// Normalize a batch, preserving order.
pub fn normalize_all(handles: Vec<ImageHandle>) -> Vec<CanonicalImage> {
    handles.into_iter().map(normalize).collect()
}

fn expand_palette(indexed: &IndexedRaster) -> RgbaImage {
    let palette = indexed.palette();
    let mut buffer = Vec::with_capacity(indexed.indices().len() * 4);
    for &index in indexed.indices() {
        buffer.extend_from_slice(&palette[index as usize].0);
    }

    // Sizes were checked when the raster was built.
    RgbaImage::from_raw(indexed.width(), indexed.height(), buffer)
        .unwrap_or_else(|| RgbaImage::new(indexed.width(), indexed.height()))
}
