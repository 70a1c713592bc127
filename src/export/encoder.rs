//! File and clipboard encoders for composites.
//!
//! PNG keeps alpha verbatim. JPEG has no alpha channel, so the composite is
//! flattened onto white first. Clipboard bitmaps drop alpha without
//! compositing.

use image::codecs::bmp::BmpEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, Rgb, RgbImage, Rgba, RgbaImage};
use std::io::Write;
use std::path::Path;

use crate::core::error::EncodeError;
use crate::core::types::{CanonicalImage, ExportFormat};
use crate::layout::blend_over;

/// Size of the BMP file header in front of the DIB.
pub const BMP_FILE_HEADER_LEN: usize = 14;

/// Composite `rgba` over an opaque `background` and discard alpha.
pub fn flatten_onto(rgba: &RgbaImage, background: Rgb<u8>) -> RgbImage {
    let [r, g, b] = background.0;
    let base = Rgba([r, g, b, 255]);
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, _] = blend_over(base, *rgba.get_pixel(x, y)).0;
        Rgb([r, g, b])
    })
}

/// Keep the color channels as they are and throw alpha away.
pub fn drop_alpha(rgba: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, _] = rgba.get_pixel(x, y).0;
        Rgb([r, g, b])
    })
}

/// Encode the composite in `format`. `quality` only applies to JPEG.
pub fn encode(
    image: &CanonicalImage,
    format: ExportFormat,
    quality: u8,
) -> Result<Vec<u8>, EncodeError> {
    let rgba = image.as_rgba();
    let (width, height) = rgba.dimensions();
    let mut bytes = Vec::new();

    let result = match format {
        ExportFormat::Png => PngEncoder::new(&mut bytes).write_image(
            rgba.as_raw(),
            width,
            height,
            ExtendedColorType::Rgba8,
        ),
        ExportFormat::Jpeg => {
            let rgb = flatten_onto(rgba, Rgb([255, 255, 255]));
            JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100)).encode(
                rgb.as_raw(),
                width,
                height,
                ExtendedColorType::Rgb8,
            )
        }
    };
    result.map_err(|source| EncodeError::Encode { format, source })?;

    Ok(bytes)
}

/// Encode and write to `path`.
///
/// Bytes go to a temporary file next to `path` that is renamed into place
/// once complete, so a failure never leaves a partial file behind.
pub fn save(
    image: &CanonicalImage,
    path: &Path,
    format: ExportFormat,
    quality: u8,
) -> Result<(), EncodeError> {
    let bytes = encode(image, format, quality)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let write_err = |source| EncodeError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut file = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
    file.write_all(&bytes).map_err(write_err)?;
    file.persist(path).map_err(|e| write_err(e.error))?;

    log::info!(
        "Saved {}x{} {} to {} ({} bytes)",
        image.width(),
        image.height(),
        format,
        path.display(),
        bytes.len()
    );
    Ok(())
}

/// What goes onto the clipboard: a 24-bit DIB, i.e. a BMP file without its
/// 14-byte file header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardBitmap {
    dib: Vec<u8>,
    width: u32,
    height: u32,
}

impl ClipboardBitmap {
    /// The DIB bytes handed to the clipboard.
    pub fn dib(&self) -> &[u8] {
        &self.dib
    }

    /// Pixel dimensions (width, height).
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Decode the DIB back into pixels, for clipboards that only take raw
    /// images.
    pub fn decode_pixels(&self) -> Result<RgbImage, EncodeError> {
        let header_size = self
            .dib
            .get(..4)
            .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]) as usize)
            .filter(|&size| size >= 40 && size <= self.dib.len())
            .ok_or_else(|| EncodeError::Clipboard("malformed DIB header".to_string()))?;

        // 24-bit DIBs carry no palette, so pixels follow the info header.
        let file_len = (BMP_FILE_HEADER_LEN + self.dib.len()) as u32;
        let data_offset = (BMP_FILE_HEADER_LEN + header_size) as u32;
        let mut bmp = Vec::with_capacity(file_len as usize);
        bmp.extend_from_slice(b"BM");
        bmp.extend_from_slice(&file_len.to_le_bytes());
        bmp.extend_from_slice(&0u32.to_le_bytes());
        bmp.extend_from_slice(&data_offset.to_le_bytes());
        bmp.extend_from_slice(&self.dib);

        image::load_from_memory_with_format(&bmp, image::ImageFormat::Bmp)
            .map(|image| image.to_rgb8())
            .map_err(|e| EncodeError::Clipboard(e.to_string()))
    }
}

/// Build the clipboard payload: alpha dropped, BMP encoded, header stripped.
pub fn clipboard_bitmap(image: &CanonicalImage) -> Result<ClipboardBitmap, EncodeError> {
    let rgb = drop_alpha(image.as_rgba());
    let (width, height) = rgb.dimensions();

    let mut bmp = Vec::new();
    BmpEncoder::new(&mut bmp)
        .encode(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::Clipboard(e.to_string()))?;

    if bmp.len() < BMP_FILE_HEADER_LEN {
        return Err(EncodeError::Clipboard("BMP payload too short".to_string()));
    }
    let dib = bmp.split_off(BMP_FILE_HEADER_LEN);

    Ok(ClipboardBitmap { dib, width, height })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn half_transparent() -> CanonicalImage {
        let mut rgba = RgbaImage::from_pixel(16, 16, Rgba([0, 0, 0, 0]));
        for x in 0..8 {
            for y in 0..16 {
                rgba.put_pixel(x, y, Rgba([20, 40, 60, 255]));
            }
        }
        CanonicalImage::from_rgba(rgba)
    }

    #[test]
    fn test_flatten_onto_white() {
        let flat = flatten_onto(half_transparent().as_rgba(), Rgb([255, 255, 255]));
        assert_eq!(*flat.get_pixel(0, 0), Rgb([20, 40, 60]));
        assert_eq!(*flat.get_pixel(15, 15), Rgb([255, 255, 255]));
    }

    #[test]
    fn test_drop_alpha_does_not_composite() {
        let rgba = RgbaImage::from_pixel(1, 1, Rgba([9, 8, 7, 0]));
        assert_eq!(*drop_alpha(&rgba).get_pixel(0, 0), Rgb([9, 8, 7]));
    }

    #[test]
    fn test_png_keeps_alpha() {
        let image = half_transparent();
        let bytes = encode(&image, ExportFormat::Png, 95).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(&decoded, image.as_rgba());
    }

    #[test]
    fn test_jpeg_has_no_alpha_and_white_background() {
        let bytes = encode(&half_transparent(), ExportFormat::Jpeg, 95).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert!(!decoded.color().has_alpha());

        let rgb = decoded.to_rgb8();
        let corner = rgb.get_pixel(15, 15);
        assert!(corner.0.iter().all(|&c| c >= 245), "not white: {:?}", corner);
    }

    #[test]
    fn test_save_writes_file_and_leaves_no_temp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        save(&half_transparent(), &path, ExportFormat::Png, 95).unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(image::open(&path).unwrap().width(), 16);
    }

    #[test]
    fn test_save_into_missing_dir_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.png");
        let err = save(&half_transparent(), &path, ExportFormat::Png, 95).unwrap_err();
        assert!(matches!(err, EncodeError::Write { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn test_clipboard_bitmap_strips_file_header() {
        let image = half_transparent();
        let bitmap = clipboard_bitmap(&image).unwrap();

        let mut full = Vec::new();
        BmpEncoder::new(&mut full)
            .encode(drop_alpha(image.as_rgba()).as_raw(), 16, 16, ExtendedColorType::Rgb8)
            .unwrap();
        assert_eq!(&full[..2], b"BM");
        assert_eq!(bitmap.dib(), &full[BMP_FILE_HEADER_LEN..]);
        assert_eq!(bitmap.dimensions(), (16, 16));

        // DIB starts with its own header size.
        let dib = bitmap.dib();
        let header_size = u32::from_le_bytes([dib[0], dib[1], dib[2], dib[3]]);
        assert!(header_size >= 40);
    }

    #[test]
    fn test_clipboard_dib_decodes_to_channel_dropped_pixels() {
        let image = half_transparent();
        let pixels = clipboard_bitmap(&image).unwrap().decode_pixels().unwrap();

        assert_eq!(pixels, drop_alpha(image.as_rgba()));
        // Transparent black stays black: no compositing against white.
        assert_eq!(*pixels.get_pixel(15, 0), Rgb([0, 0, 0]));
        assert_eq!(*pixels.get_pixel(0, 0), Rgb([20, 40, 60]));
    }

    #[test]
    fn test_malformed_dib_is_an_error() {
        let bitmap = ClipboardBitmap {
            dib: vec![1, 2, 3],
            width: 1,
            height: 1,
        };
        assert!(matches!(bitmap.decode_pixels(), Err(EncodeError::Clipboard(_))));
    }
}
