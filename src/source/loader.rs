//! Decoding files into [`ImageHandle`]s.

use std::path::Path;

use crate::core::error::DecodeError;
use crate::core::types::ImageHandle;

/// Decode one image file.
pub fn decode(path: &Path) -> Result<ImageHandle, DecodeError> {
    let image = image::ImageReader::open(path)
        .map_err(|e| DecodeError::Open {
            path: path.to_path_buf(),
            source: image::ImageError::IoError(e),
        })?
        .with_guessed_format()
        .map_err(|e| DecodeError::Open {
            path: path.to_path_buf(),
            source: image::ImageError::IoError(e),
        })?
        .decode()
        .map_err(|source| DecodeError::Open {
            path: path.to_path_buf(),
            source,
        })?;

    log::debug!(
        "Decoded {} ({}x{}, {:?})",
        path.display(),
        image.width(),
        image.height(),
        image.color()
    );
    Ok(ImageHandle::from_dynamic(image, path.display().to_string()))
}

/// Decode a batch in order.
///
/// The first failure aborts the batch; handles decoded before it are
/// dropped with the partial vector.
pub fn decode_all<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<ImageHandle>, DecodeError> {
    paths.iter().map(|p| decode(p.as_ref())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::PixelFormat;
    use image::{GrayImage, RgbImage};

    #[test]
    fn test_decode_keeps_pixel_format() {
        let dir = tempfile::tempdir().unwrap();
        let gray_path = dir.path().join("gray.png");
        let rgb_path = dir.path().join("rgb.bmp");
        GrayImage::from_pixel(4, 3, image::Luma([90])).save(&gray_path).unwrap();
        RgbImage::from_pixel(2, 5, image::Rgb([1, 2, 3])).save(&rgb_path).unwrap();

        let handles = decode_all(&[gray_path, rgb_path]).unwrap();
        assert_eq!(handles[0].pixel_format(), PixelFormat::Grayscale);
        assert_eq!(handles[0].dimensions(), (4, 3));
        assert_eq!(handles[1].pixel_format(), PixelFormat::Rgb);
        assert_eq!(handles[1].dimensions(), (2, 5));
    }

    #[test]
    fn test_decode_failure_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.png");
        let bad = dir.path().join("bad.png");
        RgbImage::new(1, 1).save(&good).unwrap();
        std::fs::write(&bad, b"definitely not a png").unwrap();

        match decode_all(&[good, bad.clone()]) {
            Err(DecodeError::Open { path, .. }) => assert_eq!(path, bad),
            other => panic!("expected decode failure, got {:?}", other.map(|v| v.len())),
        }
    }
}
