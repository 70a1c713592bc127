//! Clipboard access.
//!
//! The library only talks to the clipboard through [`ClipboardSink`] and
//! [`ClipboardSource`], so sessions can be driven without a desktop.

use image::RgbaImage;

use super::encoder::ClipboardBitmap;
use crate::core::error::EncodeError;

/// Accepts bitmaps for the platform clipboard.
pub trait ClipboardSink {
    /// Replace the clipboard content with `bitmap`.
    fn put_clipboard_bitmap(&mut self, bitmap: &ClipboardBitmap) -> Result<(), EncodeError>;
}

/// Reads what the user pasted.
pub trait ClipboardSource {
    /// Clipboard text, if any.
    fn read_text(&mut self) -> Option<String>;
    /// Clipboard pixels, if any.
    fn read_image(&mut self) -> Option<RgbaImage>;
}

/// A clipboard that is never available.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedClipboard;

impl ClipboardSink for UnsupportedClipboard {
    fn put_clipboard_bitmap(&mut self, _bitmap: &ClipboardBitmap) -> Result<(), EncodeError> {
        Err(EncodeError::ClipboardUnsupported)
    }
}

impl ClipboardSource for UnsupportedClipboard {
    fn read_text(&mut self) -> Option<String> {
        None
    }

    fn read_image(&mut self) -> Option<RgbaImage> {
        None
    }
}

#[cfg(feature = "clipboard")]
pub use system::SystemClipboard;

#[cfg(feature = "clipboard")]
mod system {
    use super::*;
    use std::borrow::Cow;

    /// The desktop clipboard, via `arboard`.
    pub struct SystemClipboard {
        inner: arboard::Clipboard,
    }

    impl SystemClipboard {
        /// Open the clipboard of the current desktop session.
        pub fn new() -> Result<Self, EncodeError> {
            let inner =
                arboard::Clipboard::new().map_err(|e| EncodeError::Clipboard(e.to_string()))?;
            Ok(Self { inner })
        }
    }

    impl std::fmt::Debug for SystemClipboard {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("SystemClipboard")
        }
    }

    impl ClipboardSink for SystemClipboard {
        fn put_clipboard_bitmap(&mut self, bitmap: &ClipboardBitmap) -> Result<(), EncodeError> {
            // arboard takes raw RGBA and rebuilds the platform bitmap from it.
            let pixels = bitmap.decode_pixels()?;
            let (width, height) = pixels.dimensions();
            let bytes: Vec<u8> = pixels
                .pixels()
                .flat_map(|p| [p[0], p[1], p[2], 255])
                .collect();

            let image_data = arboard::ImageData {
                width: width as usize,
                height: height as usize,
                bytes: Cow::Owned(bytes),
            };
            self.inner
                .set_image(image_data)
                .map_err(|e| EncodeError::Clipboard(e.to_string()))
        }
    }

    impl ClipboardSource for SystemClipboard {
        fn read_text(&mut self) -> Option<String> {
            self.inner.get_text().ok()
        }

        fn read_image(&mut self) -> Option<RgbaImage> {
            let data = self.inner.get_image().ok()?;
            RgbaImage::from_raw(data.width as u32, data.height as u32, data.bytes.into_owned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::CanonicalImage;
    use crate::export::encoder::clipboard_bitmap;
    use image::Rgba;

    #[test]
    fn test_unsupported_clipboard() {
        let image = CanonicalImage::from_rgba(RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 255])));
        let bitmap = clipboard_bitmap(&image).unwrap();

        let mut clipboard = UnsupportedClipboard;
        assert!(matches!(
            clipboard.put_clipboard_bitmap(&bitmap),
            Err(EncodeError::ClipboardUnsupported)
        ));
        assert!(clipboard.read_text().is_none());
        assert!(clipboard.read_image().is_none());
    }
}
