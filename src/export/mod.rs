//! Export encoder: files and clipboard.

pub mod clipboard;
pub mod encoder;

#[cfg(feature = "clipboard")]
pub use clipboard::SystemClipboard;
pub use clipboard::{ClipboardSink, ClipboardSource, UnsupportedClipboard};
pub use encoder::{
    clipboard_bitmap, drop_alpha, encode, flatten_onto, save, ClipboardBitmap,
    BMP_FILE_HEADER_LEN,
};
