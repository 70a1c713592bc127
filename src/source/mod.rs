//! Image Source Resolver.
//!
//! Normalizes file selections, drag-and-drop payloads and clipboard
//! content into an ordered list of decodable image files, then decodes them.

pub mod loader;
pub mod resolver;

pub use loader::{decode, decode_all};
pub use resolver::{
    has_supported_extension, is_supported, materialize_pixels, parse_drop_list,
    parse_pasted_text, resolve, ImageSource, ResolvedImage, SUPPORTED_EXTENSIONS,
};
