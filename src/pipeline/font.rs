//! Watermark font selection.
//!
//! Candidates are tried in order through a [`FontLookup`]; the first one
//! that loads and parses wins. When none does, a built-in 8x8 bitmap font is
//! used, so selection never fails.

use ab_glyph::FontVec;
use font8x8::{UnicodeFonts, BASIC_FONTS};
use std::fmt;
use std::path::{Path, PathBuf};

/// Something that can turn a font name into font file bytes.
pub trait FontLookup {
    /// Bytes of the font called `candidate`, if available.
    fn load(&self, candidate: &str) -> Option<Vec<u8>>;
}

/// Finds fonts on the local filesystem.
///
/// A candidate that is itself a path to an existing file is read directly;
/// otherwise the platform font directories are searched for a file with
/// that name, ignoring case.
#[derive(Debug, Clone)]
pub struct SystemFonts {
    dirs: Vec<PathBuf>,
}

impl SystemFonts {
    /// Search the usual font directories of Windows, Linux and macOS.
    pub fn new() -> Self {
        let mut dirs = vec![
            PathBuf::from(r"C:\Windows\Fonts"),
            PathBuf::from("/usr/share/fonts"),
            PathBuf::from("/usr/local/share/fonts"),
            PathBuf::from("/Library/Fonts"),
            PathBuf::from("/System/Library/Fonts"),
        ];
        if let Some(home) = std::env::var_os("HOME") {
            let home = PathBuf::from(home);
            dirs.push(home.join(".fonts"));
            dirs.push(home.join(".local/share/fonts"));
            dirs.push(home.join("Library/Fonts"));
        }
        Self { dirs }
    }

    /// Search only the given directories.
    pub fn with_dirs(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }

    fn find(&self, name: &str) -> Option<PathBuf> {
        self.dirs
            .iter()
            .filter(|dir| dir.is_dir())
            .flat_map(|dir| {
                walkdir::WalkDir::new(dir)
                    .follow_links(true)
                    .into_iter()
                    .filter_map(|e| e.ok())
            })
            .find(|entry| {
                entry.file_type().is_file()
                    && entry.file_name().to_string_lossy().eq_ignore_ascii_case(name)
            })
            .map(|entry| entry.into_path())
    }
}

impl Default for SystemFonts {
    fn default() -> Self {
        Self::new()
    }
}

impl FontLookup for SystemFonts {
    fn load(&self, candidate: &str) -> Option<Vec<u8>> {
        let direct = Path::new(candidate);
        let path = if direct.is_file() {
            direct.to_path_buf()
        } else {
            self.find(candidate)?
        };
        std::fs::read(&path).ok()
    }
}

/// The font a watermark is drawn with.
pub enum WatermarkFont {
    /// A TrueType/OpenType face.
    Outline {
        /// Candidate name the face was loaded from
        name: String,
        /// The parsed face
        font: FontVec,
    },
    /// The built-in 8x8 bitmap font.
    Bitmap,
}

impl WatermarkFont {
    /// True when no candidate loaded.
    pub fn is_fallback(&self) -> bool {
        matches!(self, WatermarkFont::Bitmap)
    }
}

impl fmt::Debug for WatermarkFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WatermarkFont::Outline { name, .. } => f.debug_tuple("Outline").field(name).finish(),
            WatermarkFont::Bitmap => f.write_str("Bitmap"),
        }
    }
}

/// Pick the first candidate that loads; fall back to the bitmap font.
pub fn select_font<S: AsRef<str>>(candidates: &[S], lookup: &dyn FontLookup) -> WatermarkFont {
    for candidate in candidates {
        let name = candidate.as_ref();
        let Some(bytes) = lookup.load(name) else {
            log::debug!("Font {} not found", name);
            continue;
        };
        // Collections (.ttc) use their first face.
        match FontVec::try_from_vec_and_index(bytes, 0) {
            Ok(font) => {
                log::debug!("Using watermark font {}", name);
                return WatermarkFont::Outline {
                    name: name.to_string(),
                    font,
                };
            }
            Err(e) => log::debug!("Font {} is not usable: {}", name, e),
        }
    }

    log::warn!("No watermark font candidate could be loaded, using the built-in bitmap font");
    WatermarkFont::Bitmap
}

/// 8x8 glyph for 图, least significant bit leftmost.
const GLYPH_TU: [u8; 8] = [0xFF, 0x89, 0xBD, 0x99, 0xA5, 0x89, 0xA1, 0xFF];

/// Bitmap for `ch` in the built-in font. Unknown characters render as `?`.
pub fn bitmap_glyph(ch: char) -> [u8; 8] {
    if ch == '图' {
        return GLYPH_TU;
    }
    BASIC_FONTS
        .get(ch)
        .or_else(|| BASIC_FONTS.get('?'))
        .unwrap_or([0xFF; 8])
}
