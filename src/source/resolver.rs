//! Turns user inputs (selected files, dropped payloads, pasted text or
//! pasted pixels) into an ordered list of image files.

use image::RgbaImage;
use std::path::{Path, PathBuf};
use tempfile::TempPath;

use crate::core::error::EncodeError;

/// File extensions accepted at ingestion, compared case-insensitively.
pub const SUPPORTED_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "bmp", "gif", "webp"];

/// Where a batch of images comes from.
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// A path chosen explicitly.
    Path(PathBuf),
    /// The raw payload of a drag-and-drop event.
    Dropped(String),
    /// Clipboard text, one path per line.
    PastedText(String),
    /// Clipboard pixel data.
    PastedPixels(RgbaImage),
}

/// A file ready for decoding.
#[derive(Debug)]
pub struct ResolvedImage {
    /// File to decode.
    pub path: PathBuf,
    /// Name shown to the user.
    pub display_name: String,
    /// Keeps a materialized paste alive; the file is deleted on drop.
    pub temp: Option<TempPath>,
}

impl ResolvedImage {
    fn from_path(path: PathBuf) -> Self {
        let display_name = display_name(&path);
        Self {
            path,
            display_name,
            temp: None,
        }
    }
}

/// Check the extension against [`SUPPORTED_EXTENSIONS`].
pub fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .is_some_and(|e| SUPPORTED_EXTENSIONS.contains(&e.as_str()))
}

/// An existing regular file with a supported extension.
pub fn is_supported(path: &Path) -> bool {
    path.is_file() && has_supported_extension(path)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn strip_quotes(token: &str) -> &str {
    token.trim_matches(|c| c == '"' || c == '\'')
}

/// Split a drag-and-drop payload into paths.
///
/// Payloads arrive as Tcl-style lists: whitespace separates entries and
/// `{...}` groups a path that contains spaces. A payload that is itself an
/// existing path is taken verbatim.
pub fn parse_drop_list(raw: &str) -> Vec<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Vec::new();
    }
    if Path::new(raw).exists() {
        return vec![raw.to_string()];
    }

    let mut tokens = Vec::new();
    let mut chars = raw.chars().peekable();
    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        let mut token = String::new();
        match c {
            '{' => {
                chars.next();
                let mut depth = 1;
                for c in chars.by_ref() {
                    match c {
                        '{' => depth += 1,
                        '}' => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                        }
                        _ => {}
                    }
                    token.push(c);
                }
            }
            '"' => {
                chars.next();
                for c in chars.by_ref() {
                    if c == '"' {
                        break;
                    }
                    token.push(c);
                }
            }
            _ => {
                while let Some(&c) = chars.peek() {
                    if c.is_whitespace() {
                        break;
                    }
                    token.push(c);
                    chars.next();
                }
            }
        }

        let token = strip_quotes(&token);
        if !token.is_empty() {
            tokens.push(token.to_string());
        }
    }
    tokens
}

/// Split pasted text into candidate paths, one per line.
pub fn parse_pasted_text(raw: &str) -> Vec<String> {
    raw.replace("\r\n", "\n")
        .split('\n')
        .map(|line| strip_quotes(line.trim()))
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Write pasted pixels to a temporary PNG so they can enter the pipeline
/// like any other file. The file is removed when the handle drops.
pub fn materialize_pixels(pixels: &RgbaImage) -> Result<TempPath, EncodeError> {
    let file = tempfile::Builder::new()
        .prefix("pasted_img_")
        .suffix(".png")
        .tempfile()
        .map_err(|source| EncodeError::Write {
            path: std::env::temp_dir(),
            source,
        })?;
    let path = file.into_temp_path();

    pixels
        .save_with_format(&path, image::ImageFormat::Png)
        .map_err(|source| EncodeError::Encode {
            format: crate::core::types::ExportFormat::Png,
            source,
        })?;

    log::debug!(
        "Materialized {}x{} pasted pixels at {}",
        pixels.width(),
        pixels.height(),
        path.display()
    );
    Ok(path)
}

/// Resolve one source into decodable files, in order.
///
/// Entries that are missing or have an unsupported extension are dropped
/// silently.
pub fn resolve(source: ImageSource) -> Result<Vec<ResolvedImage>, EncodeError> {
    let candidates: Vec<PathBuf> = match source {
        ImageSource::Path(path) => vec![path],
        ImageSource::Dropped(raw) => parse_drop_list(&raw).into_iter().map(PathBuf::from).collect(),
        ImageSource::PastedText(raw) => {
            parse_pasted_text(&raw).into_iter().map(PathBuf::from).collect()
        }
        ImageSource::PastedPixels(pixels) => {
            let temp = materialize_pixels(&pixels)?;
            return Ok(vec![ResolvedImage {
                path: temp.to_path_buf(),
                display_name: "Pasted Image.png".to_string(),
                temp: Some(temp),
            }]);
        }
    };

    Ok(candidates
        .into_iter()
        .filter(|path| {
            let keep = is_supported(path);
            if !keep {
                log::debug!("Skipping unsupported input {}", path.display());
            }
            keep
        })
        .map(ResolvedImage::from_path)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_filter() {
        assert!(has_supported_extension(Path::new("a.PNG")));
        assert!(has_supported_extension(Path::new("dir/b.JpEg")));
        assert!(has_supported_extension(Path::new("c.webp")));
        assert!(!has_supported_extension(Path::new("d.tiff")));
        assert!(!has_supported_extension(Path::new("noext")));
    }

    #[test]
    fn test_drop_list_braces_and_plain() {
        let paths = parse_drop_list("{/tmp/my photos/a.png} /tmp/b.jpg {/tmp/c d.gif}");
        assert_eq!(paths, vec!["/tmp/my photos/a.png", "/tmp/b.jpg", "/tmp/c d.gif"]);
    }

    #[test]
    fn test_drop_list_quotes() {
        let paths = parse_drop_list("\"/tmp/x y.png\" '/tmp/z.png'");
        assert_eq!(paths, vec!["/tmp/x y.png", "/tmp/z.png"]);
        assert!(parse_drop_list("   ").is_empty());
    }

    #[test]
    fn test_drop_list_existing_path_with_spaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("with space.png");
        std::fs::write(&path, b"x").unwrap();

        let raw = path.to_string_lossy().to_string();
        assert_eq!(parse_drop_list(&raw), vec![raw.clone()]);
    }

    #[test]
    fn test_pasted_text() {
        let paths = parse_pasted_text("\"/a.png\"\r\n\n  /b.jpg  \r\n'/c.gif'");
        assert_eq!(paths, vec!["/a.png", "/b.jpg", "/c.gif"]);
    }

    #[test]
    fn test_resolve_filters_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.png");
        let bad = dir.path().join("notes.txt");
        std::fs::write(&good, b"x").unwrap();
        std::fs::write(&bad, b"x").unwrap();

        let text = format!("{}\n{}\n{}", good.display(), bad.display(), "/missing.png");
        let resolved = resolve(ImageSource::PastedText(text)).unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].path, good);
        assert_eq!(resolved[0].display_name, "good.png");
    }

    #[test]
    fn test_materialized_paste_is_removed_on_drop() {
        let pixels = RgbaImage::from_pixel(3, 2, image::Rgba([1, 2, 3, 255]));
        let resolved = resolve(ImageSource::PastedPixels(pixels)).unwrap();
        assert_eq!(resolved.len(), 1);

        let path = resolved[0].path.clone();
        assert!(path.exists());
        let decoded = image::open(&path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (3, 2));

        drop(resolved);
        assert!(!path.exists());
    }
}
