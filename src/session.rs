//! A splicing session: the ordered image list, the configuration and the
//! last composite.
//!
//! Every method is one user action. An action either completes or returns
//! an error and leaves the session as it was.

use image::imageops::FilterType;
use image::{DynamicImage, RgbaImage};
use std::path::{Path, PathBuf};
use tempfile::TempPath;

use crate::core::config::SpliceConfig;
use crate::core::error::{SplicerResult, UsageError};
use crate::core::types::ExportFormat;
use crate::export::{self, ClipboardSink, ClipboardSource};
use crate::layout::CompositeImage;
use crate::pipeline::{self, FontLookup, SystemFonts};
use crate::source::{self, ImageSource, ResolvedImage};

/// One image in the session list.
#[derive(Debug)]
pub struct SessionEntry {
    path: PathBuf,
    display_name: String,
    temp: Option<TempPath>,
}

impl SessionEntry {
    /// File the image is decoded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Name shown in the list.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// True for pasted pixel data backed by a temporary file.
    pub fn is_pasted(&self) -> bool {
        self.temp.is_some()
    }
}

impl From<ResolvedImage> for SessionEntry {
    fn from(resolved: ResolvedImage) -> Self {
        Self {
            path: resolved.path,
            display_name: resolved.display_name,
            temp: resolved.temp,
        }
    }
}

/// The state behind one splicing window.
pub struct Session {
    config: SpliceConfig,
    entries: Vec<SessionEntry>,
    composite: Option<CompositeImage>,
    fonts: Box<dyn FontLookup>,
}

impl Session {
    /// Empty session looking up watermark fonts on the system.
    pub fn new(config: SpliceConfig) -> Self {
        Self::with_fonts(config, Box::new(SystemFonts::new()))
    }

    /// Empty session with a custom font lookup.
    pub fn with_fonts(config: SpliceConfig, fonts: Box<dyn FontLookup>) -> Self {
        Self {
            config,
            entries: Vec::new(),
            composite: None,
            fonts,
        }
    }

    /// Current settings.
    pub fn config(&self) -> &SpliceConfig {
        &self.config
    }

    /// Settings take effect on the next [`Session::splice`].
    pub fn config_mut(&mut self) -> &mut SpliceConfig {
        &mut self.config
    }

    /// Entries in splice order.
    pub fn entries(&self) -> &[SessionEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no image has been added.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The last successful composite.
    pub fn composite(&self) -> Option<&CompositeImage> {
        self.composite.as_ref()
    }

    fn push_resolved(&mut self, resolved: Vec<ResolvedImage>) -> usize {
        let mut added = 0;
        for image in resolved {
            if image.temp.is_none() && self.entries.iter().any(|e| e.path == image.path) {
                log::debug!("Skipping duplicate {}", image.path.display());
                continue;
            }
            self.entries.push(image.into());
            added += 1;
        }
        added
    }

    fn add_source(&mut self, source: ImageSource) -> SplicerResult<usize> {
        let resolved = source::resolve(source)?;
        let added = self.push_resolved(resolved);
        log::info!("Added {} image(s), {} in session", added, self.entries.len());
        Ok(added)
    }

    /// Add one file. Returns how many entries were added (0 or 1).
    pub fn add_path(&mut self, path: impl Into<PathBuf>) -> SplicerResult<usize> {
        self.add_source(ImageSource::Path(path.into()))
    }

    /// Add several files in order.
    pub fn add_paths<I, P>(&mut self, paths: I) -> SplicerResult<usize>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut added = 0;
        for path in paths {
            added += self.add_path(path)?;
        }
        Ok(added)
    }

    /// Add the files of a drag-and-drop payload.
    pub fn add_dropped(&mut self, raw: &str) -> SplicerResult<usize> {
        self.add_source(ImageSource::Dropped(raw.to_string()))
    }

    /// Add the files named in pasted text, one per line.
    pub fn add_pasted_text(&mut self, raw: &str) -> SplicerResult<usize> {
        self.add_source(ImageSource::PastedText(raw.to_string()))
    }

    /// Add pasted pixels as `Pasted Image N.png`.
    pub fn add_pasted_pixels(&mut self, pixels: RgbaImage) -> SplicerResult<usize> {
        let name = self.next_paste_name();
        let mut resolved = source::resolve(ImageSource::PastedPixels(pixels))?;
        for image in &mut resolved {
            image.display_name = name.clone();
        }
        let added = self.push_resolved(resolved);
        log::info!("Added {}, {} in session", name, self.entries.len());
        Ok(added)
    }

    fn next_paste_name(&self) -> String {
        (1..)
            .map(|n| format!("Pasted Image {}.png", n))
            .find(|name| !self.entries.iter().any(|e| &e.display_name == name))
            .unwrap_or_default()
    }

    /// Paste from the clipboard.
    ///
    /// Text naming image files wins; pixel data is only used when the text
    /// added nothing.
    pub fn paste(&mut self, clipboard: &mut dyn ClipboardSource) -> SplicerResult<usize> {
        if let Some(text) = clipboard.read_text() {
            let added = self.add_pasted_text(&text)?;
            if added > 0 {
                return Ok(added);
            }
        }

        match clipboard.read_image() {
            Some(pixels) => self.add_pasted_pixels(pixels),
            None => {
                log::warn!("Clipboard holds no image or image path");
                Ok(0)
            }
        }
    }

    /// Remove the entries at `indices`.
    pub fn remove(&mut self, indices: &[usize]) -> SplicerResult<()> {
        if indices.is_empty() {
            return Err(UsageError::NoSelection.into());
        }

        let len = self.entries.len();
        if let Some(&index) = indices.iter().find(|&&i| i >= len) {
            return Err(UsageError::IndexOutOfRange { index, len }.into());
        }

        let mut sorted = indices.to_vec();
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        sorted.dedup();
        for index in sorted {
            let entry = self.entries.remove(index);
            log::debug!("Removed {}", entry.display_name);
        }
        Ok(())
    }

    /// Drop every entry and the composite.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.composite = None;
        log::info!("Session cleared");
    }

    /// Decode, normalize, stamp and lay out the current list.
    ///
    /// On failure the previous composite is kept.
    pub fn splice(&mut self) -> SplicerResult<&CompositeImage> {
        let paths: Vec<&Path> = self.entries.iter().map(|e| e.path.as_path()).collect();
        let composite = pipeline::run(&paths, &self.config, self.fonts.as_ref())?;
        Ok(self.composite.insert(composite))
    }

    fn current(&self) -> SplicerResult<&CompositeImage> {
        self.composite
            .as_ref()
            .ok_or_else(|| UsageError::NothingToExport.into())
    }

    /// The composite scaled down to fit `max_width` x `max_height`.
    /// Never scales up.
    pub fn preview(&self, max_width: u32, max_height: u32) -> SplicerResult<RgbaImage> {
        let rgba = self.current()?.image.as_rgba();
        let (width, height) = rgba.dimensions();

        let ratio = f64::min(
            max_width as f64 / width as f64,
            max_height as f64 / height as f64,
        );
        if ratio >= 1.0 {
            return Ok(rgba.clone());
        }

        let new_width = ((width as f64 * ratio) as u32).max(1);
        let new_height = ((height as f64 * ratio) as u32).max(1);
        Ok(image::imageops::resize(rgba, new_width, new_height, FilterType::Lanczos3))
    }

    /// Entry `index` scaled to fit `width` x `height`, keeping aspect ratio.
    pub fn thumbnail(&self, index: usize, width: u32, height: u32) -> SplicerResult<RgbaImage> {
        let entry = self.entries.get(index).ok_or(UsageError::IndexOutOfRange {
            index,
            len: self.entries.len(),
        })?;

        let rgba = pipeline::normalize(source::decode(&entry.path)?).into_rgba();
        Ok(DynamicImage::ImageRgba8(rgba)
            .resize(width, height, FilterType::Lanczos3)
            .to_rgba8())
    }

    /// Save the composite to `path`.
    ///
    /// Without an explicit format it is inferred from the extension, falling
    /// back to the configured format. Returns the format written.
    pub fn save(&self, path: &Path, format: Option<ExportFormat>) -> SplicerResult<ExportFormat> {
        let composite = self.current()?;
        let format = format
            .or_else(|| ExportFormat::from_path(path))
            .unwrap_or(self.config.export.format);

        export::save(&composite.image, path, format, self.config.export.jpeg_quality)?;
        Ok(format)
    }

    /// Put the composite on the clipboard as a bitmap.
    pub fn copy(&self, clipboard: &mut dyn ClipboardSink) -> SplicerResult<()> {
        let composite = self.current()?;
        let bitmap = export::clipboard_bitmap(&composite.image)?;
        clipboard.put_clipboard_bitmap(&bitmap)?;

        let (width, height) = bitmap.dimensions();
        log::info!("Copied {}x{} composite to the clipboard", width, height);
        Ok(())
    }
}
