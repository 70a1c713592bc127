//! Error types for Splicer.
//!
//! Uses thiserror for structured errors with context. The taxonomy follows
//! what the caller has to do about a failure:
//! - [`UsageError`]: the user must correct the input; nothing changed
//! - [`DecodeError`]: a source image could not be read
//! - [`EncodeError`]: an export target could not be written
//! - [`ConfigError`]: a configuration file could not be loaded
//!
//! Degraded successes (such as a missing watermark font) are not errors and
//! are only logged.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::core::types::ExportFormat;

/// Top-level error type for Splicer.
///
/// Every user action (add, remove, splice, save, copy) returns this type, so
/// one action is one error boundary.
#[derive(Error, Debug)]
pub enum SplicerError {
    /// The input must be corrected
    #[error("Usage error: {0}")]
    Usage(#[from] UsageError),

    /// A source could not be decoded
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// An export failed
    #[error("Encode error: {0}")]
    Encode(#[from] EncodeError),

    /// A configuration file could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors caused by how the library was called.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UsageError {
    /// Splice was asked for with an empty image list
    #[error("No images selected")]
    NoImages,

    /// Remove was asked for with nothing selected
    #[error("No entries selected")]
    NoSelection,

    /// A selected index does not name an entry
    #[error("Index {index} is out of range for {len} image(s)")]
    IndexOutOfRange {
        /// The offending index
        index: usize,
        /// Number of entries at the time
        len: usize,
    },

    /// Layout mode name not recognized
    #[error("Unknown layout mode '{0}' (expected horizontal, vertical or grid)")]
    UnknownLayoutMode(String),

    /// Watermark color name not recognized
    #[error("Unknown watermark color '{0}' (expected red, white or black)")]
    UnknownColor(String),

    /// Export format name or extension not recognized
    #[error("Unknown export format '{0}' (expected png or jpg)")]
    UnknownFormat(String),

    /// Save or copy before any successful splice
    #[error("Nothing to export: splice some images first")]
    NothingToExport,

    /// The canvas would not fit in 32-bit dimensions
    #[error("Canvas of {width}x{height} pixels is too large")]
    CanvasTooLarge {
        /// Requested canvas width
        width: u64,
        /// Requested canvas height
        height: u64,
    },
}

/// Errors while turning a source into pixels.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The file could not be opened or decoded
    #[error("Failed to open image {path}: {source}")]
    Open {
        /// Source path
        path: PathBuf,
        /// Decoder error
        #[source]
        source: image::ImageError,
    },

    /// Raw pixel data is inconsistent with its dimensions
    #[error("Invalid raster: {0}")]
    InvalidRaster(String),
}

/// Errors while writing a composite to a sink.
#[derive(Error, Debug)]
pub enum EncodeError {
    /// The encoder rejected the image
    #[error("Failed to encode {format}: {source}")]
    Encode {
        /// Target format
        format: ExportFormat,
        /// Encoder error
        #[source]
        source: image::ImageError,
    },

    /// The output file could not be written
    #[error("Failed to write {path}: {source}")]
    Write {
        /// Output path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// No clipboard is available in this build
    #[error("Clipboard bitmaps are not supported on this platform")]
    ClipboardUnsupported,

    /// The clipboard or the bitmap conversion failed
    #[error("Clipboard error: {0}")]
    Clipboard(String),
}

/// Errors while loading a configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read
    #[error("Failed to read {path}: {source}")]
    Read {
        /// Config path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for [`SpliceConfig`](crate::core::config::SpliceConfig)
    #[error("Invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Broad category of a [`SplicerError`], used for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// See [`UsageError`]
    Usage,
    /// See [`DecodeError`]
    Decode,
    /// See [`EncodeError`]
    Encode,
    /// See [`ConfigError`]
    Config,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCategory::Usage => "usage",
            ErrorCategory::Decode => "decode",
            ErrorCategory::Encode => "encode",
            ErrorCategory::Config => "config",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Error Utilities
// ============================================================================

impl SplicerError {
    /// Category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            SplicerError::Usage(_) => ErrorCategory::Usage,
            SplicerError::Decode(_) => ErrorCategory::Decode,
            SplicerError::Encode(_) => ErrorCategory::Encode,
            SplicerError::Config(_) => ErrorCategory::Config,
        }
    }

    /// Check if the user can fix this by changing their input.
    pub fn is_usage(&self) -> bool {
        matches!(self, SplicerError::Usage(_))
    }

    /// Process exit status for this error: 2 for usage errors, 1 otherwise.
    pub fn exit_code(&self) -> u8 {
        if self.is_usage() {
            2
        } else {
            1
        }
    }

    /// Get suggestion for fixing this error.
    pub fn suggested_fix(&self) -> Option<String> {
        match self {
            SplicerError::Usage(UsageError::NoImages) => {
                Some("Add at least one image before splicing".to_string())
            }
            SplicerError::Usage(UsageError::NoSelection) => {
                Some("Select the entries to remove first".to_string())
            }
            SplicerError::Usage(UsageError::NothingToExport) => {
                Some("Run a splice before saving or copying".to_string())
            }
            SplicerError::Usage(UsageError::UnknownLayoutMode(_)) => {
                Some("Use one of: horizontal, vertical, grid".to_string())
            }
            SplicerError::Usage(UsageError::UnknownFormat(_)) => {
                Some("Use png or jpg, or give the output file one of those extensions".to_string())
            }
            SplicerError::Decode(DecodeError::Open { path, .. }) => Some(format!(
                "Check that '{}' is a readable jpg, png, bmp, gif or webp file",
                path.display()
            )),
            SplicerError::Encode(EncodeError::Write { path, .. }) => Some(format!(
                "Check that the directory of '{}' exists and is writable",
                path.display()
            )),
            SplicerError::Encode(EncodeError::ClipboardUnsupported) => {
                Some("Save the image to a file instead".to_string())
            }
            _ => None,
        }
    }
}

/// Result type alias for Splicer operations.
pub type SplicerResult<T> = Result<T, SplicerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_errors_are_usage() {
        let error = SplicerError::from(UsageError::NoImages);
        assert!(error.is_usage());
        assert_eq!(error.category(), ErrorCategory::Usage);
        assert_eq!(error.category().to_string(), "usage");
        assert_eq!(error.exit_code(), 2);
        assert!(error.suggested_fix().is_some());
    }

    #[test]
    fn test_decode_error_suggestion_names_path() {
        let error = SplicerError::from(DecodeError::Open {
            path: PathBuf::from("broken.png"),
            source: image::ImageError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "missing",
            )),
        });
        assert!(!error.is_usage());
        assert_eq!(error.category(), ErrorCategory::Decode);
        assert_eq!(error.exit_code(), 1);
        assert!(error.suggested_fix().unwrap().contains("broken.png"));
    }

    #[test]
    fn test_error_messages() {
        let error = UsageError::IndexOutOfRange { index: 4, len: 2 };
        assert_eq!(error.to_string(), "Index 4 is out of range for 2 image(s)");

        let error = EncodeError::ClipboardUnsupported;
        assert!(error.to_string().contains("not supported"));
    }
}
