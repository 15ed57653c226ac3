//! Structured error types for grid construction.
//!
//! Structural problems (empty input, capacity, label counts, bad alignment or
//! colors) are reported before any image is decoded. Decode and save failures
//! carry the offending path so callers can point at the bad input.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The unified error type returned by all public gridcanvas API functions.
#[derive(Debug, Error)]
pub enum GridError {
    /// No images were supplied.
    #[error("no images supplied; a grid needs at least one image")]
    EmptyInput,

    /// Explicit rows × cols cannot hold every image.
    #[error("too many images ({images}) for a {rows}x{cols} grid")]
    InsufficientCapacity {
        rows: usize,
        cols: usize,
        images: usize,
    },

    /// A label list does not match the dimension it annotates.
    #[error("expected {expected} {kind} but got {actual}")]
    LabelCountMismatch {
        kind: LabelKind,
        expected: usize,
        actual: usize,
    },

    /// An alignment string outside `left`, `center`, `right`.
    #[error("alignment must be 'left', 'center', or 'right', got '{0}'")]
    InvalidAlignment(String),

    /// A color string that is neither a known name nor a hex/rgb() value.
    #[error("unrecognized color '{0}'")]
    InvalidColor(String),

    /// A configuration value outside its allowed range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A font file could not be read or parsed. Grid construction recovers
    /// from this by falling back to a system or the bundled face.
    #[error("failed to load font '{}': {reason}", path.display())]
    FontLoadFailure { path: PathBuf, reason: String },

    /// An image source could not be read or decoded.
    #[error("failed to decode image #{index} ('{path}'): {reason}")]
    ImageDecodeFailure {
        index: usize,
        path: String,
        reason: String,
    },

    /// JSON configuration failed to parse.
    #[error("failed to parse grid configuration: {source}{hint}")]
    ConfigParse {
        #[source]
        source: serde_json::Error,
        hint: String,
    },

    /// The canvas could not be encoded or written.
    #[error("failed to save grid to '{}': {source}", path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The system image viewer could not be launched.
    #[error("failed to launch image viewer: {0}")]
    Viewer(#[source] std::io::Error),
}

/// Which label list a [`GridError::LabelCountMismatch`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelKind {
    /// Per-image captions; must match the image count.
    Image,
    /// Column headers; must match the resolved column count.
    Column,
    /// Row headers; must match the resolved row count.
    Row,
}

impl fmt::Display for LabelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelKind::Image => write!(f, "image labels"),
            LabelKind::Column => write!(f, "x_labels (one per column)"),
            LabelKind::Row => write!(f, "y_labels (one per row)"),
        }
    }
}

impl From<serde_json::Error> for GridError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "\n  Hint: check for trailing commas, missing quotes, or unescaped characters."
                    .to_string()
            }
            serde_json::error::Category::Data => {
                "\n  Hint: the JSON is valid but doesn't match the grid configuration schema. Check field names and types.".to_string()
            }
            serde_json::error::Category::Eof => {
                "\n  Hint: unexpected end of input. Is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        GridError::ConfigParse { source: e, hint }
    }
}
