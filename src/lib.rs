//! # gridcanvas
//!
//! A labeled image-grid compositor.
//!
//! Hand it a list of images and it produces one canvas: every image resized
//! into a uniform cell, each optionally captioned, the whole grid optionally
//! framed by column headers above and row headers to the left. Layout is
//! fully deterministic; the same inputs always give the same pixels.
//!
//! Captions are a hard constraint on the layout rather than an overlay. When
//! per-image labels are present the gap between rows grows until the whole
//! caption block fits, so text never runs into the image below it.
//!
//! ## Architecture
//!
//! ```text
//! Images + GridConfig
//!       ↓
//!   [layout::grid] — Resolve rows × cols
//!       ↓
//!   [text]         — Wrap and clip labels to width / line limits
//!       ↓
//!   [layout]       — Negotiate spacing, place cells and header bands
//!       ↓
//!   [compose]      — Resize cells, draw captions and headers, paste
//!       ↓
//!   [grid]         — Owned canvas: save, show, copy, resize
//! ```

pub mod compose;
pub mod config;
pub mod error;
pub mod font;
pub mod grid;
pub mod image_loader;
pub mod layout;
pub mod text;

pub use config::{Align, CellSize, Color, FitMode, GridConfig, LabelOrientation, ResampleFilter};
pub use error::{GridError, LabelKind};
pub use grid::Grid;
pub use image_loader::ImageSource;

/// Compose a grid.
///
/// This is the primary entry point. Takes decoded images or paths and
/// returns the composed grid.
pub fn grid<'a, I, S>(images: I, config: &GridConfig) -> Result<Grid, GridError>
where
    I: IntoIterator<Item = S>,
    S: Into<ImageSource<'a>>,
{
    Grid::new(images, config)
}

/// Compose a grid configured by a JSON document.
pub fn grid_json<'a, I, S>(images: I, json: &str) -> Result<Grid, GridError>
where
    I: IntoIterator<Item = S>,
    S: Into<ImageSource<'a>>,
{
    let config = GridConfig::from_json(json)?;
    Grid::new(images, &config)
}
