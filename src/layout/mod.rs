//! # Layout
//!
//! Pure geometry: grid shape, effective spacing, and the absolute position
//! of every cell and header band on the canvas. Nothing here touches pixels.
//!
//! ```text
//!  ┌──────────┬──────────────────────────────────────────┐
//!  │          │ x-header band (column labels)            │
//!  ├──────────┼─────────┬───────┬─────────┬──────────────┤
//!  │ y-header │ cell    │spacing│ cell    │              │
//!  │ band     │ caption │       │ caption │              │
//!  │          ├─────────┘       └─────────┘              │
//!  │          │   spacing (≥ caption band)               │
//!  │          ├─────────┐       ┌─────────┐              │
//!  │          │ cell    │       │ cell    │              │
//!  │          │ caption │       │ caption │  ← last band │
//!  └──────────┴─────────┴───────┴─────────┴──────────────┘
//! ```

pub mod grid;

use crate::config::Color;
use crate::font::FontHandle;
use grid::GridShape;
use tracing::debug;

/// Gap between cells that keeps captions clear of the row below.
///
/// Without per-image labels the request stands. With them, the gap grows to
/// at least the full caption block; it never shrinks below the request.
pub fn negotiate_spacing(
    requested: u32,
    label_line_height: u32,
    label_max_lines: usize,
    labels_present: bool,
) -> u32 {
    if !labels_present {
        return requested;
    }
    let needed = label_line_height.saturating_mul(label_max_lines as u32);
    if needed > requested {
        debug!(requested, effective = needed, "spacing grown to fit captions");
    }
    requested.max(needed)
}

/// The resolved configuration every compositor works from.
#[derive(Debug, Clone)]
pub struct GridSpec {
    pub shape: GridShape,
    pub cell_width: u32,
    pub cell_height: u32,
    /// Effective spacing after negotiation.
    pub spacing: u32,
    /// Height reserved under each cell for its caption; 0 without captions.
    pub caption_band: u32,
    pub background: Color,
    pub text_color: Color,
    pub font: FontHandle,
}

/// Absolute positions of everything on the canvas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputedLayout {
    /// Top-left corner of every slot, row-major, `rows * cols` entries.
    pub cell_origins: Vec<(u32, u32)>,
    pub x_header_height: u32,
    pub y_header_width: u32,
    pub caption_band: u32,
    pub canvas_width: u32,
    pub canvas_height: u32,
}

impl ComputedLayout {
    /// Place every slot given the header band sizes.
    ///
    /// The canvas height includes the caption band under the last row, so
    /// bottom-row captions are never cut off.
    pub fn compute(spec: &GridSpec, x_header_height: u32, y_header_width: u32) -> Self {
        let GridShape { rows, cols } = spec.shape;
        let pitch_x = spec.cell_width + spec.spacing;
        let pitch_y = spec.cell_height + spec.spacing;

        let cell_origins = (0..rows * cols)
            .map(|i| {
                let (row, col) = spec.shape.position(i);
                (
                    y_header_width + col as u32 * pitch_x,
                    x_header_height + row as u32 * pitch_y,
                )
            })
            .collect();

        let canvas_width = y_header_width + span(cols, spec.cell_width, spec.spacing);
        let canvas_height =
            x_header_height + span(rows, spec.cell_height, spec.spacing) + spec.caption_band;

        debug!(
            rows,
            cols,
            canvas_width,
            canvas_height,
            spacing = spec.spacing,
            "computed grid layout"
        );

        Self {
            cell_origins,
            x_header_height,
            y_header_width,
            caption_band: spec.caption_band,
            canvas_width,
            canvas_height,
        }
    }

    pub fn canvas_size(&self) -> (u32, u32) {
        (self.canvas_width, self.canvas_height)
    }

    /// Left edge of column `col`.
    pub fn column_x(&self, col: usize) -> u32 {
        self.cell_origins[col].0
    }

    /// Top edge of row `row`.
    pub fn row_y(&self, row: usize, cols: usize) -> u32 {
        self.cell_origins[row * cols].1
    }
}

/// Length of `count` cells of `size` separated by `spacing`.
fn span(count: usize, size: u32, spacing: u32) -> u32 {
    let count = count as u32;
    count * size + count.saturating_sub(1) * spacing
}
