//! # Canvas Composition
//!
//! Sizes the header bands, places everything with [`ComputedLayout`], and
//! writes the final canvas: background, row headers, column headers, then
//! every cell tile in row-major order. Regions are written with
//! `imageops::replace`; pasted regions never blend with what's below.

pub mod cell;

use crate::config::{Align, LabelOrientation};
use crate::layout::{ComputedLayout, GridSpec};
use crate::text::{LabelTextLayout, WrappedLabel};
use image::{imageops, Rgba, RgbaImage};

/// One set of header labels and how to lay them out.
#[derive(Debug, Clone, Copy)]
pub struct HeaderLabels<'a> {
    pub labels: &'a [String],
    pub max_lines: usize,
    pub align: Align,
}

/// The canvas and the layout it was composed with.
#[derive(Debug, Clone)]
pub struct Composed {
    pub canvas: RgbaImage,
    pub layout: ComputedLayout,
}

pub struct CanvasComposer<'a> {
    spec: &'a GridSpec,
    text: LabelTextLayout,
    y_orientation: LabelOrientation,
}

impl<'a> CanvasComposer<'a> {
    pub fn new(spec: &'a GridSpec, y_orientation: LabelOrientation) -> Self {
        Self {
            spec,
            text: LabelTextLayout::new(),
            y_orientation,
        }
    }

    /// Wrap column headers to the cell width.
    pub fn wrap_x_labels(&self, header: &HeaderLabels) -> Vec<WrappedLabel> {
        self.wrap_all(header, self.spec.cell_width)
    }

    /// Wrap row headers: to the cell width when horizontal, to the cell
    /// height when rotated.
    pub fn wrap_y_labels(&self, header: &HeaderLabels) -> Vec<WrappedLabel> {
        let width = match self.y_orientation {
            LabelOrientation::Horizontal => self.spec.cell_width,
            LabelOrientation::Rotated => self.spec.cell_height,
        };
        self.wrap_all(header, width)
    }

    fn wrap_all(&self, header: &HeaderLabels, max_width: u32) -> Vec<WrappedLabel> {
        header
            .labels
            .iter()
            .map(|l| {
                self.text
                    .wrap(&self.spec.font, l, max_width as f64, header.max_lines)
            })
            .collect()
    }

    /// Height of the column header band.
    pub fn x_header_height(wrapped: &[WrappedLabel]) -> u32 {
        wrapped.iter().map(WrappedLabel::block_height).max().unwrap_or(0)
    }

    /// Width of the row header band.
    pub fn y_header_width(&self, wrapped: &[WrappedLabel]) -> u32 {
        match self.y_orientation {
            LabelOrientation::Horizontal => wrapped
                .iter()
                .map(WrappedLabel::widest)
                .fold(0.0, f64::max)
                .ceil() as u32,
            LabelOrientation::Rotated => wrapped
                .iter()
                .map(WrappedLabel::block_height)
                .max()
                .unwrap_or(0),
        }
    }

    /// Compose the final canvas from cell tiles and optional headers.
    pub fn compose(
        &self,
        cells: &[RgbaImage],
        x_labels: Option<HeaderLabels>,
        y_labels: Option<HeaderLabels>,
    ) -> Composed {
        let x_wrapped = x_labels
            .as_ref()
            .map(|h| self.wrap_x_labels(h))
            .unwrap_or_default();
        let y_wrapped = y_labels
            .as_ref()
            .map(|h| self.wrap_y_labels(h))
            .unwrap_or_default();

        let layout = ComputedLayout::compute(
            self.spec,
            Self::x_header_height(&x_wrapped),
            self.y_header_width(&y_wrapped),
        );
        let mut canvas = RgbaImage::from_pixel(
            layout.canvas_width,
            layout.canvas_height,
            self.spec.background.to_rgba(),
        );

        if let Some(header) = y_labels {
            self.draw_y_header(&mut canvas, &layout, &y_wrapped, header.align);
        }
        if let Some(header) = x_labels {
            self.draw_x_header(&mut canvas, &layout, &x_wrapped, header.align);
        }
        for (tile, &(x, y)) in cells.iter().zip(layout.cell_origins.iter()) {
            imageops::replace(&mut canvas, tile, x as i64, y as i64);
        }

        Composed { canvas, layout }
    }

    fn draw_x_header(&self, canvas: &mut RgbaImage, layout: &ComputedLayout, wrapped: &[WrappedLabel], align: Align) {
        let band = layout.x_header_height;
        for (col, label) in wrapped.iter().enumerate() {
            let col_x = layout.column_x(col) as i64;
            let top = (band as i64 - label.block_height() as i64) / 2;
            self.draw_block(canvas, label, col_x, top, self.spec.cell_width, align);
        }
    }

    fn draw_y_header(&self, canvas: &mut RgbaImage, layout: &ComputedLayout, wrapped: &[WrappedLabel], align: Align) {
        let cols = self.spec.shape.cols;
        let band = layout.y_header_width;
        let cell_h = self.spec.cell_height;

        for (row, label) in wrapped.iter().enumerate() {
            let row_y = layout.row_y(row, cols);
            match self.y_orientation {
                LabelOrientation::Horizontal => {
                    let top = row_y as i64 + (cell_h as i64 - label.block_height() as i64) / 2;
                    self.draw_block(canvas, label, 0, top, band, align);
                }
                LabelOrientation::Rotated => {
                    if band == 0 {
                        continue;
                    }
                    // Lay the text out along the row height, then turn it
                    // a quarter counter-clockwise into the header band.
                    let mut strip = RgbaImage::from_pixel(cell_h, band, self.spec.background.to_rgba());
                    let top = (band as i64 - label.block_height() as i64) / 2;
                    self.draw_block(&mut strip, label, 0, top, cell_h, align);
                    let rotated = imageops::rotate270(&strip);
                    imageops::replace(canvas, &rotated, 0, row_y as i64);
                }
            }
        }
    }

    /// Draw every line of `label` in a box starting at (`left`, `top`) that
    /// is `width` wide, each line aligned independently.
    fn draw_block(&self, target: &mut RgbaImage, label: &WrappedLabel, left: i64, top: i64, width: u32, align: Align) {
        let color: Rgba<u8> = self.spec.text_color.to_rgba();
        for (i, line) in label.lines.iter().enumerate() {
            let x = left + align.offset(line.width, width, 0);
            let y = top + i as i64 * label.line_height as i64;
            self.spec.font.draw_text(target, x, y, &line.text, color);
        }
    }
}
