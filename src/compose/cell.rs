//! Per-image cell tiles.
//!
//! A tile is the source image resized to the uniform cell size, plus the
//! caption band underneath when captions are configured. Tiles are pasted
//! onto the canvas as opaque rectangles.

use crate::config::{Align, FitMode, ResampleFilter};
use crate::layout::GridSpec;
use crate::text::WrappedLabel;
use image::{imageops, DynamicImage, GenericImageView, RgbaImage};

/// Horizontal inset for left/right aligned captions.
pub const CAPTION_INSET: u32 = 2;

pub struct CellCompositor<'a> {
    spec: &'a GridSpec,
    fit: FitMode,
    filter: ResampleFilter,
    align: Align,
}

impl<'a> CellCompositor<'a> {
    pub fn new(spec: &'a GridSpec, fit: FitMode, filter: ResampleFilter, align: Align) -> Self {
        Self {
            spec,
            fit,
            filter,
            align,
        }
    }

    /// Tile width × height, caption band included.
    pub fn tile_size(&self) -> (u32, u32) {
        (
            self.spec.cell_width,
            self.spec.cell_height + self.spec.caption_band,
        )
    }

    /// Build the tile for one image.
    pub fn build_cell(&self, image: &DynamicImage, caption: Option<&WrappedLabel>) -> RgbaImage {
        let (w, h) = self.tile_size();
        let mut tile = RgbaImage::from_pixel(w, h, self.spec.background.to_rgba());

        let (x, y, resized) = self.fit_image(image);
        imageops::replace(&mut tile, &resized, x, y);

        if let Some(caption) = caption {
            let color = self.spec.text_color.to_rgba();
            for (i, line) in caption.lines.iter().enumerate() {
                let x = self.align.offset(line.width, self.spec.cell_width, CAPTION_INSET);
                let y = self.spec.cell_height as i64 + (i as u32 * caption.line_height) as i64;
                self.spec.font.draw_text(&mut tile, x, y, &line.text, color);
            }
        }
        tile
    }

    /// Resize `image` into the cell; returns its offset inside the cell.
    fn fit_image(&self, image: &DynamicImage) -> (i64, i64, RgbaImage) {
        let (cw, ch) = (self.spec.cell_width, self.spec.cell_height);
        let (iw, ih) = image.dimensions();
        let filter = self.filter.filter_type();

        match self.fit {
            FitMode::Stretch => {
                if (iw, ih) == (cw, ch) {
                    (0, 0, image.to_rgba8())
                } else {
                    (0, 0, image.resize_exact(cw, ch, filter).to_rgba8())
                }
            }
            FitMode::Contain => {
                let (nw, nh) = contain_size(iw, ih, cw, ch);
                let resized = if (iw, ih) == (nw, nh) {
                    image.to_rgba8()
                } else {
                    image.resize_exact(nw, nh, filter).to_rgba8()
                };
                (((cw - nw) / 2) as i64, ((ch - nh) / 2) as i64, resized)
            }
        }
    }
}

/// Largest size with the source's aspect ratio that fits in the cell.
fn contain_size(iw: u32, ih: u32, cw: u32, ch: u32) -> (u32, u32) {
    let (iw, ih) = (iw.max(1) as f64, ih.max(1) as f64);
    let img_ratio = iw / ih;
    let cell_ratio = cw as f64 / ch as f64;
    let (w, h) = if img_ratio > cell_ratio {
        (cw as f64, cw as f64 / img_ratio)
    } else {
        (ch as f64 * img_ratio, ch as f64)
    };
    ((w as u32).clamp(1, cw), (h as u32).clamp(1, ch))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Color;
    use crate::font::fixture_font;
    use crate::layout::grid::GridShape;
    use crate::text::LabelTextLayout;
    use image::Rgba;

    fn spec(cell_w: u32, cell_h: u32, caption_band: u32) -> GridSpec {
        GridSpec {
            shape: GridShape { rows: 1, cols: 1 },
            cell_width: cell_w,
            cell_height: cell_h,
            spacing: caption_band,
            caption_band,
            background: Color::WHITE,
            text_color: Color::BLACK,
            font: fixture_font(10),
        }
    }

    fn red(w: u32, h: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba([255, 0, 0, 255])))
    }

    #[test]
    fn test_stretch_fills_cell() {
        let s = spec(20, 10, 0);
        let c = CellCompositor::new(&s, FitMode::Stretch, ResampleFilter::Nearest, Align::Center);
        let tile = c.build_cell(&red(5, 5), None);
        assert_eq!(tile.dimensions(), (20, 10));
        assert_eq!(tile.get_pixel(0, 0), &Rgba([255, 0, 0, 255]));
        assert_eq!(tile.get_pixel(19, 9), &Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_contain_letterboxes() {
        let s = spec(20, 10, 0);
        let c = CellCompositor::new(&s, FitMode::Contain, ResampleFilter::Nearest, Align::Center);
        let tile = c.build_cell(&red(10, 10), None);
        // 10×10 inside a 20×10 cell: centered, 5px of background each side.
        assert_eq!(tile.get_pixel(0, 5), &Rgba([255, 255, 255, 255]));
        assert_eq!(tile.get_pixel(10, 5), &Rgba([255, 0, 0, 255]));
        assert_eq!(tile.get_pixel(19, 5), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_caption_drawn_below_image() {
        let band = fixture_font(10).line_height();
        let s = spec(40, 10, band);
        let c = CellCompositor::new(&s, FitMode::Stretch, ResampleFilter::Nearest, Align::Left);
        let caption = LabelTextLayout::new().wrap(&s.font, "H", 40.0, 1);
        let tile = c.build_cell(&red(40, 10), Some(&caption));
        assert_eq!(tile.dimensions(), (40, 10 + band));

        // The image rows stay untouched; the "H" lands in the band from the inset on.
        assert!((0..40).all(|x| (0..10).all(|y| tile.get_pixel(x, y) == &Rgba([255, 0, 0, 255]))));
        let right = CAPTION_INSET + s.font.char_width('H').ceil() as u32 + 1;
        let ink: Vec<u32> = (0..40)
            .filter(|&x| (10..10 + band).any(|y| tile.get_pixel(x, y)[1] < 128))
            .collect();
        assert!(!ink.is_empty());
        assert!(ink.iter().all(|&x| x >= CAPTION_INSET && x < right), "ink columns {:?}", ink);
        assert_eq!(tile.get_pixel(39, 10 + band - 1), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_contain_size() {
        assert_eq!(contain_size(100, 50, 50, 50), (50, 25));
        assert_eq!(contain_size(50, 100, 50, 50), (25, 50));
        assert_eq!(contain_size(1000, 1, 10, 10), (10, 1));
    }
}
