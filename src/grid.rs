//! # Grid
//!
//! The public entry point. [`Grid::new`] runs the whole pipeline once:
//!
//! ```text
//! GridConfig + images
//!       ↓
//!   validate       : ranges, label counts (no decoding yet)
//!       ↓
//!   resolve        : rows × cols
//!       ↓
//!   normalize      : decode paths, borrow decoded images
//!       ↓
//!   cells          : resize + caption per image
//!       ↓
//!   compose        : headers + cells onto one canvas
//! ```
//!
//! The result owns its canvas and forwards image operations to it.

use crate::compose::cell::{CellCompositor, CAPTION_INSET};
use crate::compose::{CanvasComposer, HeaderLabels};
use crate::config::{GridConfig, ResampleFilter};
use crate::error::{GridError, LabelKind};
use crate::font::load_font;
use crate::image_loader::{normalize, ImageEntry, ImageSource};
use crate::layout::grid::{self as geometry, GridShape};
use crate::layout::{negotiate_spacing, ComputedLayout, GridSpec};
use crate::text::LabelTextLayout;
use image::{ColorType, DynamicImage, GenericImageView, ImageFormat, RgbaImage};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info};

/// A composed image grid.
#[derive(Debug, Clone)]
pub struct Grid {
    canvas: DynamicImage,
    /// Absent once the canvas has been resized.
    layout: Option<ComputedLayout>,
    filter: ResampleFilter,
}

impl Grid {
    /// Build a grid from `images` laid out according to `config`.
    ///
    /// Structural problems (no images, too many images for the requested
    /// shape, label lists of the wrong length, out-of-range values) are
    /// reported before any image is decoded.
    pub fn new<'a, I, S>(images: I, config: &GridConfig) -> Result<Self, GridError>
    where
        I: IntoIterator<Item = S>,
        S: Into<ImageSource<'a>>,
    {
        config.validate()?;
        let sources: Vec<ImageSource<'a>> = images.into_iter().map(Into::into).collect();
        if sources.is_empty() {
            return Err(GridError::EmptyInput);
        }

        let shape = geometry::resolve(sources.len(), config.rows, config.cols)?;
        debug!(
            images = sources.len(),
            rows = shape.rows,
            cols = shape.cols,
            "resolved grid shape"
        );
        check_label_counts(config, sources.len(), shape)?;

        let entries = normalize(sources)?;
        let font = load_font(config.font_path.as_deref(), config.font_size)?;
        let (cell_width, cell_height) = cell_size(config, &entries);

        let text = LabelTextLayout::new();
        let line_height = font.line_height();
        let labels_present = config.has_image_labels();
        let captions: Vec<_> = match &config.labels {
            Some(labels) if labels_present => {
                let width = cell_width.saturating_sub(2 * CAPTION_INSET) as f64;
                labels
                    .iter()
                    .map(|l| Some(text.wrap(&font, l, width, config.labels_max_lines)))
                    .collect()
            }
            _ => vec![None; entries.len()],
        };

        let spacing = negotiate_spacing(
            config.spacing,
            line_height,
            config.labels_max_lines,
            labels_present,
        );
        let caption_band = if labels_present {
            line_height * config.labels_max_lines as u32
        } else {
            0
        };

        let spec = GridSpec {
            shape,
            cell_width,
            cell_height,
            spacing,
            caption_band,
            background: config.background_color,
            text_color: config.text_color,
            font,
        };

        let compositor = CellCompositor::new(&spec, config.fit, config.filter, config.labels_align);
        let cells: Vec<RgbaImage> = entries
            .iter()
            .zip(captions.iter())
            .map(|(entry, caption)| compositor.build_cell(&entry.image, caption.as_ref()))
            .collect();
        // Decoded sources aren't needed past this point.
        drop(entries);

        let x_header = config.x_labels.as_deref().map(|labels| HeaderLabels {
            labels,
            max_lines: config.x_labels_max_lines,
            align: config.x_labels_align,
        });
        let y_header = config.y_labels.as_deref().map(|labels| HeaderLabels {
            labels,
            max_lines: config.y_labels_max_lines,
            align: config.y_labels_align,
        });

        let composed = CanvasComposer::new(&spec, config.y_labels_orientation).compose(&cells, x_header, y_header);
        let canvas = if config.background_color.is_opaque() {
            DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(composed.canvas).to_rgb8())
        } else {
            DynamicImage::ImageRgba8(composed.canvas)
        };

        Ok(Self {
            canvas,
            layout: Some(composed.layout),
            filter: config.filter,
        })
    }

    /// Encode the canvas to `path`; the format follows the extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), GridError> {
        let path = path.as_ref();
        self.canvas.save(path).map_err(|source| GridError::Save {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), width = self.width(), height = self.height(), "grid saved");
        Ok(())
    }

    /// Encode the canvas to `path` in an explicit format.
    pub fn save_with_format(&self, path: impl AsRef<Path>, format: ImageFormat) -> Result<(), GridError> {
        let path = path.as_ref();
        self.canvas
            .save_with_format(path, format)
            .map_err(|source| GridError::Save {
                path: path.to_path_buf(),
                source,
            })?;
        info!(path = %path.display(), ?format, "grid saved");
        Ok(())
    }

    /// Open the canvas in the platform's image viewer. The image is written
    /// to a temporary PNG first; the viewer runs detached.
    pub fn show(&self) -> Result<PathBuf, GridError> {
        static SHOWN: AtomicUsize = AtomicUsize::new(0);
        let n = SHOWN.fetch_add(1, Ordering::Relaxed);
        let path = std::env::temp_dir().join(format!("gridcanvas-{}-{}.png", std::process::id(), n));
        self.save_with_format(&path, ImageFormat::Png)?;
        viewer_command(&path).spawn().map_err(GridError::Viewer)?;
        Ok(path)
    }

    /// An independent copy of this grid.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// A new grid with the canvas resampled to `width` × `height`, using the
    /// configured filter. The result no longer carries a layout.
    pub fn resize(&self, width: u32, height: u32) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::InvalidConfig(format!(
                "cannot resize a grid to {}x{}",
                width, height
            )));
        }
        Ok(Self {
            canvas: self.canvas.resize_exact(width, height, self.filter.filter_type()),
            layout: None,
            filter: self.filter,
        })
    }

    pub fn size(&self) -> (u32, u32) {
        self.canvas.dimensions()
    }

    pub fn width(&self) -> u32 {
        self.canvas.width()
    }

    pub fn height(&self) -> u32 {
        self.canvas.height()
    }

    /// Pixel mode name: "RGB" for an opaque background, "RGBA" otherwise.
    pub fn mode(&self) -> &'static str {
        color_mode(self.canvas.color())
    }

    pub fn image(&self) -> &DynamicImage {
        &self.canvas
    }

    pub fn into_image(self) -> DynamicImage {
        self.canvas
    }

    /// Where every cell and header band was placed.
    pub fn layout(&self) -> Option<&ComputedLayout> {
        self.layout.as_ref()
    }
}

fn check_label_counts(config: &GridConfig, images: usize, shape: GridShape) -> Result<(), GridError> {
    let checks = [
        (LabelKind::Image, config.labels.as_ref(), images),
        (LabelKind::Column, config.x_labels.as_ref(), shape.cols),
        (LabelKind::Row, config.y_labels.as_ref(), shape.rows),
    ];
    for (kind, labels, expected) in checks {
        if let Some(labels) = labels {
            if labels.len() != expected {
                return Err(GridError::LabelCountMismatch {
                    kind,
                    expected,
                    actual: labels.len(),
                });
            }
        }
    }
    Ok(())
}

/// The configured cell size, or the widest × tallest input.
fn cell_size(config: &GridConfig, entries: &[ImageEntry]) -> (u32, u32) {
    match config.cell_size {
        Some(cell) => (cell.width, cell.height),
        None => {
            let w = entries.iter().map(|e| e.width).max().unwrap_or(1);
            let h = entries.iter().map(|e| e.height).max().unwrap_or(1);
            (w.max(1), h.max(1))
        }
    }
}

fn color_mode(color: ColorType) -> &'static str {
    match color {
        ColorType::L8 => "L",
        ColorType::La8 => "LA",
        ColorType::Rgb8 => "RGB",
        ColorType::Rgba8 => "RGBA",
        ColorType::L16 => "I;16",
        ColorType::La16 => "LA;16",
        ColorType::Rgb16 => "RGB;16",
        ColorType::Rgba16 => "RGBA;16",
        ColorType::Rgb32F => "RGB;F",
        ColorType::Rgba32F => "RGBA;F",
        _ => "unknown",
    }
}

fn viewer_command(path: &Path) -> Command {
    let mut cmd = if cfg!(target_os = "macos") {
        Command::new("open")
    } else if cfg!(target_os = "windows") {
        Command::new("explorer")
    } else {
        Command::new("xdg-open")
    };
    cmd.arg(path);
    cmd
}
