//! # Grid Configuration
//!
//! Every knob of a grid lives in one explicit [`GridConfig`] with defaults for
//! all fields. It deserializes from camelCase JSON so a whole grid setup can
//! be kept in a file; strings for colors and alignments are parsed eagerly,
//! so a bad value fails at load time rather than halfway through composing.

use crate::error::GridError;
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// The complete configuration for one grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GridConfig {
    /// One caption per image, drawn beneath the image.
    pub labels: Option<Vec<String>>,
    /// Number of rows. Derived from the image count when omitted.
    pub rows: Option<usize>,
    /// Number of columns. Derived from the image count when omitted.
    pub cols: Option<usize>,
    /// One header per column, drawn above the grid.
    pub x_labels: Option<Vec<String>>,
    /// One header per row, drawn left of the grid.
    pub y_labels: Option<Vec<String>>,
    /// Requested gap between cells in pixels. Grown automatically when
    /// captions need more room.
    pub spacing: u32,
    pub x_labels_max_lines: usize,
    pub y_labels_max_lines: usize,
    pub labels_max_lines: usize,
    pub x_labels_align: Align,
    pub y_labels_align: Align,
    pub labels_align: Align,
    /// Font size in pixels.
    pub font_size: u32,
    pub background_color: Color,
    pub text_color: Color,
    /// TrueType/OpenType font file. When absent or unreadable, common system
    /// fonts are tried, then the bundled DejaVu Sans.
    pub font_path: Option<PathBuf>,
    /// Explicit cell size. Defaults to the widest × tallest input image.
    pub cell_size: Option<CellSize>,
    pub fit: FitMode,
    pub filter: ResampleFilter,
    pub y_labels_orientation: LabelOrientation,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            labels: None,
            rows: None,
            cols: None,
            x_labels: None,
            y_labels: None,
            spacing: 5,
            x_labels_max_lines: 2,
            y_labels_max_lines: 2,
            labels_max_lines: 1,
            x_labels_align: Align::Left,
            y_labels_align: Align::Left,
            labels_align: Align::Center,
            font_size: 12,
            background_color: Color::WHITE,
            text_color: Color::BLACK,
            font_path: None,
            cell_size: None,
            fit: FitMode::Stretch,
            filter: ResampleFilter::Lanczos3,
            y_labels_orientation: LabelOrientation::Horizontal,
        }
    }
}

impl GridConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, GridError> {
        let config: GridConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that don't depend on the images.
    pub fn validate(&self) -> Result<(), GridError> {
        for (name, value) in [
            ("labels_max_lines", self.labels_max_lines),
            ("x_labels_max_lines", self.x_labels_max_lines),
            ("y_labels_max_lines", self.y_labels_max_lines),
        ] {
            if value == 0 {
                return Err(GridError::InvalidConfig(format!(
                    "{} must be at least 1",
                    name
                )));
            }
        }
        if self.font_size == 0 {
            return Err(GridError::InvalidConfig(
                "font_size must be at least 1".to_string(),
            ));
        }
        if self.rows == Some(0) || self.cols == Some(0) {
            return Err(GridError::InvalidConfig(
                "rows and cols must be at least 1".to_string(),
            ));
        }
        if let Some(cell) = self.cell_size {
            if cell.width == 0 || cell.height == 0 {
                return Err(GridError::InvalidConfig(format!(
                    "cell size must be at least 1x1, got {}",
                    cell
                )));
            }
        }
        Ok(())
    }

    /// Whether any per-image caption will be drawn.
    pub fn has_image_labels(&self) -> bool {
        self.labels.as_ref().is_some_and(|l| !l.is_empty())
    }
}

/// Horizontal alignment of a label within its box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

impl Align {
    pub fn as_str(&self) -> &'static str {
        match self {
            Align::Left => "left",
            Align::Center => "center",
            Align::Right => "right",
        }
    }

    /// X offset of content `content_width` wide inside a box `container`
    /// wide. `inset` keeps left/right aligned content off the edges.
    pub fn offset(&self, content_width: f64, container: u32, inset: u32) -> i64 {
        let container = container as f64;
        let inset = inset as f64;
        let x = match self {
            Align::Left => inset,
            Align::Center => (container - content_width) / 2.0,
            Align::Right => container - inset - content_width,
        };
        x.floor() as i64
    }
}

impl FromStr for Align {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(Align::Left),
            "center" | "centre" => Ok(Align::Center),
            "right" => Ok(Align::Right),
            _ => Err(GridError::InvalidAlignment(s.to_string())),
        }
    }
}

impl TryFrom<String> for Align {
    type Error = GridError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Align> for String {
    fn from(a: Align) -> Self {
        a.as_str().to_string()
    }
}

impl fmt::Display for Align {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

const NAMED_COLORS: &[(&str, [u8; 3])] = &[
    ("white", [255, 255, 255]),
    ("black", [0, 0, 0]),
    ("red", [255, 0, 0]),
    ("green", [0, 128, 0]),
    ("lime", [0, 255, 0]),
    ("blue", [0, 0, 255]),
    ("yellow", [255, 255, 0]),
    ("cyan", [0, 255, 255]),
    ("magenta", [255, 0, 255]),
    ("purple", [128, 0, 128]),
    ("orange", [255, 165, 0]),
    ("pink", [255, 192, 203]),
    ("brown", [165, 42, 42]),
    ("navy", [0, 0, 128]),
    ("teal", [0, 128, 128]),
    ("gray", [128, 128, 128]),
    ("grey", [128, 128, 128]),
    ("lightgray", [211, 211, 211]),
    ("lightgrey", [211, 211, 211]),
    ("darkgray", [169, 169, 169]),
    ("darkgrey", [169, 169, 169]),
    ("silver", [192, 192, 192]),
];

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const TRANSPARENT: Color = Color {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
    };

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn is_opaque(&self) -> bool {
        self.a == 255
    }

    pub fn to_rgba(self) -> image::Rgba<u8> {
        image::Rgba([self.r, self.g, self.b, self.a])
    }

    fn hex(hex: &str) -> Option<Self> {
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            3 | 4 => {
                let mut v = [255u8; 4];
                for (i, c) in hex.chars().enumerate() {
                    v[i] = channel(&c.to_string().repeat(2))?;
                }
                Some(Self {
                    r: v[0],
                    g: v[1],
                    b: v[2],
                    a: v[3],
                })
            }
            6 | 8 => {
                let mut v = [255u8; 4];
                for i in 0..hex.len() / 2 {
                    v[i] = channel(&hex[i * 2..i * 2 + 2])?;
                }
                Some(Self {
                    r: v[0],
                    g: v[1],
                    b: v[2],
                    a: v[3],
                })
            }
            _ => None,
        }
    }

    /// `rgb(r, g, b)` or `rgba(r, g, b, a)` with 0-255 channels.
    fn functional(s: &str) -> Option<Self> {
        let (body, want) = if let Some(b) = s.strip_prefix("rgba(") {
            (b, 4)
        } else if let Some(b) = s.strip_prefix("rgb(") {
            (b, 3)
        } else {
            return None;
        };
        let body = body.strip_suffix(')')?;
        let parts: Vec<u8> = body
            .split(',')
            .map(|p| p.trim().parse::<u8>().ok())
            .collect::<Option<_>>()?;
        if parts.len() != want {
            return None;
        }
        Some(Self {
            r: parts[0],
            g: parts[1],
            b: parts[2],
            a: parts.get(3).copied().unwrap_or(255),
        })
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

impl FromStr for Color {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_ascii_lowercase().replace(' ', "");
        if norm == "transparent" {
            return Ok(Color::TRANSPARENT);
        }
        if let Some(&(_, [r, g, b])) = NAMED_COLORS.iter().find(|(name, _)| *name == norm) {
            return Ok(Color::rgb(r, g, b));
        }
        let parsed = match norm.strip_prefix('#') {
            Some(hex) => Color::hex(hex),
            None => Color::functional(&norm),
        };
        parsed.ok_or_else(|| GridError::InvalidColor(s.to_string()))
    }
}

impl TryFrom<String> for Color {
    type Error = GridError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
        if !self.is_opaque() {
            write!(f, "{:02x}", self.a)?;
        }
        Ok(())
    }
}

/// Uniform cell dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellSize {
    pub width: u32,
    pub height: u32,
}

impl CellSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl FromStr for CellSize {
    type Err = GridError;

    /// Parses `WIDTHxHEIGHT`, e.g. `200x150`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || GridError::InvalidConfig(format!("cell size must look like 200x150, got '{}'", s));
        let (w, h) = s.trim().split_once(['x', 'X']).ok_or_else(bad)?;
        let width = w.trim().parse().map_err(|_| bad())?;
        let height = h.trim().parse().map_err(|_| bad())?;
        Ok(CellSize { width, height })
    }
}

impl fmt::Display for CellSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// How a source image fills its cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitMode {
    /// Resize to exactly the cell size, ignoring aspect ratio.
    #[default]
    Stretch,
    /// Scale to fit inside the cell keeping aspect ratio; the rest of the
    /// cell shows the background color.
    Contain,
}

impl FromStr for FitMode {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stretch" => Ok(FitMode::Stretch),
            "contain" => Ok(FitMode::Contain),
            _ => Err(GridError::InvalidConfig(format!(
                "fit must be 'stretch' or 'contain', got '{}'",
                s
            ))),
        }
    }
}

/// Resampling filter for resizing cells and canvases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResampleFilter {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    #[default]
    Lanczos3,
}

impl ResampleFilter {
    pub fn filter_type(self) -> FilterType {
        match self {
            ResampleFilter::Nearest => FilterType::Nearest,
            ResampleFilter::Triangle => FilterType::Triangle,
            ResampleFilter::CatmullRom => FilterType::CatmullRom,
            ResampleFilter::Gaussian => FilterType::Gaussian,
            ResampleFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

impl FromStr for ResampleFilter {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nearest" => Ok(ResampleFilter::Nearest),
            "triangle" | "bilinear" => Ok(ResampleFilter::Triangle),
            "catmull-rom" | "bicubic" => Ok(ResampleFilter::CatmullRom),
            "gaussian" => Ok(ResampleFilter::Gaussian),
            "lanczos3" | "lanczos" => Ok(ResampleFilter::Lanczos3),
            _ => Err(GridError::InvalidConfig(format!(
                "unknown resampling filter '{}'",
                s
            ))),
        }
    }
}

/// Orientation of row header text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelOrientation {
    /// Text reads left to right; the header is as wide as its widest line.
    #[default]
    Horizontal,
    /// Text is rotated 90° counter-clockwise and wraps along the row height.
    Rotated,
}
