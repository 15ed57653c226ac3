//! # Font Management
//!
//! Loading fonts, measuring text, and drawing it onto RGBA canvases.
//!
//! Metrics (advances, ascent, descent) are read with ttf-parser. Drawing goes
//! through cosmic-text, which shapes the line and rasterizes glyphs with
//! swash. Each loaded face gets a private font database holding only that
//! face, so the pixels never depend on what else the host has installed.
//!
//! [`load_font`] resolves a face in order: the configured file, a list of
//! common system fonts, then DejaVu Sans embedded in the binary. A configured
//! file that fails to load is logged and skipped; it never aborts grid
//! construction.

use crate::error::GridError;
use cosmic_text::{fontdb, Attrs, Buffer, Family, FontSystem, Metrics, Shaping, SwashCache};
use image::{Pixel, Rgba, RgbaImage};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use tracing::{debug, warn};

/// Extra leading applied on top of ascent + descent.
const LINE_SPACING: f64 = 1.05;

static BUNDLED_FONT: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");

/// System font files tried, in order, before the embedded face.
pub const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    // Linux
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/ubuntu/Ubuntu-R.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/arial.ttf",
    // macOS
    "/System/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/System/Library/Fonts/Helvetica.ttf",
    "/Library/Fonts/Arial.ttf",
    // Windows
    "C:/Windows/Fonts/arial.ttf",
    "C:/Windows/Fonts/calibri.ttf",
    "C:/Windows/Fonts/segoeui.ttf",
];

/// Parsed metrics from a TrueType/OpenType font via ttf-parser.
#[derive(Debug, Clone)]
pub struct CustomFontMetrics {
    pub units_per_em: u16,
    pub advance_widths: HashMap<char, u16>,
    pub default_advance: u16,
    pub ascender: i16,
    pub descender: i16,
}

impl CustomFontMetrics {
    /// Parse metrics from font data using ttf-parser.
    pub fn from_font_data(data: &[u8]) -> Result<Self, String> {
        let face = ttf_parser::Face::parse(data, 0).map_err(|e| e.to_string())?;
        let units_per_em = face.units_per_em();
        let mut advance_widths = HashMap::new();
        let mut default_advance = 0u16;

        for code in 32u32..=0xFFFF {
            if let Some(ch) = char::from_u32(code) {
                if let Some(glyph_id) = face.glyph_index(ch) {
                    let advance = face.glyph_hor_advance(glyph_id).unwrap_or(0);
                    advance_widths.insert(ch, advance);
                    if ch == ' ' {
                        default_advance = advance;
                    }
                }
            }
        }

        if default_advance == 0 {
            default_advance = units_per_em / 2;
        }

        Ok(CustomFontMetrics {
            units_per_em,
            advance_widths,
            default_advance,
            ascender: face.ascender(),
            descender: face.descender(),
        })
    }

    fn advance(&self, ch: char) -> u16 {
        self.advance_widths
            .get(&ch)
            .copied()
            .unwrap_or(self.default_advance)
    }
}

/// Where a face was loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontOrigin {
    /// A font file on disk, configured or found among the system fonts.
    File(PathBuf),
    /// DejaVu Sans compiled into the binary.
    Bundled,
    /// Bytes handed to [`FontHandle::from_bytes`].
    Memory,
}

/// Shaping and rasterization state for one face.
struct GlyphRenderer {
    fonts: FontSystem,
    cache: SwashCache,
}

struct LoadedFace {
    metrics: CustomFontMetrics,
    family: String,
    origin: FontOrigin,
    renderer: Mutex<GlyphRenderer>,
}

impl fmt::Debug for LoadedFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedFace")
            .field("family", &self.family)
            .field("origin", &self.origin)
            .field("units_per_em", &self.metrics.units_per_em)
            .finish_non_exhaustive()
    }
}

impl LoadedFace {
    fn parse(data: Vec<u8>, origin: FontOrigin) -> Result<Self, String> {
        let metrics = CustomFontMetrics::from_font_data(&data)?;
        let mut db = fontdb::Database::new();
        db.load_font_data(data);
        let family = db
            .faces()
            .next()
            .and_then(|face| face.families.first())
            .map(|(name, _)| name.clone())
            .ok_or_else(|| "font has no family name".to_string())?;
        let fonts = FontSystem::new_with_locale_and_db("en-US".to_string(), db);
        Ok(Self {
            metrics,
            family,
            origin,
            renderer: Mutex::new(GlyphRenderer {
                fonts,
                cache: SwashCache::new(),
            }),
        })
    }
}

/// A font resolved at a concrete pixel size.
///
/// All measurements are in pixels. Cloning is cheap; clones share the parsed
/// face and its glyph cache.
#[derive(Debug, Clone)]
pub struct FontHandle {
    face: Arc<LoadedFace>,
    size: f64,
}

/// Load the font at `path`, falling back to the system fonts and finally to
/// the embedded DejaVu Sans.
///
/// An unreadable or unparsable `path` is logged as a warning. The only error
/// left is the embedded face failing to parse.
pub fn load_font(path: Option<&Path>, size: u32) -> Result<FontHandle, GridError> {
    let candidates: Vec<&Path> = SYSTEM_FONT_CANDIDATES.iter().map(Path::new).collect();
    load_font_from(path, size, &candidates)
}

fn load_font_from(path: Option<&Path>, size: u32, candidates: &[&Path]) -> Result<FontHandle, GridError> {
    if let Some(p) = path {
        match FontHandle::from_file(p, size) {
            Ok(font) => return Ok(font),
            Err(e) => warn!(error = %e, "falling back to the system or bundled fonts"),
        }
    }
    for candidate in candidates.iter().filter(|c| c.is_file()) {
        match FontHandle::from_file(candidate, size) {
            Ok(font) => {
                debug!(path = %candidate.display(), "using system font");
                return Ok(font);
            }
            Err(e) => debug!(error = %e, "skipping system font"),
        }
    }
    debug!("using the bundled font");
    FontHandle::bundled(size)
}

impl FontHandle {
    /// The embedded DejaVu Sans face. Parsed once per process.
    pub fn bundled(size: u32) -> Result<Self, GridError> {
        static FACE: OnceLock<Result<Arc<LoadedFace>, String>> = OnceLock::new();
        let face = FACE
            .get_or_init(|| LoadedFace::parse(BUNDLED_FONT.to_vec(), FontOrigin::Bundled).map(Arc::new))
            .clone()
            .map_err(|reason| GridError::FontLoadFailure {
                path: PathBuf::from("<bundled DejaVuSans.ttf>"),
                reason,
            })?;
        Ok(Self::with_face(face, size))
    }

    /// Load a TrueType/OpenType font file.
    pub fn from_file(path: &Path, size: u32) -> Result<Self, GridError> {
        let failure = |reason: String| GridError::FontLoadFailure {
            path: path.to_path_buf(),
            reason,
        };
        let data = std::fs::read(path).map_err(|e| failure(e.to_string()))?;
        let face = LoadedFace::parse(data, FontOrigin::File(path.to_path_buf())).map_err(failure)?;
        Ok(Self::with_face(Arc::new(face), size))
    }

    /// Parse a TrueType/OpenType font from memory.
    pub fn from_bytes(data: Vec<u8>, size: u32) -> Result<Self, String> {
        let face = LoadedFace::parse(data, FontOrigin::Memory)?;
        Ok(Self::with_face(Arc::new(face), size))
    }

    fn with_face(face: Arc<LoadedFace>, size: u32) -> Self {
        Self {
            face,
            size: size.max(1) as f64,
        }
    }

    pub fn origin(&self) -> &FontOrigin {
        &self.face.origin
    }

    /// Family name from the font's naming table.
    pub fn family(&self) -> &str {
        &self.face.family
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    /// Pixels above the baseline.
    pub fn ascent(&self) -> f64 {
        self.face.metrics.ascender as f64 * self.units_scale()
    }

    /// Pixels below the baseline, as a positive number.
    pub fn descent(&self) -> f64 {
        -(self.face.metrics.descender as f64) * self.units_scale()
    }

    /// Vertical distance between consecutive lines, in whole pixels.
    /// Constant for a given face and size.
    pub fn line_height(&self) -> u32 {
        (((self.ascent() + self.descent()) * LINE_SPACING).floor() as u32).max(1)
    }

    /// Advance width of a single character.
    pub fn char_width(&self, ch: char) -> f64 {
        self.face.metrics.advance(ch) as f64 * self.units_scale()
    }

    /// Width of `text` laid out on a single line.
    pub fn measure(&self, text: &str) -> f64 {
        text.chars().map(|ch| self.char_width(ch)).sum()
    }

    /// Draw one line of text with its line box's top-left corner at
    /// (`x`, `y`). Pixels falling outside `target` are clipped.
    pub fn draw_text(&self, target: &mut RgbaImage, x: i64, y: i64, text: &str, color: Rgba<u8>) {
        if text.is_empty() {
            return;
        }
        let mut renderer = self.face.renderer.lock().unwrap_or_else(PoisonError::into_inner);
        let GlyphRenderer { fonts, cache } = &mut *renderer;

        let metrics = Metrics::new(self.size as f32, self.line_height() as f32);
        let mut buffer = Buffer::new(fonts, metrics);
        buffer.set_size(fonts, None, None);
        let attrs = Attrs::new().family(Family::Name(&self.face.family));
        buffer.set_text(fonts, text, attrs, Shaping::Advanced);
        buffer.shape_until_scroll(fonts, false);

        let (width, height) = (target.width() as i64, target.height() as i64);
        let ink = cosmic_text::Color::rgba(color[0], color[1], color[2], color[3]);
        buffer.draw(fonts, cache, ink, |gx, gy, w, h, c| {
            if c.a() == 0 {
                return;
            }
            let src = Rgba([c.r(), c.g(), c.b(), c.a()]);
            for py in 0..h as i64 {
                for px in 0..w as i64 {
                    let (tx, ty) = (x + gx as i64 + px, y + gy as i64 + py);
                    if tx >= 0 && ty >= 0 && tx < width && ty < height {
                        target.get_pixel_mut(tx as u32, ty as u32).blend(&src);
                    }
                }
            }
        });
    }

    fn units_scale(&self) -> f64 {
        self.size / self.face.metrics.units_per_em.max(1) as f64
    }
}

/// DejaVu Sans Mono from the test fixtures: every character advances
/// 1233/2048 em.
#[cfg(test)]
pub(crate) fn fixture_font(size: u32) -> FontHandle {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/DejaVuSansMono.ttf");
    FontHandle::from_file(Path::new(path), size).unwrap()
}
