//! Integration tests for the gridcanvas pipeline.
//!
//! These tests exercise the full path from images + configuration to a
//! composed canvas. They verify:
//! - Canvas dimensions for plain, captioned and headed grids
//! - Composition is deterministic down to the pixel
//! - Structural errors surface before any decoding
//! - Paths and data URIs decode the same as in-memory images
//! - Saved grids re-decode with the same size and mode

use base64::Engine;
use gridcanvas::*;
use gridcanvas::font::{load_font, FontHandle, FontOrigin};
use image::{DynamicImage, ImageOutputFormat, Rgba, RgbaImage};
use std::io::Cursor;
use std::path::PathBuf;

// ─── Helpers ────────────────────────────────────────────────────

fn solid(w: u32, h: u32, c: [u8; 4]) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba(c)))
}

fn gradient(w: u32, h: u32) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_fn(w, h, |x, y| {
        Rgba([(x * 7 % 256) as u8, (y * 13 % 256) as u8, ((x + y) % 256) as u8, 255])
    }))
}

fn strings(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

fn png_bytes(img: &DynamicImage) -> Vec<u8> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageOutputFormat::Png)
        .unwrap();
    buf
}

/// DejaVu Sans Mono: 14px lines and 1233/2048 em advances at 12px.
fn fixture_font_path() -> PathBuf {
    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/DejaVuSansMono.ttf"))
}

fn fixture_font() -> FontHandle {
    FontHandle::from_file(&fixture_font_path(), 12).unwrap()
}

/// Whether any pixel in the rectangle is darker than mid gray.
fn has_ink(img: &image::RgbImage, xs: std::ops::Range<u32>, ys: std::ops::Range<u32>) -> bool {
    xs.into_iter()
        .any(|x| ys.clone().any(|y| img.get_pixel(x, y).0.iter().all(|&c| c < 128)))
}

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("gridcanvas-test-{}-{}", std::process::id(), name))
}

// ─── Geometry ───────────────────────────────────────────────────

#[test]
fn test_two_by_two_canvas_size() {
    let imgs: Vec<_> = (0..4).map(|_| solid(100, 100, [200, 0, 0, 255])).collect();
    let config = GridConfig {
        spacing: 10,
        ..Default::default()
    };
    let grid = grid(&imgs, &config).unwrap();
    assert_eq!(grid.size(), (210, 210));
    assert_eq!(grid.width(), 210);
    assert_eq!(grid.height(), 210);
}

#[test]
fn test_five_images_auto_layout() {
    let imgs: Vec<_> = (0..5).map(|_| solid(20, 20, [0, 0, 0, 255])).collect();
    let config = GridConfig {
        spacing: 0,
        ..Default::default()
    };
    let grid = grid(&imgs, &config).unwrap();
    // Two rows of three; the last slot stays background.
    assert_eq!(grid.size(), (60, 40));
    let rgb = grid.image().to_rgb8();
    assert_eq!(rgb.get_pixel(50, 30).0, [255, 255, 255]);
    assert_eq!(rgb.get_pixel(30, 30).0, [0, 0, 0]);
}

#[test]
fn test_captions_grow_spacing_in_both_directions() {
    let imgs: Vec<_> = (0..4).map(|_| solid(40, 40, [255, 0, 0, 255])).collect();
    let config = GridConfig {
        labels: Some(strings(&["a", "b", "c", "d"])),
        labels_max_lines: 2,
        font_path: Some(fixture_font_path()),
        ..Default::default()
    };
    let grid = grid(&imgs, &config).unwrap();
    // 14px lines × 2 = 28px caption block, above the requested 5px.
    assert_eq!(grid.size(), (40 + 28 + 40, 40 + 28 + 40 + 28));

    let layout = grid.layout().unwrap();
    assert_eq!(layout.caption_band, 28);
    assert_eq!(layout.cell_origins[3], (68, 68));
}

#[test]
fn test_captions_do_not_overlap_next_row() {
    let imgs: Vec<_> = (0..2).map(|_| solid(60, 30, [0, 0, 255, 255])).collect();
    let config = GridConfig {
        rows: Some(2),
        labels: Some(strings(&["first caption", "second caption"])),
        spacing: 0,
        font_path: Some(fixture_font_path()),
        ..Default::default()
    };
    let grid = grid(&imgs, &config).unwrap();
    let rgb = grid.image().to_rgb8();
    let layout = grid.layout().unwrap();
    let (_, second_top) = layout.cell_origins[1];
    // The second image starts exactly where the first caption band ends.
    assert_eq!(second_top, 30 + 14);
    for x in 0..60 {
        assert_eq!(rgb.get_pixel(x, second_top).0, [0, 0, 255]);
    }
    // The caption band under the first image carries ink.
    assert!(has_ink(&rgb, 0..60, 30..44));
}

#[test]
fn test_header_bands() {
    let imgs: Vec<_> = (0..2).map(|_| solid(100, 50, [0, 255, 0, 255])).collect();
    let config = GridConfig {
        x_labels: Some(strings(&["Before", "After"])),
        y_labels: Some(strings(&["Row one"])),
        font_path: Some(fixture_font_path()),
        ..Default::default()
    };
    let grid = grid(&imgs, &config).unwrap();
    let layout = grid.layout().unwrap();
    let font = fixture_font();
    let y_band = font.measure("Row one").ceil() as u32;
    assert_eq!(y_band, 51);
    assert_eq!(layout.x_header_height, 14);
    assert_eq!(layout.y_header_width, y_band);
    assert_eq!(grid.size(), (y_band + 100 + 5 + 100, 14 + 50));
    assert_eq!(layout.cell_origins[0], (y_band, 14));
}

#[test]
fn test_truetype_text_inks_headers_and_captions() {
    let imgs: Vec<_> = (0..2).map(|_| solid(80, 40, [0, 255, 0, 255])).collect();
    let config = GridConfig {
        labels: Some(strings(&["left", "right"])),
        x_labels: Some(strings(&["Before", "After"])),
        font_path: Some(fixture_font_path()),
        ..Default::default()
    };
    let grid = grid(&imgs, &config).unwrap();
    let rgb = grid.image().to_rgb8();
    let layout = grid.layout().unwrap();
    assert_eq!(layout.x_header_height, 14);
    assert_eq!(layout.caption_band, 14);

    for &(x, y) in &layout.cell_origins {
        // Column header above, caption band below.
        assert!(has_ink(&rgb, x..x + 80, 0..14), "no header ink over column at x={}", x);
        assert!(has_ink(&rgb, x..x + 80, y + 40..y + 54), "no caption ink under cell at x={}", x);
        // Text never bleeds into the image itself.
        assert_eq!(rgb.get_pixel(x + 40, y + 20).0, [0, 255, 0]);
    }
}

#[test]
fn test_long_x_labels_wrap_and_clip() {
    let imgs = [solid(45, 45, [0, 0, 0, 255])];
    let config = GridConfig {
        x_labels: Some(strings(&["one two three four five six seven"])),
        x_labels_max_lines: 2,
        font_path: Some(fixture_font_path()),
        ..Default::default()
    };
    let grid = grid(&imgs, &config).unwrap();
    // Never taller than max lines × line height.
    assert_eq!(grid.layout().unwrap().x_header_height, 28);
}

// ─── Determinism ────────────────────────────────────────────────

#[test]
fn test_composition_is_deterministic() {
    let imgs: Vec<_> = (0..6).map(|i| gradient(30 + i * 5, 25)).collect();
    let config = GridConfig {
        labels: Some(strings(&["a", "bb", "ccc", "dddd", "eeeee", "ffffff"])),
        x_labels: Some(strings(&["x1", "x2", "x3"])),
        y_labels: Some(strings(&["y1", "y2"])),
        labels_align: Align::Right,
        ..Default::default()
    };
    let a = grid(&imgs, &config).unwrap();
    let b = grid(&imgs, &config).unwrap();
    assert_eq!(a.size(), b.size());
    assert_eq!(a.image().as_bytes(), b.image().as_bytes());
}

// ─── Errors ─────────────────────────────────────────────────────

#[test]
fn test_x_label_count_mismatch() {
    let imgs: Vec<_> = (0..4).map(|_| solid(10, 10, [0, 0, 0, 255])).collect();
    let config = GridConfig {
        rows: Some(2),
        cols: Some(2),
        x_labels: Some(strings(&["only", "three", "given"])),
        ..Default::default()
    };
    let err = grid(&imgs, &config).unwrap_err();
    assert!(matches!(
        err,
        GridError::LabelCountMismatch {
            kind: LabelKind::Column,
            expected: 2,
            actual: 3
        }
    ));
}

#[test]
fn test_insufficient_capacity() {
    let imgs: Vec<_> = (0..6).map(|_| solid(10, 10, [0, 0, 0, 255])).collect();
    let config = GridConfig {
        rows: Some(2),
        cols: Some(2),
        ..Default::default()
    };
    assert!(matches!(
        grid(&imgs, &config),
        Err(GridError::InsufficientCapacity { images: 6, .. })
    ));
}

#[test]
fn test_bad_json_config() {
    let imgs = [solid(10, 10, [0, 0, 0, 255])];
    let err = grid_json(&imgs, r#"{ "xLabelsAlign": "middle" }"#).unwrap_err();
    assert!(err.to_string().contains("middle"));

    let err = grid_json(&imgs, r#"{ "rows": 2, }"#).unwrap_err();
    assert!(matches!(err, GridError::ConfigParse { .. }));
}

#[test]
fn test_missing_font_falls_back() {
    let imgs = [solid(50, 20, [0, 0, 0, 255])];
    let config = GridConfig {
        labels: Some(strings(&["caption"])),
        font_path: Some(PathBuf::from("/no/such/font.ttf")),
        ..Default::default()
    };
    let grid = grid(&imgs, &config).unwrap();
    // Same face as with no font configured at all.
    let fallback = load_font(None, 12).unwrap();
    assert_ne!(fallback.origin(), &FontOrigin::File(PathBuf::from("/no/such/font.ttf")));
    assert_eq!(grid.layout().unwrap().caption_band, fallback.line_height());
}

// ─── Sources ────────────────────────────────────────────────────

#[test]
fn test_paths_and_data_uris_match_decoded_images() {
    let a = gradient(16, 16);
    let b = gradient(16, 16);
    let path = temp_path("source.png");
    a.save(&path).unwrap();
    let uri = format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(png_bytes(&b))
    );

    let config = GridConfig {
        filter: ResampleFilter::Nearest,
        ..Default::default()
    };
    let from_memory = grid([&a, &b], &config).unwrap();
    let from_sources = grid(
        vec![ImageSource::from(path.as_path()), ImageSource::from(uri)],
        &config,
    )
    .unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(from_memory.image().as_bytes(), from_sources.image().as_bytes());
}

#[test]
fn test_corrupt_source_reports_index() {
    let path = temp_path("corrupt.png");
    std::fs::write(&path, b"definitely not an image").unwrap();
    let ok = solid(4, 4, [0, 0, 0, 255]);
    let err = grid(
        vec![ImageSource::from(&ok), ImageSource::from(path.as_path())],
        &GridConfig::default(),
    )
    .unwrap_err();
    std::fs::remove_file(&path).ok();
    assert!(matches!(err, GridError::ImageDecodeFailure { index: 1, .. }));
}

// ─── Facade ─────────────────────────────────────────────────────

#[test]
fn test_save_round_trip_keeps_size_and_mode() {
    let imgs: Vec<_> = (0..3).map(|i| gradient(20 + i, 18)).collect();
    let config = GridConfig {
        labels: Some(strings(&["one", "two", "three"])),
        ..Default::default()
    };
    let grid = grid(&imgs, &config).unwrap();
    let path = temp_path("round-trip.png");
    grid.save(&path).unwrap();
    let decoded = image::open(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!((decoded.width(), decoded.height()), grid.size());
    assert_eq!(decoded.color(), grid.image().color());
    assert_eq!(grid.mode(), "RGB");
}

#[test]
fn test_transparent_background_round_trip() {
    let imgs = [solid(10, 10, [255, 0, 0, 255]), solid(10, 10, [0, 255, 0, 255])];
    let config = GridConfig {
        background_color: Color::TRANSPARENT,
        spacing: 4,
        ..Default::default()
    };
    let grid = grid(&imgs, &config).unwrap();
    assert_eq!(grid.mode(), "RGBA");

    let path = temp_path("transparent.png");
    grid.save(&path).unwrap();
    let decoded = image::open(&path).unwrap().to_rgba8();
    std::fs::remove_file(&path).ok();
    // The gap between the two cells is fully transparent.
    assert_eq!(decoded.get_pixel(12, 5)[3], 0);
}

#[test]
fn test_save_to_unwritable_path_fails() {
    let grid = grid([&solid(4, 4, [0, 0, 0, 255])], &GridConfig::default()).unwrap();
    let err = grid.save("/no/such/dir/grid.png").unwrap_err();
    assert!(matches!(err, GridError::Save { .. }));
}

#[test]
fn test_resize_and_copy() {
    let imgs: Vec<_> = (0..4).map(|_| solid(50, 50, [9, 9, 9, 255])).collect();
    let grid = grid(&imgs, &GridConfig::default()).unwrap();
    let copy = grid.copy();
    let half = grid.resize(grid.width() / 2, grid.height() / 2).unwrap();
    assert_eq!(half.size(), (52, 52));
    assert_eq!(half.mode(), "RGB");
    assert_eq!(copy.size(), grid.size());
}
