//! # Image Sources and Decoding
//!
//! Callers hand the grid either images they already decoded or references
//! to images on disk. Everything is normalized to [`ImageEntry`] in one pass
//! before layout starts. Decoded images are borrowed, never copied.
//!
//! Supported path forms:
//! - `data:image/...;base64,...` data URIs
//! - file paths (absolute or relative)

use crate::error::GridError;
use image::{DynamicImage, GenericImageView};
use std::borrow::Cow;
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// One input to the grid.
#[derive(Debug, Clone)]
pub enum ImageSource<'a> {
    /// An image the caller already decoded. Read, never modified.
    Decoded(&'a DynamicImage),
    /// A file path or data URI to decode.
    Path(PathBuf),
}

impl<'a> From<&'a DynamicImage> for ImageSource<'a> {
    fn from(img: &'a DynamicImage) -> Self {
        ImageSource::Decoded(img)
    }
}

impl From<PathBuf> for ImageSource<'_> {
    fn from(p: PathBuf) -> Self {
        ImageSource::Path(p)
    }
}

impl From<&Path> for ImageSource<'_> {
    fn from(p: &Path) -> Self {
        ImageSource::Path(p.to_path_buf())
    }
}

impl From<&str> for ImageSource<'_> {
    fn from(s: &str) -> Self {
        ImageSource::Path(PathBuf::from(s))
    }
}

impl From<String> for ImageSource<'_> {
    fn from(s: String) -> Self {
        ImageSource::Path(PathBuf::from(s))
    }
}

/// A decoded input image with its natural size.
#[derive(Debug, Clone)]
pub struct ImageEntry<'a> {
    /// Position in the caller's input list.
    pub index: usize,
    pub image: Cow<'a, DynamicImage>,
    pub width: u32,
    pub height: u32,
}

impl<'a> ImageEntry<'a> {
    fn new(index: usize, image: Cow<'a, DynamicImage>) -> Self {
        let (width, height) = image.dimensions();
        Self {
            index,
            image,
            width,
            height,
        }
    }
}

/// Resolve every source to a decoded image, failing on the first source
/// that cannot be read or decoded.
pub fn normalize<'a>(sources: Vec<ImageSource<'a>>) -> Result<Vec<ImageEntry<'a>>, GridError> {
    sources
        .into_iter()
        .enumerate()
        .map(|(index, source)| match source {
            ImageSource::Decoded(img) => Ok(ImageEntry::new(index, Cow::Borrowed(img))),
            ImageSource::Path(path) => {
                let img = load_image(&path).map_err(|reason| GridError::ImageDecodeFailure {
                    index,
                    path: describe(&path),
                    reason,
                })?;
                Ok(ImageEntry::new(index, Cow::Owned(img)))
            }
        })
        .collect()
}

/// Load and decode an image from a file path or data URI.
pub fn load_image(src: &Path) -> Result<DynamicImage, String> {
    let raw_bytes = read_source_bytes(src)?;
    decode_image_bytes(&raw_bytes)
}

/// Resolve the source to raw image bytes.
fn read_source_bytes(src: &Path) -> Result<Vec<u8>, String> {
    // Data URI: data:image/png;base64,iVBOR...
    if let Some(uri) = src.to_str().filter(|s| s.starts_with("data:image/")) {
        let comma_pos = uri
            .find(',')
            .ok_or_else(|| "Invalid data URI: missing comma".to_string())?;
        return base64_decode(&uri[comma_pos + 1..]);
    }

    std::fs::read(src).map_err(|e| format!("Failed to read image file: {}", e))
}

fn base64_decode(input: &str) -> Result<Vec<u8>, String> {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD
        .decode(input.trim())
        .map_err(|e| format!("Base64 decode error: {}", e))
}

/// Detect the format from magic bytes and decode.
fn decode_image_bytes(data: &[u8]) -> Result<DynamicImage, String> {
    if data.len() < 4 {
        return Err("Image data too short".to_string());
    }

    image::io::Reader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| format!("Format detection error: {}", e))?
        .decode()
        .map_err(|e| format!("Failed to decode image: {}", e))
}

/// A short, printable form of a source for error messages. Data URIs are
/// abbreviated so a failing inline image doesn't flood the terminal.
fn describe(src: &Path) -> String {
    let s = src.to_string_lossy();
    if s.starts_with("data:") && s.chars().count() > 32 {
        format!("{}...", s.chars().take(32).collect::<String>())
    } else {
        s.into_owned()
    }
}
