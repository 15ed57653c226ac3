//! # Label Text Layout
//!
//! Wraps label strings into lines that fit a pixel width under a maximum
//! line count. Break opportunities come from UAX#14; widths come from the
//! [`FontHandle`]. Text that doesn't fit in the allowed lines is clipped
//! with a visible marker rather than silently dropped.

use crate::font::FontHandle;
use unicode_linebreak::{linebreaks, BreakOpportunity};

/// Appended to the last line when text had to be cut.
pub const CLIP_MARKER: &str = "...";

/// One wrapped line and its measured width.
#[derive(Debug, Clone, PartialEq)]
pub struct WrappedLine {
    pub text: String,
    pub width: f64,
}

/// A label after wrapping.
#[derive(Debug, Clone, PartialEq)]
pub struct WrappedLabel {
    pub lines: Vec<WrappedLine>,
    /// Distance between consecutive line tops, shared by every label set in
    /// the same font and size.
    pub line_height: u32,
    /// Whether text was cut and the last line ends in [`CLIP_MARKER`].
    pub clipped: bool,
}

impl WrappedLabel {
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Height of the whole text block.
    pub fn block_height(&self) -> u32 {
        self.lines.len() as u32 * self.line_height
    }

    /// Width of the widest line.
    pub fn widest(&self) -> f64 {
        self.lines.iter().map(|l| l.width).fold(0.0, f64::max)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Split text into UAX#14 segments. Each segment keeps its trailing
/// whitespace; the flag marks a mandatory break after it.
fn segments(text: &str) -> Vec<(&str, bool)> {
    let mut out = Vec::new();
    let mut start = 0;
    for (end, opp) in linebreaks(text) {
        out.push((&text[start..end], opp == BreakOpportunity::Mandatory && end < text.len()));
        start = end;
    }
    out
}

/// A line before the limit is applied. `split` marks a line that ends
/// inside a word cut between characters.
#[derive(Debug, Clone, PartialEq)]
struct RawLine {
    text: String,
    split: bool,
}

impl RawLine {
    fn whole(text: &str) -> Self {
        Self {
            text: text.to_string(),
            split: false,
        }
    }
}

/// Reassemble broken lines into running text. Word boundaries get a space;
/// fragments of a split word are glued back together.
fn rejoin(lines: &[RawLine]) -> String {
    let mut out = String::new();
    let mut glue = false;
    for line in lines {
        if !out.is_empty() && !glue {
            out.push(' ');
        }
        out.push_str(&line.text);
        glue = line.split;
    }
    out
}

pub struct LabelTextLayout;

impl Default for LabelTextLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl LabelTextLayout {
    pub fn new() -> Self {
        Self
    }

    /// Wrap `text` to at most `max_lines` lines no wider than `max_width`.
    ///
    /// Words are packed greedily. A word wider than a whole line is split
    /// between characters. When more lines would be needed, the remainder is
    /// folded into the last line and cut to fit with [`CLIP_MARKER`].
    pub fn wrap(&self, font: &FontHandle, text: &str, max_width: f64, max_lines: usize) -> WrappedLabel {
        let line_height = font.line_height();
        let max_lines = max_lines.max(1);
        let max_width = max_width.max(1.0);

        let text = text.trim();
        if text.is_empty() {
            return WrappedLabel {
                lines: vec![],
                line_height,
                clipped: false,
            };
        }

        let mut raw = self.break_into_lines(font, text, max_width);
        let clipped = raw.len() > max_lines;
        if clipped {
            let rest = rejoin(&raw.split_off(max_lines - 1));
            raw.push(RawLine::whole(&self.clip_line(font, &rest, max_width)));
        }

        WrappedLabel {
            lines: raw
                .into_iter()
                .map(|line| WrappedLine {
                    width: font.measure(&line.text),
                    text: line.text,
                })
                .collect(),
            line_height,
            clipped,
        }
    }

    /// Greedy line breaking with no line limit.
    fn break_into_lines(&self, font: &FontHandle, text: &str, max_width: f64) -> Vec<RawLine> {
        let mut lines = Vec::new();
        let mut current = String::new();

        for (segment, mandatory) in segments(text) {
            let mut pending = segment.to_string();
            loop {
                let candidate = format!("{}{}", current, pending);
                if font.measure(candidate.trim_end()) <= max_width {
                    current = candidate;
                    break;
                }
                if !current.trim_end().is_empty() {
                    lines.push(RawLine::whole(current.trim_end()));
                    current.clear();
                    continue;
                }

                // The word alone overflows: cut it between characters,
                // keeping at least one character per line.
                let word = pending.trim_end();
                let keep = fit_chars(font, word, max_width).max(1);
                let split = word
                    .char_indices()
                    .nth(keep)
                    .map(|(i, _)| i)
                    .unwrap_or(word.len());
                lines.push(RawLine {
                    text: word[..split].to_string(),
                    split: split < word.len(),
                });
                pending = pending[split..].to_string();
                if pending.trim().is_empty() {
                    break;
                }
            }

            if mandatory {
                lines.push(RawLine::whole(current.trim_end()));
                current.clear();
            }
        }

        if !current.trim_end().is_empty() {
            lines.push(RawLine::whole(current.trim_end()));
        }
        lines
    }

    /// Cut `text` so that it plus the clip marker fits `max_width`. The
    /// marker is kept even when it alone overflows.
    fn clip_line(&self, font: &FontHandle, text: &str, max_width: f64) -> String {
        let text = text.trim_end();
        let budget = max_width - font.measure(CLIP_MARKER);
        let keep = if budget > 0.0 { fit_chars(font, text, budget) } else { 0 };
        let head: String = text.chars().take(keep).collect();
        format!("{}{}", head.trim_end(), CLIP_MARKER)
    }
}

/// Number of leading characters of `text` that fit in `max_width`.
fn fit_chars(font: &FontHandle, text: &str, max_width: f64) -> usize {
    let mut width = 0.0;
    let mut count = 0;
    for ch in text.chars() {
        width += font.char_width(ch);
        if width > max_width {
            break;
        }
        count += 1;
    }
    count
}
