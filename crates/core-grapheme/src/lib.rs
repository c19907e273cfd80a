//! Grapheme segmentation and terminal display-width measurement.
//!
//! Everything upstream of the terminal cell grid (explicitly out of scope
//! here) needs to agree on two questions about a chunk of text: where do
//! the grapheme cluster boundaries fall, and how many terminal columns does
//! each cluster occupy. [`GraphemeService`] is the trait boundary a
//! `TextBuffer`/`TextBufferView` is built against; [`UnicodeGraphemeService`]
//! is the default, fuller classifier, and [`WcwidthGraphemeService`] is a
//! thin pass-through for callers that just want `unicode-width`'s answer.

mod classify;

use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

/// A single grapheme cluster within a normalized string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub cluster: String,
    /// Byte offset in the normalized string (inclusive).
    pub start: usize,
    /// Byte offset in the normalized string (exclusive).
    pub end: usize,
    /// Terminal cell width.
    pub width: u16,
}

/// A pluggable grapheme segmentation + width measurement strategy.
pub trait GraphemeService {
    /// Display width, in terminal columns, of a single grapheme cluster.
    /// `egc` must already be a single cluster; behavior on multi-cluster
    /// input is unspecified.
    fn cluster_width(&self, egc: &str) -> u16;

    /// Normalize `input` to NFC and segment it into grapheme clusters with
    /// byte ranges and widths. Clusters are in order, non-overlapping, and
    /// concatenate back to the normalized string.
    fn normalize_and_segment(&self, input: &str) -> (String, Vec<Segment>) {
        let normalized: String = input.nfc().collect();
        let mut out = Vec::new();
        let mut byte = 0usize;
        for g in normalized.graphemes(true) {
            let len = g.len();
            out.push(Segment {
                cluster: g.to_string(),
                start: byte,
                end: byte + len,
                width: self.cluster_width(g),
            });
            byte += len;
        }
        (normalized, out)
    }
}

/// A thin pass-through over `unicode-width`, with no emoji/combining-mark
/// classification beyond what that crate gives for free. Cheaper than
/// [`UnicodeGraphemeService`]; appropriate when the host terminal's own
/// East-Asian-width/emoji behavior is known to match `unicode-width`.
#[derive(Debug, Default, Clone, Copy)]
pub struct WcwidthGraphemeService;

impl GraphemeService for WcwidthGraphemeService {
    fn cluster_width(&self, egc: &str) -> u16 {
        egc.chars()
            .map(|c| unicode_width::UnicodeWidthChar::width(c).unwrap_or(1) as u16)
            .sum::<u16>()
            .max(if egc.is_empty() { 0 } else { 1 })
    }
}

/// The fuller classifier: emoji ZWJ sequences, flags, keycaps, skin-tone
/// modifiers, and combining-mark clusters are given the width a real
/// terminal renders them at rather than the sum of their `unicode-width`
/// per-codepoint answers.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnicodeGraphemeService;

impl GraphemeService for UnicodeGraphemeService {
    fn cluster_width(&self, egc: &str) -> u16 {
        classify::egc_width(egc)
    }
}

pub use classify::egc_width;
