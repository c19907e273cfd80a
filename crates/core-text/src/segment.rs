//! The rope leaf type a `TextBuffer` is built from.

use std::ops::Range;

use core_rope::RopeItem;

/// Marker tag for `Segment::LineStart` leaves.
pub const LINE_START_TAG: u32 = 0;
/// Marker tag for `Segment::HardBreak` leaves.
pub const HARD_BREAK_TAG: u32 = 1;

/// A leaf of a `TextBuffer`'s rope.
///
/// `LineStart` and `HardBreak` are zero-byte marker variants; `TextChunk`
/// holds a byte range into the buffer's content arena plus its precomputed
/// display width and grapheme count so line/column math never re-measures
/// text that hasn't changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// The rope's sentinel leaf; never appears except as the sole leaf of
    /// an empty rope.
    Sentinel,
    LineStart,
    TextChunk {
        range: Range<usize>,
        width: u64,
        grapheme_count: u64,
    },
    HardBreak,
}

impl Segment {
    pub fn is_line_start(&self) -> bool {
        matches!(self, Segment::LineStart)
    }

    pub fn is_hard_break(&self) -> bool {
        matches!(self, Segment::HardBreak)
    }

    pub fn as_chunk(&self) -> Option<(&Range<usize>, u64, u64)> {
        match self {
            Segment::TextChunk {
                range,
                width,
                grapheme_count,
            } => Some((range, *width, *grapheme_count)),
            _ => None,
        }
    }
}

impl RopeItem for Segment {
    fn empty() -> Self {
        Segment::Sentinel
    }

    fn is_empty(&self) -> bool {
        matches!(self, Segment::Sentinel)
    }

    /// Grapheme-count contribution: a `TextChunk`'s own grapheme count, a
    /// `HardBreak`'s implicit newline counted as one char, `LineStart`
    /// contributes nothing.
    fn weight(&self) -> u64 {
        match self {
            Segment::Sentinel | Segment::LineStart => 0,
            Segment::HardBreak => 1,
            Segment::TextChunk { grapheme_count, .. } => *grapheme_count,
        }
    }

    /// Byte-length contribution: a `TextChunk`'s own byte range, a
    /// `HardBreak`'s one `\n` byte, `LineStart` contributes nothing.
    fn aux(&self) -> u64 {
        match self {
            Segment::Sentinel | Segment::LineStart => 0,
            Segment::HardBreak => 1,
            Segment::TextChunk { range, .. } => (range.end - range.start) as u64,
        }
    }

    fn marker(&self) -> Option<u32> {
        match self {
            Segment::LineStart => Some(LINE_START_TAG),
            Segment::HardBreak => Some(HARD_BREAK_TAG),
            _ => None,
        }
    }
}
