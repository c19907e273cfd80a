//! A line/chunk-segmented text buffer built over `core_rope::Rope<Segment>`.
//!
//! `TextBuffer` owns its rope, its content arena (an append-only `String`
//! that segment byte ranges index into), its per-line highlights, and a
//! lazily-rebuilt style-span cache. Two addressing dimensions are exposed
//! over the same tree: byte offsets (`aux`, used by `insert_bytes`/
//! `delete_range`) and grapheme-count offsets (`weight`, used by line/column
//! addressing and by `insert_text_at_char`/`delete_char_range`).

mod error;
mod highlight;
mod segment;

pub use error::{Result, TextError};
pub use highlight::{Highlight, Span};
pub use segment::{Segment, HARD_BREAK_TAG, LINE_START_TAG};

use std::cell::RefCell;
use std::collections::HashMap;
use std::ops::Range;

use core_grapheme::{GraphemeService, UnicodeGraphemeService};
use core_rope::Rope;
use highlight::HighlightStore;
use tracing::trace;

/// Builds `Segment`s for `text`, appending normalized bytes to `arena`.
/// Internal newlines become `HardBreak`/`LineStart` pairs; no leading or
/// trailing marker is added, so this is suitable both for the body of
/// `set_text` (prefixed by one `LineStart`) and for mid-document splices.
fn build_segments(text: &str, arena: &mut String, grapheme: &dyn GraphemeService) -> Vec<Segment> {
    let mut segments = Vec::new();
    let parts: Vec<&str> = text.split('\n').collect();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            segments.push(Segment::HardBreak);
            segments.push(Segment::LineStart);
        }
        if !part.is_empty() {
            segments.push(make_chunk_from_text(part, arena, grapheme));
        }
    }
    segments
}

fn make_chunk_from_text(text: &str, arena: &mut String, grapheme: &dyn GraphemeService) -> Segment {
    let (normalized, segs) = grapheme.normalize_and_segment(text);
    let width = segs.iter().map(|s| s.width as u64).sum();
    let grapheme_count = segs.len() as u64;
    let start = arena.len();
    arena.push_str(&normalized);
    let end = arena.len();
    Segment::TextChunk {
        range: start..end,
        width,
        grapheme_count,
    }
}

fn make_chunk_from_range(range: Range<usize>, arena: &str, grapheme: &dyn GraphemeService) -> Segment {
    let (_, segs) = grapheme.normalize_and_segment(&arena[range.clone()]);
    Segment::TextChunk {
        width: segs.iter().map(|s| s.width as u64).sum(),
        grapheme_count: segs.len() as u64,
        range,
    }
}

/// Split a `TextChunk` at the absolute arena byte offset `abs`.
fn split_chunk_at(range: &Range<usize>, abs: usize, arena: &str, grapheme: &dyn GraphemeService) -> (Segment, Segment) {
    let left = make_chunk_from_range(range.start..abs, arena, grapheme);
    let right = make_chunk_from_range(abs..range.end, arena, grapheme);
    (left, right)
}

/// Splitter for the `aux` (byte) dimension: `offset` is a byte offset
/// within the leaf.
fn split_by_byte_offset(item: &Segment, offset: u64, arena: &str, grapheme: &dyn GraphemeService) -> (Segment, Segment) {
    match item {
        Segment::TextChunk { range, .. } => {
            split_chunk_at(range, range.start + offset as usize, arena, grapheme)
        }
        other => panic!("cannot split non-chunk segment {other:?} by byte offset"),
    }
}

/// Splitter for the `weight` (grapheme-count) dimension: `offset` is a
/// grapheme index within the leaf.
fn split_by_grapheme_offset(item: &Segment, offset: u64, arena: &str, grapheme: &dyn GraphemeService) -> (Segment, Segment) {
    match item {
        Segment::TextChunk { range, .. } => {
            let text = &arena[range.clone()];
            let (_, segs) = grapheme.normalize_and_segment(text);
            let byte_in_chunk = segs.get(offset as usize).map(|s| s.start).unwrap_or(text.len());
            split_chunk_at(range, range.start + byte_in_chunk, arena, grapheme)
        }
        other => panic!("cannot split non-chunk segment {other:?} by grapheme offset"),
    }
}

pub struct TextBuffer {
    rope: Rope<Segment>,
    arena: String,
    grapheme: Box<dyn GraphemeService>,
    highlights: HighlightStore,
    span_cache: RefCell<HashMap<u32, Vec<Span>>>,
    default_style: u32,
    dirty_epoch: u64,
}

impl TextBuffer {
    pub fn new() -> Self {
        Self::with_grapheme_service(Box::new(UnicodeGraphemeService))
    }

    pub fn with_grapheme_service(grapheme: Box<dyn GraphemeService>) -> Self {
        let mut buf = Self {
            rope: Rope::new(),
            arena: String::new(),
            grapheme,
            highlights: HighlightStore::new(),
            span_cache: RefCell::new(HashMap::new()),
            default_style: 0,
            dirty_epoch: 0,
        };
        buf.set_text("");
        buf
    }

    pub fn dirty_epoch(&self) -> u64 {
        self.dirty_epoch
    }

    fn bump_epoch(&mut self) {
        self.dirty_epoch += 1;
        self.span_cache.borrow_mut().clear();
    }

    // -- ingestion -----------------------------------------------------

    /// Replace the buffer's entire contents. `bytes` is decoded lossily if
    /// it is not valid UTF-8 (malformed sequences map to the replacement
    /// character, matching the Unicode-service failure contract).
    pub fn set_text(&mut self, text: &str) {
        self.rope = Rope::new();
        self.arena.clear();
        let mut segments = vec![Segment::LineStart];
        segments.extend(build_segments(text, &mut self.arena, self.grapheme.as_ref()));
        self.rope = Rope::from_slice(&segments);
        self.highlights.clear_all();
        trace!(target: "text", lines = self.line_count(), "set_text");
        self.bump_epoch();
    }

    pub fn set_text_bytes(&mut self, bytes: &[u8]) {
        self.set_text(&String::from_utf8_lossy(bytes));
    }

    /// Insert `text` at byte offset `pos` into the logical byte stream
    /// (newlines count as one byte each, matching `Segment::aux`).
    pub fn insert_bytes(&mut self, pos: u64, text: &str) {
        if text.is_empty() {
            return;
        }
        let new_segments = build_segments(text, &mut self.arena, self.grapheme.as_ref());
        let arena_ref = &self.arena;
        let grapheme_ref = self.grapheme.as_ref();
        let splitter = |item: &Segment, offset: u64| split_by_byte_offset(item, offset, arena_ref, grapheme_ref);
        self.rope.insert_slice_by_aux(pos, &new_segments, splitter);
        trace!(target: "text", pos, len = text.len(), "insert_bytes");
        self.bump_epoch();
    }

    /// Delete logical byte range `[lo, hi)`.
    pub fn delete_range(&mut self, lo: u64, hi: u64) {
        if lo >= hi {
            return;
        }
        let arena_ref = &self.arena;
        let grapheme_ref = self.grapheme.as_ref();
        let splitter = |item: &Segment, offset: u64| split_by_byte_offset(item, offset, arena_ref, grapheme_ref);
        self.rope.delete_range_by_aux(lo, hi, splitter);
        trace!(target: "text", lo, hi, "delete_range");
        self.bump_epoch();
    }

    /// Insert `text` at grapheme-count offset `char_pos` (newlines counted
    /// as one char each).
    pub fn insert_text_at_char(&mut self, char_pos: u64, text: &str) {
        if text.is_empty() {
            return;
        }
        let new_segments = build_segments(text, &mut self.arena, self.grapheme.as_ref());
        let arena_ref = &self.arena;
        let grapheme_ref = self.grapheme.as_ref();
        let splitter = |item: &Segment, offset: u64| split_by_grapheme_offset(item, offset, arena_ref, grapheme_ref);
        self.rope.insert_slice_by_weight(char_pos, &new_segments, splitter);
        trace!(target: "text", char_pos, "insert_text_at_char");
        self.bump_epoch();
    }

    /// Delete grapheme-count range `[lo, hi)`.
    pub fn delete_char_range(&mut self, lo: u64, hi: u64) {
        if lo >= hi {
            return;
        }
        let arena_ref = &self.arena;
        let grapheme_ref = self.grapheme.as_ref();
        let splitter = |item: &Segment, offset: u64| split_by_grapheme_offset(item, offset, arena_ref, grapheme_ref);
        self.rope.delete_range_by_weight(lo, hi, splitter);
        trace!(target: "text", lo, hi, "delete_char_range");
        self.bump_epoch();
    }

    // -- line queries ----------------------------------------------------

    pub fn line_count(&self) -> u32 {
        self.rope.marker_count(LINE_START_TAG)
    }

    /// Grapheme-count offset of the start of logical line `line`.
    pub fn get_line_start(&self, line: u32) -> Option<u64> {
        let leaf_index = self.rope.get_marker(LINE_START_TAG, line)?;
        let mut acc = 0u64;
        let mut found = false;
        self.rope.walk(|item, idx| {
            if idx == leaf_index {
                found = true;
                return core_rope::WalkControl::stop();
            }
            acc += item.weight();
            core_rope::WalkControl::cont()
        });
        if found { Some(acc) } else { None }
    }

    /// Grapheme count of logical line `line`'s own text (excluding the
    /// implicit trailing newline char).
    pub fn line_width_graphemes(&self, line: u32) -> u32 {
        self.line_segments(line)
            .iter()
            .filter_map(|s| s.as_chunk())
            .map(|(_, _, count)| count as u32)
            .sum()
    }

    /// Display-column width of logical line `line`.
    pub fn line_width_cols(&self, line: u32) -> u32 {
        self.line_segments(line)
            .iter()
            .filter_map(|s| s.as_chunk())
            .map(|(_, width, _)| width as u32)
            .sum()
    }

    pub fn line_text(&self, line: u32) -> String {
        self.line_segments(line)
            .iter()
            .filter_map(|s| s.as_chunk())
            .map(|(range, _, _)| &self.arena[range.clone()])
            .collect()
    }

    /// The chunk/marker segments making up logical line `line`, in order,
    /// stopping at (but not including) the next `HardBreak`.
    fn line_segments(&self, line: u32) -> Vec<Segment> {
        let Some(start_leaf) = self.rope.get_marker(LINE_START_TAG, line) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        self.rope.walk_from(start_leaf + 1, |item, _idx| {
            if item.is_hard_break() {
                return core_rope::WalkControl::stop();
            }
            out.push(item.clone());
            core_rope::WalkControl::cont()
        });
        out
    }

    pub fn to_plain_text(&self) -> String {
        let mut out = String::new();
        self.rope.walk(|item, _idx| {
            match item {
                Segment::TextChunk { range, .. } => out.push_str(&self.arena[range.clone()]),
                Segment::HardBreak => out.push('\n'),
                _ => {}
            }
            core_rope::WalkControl::cont()
        });
        out
    }

    pub fn total_char_count(&self) -> u64 {
        self.rope.total_weight()
    }

    pub fn to_text(&self) -> String {
        self.rope.to_text()
    }

    /// The grapheme/measurement service this buffer was constructed with, so
    /// dependents (views) can re-segment a line's text the same way the
    /// buffer itself did rather than owning a second, possibly divergent,
    /// service instance.
    pub fn grapheme_service(&self) -> &dyn GraphemeService {
        self.grapheme.as_ref()
    }

    // -- undo --------------------------------------------------------------

    /// Snapshots the rope's current root as an undo point. Callers wrap this
    /// around a logical edit, not around every rope-level mutation, so a
    /// multi-step logical edit (e.g. deleting a selection then retyping)
    /// can still be grouped by calling this once up front.
    pub fn store_undo(&mut self) {
        self.rope.store_undo();
    }

    pub fn can_undo(&self) -> bool {
        self.rope.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.rope.can_redo()
    }

    pub fn undo(&mut self) -> Result<()> {
        self.rope.undo()?;
        self.bump_epoch();
        Ok(())
    }

    pub fn redo(&mut self) -> Result<()> {
        self.rope.redo()?;
        self.bump_epoch();
        Ok(())
    }

    pub fn clear_history(&mut self) {
        self.rope.clear_history();
    }

    // -- highlights ------------------------------------------------------

    pub fn add_highlight(&mut self, line: u32, col_start: u32, col_end: u32, style_id: u32, priority: u32, ref_id: Option<u64>) {
        if col_start >= col_end {
            return;
        }
        self.highlights.add(
            line,
            Highlight {
                col_start,
                col_end,
                style_id,
                priority,
                ref_id,
            },
        );
        self.span_cache.borrow_mut().remove(&line);
    }

    /// Decompose a global grapheme-count range into per-line highlights.
    pub fn add_highlight_by_char_range(&mut self, start: u64, end: u64, style_id: u32, priority: u32, ref_id: Option<u64>) {
        if start >= end {
            return;
        }
        let line_count = self.line_count();
        for line in 0..line_count {
            let Some(line_start) = self.get_line_start(line) else {
                continue;
            };
            let line_width = self.line_width_graphemes(line) as u64;
            let line_end = line_start + line_width;
            let seg_start = start.max(line_start);
            let seg_end = end.min(line_end);
            if seg_start >= seg_end {
                continue;
            }
            let col_start = (seg_start - line_start) as u32;
            let col_end = (seg_end - line_start) as u32;
            self.add_highlight(line, col_start, col_end, style_id, priority, ref_id);
        }
    }

    pub fn remove_highlights_by_ref(&mut self, ref_id: u64) {
        self.highlights.remove_by_ref(ref_id);
        self.span_cache.borrow_mut().clear();
    }

    pub fn clear_line_highlights(&mut self, line: u32) {
        self.highlights.clear_line(line);
        self.span_cache.borrow_mut().remove(&line);
    }

    pub fn clear_all_highlights(&mut self) {
        self.highlights.clear_all();
        self.span_cache.borrow_mut().clear();
    }

    pub fn get_line_highlights(&self, line: u32) -> Vec<Highlight> {
        self.highlights.line(line).to_vec()
    }

    /// Cached, coalesced style spans covering `[0, line_width)` for `line`,
    /// in grapheme-column units (the same units as `Highlight::col_start`/
    /// `col_end` and the vline `col_offset`/`grapheme_count` axis).
    pub fn get_line_spans(&self, line: u32) -> Vec<Span> {
        if let Some(cached) = self.span_cache.borrow().get(&line) {
            return cached.clone();
        }
        let width = self.line_width_graphemes(line);
        let spans = highlight::compute_line_spans(self.highlights.line(line), width, self.default_style);
        self.span_cache.borrow_mut().insert(line, spans.clone());
        spans
    }
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}
