//! A wrapping, viewport- and selection-aware projection over a `core_text::TextBuffer`.
//!
//! `TextBufferView` holds a non-owning reference to the buffer it projects
//! and owns only its own derived caches (virtual lines, line-start/width
//! arrays). It never mutates the buffer. Caches are rebuilt lazily, on the
//! next query, whenever the buffer's `dirty_epoch` has advanced past the
//! epoch the view last saw, or the view's own configuration (wrap mode/
//! width, viewport) has changed since the last rebuild.

mod selection;
mod wrap;

pub use selection::{Selection, SelectionColor, SELECTION_SENTINEL};

use core_grapheme::GraphemeService;
use core_text::{Span, TextBuffer};
use tracing::trace;
use wrap::{is_word_break_class, WrapGrapheme};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WrapMode {
    #[default]
    None,
    Char,
    Word,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// One visual row produced by wrapping: a sub-range of a logical line's
/// graphemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VLine {
    pub source_line: u32,
    pub col_offset: u32,
    pub grapheme_count: u32,
    pub width: u32,
}

/// Parallel per-logical-line arrays: char offset of each line's start
/// (newlines counted as one char) and each line's display width.
#[derive(Debug, Clone, Default)]
pub struct LineInfo {
    pub starts: Vec<u64>,
    pub widths: Vec<u32>,
}

#[derive(Debug, Default)]
struct Cache {
    built: bool,
    buffer_epoch: u64,
    view_epoch: u64,
    vlines: Vec<VLine>,
    line_info: LineInfo,
}

pub struct TextBufferView<'a> {
    buffer: &'a TextBuffer,
    wrap_mode: WrapMode,
    wrap_width: Option<u32>,
    viewport: Option<Viewport>,
    selection: Selection,
    view_epoch: u64,
    cache: Cache,
}

impl<'a> TextBufferView<'a> {
    pub fn new(buffer: &'a TextBuffer) -> Self {
        Self {
            buffer,
            wrap_mode: WrapMode::None,
            wrap_width: None,
            viewport: None,
            selection: Selection::default(),
            view_epoch: 0,
            cache: Cache::default(),
        }
    }

    fn bump_view_epoch(&mut self) {
        self.view_epoch += 1;
    }

    // -- configuration -----------------------------------------------------

    pub fn set_wrap_mode(&mut self, mode: WrapMode) {
        self.wrap_mode = mode;
        self.bump_view_epoch();
    }

    pub fn set_wrap_width(&mut self, width: Option<u32>) {
        self.wrap_width = width;
        self.bump_view_epoch();
    }

    pub fn wrap_mode(&self) -> WrapMode {
        self.wrap_mode
    }

    pub fn wrap_width(&self) -> Option<u32> {
        self.wrap_width
    }

    /// The view never clamps this itself; scroll policy is the editor
    /// layer's responsibility.
    pub fn set_viewport(&mut self, vp: Viewport) {
        self.viewport = Some(vp);
        self.bump_view_epoch();
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    // -- cache maintenance ---------------------------------------------------

    fn ensure_fresh(&mut self) {
        let buffer_epoch = self.buffer.dirty_epoch();
        if self.cache.built && self.cache.buffer_epoch == buffer_epoch && self.cache.view_epoch == self.view_epoch {
            return;
        }
        self.rebuild_cache(buffer_epoch);
    }

    fn wrap_line(&self, text: &str, grapheme: &dyn GraphemeService) -> Vec<wrap::WrapSpan> {
        let (_, segs) = grapheme.normalize_and_segment(text);
        match self.wrap_mode {
            WrapMode::None => {
                let width: u32 = segs.iter().map(|s| s.width as u32).sum();
                vec![wrap::WrapSpan {
                    col_offset: 0,
                    grapheme_count: segs.len() as u32,
                    width,
                }]
            }
            WrapMode::Char | WrapMode::Word => {
                let wrap_width = self.wrap_width.unwrap_or(u32::MAX);
                let graphemes: Vec<WrapGrapheme> = segs
                    .iter()
                    .map(|s| WrapGrapheme {
                        width: s.width as u32,
                        is_break_class: is_word_break_class(&s.cluster),
                    })
                    .collect();
                if self.wrap_mode == WrapMode::Char {
                    wrap::wrap_char(&graphemes, wrap_width)
                } else {
                    wrap::wrap_word(&graphemes, wrap_width)
                }
            }
        }
    }

    fn rebuild_cache(&mut self, buffer_epoch: u64) {
        let line_count = self.buffer.line_count();
        let mut vlines = Vec::new();
        let mut starts = Vec::with_capacity(line_count as usize);
        let mut widths = Vec::with_capacity(line_count as usize);
        for line in 0..line_count {
            starts.push(self.buffer.get_line_start(line).unwrap_or(0));
            widths.push(self.buffer.line_width_cols(line));
            let text = self.buffer.line_text(line);
            for span in self.wrap_line(&text, self.buffer.grapheme_service()) {
                vlines.push(VLine {
                    source_line: line,
                    col_offset: span.col_offset,
                    grapheme_count: span.grapheme_count,
                    width: span.width,
                });
            }
        }
        trace!(target: "view", lines = line_count, vlines = vlines.len(), "rebuilt virtual lines");
        self.cache = Cache {
            built: true,
            buffer_epoch,
            view_epoch: self.view_epoch,
            vlines,
            line_info: LineInfo { starts, widths },
        };
    }

    // -- virtual lines -------------------------------------------------------

    pub fn get_virtual_line_count(&mut self) -> u32 {
        self.ensure_fresh();
        self.cache.vlines.len() as u32
    }

    pub fn get_virtual_lines(&mut self) -> &[VLine] {
        self.ensure_fresh();
        &self.cache.vlines
    }

    pub fn get_cached_line_info(&mut self) -> &LineInfo {
        self.ensure_fresh();
        &self.cache.line_info
    }

    /// The source line's cached style spans wholesale; the renderer is
    /// expected to clip to `[col_offset, col_offset + grapheme_count)`.
    pub fn get_virtual_line_spans(&mut self, vline_index: u32) -> Option<(u32, u32, Vec<Span>)> {
        self.ensure_fresh();
        let vline = *self.cache.vlines.get(vline_index as usize)?;
        Some((vline.source_line, vline.col_offset, self.buffer.get_line_spans(vline.source_line)))
    }

    // -- selection -------------------------------------------------------

    pub fn set_selection(&mut self, start: u64, end: u64, bg: Option<u32>, fg: Option<u32>) {
        self.selection.set(start, end, bg, fg);
    }

    /// Converts viewport-local (visual) coordinates to a global char offset.
    fn local_to_global(&mut self, x: u32, y: u32) -> u64 {
        self.ensure_fresh();
        let vp = self.viewport.unwrap_or_default();
        let visual_row = (vp.y + y) as usize;
        let wrapping = self.wrap_mode != WrapMode::None;
        let col = if wrapping { x } else { vp.x + x };
        let Some(vline) = self.cache.vlines.get(visual_row) else {
            return self.buffer.total_char_count();
        };
        let source_line = vline.source_line;
        let line_width = self.buffer.line_width_graphemes(source_line);
        let logical_col = (vline.col_offset + col).min(line_width);
        let line_start = self.buffer.get_line_start(source_line).unwrap_or(0);
        line_start + logical_col as u64
    }

    pub fn set_local_selection(&mut self, x0: u32, y0: u32, x1: u32, y1: u32, bg: Option<u32>, fg: Option<u32>) {
        let start = self.local_to_global(x0, y0);
        let end = self.local_to_global(x1, y1);
        self.selection.set(start, end, bg, fg);
    }

    pub fn reset_local_selection(&mut self) {
        self.selection.clear();
    }

    pub fn pack_selection_info(&self) -> u64 {
        self.selection.packed()
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Walks the buffer in char order from `selection.start` to
    /// `selection.end`, appending bytes to `out`; newlines count as a single
    /// `\n` byte. Returns the number of bytes appended.
    pub fn get_selected_text_into_buffer(&self, out: &mut String) -> usize {
        let Some((start, end)) = self.selection.range else {
            return 0;
        };
        let before = out.len();
        let line_count = self.buffer.line_count();
        let grapheme = self.buffer.grapheme_service();
        for line in 0..line_count {
            let Some(line_start) = self.buffer.get_line_start(line) else {
                continue;
            };
            let line_width = self.buffer.line_width_graphemes(line) as u64;
            let line_end_char = line_start + line_width;
            let seg_start = start.max(line_start);
            let seg_end = end.min(line_end_char);
            if seg_start < seg_end {
                let text = self.buffer.line_text(line);
                let (_, segs) = grapheme.normalize_and_segment(&text);
                let g_start = (seg_start - line_start) as usize;
                let g_end = (seg_end - line_start) as usize;
                let byte_start = segs.get(g_start).map(|s| s.start).unwrap_or(text.len());
                let byte_end = segs.get(g_end.saturating_sub(1)).map(|s| s.end).unwrap_or(text.len());
                out.push_str(&text[byte_start..byte_end]);
            }
            if line + 1 < line_count && start <= line_end_char && line_end_char < end {
                out.push('\n');
            }
        }
        out.len() - before
    }
}
