//! Cursor(s) and logical edit operations over a `core_text::TextBuffer`.
//!
//! `EditBuffer` owns the buffer outright and exposes character-oriented
//! edits (insert/delete/line ops) in terms of `(row, col)` cursor positions
//! rather than the buffer's own byte/grapheme offsets, grouping each
//! user-visible edit into one undo snapshot.

use core_grapheme::GraphemeService;
use core_text::TextBuffer;
use tracing::trace;

/// A cursor in logical `(row, col)` space. `desired_col` is the sticky
/// column `moveUp`/`moveDown` chase across lines of varying width; it is
/// reset by any horizontal movement or edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub row: u32,
    pub col: u32,
    pub desired_col: Option<u32>,
}

pub struct EditBuffer {
    buffer: TextBuffer,
    cursors: Vec<Cursor>,
}

/// Grapheme-count length `s` would add to the buffer's char dimension:
/// each non-empty run between newlines segments to its grapheme count, and
/// every newline itself counts as one char, matching `Segment::weight`.
fn char_length_of(s: &str, grapheme: &dyn GraphemeService) -> u64 {
    let newline_count = s.matches('\n').count() as u64;
    if newline_count == 0 {
        let (_, segs) = grapheme.normalize_and_segment(s);
        return segs.len() as u64;
    }
    let mut total = newline_count;
    for part in s.split('\n') {
        if !part.is_empty() {
            let (_, segs) = grapheme.normalize_and_segment(part);
            total += segs.len() as u64;
        }
    }
    total
}

impl EditBuffer {
    pub fn new() -> Self {
        Self {
            buffer: TextBuffer::new(),
            cursors: vec![Cursor::default()],
        }
    }

    pub fn with_buffer(buffer: TextBuffer) -> Self {
        Self {
            buffer,
            cursors: vec![Cursor::default()],
        }
    }

    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    pub fn cursors(&self) -> &[Cursor] {
        &self.cursors
    }

    pub fn primary_cursor(&self) -> Cursor {
        self.cursors[0]
    }

    pub fn add_cursor(&mut self, row: u32, col: u32) {
        self.cursors.push(Cursor { row, col, desired_col: None });
        self.clamp_all_cursors();
    }

    pub fn clear_extra_cursors(&mut self) {
        self.cursors.truncate(1);
    }

    // -- whole-buffer replace --------------------------------------------

    /// Replaces the buffer's entire contents. When `preserve_cursor` is
    /// false the cursor list collapses to a single cursor at `(0, 0)`.
    pub fn set_text(&mut self, text: &str, preserve_cursor: bool) {
        let saved = self.cursors.clone();
        self.buffer.set_text(text);
        if preserve_cursor {
            self.cursors = saved;
            self.clamp_all_cursors();
        } else {
            self.cursors = vec![Cursor::default()];
        }
    }

    // -- undo --------------------------------------------------------------

    pub fn can_undo(&self) -> bool {
        self.buffer.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.buffer.can_redo()
    }

    pub fn undo(&mut self) -> core_text::Result<()> {
        self.buffer.undo()?;
        self.clamp_all_cursors();
        Ok(())
    }

    pub fn redo(&mut self) -> core_text::Result<()> {
        self.buffer.redo()?;
        self.clamp_all_cursors();
        Ok(())
    }

    // -- position helpers --------------------------------------------------

    fn to_char_offset(&self, row: u32, col: u32) -> u64 {
        let row = row.min(self.buffer.line_count().saturating_sub(1));
        self.buffer.get_line_start(row).unwrap_or(0) + col as u64
    }

    fn char_offset_of(&self, idx: usize) -> u64 {
        let c = self.cursors[idx];
        self.to_char_offset(c.row, c.col)
    }

    /// Logical `(row, col)` for a global grapheme-count offset, found by a
    /// linear sweep over lines. Editors hold far fewer cursors than a
    /// rope has leaves, so this is never the hot path the rope itself is.
    fn position_from_char_offset(&self, offset: u64) -> (u32, u32) {
        let line_count = self.buffer.line_count();
        if line_count == 0 {
            return (0, 0);
        }
        let mut last = (0u32, 0u32);
        for line in 0..line_count {
            let start = self.buffer.get_line_start(line).unwrap_or(0);
            let width = self.buffer.line_width_graphemes(line) as u64;
            let end = start + width;
            last = (line, width.min(offset.saturating_sub(start)) as u32);
            if offset <= end || line + 1 == line_count {
                return last;
            }
        }
        last
    }

    fn clamp_cursor(&self, mut c: Cursor) -> Cursor {
        let line_count = self.buffer.line_count().max(1);
        if c.row >= line_count {
            c.row = line_count - 1;
        }
        let width = self.buffer.line_width_graphemes(c.row);
        if c.col > width {
            c.col = width;
        }
        c
    }

    fn clamp_all_cursors(&mut self) {
        for i in 0..self.cursors.len() {
            let c = self.cursors[i];
            self.cursors[i] = self.clamp_cursor(c);
        }
    }

    /// Runs `op` once per cursor, left-to-right by original position, so a
    /// cursor whose edit lands before another's shifts the later one by
    /// its own net length change. `op` receives the cursor's current
    /// (already-shifted) base offset and must return `(length_delta,
    /// new_offset)` for that cursor.
    fn for_each_cursor_ordered(&mut self, mut op: impl FnMut(&mut TextBuffer, u64) -> (i64, u64)) {
        let initial: Vec<u64> = (0..self.cursors.len()).map(|i| self.char_offset_of(i)).collect();
        let mut order: Vec<usize> = (0..self.cursors.len()).collect();
        order.sort_by_key(|&i| initial[i]);
        let mut delta: i64 = 0;
        for idx in order {
            let base = (initial[idx] as i64 + delta).max(0) as u64;
            let (length_delta, new_offset) = op(&mut self.buffer, base);
            let (row, col) = self.position_from_char_offset(new_offset);
            self.cursors[idx].row = row;
            self.cursors[idx].col = col;
            self.cursors[idx].desired_col = None;
            delta += length_delta;
        }
        self.clamp_all_cursors();
    }

    /// Deletes global grapheme-count range `[start, end)` and shifts every
    /// cursor by however much of the range fell before it.
    fn apply_delete_and_shift(&mut self, start: u64, end: u64) {
        if start >= end {
            return;
        }
        let old_offsets: Vec<u64> = (0..self.cursors.len()).map(|i| self.char_offset_of(i)).collect();
        self.buffer.store_undo();
        let len = end - start;
        self.buffer.delete_char_range(start, end);
        for (i, off) in old_offsets.into_iter().enumerate() {
            let new_off = if off <= start {
                off
            } else if off >= end {
                off - len
            } else {
                start
            };
            let (row, col) = self.position_from_char_offset(new_off);
            self.cursors[i].row = row;
            self.cursors[i].col = col;
            self.cursors[i].desired_col = None;
        }
        self.clamp_all_cursors();
    }

    // -- editing -------------------------------------------------------------

    /// Inserts `s` at each cursor's position, advancing each cursor past
    /// the inserted graphemes; embedded newlines split lines.
    pub fn insert_text(&mut self, s: &str) {
        if s.is_empty() || self.cursors.is_empty() {
            return;
        }
        self.buffer.store_undo();
        let advance = char_length_of(s, self.buffer.grapheme_service()) as i64;
        self.for_each_cursor_ordered(|buf, base| {
            buf.insert_text_at_char(base, s);
            (advance, (base as i64 + advance) as u64)
        });
        trace!(target: "edit", cursors = self.cursors.len(), "insert_text");
    }

    /// Deletes the grapheme before each cursor, or joins with the previous
    /// line when a cursor sits at column 0.
    pub fn backspace(&mut self) {
        if self.cursors.is_empty() {
            return;
        }
        self.buffer.store_undo();
        self.for_each_cursor_ordered(|buf, base| {
            if base == 0 {
                return (0, 0);
            }
            buf.delete_char_range(base - 1, base);
            (-1, base - 1)
        });
        trace!(target: "edit", "backspace");
    }

    /// Symmetric to `backspace`: deletes the grapheme at each cursor.
    pub fn delete_forward(&mut self) {
        if self.cursors.is_empty() {
            return;
        }
        self.buffer.store_undo();
        self.for_each_cursor_ordered(|buf, base| {
            if base >= buf.total_char_count() {
                return (0, base);
            }
            buf.delete_char_range(base, base + 1);
            (-1, base)
        });
        trace!(target: "edit", "delete_forward");
    }

    /// Deletes global grapheme-count range `[start, end)`.
    pub fn delete_range(&mut self, start: u64, end: u64) {
        self.apply_delete_and_shift(start.min(end), start.max(end));
        trace!(target: "edit", start, end, "delete_range");
    }

    /// Deletes the primary cursor's current line, including its own
    /// trailing newline (or the preceding one, if it is the last line).
    pub fn delete_line(&mut self) {
        let line = self.cursors[0].row;
        let line_count = self.buffer.line_count();
        let start = self.buffer.get_line_start(line).unwrap_or(0);
        let width = self.buffer.line_width_graphemes(line) as u64;
        let (del_start, del_end) = if line_count <= 1 {
            (start, start + width)
        } else if line + 1 < line_count {
            (start, start + width + 1)
        } else {
            (start.saturating_sub(1), start + width)
        };
        self.apply_delete_and_shift(del_start, del_end);
        trace!(target: "edit", line, "delete_line");
    }

    pub fn goto_line(&mut self, n: u32) {
        let line_count = self.buffer.line_count();
        let row = n.min(line_count.saturating_sub(1));
        self.cursors[0] = Cursor { row, col: 0, desired_col: None };
    }

    pub fn set_cursor(&mut self, row: u32, col: u32) {
        self.cursors[0] = Cursor { row, col, desired_col: None };
        self.clamp_all_cursors();
    }

    fn move_cursor_left(&mut self, idx: usize) {
        let c = self.cursors[idx];
        if c.col > 0 {
            self.cursors[idx] = Cursor { row: c.row, col: c.col - 1, desired_col: None };
        } else if c.row > 0 {
            let prev_width = self.buffer.line_width_graphemes(c.row - 1);
            self.cursors[idx] = Cursor { row: c.row - 1, col: prev_width, desired_col: None };
        }
    }

    fn move_cursor_right(&mut self, idx: usize) {
        let c = self.cursors[idx];
        let width = self.buffer.line_width_graphemes(c.row);
        if c.col < width {
            self.cursors[idx] = Cursor { row: c.row, col: c.col + 1, desired_col: None };
        } else if c.row + 1 < self.buffer.line_count() {
            self.cursors[idx] = Cursor { row: c.row + 1, col: 0, desired_col: None };
        }
    }

    fn move_cursor_up(&mut self, idx: usize) {
        let c = self.cursors[idx];
        if c.row == 0 {
            return;
        }
        let desired = c.desired_col.unwrap_or(c.col);
        let row = c.row - 1;
        let col = desired.min(self.buffer.line_width_graphemes(row));
        self.cursors[idx] = Cursor { row, col, desired_col: Some(desired) };
    }

    fn move_cursor_down(&mut self, idx: usize) {
        let c = self.cursors[idx];
        if c.row + 1 >= self.buffer.line_count() {
            return;
        }
        let desired = c.desired_col.unwrap_or(c.col);
        let row = c.row + 1;
        let col = desired.min(self.buffer.line_width_graphemes(row));
        self.cursors[idx] = Cursor { row, col, desired_col: Some(desired) };
    }

    pub fn move_left(&mut self) {
        for i in 0..self.cursors.len() {
            self.move_cursor_left(i);
        }
    }

    pub fn move_right(&mut self) {
        for i in 0..self.cursors.len() {
            self.move_cursor_right(i);
        }
    }

    pub fn move_up(&mut self) {
        for i in 0..self.cursors.len() {
            self.move_cursor_up(i);
        }
    }

    pub fn move_down(&mut self) {
        for i in 0..self.cursors.len() {
            self.move_cursor_down(i);
        }
    }
}

impl Default for EditBuffer {
    fn default() -> Self {
        Self::new()
    }
}
