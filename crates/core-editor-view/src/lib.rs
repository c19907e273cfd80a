//! Logical/visual cursor translation and scroll-margin viewport pursuit.
//!
//! `EditorView` owns its own `core_view::TextBufferView`-shaped state (wrap
//! config, viewport, scroll margin) but holds no stored reference to an
//! `EditBuffer` — every method takes one as a parameter, the same
//! non-owning-by-parameter shape `core-edit` itself isn't subject to but
//! `core-view`'s borrow rules force here: a `TextBufferView<'a>` held across
//! calls would pin a shared borrow of the buffer for as long as the
//! `EditorView` lives, which would make it impossible to later pass a
//! `&mut EditBuffer` to move the cursor. Each query method instead
//! reconstructs a transient `TextBufferView` scoped to that one call.

use core_edit::EditBuffer;
use core_view::{TextBufferView, VLine, Viewport, WrapMode};
use tracing::trace;

/// Logical/visual cursor correspondence, as returned by
/// `logicalToVisualCursor`/`visualToLogicalCursor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisualCursor {
    /// Viewport-relative vline index; negative or `>= viewport.height` when
    /// the position is off-screen.
    pub visual_row: i64,
    pub visual_col: u32,
    pub logical_row: u32,
    pub logical_col: u32,
}

pub struct EditorView {
    wrap_mode: WrapMode,
    wrap_width: Option<u32>,
    viewport: Viewport,
    scroll_margin: f32,
    desired_visual_col: Option<u32>,
}

/// Margin-clamped top/bottom pursuit: returns the new `first` needed to keep
/// `pos` within `[first + margin, first + extent - margin)`, or `None` if
/// `pos` is already inside that band.
fn compute_scroll_intent(first: u32, pos: u32, extent: u32, margin: u32) -> Option<u32> {
    if extent == 0 {
        return None;
    }
    let m = margin.min(extent / 2);
    let top = first;
    let bottom = first + extent;
    if pos < top + m {
        let new_first = pos.saturating_sub(m);
        if new_first != first {
            return Some(new_first);
        }
    } else if pos + m >= bottom {
        let new_first = pos + m + 1 - extent;
        if new_first != first {
            return Some(new_first);
        }
    }
    None
}

/// The vline with `source_line == row` and the largest `col_offset <= col`.
fn find_vline_index(vlines: &[VLine], row: u32, col: u32) -> usize {
    let mut best = 0usize;
    let mut best_offset = 0u32;
    let mut found = false;
    for (i, v) in vlines.iter().enumerate() {
        if v.source_line == row {
            if v.col_offset <= col && (!found || v.col_offset >= best_offset) {
                best = i;
                best_offset = v.col_offset;
                found = true;
            }
        } else if found {
            break;
        }
    }
    best
}

impl EditorView {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            wrap_mode: WrapMode::None,
            wrap_width: None,
            viewport,
            scroll_margin: 0.0,
            desired_visual_col: None,
        }
    }

    fn make_view<'a>(&self, edit: &'a EditBuffer) -> TextBufferView<'a> {
        let mut view = TextBufferView::new(edit.buffer());
        view.set_wrap_mode(self.wrap_mode);
        view.set_wrap_width(self.wrap_width);
        view.set_viewport(self.viewport);
        view
    }

    pub fn set_wrap_mode(&mut self, mode: WrapMode) {
        self.wrap_mode = mode;
    }

    pub fn set_wrap_width(&mut self, width: Option<u32>) {
        self.wrap_width = width;
    }

    pub fn wrap_mode(&self) -> WrapMode {
        self.wrap_mode
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_scroll_margin(&mut self, margin: f32) {
        self.scroll_margin = margin.clamp(0.0, 0.5);
    }

    /// Updates the viewport's dimensions without scrolling it.
    pub fn set_viewport_size(&mut self, width: u32, height: u32) {
        self.viewport.width = width;
        self.viewport.height = height;
    }

    pub fn logical_to_visual_cursor(&self, edit: &EditBuffer, row: u32, col: u32) -> VisualCursor {
        let mut view = self.make_view(edit);
        let vlines = view.get_virtual_lines();
        let idx = find_vline_index(vlines, row, col);
        let vline = vlines[idx];
        VisualCursor {
            visual_row: idx as i64 - self.viewport.y as i64,
            visual_col: col.saturating_sub(vline.col_offset),
            logical_row: row,
            logical_col: col,
        }
    }

    pub fn visual_to_logical_cursor(&self, edit: &EditBuffer, visual_row: i64, visual_col: u32) -> VisualCursor {
        let mut view = self.make_view(edit);
        let vlines = view.get_virtual_lines();
        let absolute = (self.viewport.y as i64 + visual_row).max(0) as usize;
        let idx = absolute.min(vlines.len().saturating_sub(1));
        let vline = vlines[idx];
        let line_width = edit.buffer().line_width_graphemes(vline.source_line);
        let logical_col = (vline.col_offset + visual_col).min(line_width);
        VisualCursor {
            visual_row,
            visual_col,
            logical_row: vline.source_line,
            logical_col,
        }
    }

    fn move_visual(&mut self, edit: &mut EditBuffer, step: i64) {
        let cursor = edit.primary_cursor();
        let (idx, total) = {
            let mut view = self.make_view(edit);
            let vlines = view.get_virtual_lines();
            (find_vline_index(vlines, cursor.row, cursor.col) as i64, vlines.len())
        };
        if total == 0 {
            return;
        }
        let desired = self.desired_visual_col.unwrap_or(cursor.col);
        let new_idx = (idx + step).clamp(0, total as i64 - 1) as usize;
        let (logical_row, logical_col) = {
            let mut view = self.make_view(edit);
            let vlines = view.get_virtual_lines();
            let vline = vlines[new_idx];
            let col = desired.min(vline.grapheme_count);
            (vline.source_line, vline.col_offset + col)
        };
        self.desired_visual_col = Some(desired);
        edit.set_cursor(logical_row, logical_col);
        self.ensure_cursor_visible(edit);
    }

    pub fn move_up_visual(&mut self, edit: &mut EditBuffer) {
        self.move_visual(edit, -1);
    }

    pub fn move_down_visual(&mut self, edit: &mut EditBuffer) {
        self.move_visual(edit, 1);
    }

    /// Keeps the cursor within the configured scroll margin, invoked after
    /// every cursor change. Vertical pursuit always applies; horizontal
    /// pursuit only when wrapping is off (wrapped text has no horizontal
    /// scroll position of its own).
    pub fn ensure_cursor_visible(&mut self, edit: &EditBuffer) {
        let cursor = edit.primary_cursor();
        let (cursor_vline, total_vlines) = {
            let mut view = self.make_view(edit);
            let vlines = view.get_virtual_lines();
            (find_vline_index(vlines, cursor.row, cursor.col) as u32, vlines.len() as u32)
        };

        let v_margin = (self.scroll_margin * self.viewport.height as f32).floor() as u32;
        if let Some(new_y) = compute_scroll_intent(self.viewport.y, cursor_vline, self.viewport.height, v_margin) {
            self.viewport.y = new_y.min(total_vlines.saturating_sub(1));
        }

        if self.wrap_mode == WrapMode::None {
            let line_width = edit.buffer().line_width_cols(cursor.row);
            let h_margin = (self.scroll_margin * self.viewport.width as f32).floor() as u32;
            if let Some(new_x) = compute_scroll_intent(self.viewport.x, cursor.col, self.viewport.width, h_margin) {
                self.viewport.x = new_x.min(line_width);
            }
        } else {
            self.viewport.x = 0;
        }
        trace!(target: "editor_view", y = self.viewport.y, x = self.viewport.x, cursor_vline, "ensure_cursor_visible");
    }
}
