use core_edit::EditBuffer;
use core_editor_view::EditorView;
use core_view::{Viewport, WrapMode};

#[test]
fn logical_to_visual_cursor_is_identity_without_wrap() {
    let mut edit = EditBuffer::new();
    edit.set_text("hello\nworld", false);
    let view = EditorView::new(Viewport { x: 0, y: 0, width: 80, height: 10 });
    let vc = view.logical_to_visual_cursor(&edit, 1, 3);
    assert_eq!(vc.logical_row, 1);
    assert_eq!(vc.logical_col, 3);
    assert_eq!(vc.visual_row, 1);
    assert_eq!(vc.visual_col, 3);
}

#[test]
fn logical_to_visual_cursor_accounts_for_char_wrap() {
    let mut edit = EditBuffer::new();
    edit.set_text("ABCDEFGHIJKLMNOPQRST", false);
    let mut view = EditorView::new(Viewport { x: 0, y: 0, width: 80, height: 10 });
    view.set_wrap_mode(WrapMode::Char);
    view.set_wrap_width(Some(10));
    let vc = view.logical_to_visual_cursor(&edit, 0, 12);
    assert_eq!(vc.visual_row, 1);
    assert_eq!(vc.visual_col, 2);
}

#[test]
fn ensure_cursor_visible_scrolls_down_past_the_bottom_margin() {
    let mut edit = EditBuffer::new();
    let text: String = (0..20).map(|n| n.to_string()).collect::<Vec<_>>().join("\n");
    edit.set_text(&text, false);
    let mut view = EditorView::new(Viewport { x: 0, y: 0, width: 80, height: 5 });
    edit.set_cursor(9, 0);
    view.ensure_cursor_visible(&edit);
    assert_eq!(view.viewport().y, 5);
}

#[test]
fn ensure_cursor_visible_scrolls_up_above_the_top() {
    let mut edit = EditBuffer::new();
    let text: String = (0..20).map(|n| n.to_string()).collect::<Vec<_>>().join("\n");
    edit.set_text(&text, false);
    let mut view = EditorView::new(Viewport { x: 0, y: 10, width: 80, height: 5 });
    edit.set_cursor(3, 0);
    view.ensure_cursor_visible(&edit);
    assert_eq!(view.viewport().y, 3);
}

#[test]
fn move_down_visual_steps_one_vline_and_keeps_desired_column() {
    let mut edit = EditBuffer::new();
    edit.set_text("ab\nabcdefgh\nxy", false);
    let mut view = EditorView::new(Viewport { x: 0, y: 0, width: 80, height: 10 });
    edit.set_cursor(1, 5);
    view.move_down_visual(&mut edit);
    let c = edit.primary_cursor();
    assert_eq!((c.row, c.col), (2, 2));
}

#[test]
fn set_viewport_size_does_not_scroll() {
    let mut edit = EditBuffer::new();
    edit.set_text("a\nb\nc", false);
    let mut view = EditorView::new(Viewport { x: 0, y: 1, width: 80, height: 10 });
    view.set_viewport_size(80, 20);
    assert_eq!(view.viewport().y, 1);
    assert_eq!(view.viewport().height, 20);
}
