use core_edit::EditBuffer;
use core_text::TextBuffer;

#[test]
fn insert_text_advances_primary_cursor() {
    let mut edit = EditBuffer::new();
    edit.insert_text("abc");
    assert_eq!(edit.buffer().to_plain_text(), "abc");
    let c = edit.primary_cursor();
    assert_eq!((c.row, c.col), (0, 3));
}

#[test]
fn insert_text_with_newline_splits_line_and_moves_cursor() {
    let mut edit = EditBuffer::new();
    edit.insert_text("ab\ncd");
    assert_eq!(edit.buffer().to_plain_text(), "ab\ncd");
    let c = edit.primary_cursor();
    assert_eq!((c.row, c.col), (1, 2));
}

#[test]
fn backspace_at_column_zero_joins_with_previous_line() {
    let mut buf = TextBuffer::new();
    buf.set_text("ab\ncd");
    let mut edit = EditBuffer::with_buffer(buf);
    edit.set_cursor(1, 0);
    edit.backspace();
    assert_eq!(edit.buffer().to_plain_text(), "abcd");
    let c = edit.primary_cursor();
    assert_eq!((c.row, c.col), (0, 2));
}

#[test]
fn delete_forward_removes_grapheme_after_cursor() {
    let mut buf = TextBuffer::new();
    buf.set_text("abc");
    let mut edit = EditBuffer::with_buffer(buf);
    edit.set_cursor(0, 1);
    edit.delete_forward();
    assert_eq!(edit.buffer().to_plain_text(), "ac");
    let c = edit.primary_cursor();
    assert_eq!((c.row, c.col), (0, 1));
}

#[test]
fn up_then_down_preserves_desired_column_across_a_short_line() {
    let mut buf = TextBuffer::new();
    buf.set_text("ab\nabcdefgh\nxy");
    let mut edit = EditBuffer::with_buffer(buf);
    edit.set_cursor(1, 5);
    edit.move_up();
    let c = edit.primary_cursor();
    assert_eq!((c.row, c.col), (0, 2));
    edit.move_down();
    let c = edit.primary_cursor();
    assert_eq!((c.row, c.col), (1, 5));
    edit.move_down();
    let c = edit.primary_cursor();
    assert_eq!((c.row, c.col), (2, 2));
}

#[test]
fn move_left_resets_the_desired_column() {
    let mut buf = TextBuffer::new();
    buf.set_text("ab\nabcdefgh\nxy");
    let mut edit = EditBuffer::with_buffer(buf);
    edit.set_cursor(1, 5);
    edit.move_up();
    edit.move_left();
    let c = edit.primary_cursor();
    assert_eq!(c.desired_col, None);
}

#[test]
fn goto_line_clamps_past_the_last_line() {
    let mut buf = TextBuffer::new();
    buf.set_text("a\nb\nc");
    let mut edit = EditBuffer::with_buffer(buf);
    edit.goto_line(10);
    let c = edit.primary_cursor();
    assert_eq!((c.row, c.col), (2, 0));
}

#[test]
fn delete_line_removes_the_cursors_line_and_its_newline() {
    let mut buf = TextBuffer::new();
    buf.set_text("one\ntwo\nthree");
    let mut edit = EditBuffer::with_buffer(buf);
    edit.set_cursor(1, 2);
    edit.delete_line();
    assert_eq!(edit.buffer().to_plain_text(), "one\nthree");
    let c = edit.primary_cursor();
    assert_eq!((c.row, c.col), (1, 0));
}

#[test]
fn multi_cursor_insert_shifts_the_later_cursor_by_the_earlier_insert() {
    let mut buf = TextBuffer::new();
    buf.set_text("abc\ndef");
    let mut edit = EditBuffer::with_buffer(buf);
    edit.set_cursor(0, 1);
    edit.add_cursor(1, 1);
    edit.insert_text("X");
    assert_eq!(edit.buffer().to_plain_text(), "aXbc\ndXef");
    let cursors = edit.cursors();
    assert_eq!((cursors[0].row, cursors[0].col), (0, 2));
    assert_eq!((cursors[1].row, cursors[1].col), (1, 2));
}

#[test]
fn undo_reverts_an_insert_and_restores_redo() {
    let mut edit = EditBuffer::new();
    edit.insert_text("abc");
    assert!(edit.can_undo());
    edit.undo().unwrap();
    assert_eq!(edit.buffer().to_plain_text(), "");
    assert!(edit.can_redo());
    edit.redo().unwrap();
    assert_eq!(edit.buffer().to_plain_text(), "abc");
}

#[test]
fn set_text_without_preserve_resets_cursor_to_origin() {
    let mut edit = EditBuffer::new();
    edit.set_cursor(0, 0);
    edit.insert_text("hello world");
    edit.set_text("new content", false);
    let c = edit.primary_cursor();
    assert_eq!((c.row, c.col), (0, 0));
    assert_eq!(edit.buffer().to_plain_text(), "new content");
}
