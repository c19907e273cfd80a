use core_text::TextBuffer;
use core_view::{TextBufferView, Viewport, WrapMode};

#[test]
fn scenario_char_wrap_splits_twenty_cols_into_two_tens() {
    let mut buf = TextBuffer::new();
    buf.set_text("ABCDEFGHIJKLMNOPQRST");
    let mut view = TextBufferView::new(&buf);
    view.set_wrap_mode(WrapMode::Char);
    view.set_wrap_width(Some(10));
    assert_eq!(view.get_virtual_line_count(), 2);
    let widths: Vec<u32> = view.get_virtual_lines().iter().map(|v| v.width).collect();
    assert_eq!(widths, vec![10, 10]);
}

#[test]
fn scenario_word_wrap_rewraps_after_an_insert() {
    let mut buf = TextBuffer::new();
    buf.set_text("hello my good");
    let mut view = TextBufferView::new(&buf);
    view.set_wrap_mode(WrapMode::Word);
    view.set_wrap_width(Some(18));
    assert_eq!(view.get_virtual_line_count(), 1);
    drop(view);

    buf.insert_text_at_char(13, " friend");
    let mut view = TextBufferView::new(&buf);
    view.set_wrap_mode(WrapMode::Word);
    view.set_wrap_width(Some(18));
    let widths: Vec<u32> = view.get_virtual_lines().iter().map(|v| v.width).collect();
    assert_eq!(widths, vec![14, 6]);
}

#[test]
fn scenario_selection_extraction_across_lines() {
    let mut buf = TextBuffer::new();
    buf.set_text("Line 1\nLine 2\nLine 3");
    let mut view = TextBufferView::new(&buf);
    view.set_selection(0, 9, None, None);
    let mut out = String::new();
    let n = view.get_selected_text_into_buffer(&mut out);
    assert_eq!(out, "Line 1\nLi");
    assert_eq!(n, out.len());
}

#[test]
fn scenario_highlight_spans_project_onto_both_wrapped_vlines() {
    let mut buf = TextBuffer::new();
    buf.set_text("ABCDEFGHIJKLMNOPQRST");
    buf.add_highlight(0, 5, 15, 1, 1, None);
    let mut view = TextBufferView::new(&buf);
    view.set_wrap_mode(WrapMode::Char);
    view.set_wrap_width(Some(10));
    let (_, col0, _) = view.get_virtual_line_spans(0).unwrap();
    let (_, col1, _) = view.get_virtual_line_spans(1).unwrap();
    assert_eq!(col0, 0);
    assert_eq!(col1, 10);
}

#[test]
fn scenario_local_selection_spans_an_empty_line_and_a_viewport_offset() {
    let mut buf = TextBuffer::new();
    buf.set_text("Line0\n\nLine2\nLine3\nLine4");
    let mut view = TextBufferView::new(&buf);
    view.set_viewport(Viewport { x: 0, y: 1, width: 10, height: 3 });
    view.set_local_selection(0, 0, 3, 2, None, None);
    let mut out = String::new();
    view.get_selected_text_into_buffer(&mut out);
    assert_eq!(out, "\nLine2\nLin");
}

#[test]
fn empty_selection_packs_to_the_sentinel() {
    let mut buf = TextBuffer::new();
    buf.set_text("abc");
    let mut view = TextBufferView::new(&buf);
    assert_eq!(view.pack_selection_info(), core_view::SELECTION_SENTINEL);
    view.set_selection(3, 3, None, None);
    assert_eq!(view.pack_selection_info(), core_view::SELECTION_SENTINEL);
    view.set_selection(1, 2, None, None);
    assert_eq!(view.pack_selection_info(), (1u64 << 32) | 2);
}

#[test]
fn no_wrap_mode_vline_count_equals_line_count() {
    let mut buf = TextBuffer::new();
    buf.set_text("a\nbb\nccc");
    let mut view = TextBufferView::new(&buf);
    assert_eq!(view.get_virtual_line_count(), 3);
    let widths: Vec<u32> = view.get_virtual_lines().iter().map(|v| v.width).collect();
    assert_eq!(widths, vec![1, 2, 3]);
}

#[test]
fn cache_rebuilds_after_a_buffer_mutation() {
    let mut buf = TextBuffer::new();
    buf.set_text("ab");
    let mut view = TextBufferView::new(&buf);
    assert_eq!(view.get_virtual_line_count(), 1);
    drop(view);
    buf.insert_text_at_char(2, "\ncd");
    let mut view = TextBufferView::new(&buf);
    assert_eq!(view.get_virtual_line_count(), 2);
}
