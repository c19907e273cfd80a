//! Char- and word-wrap algorithms over a single logical line's graphemes.

/// One grapheme's contribution to a wrap computation: its display width and
/// whether it belongs to the word-break class (space, tab, and common
/// punctuation).
#[derive(Debug, Clone, Copy)]
pub(crate) struct WrapGrapheme {
    pub width: u32,
    pub is_break_class: bool,
}

/// A wrapped span within one logical line, in grapheme-index units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct WrapSpan {
    pub col_offset: u32,
    pub grapheme_count: u32,
    pub width: u32,
}

pub(crate) fn is_word_break_class(cluster: &str) -> bool {
    matches!(
        cluster,
        " " | "\t"
            | "-"
            | "/"
            | "\\"
            | "("
            | ")"
            | "["
            | "]"
            | "{"
            | "}"
            | "<"
            | ">"
            | "."
            | ","
            | ";"
            | ":"
            | "!"
            | "?"
            | "\""
            | "'"
    )
}

/// Char-mode wrap: break as soon as the next grapheme would push the running
/// width over `wrap_width`. A grapheme wider than `wrap_width` on its own
/// still gets emitted (occupying its own, overlength, virtual line) since the
/// accumulator never refuses the first grapheme of a line.
pub(crate) fn wrap_char(graphemes: &[WrapGrapheme], wrap_width: u32) -> Vec<WrapSpan> {
    if graphemes.is_empty() {
        return vec![WrapSpan {
            col_offset: 0,
            grapheme_count: 0,
            width: 0,
        }];
    }
    let mut out = Vec::new();
    let mut start = 0usize;
    let mut width = 0u32;
    for (i, g) in graphemes.iter().enumerate() {
        if i > start && width + g.width > wrap_width {
            out.push(WrapSpan {
                col_offset: start as u32,
                grapheme_count: (i - start) as u32,
                width,
            });
            start = i;
            width = 0;
        }
        width += g.width;
    }
    out.push(WrapSpan {
        col_offset: start as u32,
        grapheme_count: (graphemes.len() - start) as u32,
        width,
    });
    out
}

/// Word-mode wrap: greedily fill each virtual line, breaking at the last
/// word-break opportunity before an overflow. Falls back to a char-mode
/// break for a single overlength run with no opportunity on it.
pub(crate) fn wrap_word(graphemes: &[WrapGrapheme], wrap_width: u32) -> Vec<WrapSpan> {
    if graphemes.is_empty() {
        return vec![WrapSpan {
            col_offset: 0,
            grapheme_count: 0,
            width: 0,
        }];
    }
    let n = graphemes.len();
    let mut out = Vec::new();
    let mut line_start = 0usize;
    while line_start < n {
        let mut width = 0u32;
        let mut last_break: Option<(usize, u32)> = None;
        let mut j = line_start;
        while j < n {
            let g = graphemes[j];
            if j > line_start && width + g.width > wrap_width {
                break;
            }
            width += g.width;
            if g.is_break_class {
                last_break = Some((j + 1, width));
            }
            j += 1;
        }
        if j == n {
            out.push(WrapSpan {
                col_offset: line_start as u32,
                grapheme_count: (j - line_start) as u32,
                width,
            });
            break;
        }
        if let Some((break_end, break_width)) = last_break {
            out.push(WrapSpan {
                col_offset: line_start as u32,
                grapheme_count: (break_end - line_start) as u32,
                width: break_width,
            });
            line_start = break_end;
        } else {
            out.push(WrapSpan {
                col_offset: line_start as u32,
                grapheme_count: (j - line_start) as u32,
                width,
            });
            line_start = j;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn g(width: u32) -> WrapGrapheme {
        WrapGrapheme { width, is_break_class: false }
    }
    fn brk(width: u32) -> WrapGrapheme {
        WrapGrapheme { width, is_break_class: true }
    }

    #[test]
    fn char_wrap_twenty_cols_at_width_ten() {
        let graphemes: Vec<WrapGrapheme> = std::iter::repeat(g(1)).take(20).collect();
        let spans = wrap_char(&graphemes, 10);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].width, 10);
        assert_eq!(spans[1].width, 10);
    }

    #[test]
    fn char_wrap_oversized_grapheme_gets_its_own_line() {
        let graphemes = vec![g(1), g(1), g(2), g(1)];
        let spans = wrap_char(&graphemes, 1);
        // "aa" overflow immediately, so each narrow grapheme is its own vline,
        // and the width-2 grapheme alone exceeds wrap_width but still gets a
        // vline of its own.
        assert!(spans.iter().any(|s| s.grapheme_count == 1 && s.width == 2));
    }

    #[test]
    fn word_wrap_breaks_at_the_space_before_overflow() {
        // "hello my good" = 13 graphemes incl. spaces, wrap width 18 (from
        // the spec's scenario 2, before the insert).
        let text = "hello my good";
        let graphemes: Vec<WrapGrapheme> = text
            .chars()
            .map(|c| if c == ' ' { brk(1) } else { g(1) })
            .collect();
        let spans = wrap_word(&graphemes, 18);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].width, 13);
    }

    #[test]
    fn word_wrap_falls_back_to_char_mode_without_a_break_opportunity() {
        let graphemes: Vec<WrapGrapheme> = std::iter::repeat(g(1)).take(12).collect();
        let spans = wrap_word(&graphemes, 5);
        assert_eq!(spans.len(), 3);
        assert_eq!(spans[0].grapheme_count, 5);
        assert_eq!(spans[1].grapheme_count, 5);
        assert_eq!(spans[2].grapheme_count, 2);
    }

    #[test]
    fn empty_line_yields_one_empty_vline() {
        let spans = wrap_char(&[], 10);
        assert_eq!(spans, vec![WrapSpan { col_offset: 0, grapheme_count: 0, width: 0 }]);
        let spans = wrap_word(&[], 10);
        assert_eq!(spans, vec![WrapSpan { col_offset: 0, grapheme_count: 0, width: 0 }]);
    }
}
