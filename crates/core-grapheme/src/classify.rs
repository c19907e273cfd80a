//! Heuristic emoji/combining-mark classifier feeding [`egc_width`].
//!
//! Precedence: explicit override table, then the classifier below, then a
//! conservative widen-to-2 fallback for anything with emoji signal left
//! over. Classification favors over-estimating width: a stray blank column
//! is harmless, an under-estimated one causes cursor drift.

/// Sorted, small override table for sequences the classifier alone
/// mis-measures.
static OVERRIDES: &[(&str, u16)] = &[
    ("1\u{FE0F}\u{20E3}", 2), // keycap: 1 + VS16 + combining keycap
    ("\u{2699}", 1),          // gear, narrow
    ("\u{2699}\u{FE0F}", 1),  // gear + VS16, narrow
    ("\u{1F1FA}\u{1F1F8}", 2), // regional indicator pair: US flag
    ("\u{1F468}\u{200D}\u{1F469}\u{200D}\u{1F467}\u{200D}\u{1F466}", 2), // family ZWJ sequence
];

fn override_width(egc: &str) -> Option<u16> {
    OVERRIDES
        .binary_search_by(|(seq, _)| (*seq).cmp(egc))
        .ok()
        .map(|i| OVERRIDES[i].1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EgcKind {
    Ascii,
    Narrow,
    Wide,
    EmojiSimple,
    EmojiModifier,
    EmojiKeycap,
    EmojiFlag,
    EmojiZwj,
    /// Base + combining mark(s); `true` means the base was wide or emoji.
    Combining(bool),
    Other,
}

const ZWJ: char = '\u{200D}';
const KEYCAP_COMBINING: char = '\u{20E3}';

fn is_regional_indicator(c: char) -> bool {
    ('\u{1F1E6}'..='\u{1F1FF}').contains(&c)
}

fn is_skin_tone_modifier(c: char) -> bool {
    ('\u{1F3FB}'..='\u{1F3FF}').contains(&c)
}

fn is_extended_pictographic(c: char) -> bool {
    ('\u{1F300}'..='\u{1FAFF}').contains(&c) || ('\u{2600}'..='\u{27BF}').contains(&c)
}

fn is_combining_mark(c: char) -> bool {
    ('\u{0300}'..='\u{036F}').contains(&c)
        || ('\u{1AB0}'..='\u{1AFF}').contains(&c)
        || ('\u{1DC0}'..='\u{1DFF}').contains(&c)
        || ('\u{20D0}'..='\u{20FF}').contains(&c)
        || ('\u{FE20}'..='\u{FE2F}').contains(&c)
}

fn classify(egc: &str) -> EgcKind {
    if egc.is_empty() {
        return EgcKind::Other;
    }
    let mut chars = egc.chars().peekable();
    let first = *chars.peek().unwrap();
    let single = egc.chars().count() == 1;

    if single {
        if first.is_ascii() {
            return EgcKind::Ascii;
        }
        let uwidth = unicode_width::UnicodeWidthChar::width(first).unwrap_or(1);
        if is_extended_pictographic(first) {
            return EgcKind::EmojiSimple;
        }
        if uwidth == 2 {
            return EgcKind::Wide;
        }
        return EgcKind::Narrow;
    }

    let mut count_ep = 0usize;
    let mut count_ri = 0usize;
    let mut has_zwj = false;
    let mut has_skin = false;
    let mut has_combining = false;
    let mut keycap_base: Option<char> = None;
    let mut ends_with_keycap = false;
    let mut any_wide = false;
    let mut base_wide_or_emoji = false;
    let mut saw_non_mark_base = false;
    let total = egc.chars().count();

    for (i, c) in egc.chars().enumerate() {
        if is_extended_pictographic(c) {
            count_ep += 1;
        }
        if is_regional_indicator(c) {
            count_ri += 1;
        }
        if c == ZWJ {
            has_zwj = true;
        }
        if is_skin_tone_modifier(c) {
            has_skin = true;
        }
        if is_combining_mark(c) {
            has_combining = true;
        }
        if c == KEYCAP_COMBINING && i == total - 1 {
            ends_with_keycap = true;
        }
        if keycap_base.is_none() && (c.is_ascii_digit() || c == '#' || c == '*') {
            keycap_base = Some(c);
        }
        if unicode_width::UnicodeWidthChar::width(c).unwrap_or(1) == 2 {
            any_wide = true;
        }
        if !saw_non_mark_base && !is_combining_mark(c) {
            saw_non_mark_base = true;
            if is_extended_pictographic(c)
                || unicode_width::UnicodeWidthChar::width(c).unwrap_or(1) == 2
            {
                base_wide_or_emoji = true;
            }
        }
    }

    if ends_with_keycap && keycap_base.is_some() {
        return EgcKind::EmojiKeycap;
    }
    if count_ri == 2 && total == 2 {
        return EgcKind::EmojiFlag;
    }
    if has_zwj && count_ep >= 2 {
        return EgcKind::EmojiZwj;
    }
    if count_ep >= 1 && has_skin {
        return EgcKind::EmojiModifier;
    }
    if count_ep == 1 && !has_zwj {
        return EgcKind::EmojiSimple;
    }
    if has_combining {
        return EgcKind::Combining(base_wide_or_emoji);
    }
    if any_wide {
        return EgcKind::Wide;
    }
    if count_ep > 0 {
        return EgcKind::EmojiSimple;
    }
    EgcKind::Narrow
}

fn width_for_kind(kind: EgcKind) -> u16 {
    match kind {
        EgcKind::Ascii | EgcKind::Narrow => 1,
        EgcKind::Wide
        | EgcKind::EmojiSimple
        | EgcKind::EmojiModifier
        | EgcKind::EmojiKeycap
        | EgcKind::EmojiFlag
        | EgcKind::EmojiZwj => 2,
        EgcKind::Combining(base_wide) => {
            if base_wide {
                2
            } else {
                1
            }
        }
        EgcKind::Other => 1,
    }
}

/// Display column width for a single grapheme cluster.
pub fn egc_width(egc: &str) -> u16 {
    if egc.is_empty() {
        return 0;
    }
    if let Some(w) = override_width(egc) {
        return w;
    }
    let kind = classify(egc);
    let mut width = width_for_kind(kind);
    if width == 1 {
        let has_signal = egc
            .chars()
            .any(|c| is_extended_pictographic(c) || is_regional_indicator(c));
        if has_signal {
            width = 2;
        }
    }
    width
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii() {
        assert_eq!(egc_width("a"), 1);
    }

    #[test]
    fn wide_cjk() {
        assert_eq!(egc_width("界"), 2);
    }

    #[test]
    fn emoji_basic() {
        assert_eq!(egc_width("😀"), 2);
    }

    #[test]
    fn combining_acute() {
        assert_eq!(egc_width("e\u{0301}"), 1);
    }

    #[test]
    fn emoji_flag() {
        assert_eq!(egc_width("\u{1F1FA}\u{1F1F8}"), 2);
    }

    #[test]
    fn emoji_keycap() {
        assert_eq!(egc_width("1\u{FE0F}\u{20E3}"), 2);
    }

    #[test]
    fn gear_plain_and_vs16() {
        assert_eq!(egc_width("\u{2699}"), 1);
        assert_eq!(egc_width("\u{2699}\u{FE0F}"), 1);
    }

    #[test]
    fn override_table_consistency() {
        for (seq, w) in OVERRIDES.iter() {
            assert_eq!(egc_width(seq), *w, "override mismatch for {seq}");
        }
    }

    #[test]
    fn override_table_is_sorted() {
        let mut sorted = OVERRIDES.to_vec();
        sorted.sort_by(|a, b| a.0.cmp(b.0));
        assert_eq!(OVERRIDES.to_vec(), sorted);
    }
}
