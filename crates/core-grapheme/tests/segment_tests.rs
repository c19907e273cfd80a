use core_grapheme::{GraphemeService, UnicodeGraphemeService, WcwidthGraphemeService};

#[test]
fn nfc_equivalence_and_segmentation_single_cluster() {
    let svc = UnicodeGraphemeService;
    let decomposed = "e\u{0301}";
    let composed = "\u{00E9}";
    let (n1, s1) = svc.normalize_and_segment(decomposed);
    let (n2, s2) = svc.normalize_and_segment(composed);
    assert_eq!(n1, n2);
    assert_eq!(s1.len(), 1);
    assert_eq!(s2.len(), 1);
    assert_eq!(s1[0].cluster, s2[0].cluster);
    assert_eq!(s1[0].width, s2[0].width);
}

#[test]
fn byte_ranges_are_contiguous_and_cover_the_string() {
    let svc = UnicodeGraphemeService;
    let s = "a\u{2699}\u{FE0F}b";
    let (normalized, segs) = svc.normalize_and_segment(s);
    let mut prev_end = 0usize;
    let mut joined = String::new();
    for seg in &segs {
        assert_eq!(seg.start, prev_end);
        assert!(seg.end >= seg.start);
        prev_end = seg.end;
        joined.push_str(&seg.cluster);
    }
    assert_eq!(joined, normalized);
}

#[test]
fn gear_vs16_width_override_is_applied_during_segmentation() {
    let svc = UnicodeGraphemeService;
    let s = "a\u{2699}\u{FE0F}b";
    let (_n, segs) = svc.normalize_and_segment(s);
    assert_eq!(segs.len(), 3);
    assert_eq!(segs[1].width, 1);
}

#[test]
fn wcwidth_service_sums_per_codepoint_widths() {
    let svc = WcwidthGraphemeService;
    assert_eq!(svc.cluster_width("a"), 1);
    assert_eq!(svc.cluster_width("界"), 2);
}

#[test]
fn family_zwj_sequence_segments_as_one_cluster() {
    let svc = UnicodeGraphemeService;
    let family = "\u{1F468}\u{200D}\u{1F469}\u{200D}\u{1F467}\u{200D}\u{1F466}";
    let (_n, segs) = svc.normalize_and_segment(family);
    assert_eq!(segs.len(), 1);
    assert_eq!(segs[0].width, 2);
}
