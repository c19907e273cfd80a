//! Per-line highlight storage and style-span computation.
//!
//! Highlights are stored per logical line in insertion order; `ref_id` is
//! indexed separately so `remove_highlights_by_ref` runs in time
//! proportional to the number of highlights carrying that ref, not the
//! total highlight count. Style spans are derived lazily from highlights by
//! a sweep (sort by priority, paint, coalesce) and cached until the next
//! mutation.

use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Highlight {
    pub col_start: u32,
    pub col_end: u32,
    pub style_id: u32,
    pub priority: u32,
    pub ref_id: Option<u64>,
}

/// One run of a coalesced style sweep over `[col, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub col: u32,
    pub end: u32,
    pub style_id: u32,
}

#[derive(Debug, Default)]
pub struct HighlightStore {
    per_line: HashMap<u32, Vec<Highlight>>,
    by_ref: HashMap<u64, HashSet<u32>>,
}

impl HighlightStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, line: u32, h: Highlight) {
        self.per_line.entry(line).or_default().push(h);
        if let Some(r) = h.ref_id {
            self.by_ref.entry(r).or_default().insert(line);
        }
    }

    pub fn remove_by_ref(&mut self, ref_id: u64) {
        let Some(lines) = self.by_ref.remove(&ref_id) else {
            return;
        };
        for line in lines {
            if let Some(v) = self.per_line.get_mut(&line) {
                v.retain(|h| h.ref_id != Some(ref_id));
            }
        }
    }

    pub fn clear_line(&mut self, line: u32) {
        if let Some(removed) = self.per_line.remove(&line) {
            for h in removed {
                if let Some(r) = h.ref_id {
                    if let Some(set) = self.by_ref.get_mut(&r) {
                        set.remove(&line);
                    }
                }
            }
        }
    }

    pub fn clear_all(&mut self) {
        self.per_line.clear();
        self.by_ref.clear();
    }

    pub fn line(&self, line: u32) -> &[Highlight] {
        self.per_line.get(&line).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Sweep `highlights` into a non-overlapping, coalesced span list covering
/// `[0, line_width)`. Unpainted columns carry `default_style`. Highlights
/// are applied in priority-ascending order (ties keep insertion order,
/// since the sort below is stable), so higher-priority entries paint last
/// and win.
pub fn compute_line_spans(highlights: &[Highlight], line_width: u32, default_style: u32) -> Vec<Span> {
    if line_width == 0 {
        return Vec::new();
    }
    let mut paint = vec![default_style; line_width as usize];
    let mut ordered: Vec<&Highlight> = highlights.iter().collect();
    ordered.sort_by_key(|h| h.priority);
    for h in ordered {
        let start = h.col_start.min(line_width);
        let end = h.col_end.min(line_width);
        for cell in paint.iter_mut().take(end as usize).skip(start as usize) {
            *cell = h.style_id;
        }
    }

    let mut spans = Vec::new();
    let mut run_start = 0usize;
    for i in 1..paint.len() {
        if paint[i] != paint[run_start] {
            spans.push(Span {
                col: run_start as u32,
                end: i as u32,
                style_id: paint[run_start],
            });
            run_start = i;
        }
    }
    spans.push(Span {
        col: run_start as u32,
        end: line_width,
        style_id: paint[run_start],
    });
    spans
}
