//! Re-integration of validated tables into rendered document text.
//!
//! The primary layout parser emits native table markers inline, in
//! page order. Each marker is paired with the first unconsumed
//! finalized candidate on the same page and its rendered form is
//! substituted — first textual occurrence only, so two identical
//! native renderings (e.g. empty tables) are not over-substituted.

use crate::table::{grid_to_markdown, TableCandidate};
use std::collections::{BTreeMap, VecDeque};

/// A table rendering the primary layout parser already emitted.
#[derive(Debug, Clone)]
pub struct NativeTableMarker {
    /// 1-based page the native table came from, when known.
    pub page: Option<u32>,
    /// The marker's rendered form as it appears in the document text.
    pub rendered: String,
}

impl NativeTableMarker {
    /// Create a marker with a known page.
    pub fn new(page: u32, rendered: impl Into<String>) -> Self {
        Self {
            page: Some(page),
            rendered: rendered.into(),
        }
    }
}

/// Splice finalized candidates into rendered text.
///
/// Walks markers in document order; a marker with an unknown page or
/// no remaining candidate on its page is left untouched. Candidates
/// that never match a marker are retained only in sidecar/summary
/// output — they are not spliced in.
///
/// # Examples
///
/// ```
/// use tableract::geometry::Rect;
/// use tableract::integrate::{integrate, NativeTableMarker};
/// use tableract::table::{CellGrid, SourceMode, TableCandidate};
///
/// let text = "intro\n| a | b |\n|---|---|\noutro";
/// let candidate = TableCandidate::new(
///     1,
///     Rect::from_points(0.0, 0.0, 10.0, 10.0),
///     CellGrid::from_text_rows(vec![vec!["x", "y"], vec!["1", "2"]]),
///     0.9,
///     SourceMode::Bordered,
/// );
/// let markers = [NativeTableMarker::new(1, "| a | b |\n|---|---|")];
///
/// let result = integrate(text, &[candidate], &markers);
/// assert!(result.contains("| x | y |"));
/// assert!(!result.contains("| a | b |"));
/// ```
pub fn integrate(
    rendered_text: &str,
    candidates: &[TableCandidate],
    markers: &[NativeTableMarker],
) -> String {
    if candidates.is_empty() || markers.is_empty() {
        return rendered_text.to_string();
    }

    // FIFO per page, in finalized (reading) order.
    let mut by_page: BTreeMap<u32, VecDeque<&TableCandidate>> = BTreeMap::new();
    for candidate in candidates {
        by_page.entry(candidate.page).or_default().push_back(candidate);
    }

    let mut text = rendered_text.to_string();
    for marker in markers {
        let Some(page) = marker.page else {
            continue;
        };
        let Some(queue) = by_page.get_mut(&page) else {
            continue;
        };
        let Some(candidate) = queue.pop_front() else {
            continue;
        };

        let needle = marker.rendered.trim();
        if needle.is_empty() {
            // Nothing to anchor the substitution on; put the candidate back.
            queue.push_front(candidate);
            continue;
        }
        if text.contains(needle) {
            let replacement = grid_to_markdown(&candidate.grid);
            text = text.replacen(needle, &replacement, 1);
        } else {
            log::debug!("native marker for page {} not found in rendered text", page);
        }
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::table::{CellGrid, SourceMode};

    fn candidate(page: u32, rows: Vec<Vec<&str>>) -> TableCandidate {
        TableCandidate::new(
            page,
            Rect::from_points(0.0, 0.0, 100.0, 50.0),
            CellGrid::from_text_rows(rows),
            0.9,
            SourceMode::Bordered,
        )
    }

    const NATIVE: &str = "| a | b |\n|---|---|";

    #[test]
    fn test_replaces_matching_marker() {
        let text = format!("before\n{}\nafter", NATIVE);
        let result = integrate(
            &text,
            &[candidate(1, vec![vec!["x", "y"], vec!["1", "2"]])],
            &[NativeTableMarker::new(1, NATIVE)],
        );

        assert!(result.contains("| x | y |"));
        assert!(!result.contains("| a | b |"));
        assert!(result.starts_with("before\n"));
        assert!(result.ends_with("\nafter"));
    }

    #[test]
    fn test_identical_markers_first_occurrence_only() {
        // Two identical native renderings; each candidate consumes one.
        let text = format!("{}\nmiddle\n{}", NATIVE, NATIVE);
        let candidates = [
            candidate(1, vec![vec!["first", "t"], vec!["1", "2"]]),
            candidate(1, vec![vec!["second", "t"], vec!["3", "4"]]),
        ];
        let markers = [NativeTableMarker::new(1, NATIVE), NativeTableMarker::new(1, NATIVE)];

        let result = integrate(&text, &candidates, &markers);
        let first = result.find("| first | t |").unwrap();
        let second = result.find("| second | t |").unwrap();
        assert!(first < second);
        assert!(!result.contains("| a | b |"));
    }

    #[test]
    fn test_second_identical_marker_left_when_one_candidate() {
        let text = format!("{}\n{}", NATIVE, NATIVE);
        let result = integrate(
            &text,
            &[candidate(1, vec![vec!["x", "y"], vec!["1", "2"]])],
            &[NativeTableMarker::new(1, NATIVE), NativeTableMarker::new(1, NATIVE)],
        );

        assert_eq!(result.matches("| a | b |").count(), 1);
        assert_eq!(result.matches("| x | y |").count(), 1);
    }

    #[test]
    fn test_marker_without_candidate_untouched() {
        let text = format!("page two table:\n{}", NATIVE);
        let result = integrate(
            &text,
            &[candidate(1, vec![vec!["x", "y"]])],
            &[NativeTableMarker::new(2, NATIVE)],
        );
        assert_eq!(result, text);
    }

    #[test]
    fn test_marker_with_unknown_page_untouched() {
        let text = NATIVE.to_string();
        let marker = NativeTableMarker {
            page: None,
            rendered: NATIVE.to_string(),
        };
        let result = integrate(&text, &[candidate(1, vec![vec!["x", "y"]])], &[marker]);
        assert_eq!(result, text);
    }

    #[test]
    fn test_candidates_consumed_in_reading_order() {
        let native_a = "| a | b |\n|---|---|";
        let native_b = "| c | d |\n|---|---|";
        let text = format!("{}\n\n{}", native_a, native_b);
        let candidates = [
            candidate(1, vec![vec!["one", "t"], vec!["1", "2"]]),
            candidate(1, vec![vec!["two", "t"], vec!["3", "4"]]),
        ];
        let markers = [NativeTableMarker::new(1, native_a), NativeTableMarker::new(1, native_b)];

        let result = integrate(&text, &candidates, &markers);
        assert!(result.find("| one | t |").unwrap() < result.find("| two | t |").unwrap());
    }

    #[test]
    fn test_surplus_candidates_not_spliced() {
        let text = "no tables here";
        let result = integrate(text, &[candidate(1, vec![vec!["x", "y"]])], &[]);
        assert_eq!(result, text);
    }

    #[test]
    fn test_empty_marker_rendering_skipped() {
        let text = "body";
        let result = integrate(
            text,
            &[candidate(1, vec![vec!["x", "y"]])],
            &[NativeTableMarker::new(1, "   ")],
        );
        assert_eq!(result, text);
    }
}
