//! Structural complexity classification.
//!
//! Complexity decides the storage representation: complex tables get
//! sidecar JSON+CSV+Markdown files, simple tables are rendered inline
//! as Markdown only.

use crate::table::TableCandidate;
use serde::{Deserialize, Serialize};

/// Structural complexity of a finalized candidate.
///
/// Computed once, immutable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplexityAssessment {
    /// Number of rows.
    pub rows: usize,
    /// Number of columns.
    pub cols: usize,
    /// True if any cell span exceeds 1 in either dimension.
    pub has_merged_cells: bool,
    /// True if either dimension reaches the threshold or any cell is merged.
    pub is_complex: bool,
}

/// Classify a candidate's structural complexity.
///
/// Pure and deterministic: the same candidate and threshold always
/// yield the same assessment.
///
/// # Examples
///
/// ```
/// use tableract::geometry::Rect;
/// use tableract::table::{classify, CellGrid, SourceMode, TableCandidate};
///
/// let candidate = TableCandidate::new(
///     1,
///     Rect::from_points(0.0, 0.0, 100.0, 50.0),
///     CellGrid::from_text_rows(vec![vec!["a", "b"], vec!["c", "d"]]),
///     0.9,
///     SourceMode::Bordered,
/// );
///
/// let assessment = classify(&candidate, 4);
/// assert!(!assessment.is_complex);
/// assert_eq!(assessment.rows, 2);
/// ```
pub fn classify(candidate: &TableCandidate, threshold: usize) -> ComplexityAssessment {
    let rows = candidate.grid.num_rows();
    let cols = candidate.grid.num_cols();
    let has_merged_cells = candidate.grid.has_merged_cells();
    ComplexityAssessment {
        rows,
        cols,
        has_merged_cells,
        is_complex: rows >= threshold || cols >= threshold || has_merged_cells,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::table::{Cell, CellGrid, SourceMode};

    fn candidate(grid: CellGrid) -> TableCandidate {
        TableCandidate::new(
            1,
            Rect::from_points(0.0, 0.0, 100.0, 100.0),
            grid,
            1.0,
            SourceMode::Bordered,
        )
    }

    #[test]
    fn test_small_plain_table_is_simple() {
        let c = candidate(CellGrid::from_text_rows(vec![vec!["a", "b"], vec!["c", "d"]]));
        let assessment = classify(&c, 4);
        assert!(!assessment.is_complex);
        assert!(!assessment.has_merged_cells);
    }

    #[test]
    fn test_row_count_forces_complex() {
        let rows: Vec<Vec<&str>> = (0..4).map(|_| vec!["x"]).collect();
        let c = candidate(CellGrid::from_text_rows(rows));
        assert!(classify(&c, 4).is_complex);
    }

    #[test]
    fn test_col_count_forces_complex() {
        let c = candidate(CellGrid::from_text_rows(vec![vec!["a", "b", "c", "d"]]));
        assert!(classify(&c, 4).is_complex);
    }

    #[test]
    fn test_merged_cell_forces_complex() {
        let grid = CellGrid::from_rows(vec![vec![Cell::with_span("a", 1, 2), Cell::new("b")]]);
        let c = candidate(grid);
        let assessment = classify(&c, 4);
        assert!(assessment.has_merged_cells);
        assert!(assessment.is_complex);
    }

    #[test]
    fn test_threshold_is_configurable() {
        let c = candidate(CellGrid::from_text_rows(vec![vec!["a", "b"], vec!["c", "d"]]));
        assert!(classify(&c, 2).is_complex);
        assert!(!classify(&c, 3).is_complex);
    }

    #[test]
    fn test_classification_is_idempotent() {
        let c = candidate(CellGrid::from_text_rows(vec![vec!["a", "b", "c"], vec!["d", "e", "f"]]));
        assert_eq!(classify(&c, 4), classify(&c, 4));
    }

    #[test]
    fn test_empty_grid() {
        let assessment = classify(&candidate(CellGrid::new()), 4);
        assert_eq!(assessment.rows, 0);
        assert_eq!(assessment.cols, 0);
        assert!(!assessment.is_complex);
    }
}
