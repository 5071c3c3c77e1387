//! Detected table instances.
//!
//! Dynamic, dict-shaped metadata from detection capabilities is
//! normalized into these structs at the adapter boundary; nothing
//! downstream depends on untyped key lookups.

use crate::geometry::Rect;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One table cell. Rows carry no implicit header assumption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// Cell text content.
    pub text: String,
    /// Number of rows this cell spans (1 = no merge).
    pub row_span: u32,
    /// Number of columns this cell spans (1 = no merge).
    pub col_span: u32,
}

impl Cell {
    /// Create an unmerged cell.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            row_span: 1,
            col_span: 1,
        }
    }

    /// Create a cell with explicit spans.
    pub fn with_span(text: impl Into<String>, row_span: u32, col_span: u32) -> Self {
        Self {
            text: text.into(),
            row_span,
            col_span,
        }
    }

    /// True if the cell spans more than one row or column.
    pub fn is_merged(&self) -> bool {
        self.row_span > 1 || self.col_span > 1
    }
}

/// An ordered 2D cell structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellGrid {
    /// Rows in reading order, each a list of cells left to right.
    pub rows: Vec<Vec<Cell>>,
}

impl CellGrid {
    /// Create an empty grid.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a grid from rows of cells.
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    /// Build an unmerged grid from rows of text.
    ///
    /// # Examples
    ///
    /// ```
    /// use tableract::table::CellGrid;
    ///
    /// let grid = CellGrid::from_text_rows(vec![vec!["a", "b"], vec!["c", "d"]]);
    /// assert_eq!(grid.num_rows(), 2);
    /// assert_eq!(grid.num_cols(), 2);
    /// ```
    pub fn from_text_rows<S: Into<String>>(rows: Vec<Vec<S>>) -> Self {
        Self {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(Cell::new).collect())
                .collect(),
        }
    }

    /// Number of rows.
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns (widest row).
    pub fn num_cols(&self) -> usize {
        self.rows.iter().map(|row| row.len()).max().unwrap_or(0)
    }

    /// True if the grid has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// True if any cell spans more than one row or column.
    pub fn has_merged_cells(&self) -> bool {
        self.rows.iter().flatten().any(Cell::is_merged)
    }

    /// Iterate over all cell texts in reading order.
    pub fn cell_texts(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().flatten().map(|cell| cell.text.as_str())
    }
}

/// Which mechanism produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceMode {
    /// Ruled-table detector (carries a native confidence score).
    Bordered,
    /// Text-alignment detector used as fallback (sentinel confidence 1.0).
    Borderless,
    /// Geometric re-extraction after a failed text-order validation.
    CoordinateRepair,
}

impl fmt::Display for SourceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourceMode::Bordered => "bordered",
            SourceMode::Borderless => "borderless",
            SourceMode::CoordinateRepair => "coordinate_repair",
        };
        write!(f, "{}", name)
    }
}

/// One detected table instance.
#[derive(Debug, Clone, PartialEq)]
pub struct TableCandidate {
    /// 1-based page number.
    pub page: u32,
    /// Table region in page coordinates. Immutable once produced; a
    /// coordinate repair replaces the grid, never the region.
    pub bbox: Rect,
    /// Extracted cell structure.
    pub grid: CellGrid,
    /// Detector confidence in `[0, 1]`. Meaningful only for bordered
    /// output; 1.0 sentinel for borderless and coordinate repair.
    pub confidence: f32,
    /// Which mechanism produced the current grid.
    pub source_mode: SourceMode,
    /// Final document-order identifier, contiguous from 1. Assigned
    /// only after all fallback and repair steps have completed.
    pub sequence_id: Option<u32>,
    /// Warning annotation when validation failed and repair was
    /// unavailable.
    pub repair_note: Option<String>,
}

impl TableCandidate {
    /// Create a provisional candidate (no sequence id yet).
    pub fn new(page: u32, bbox: Rect, grid: CellGrid, confidence: f32, source_mode: SourceMode) -> Self {
        Self {
            page,
            bbox,
            grid,
            confidence,
            source_mode,
            sequence_id: None,
            repair_note: None,
        }
    }

    /// Zero-padded label derived from the sequence id (`"table_007"`).
    ///
    /// `None` until the orchestrator has finalized the run.
    pub fn table_id(&self) -> Option<String> {
        self.sequence_id.map(|id| format!("table_{:03}", id))
    }
}
