//! Coordinate-based table re-extraction.
//!
//! Rebuilds a table's cell structure from token (x, y) positions
//! instead of trusting the order tokens were emitted in the source
//! text stream. Reading order is reconstructed geometrically, which
//! sidesteps the corruption class the text-order validator catches.

use crate::error::Result;
use crate::geometry::Rect;
use crate::table::CellGrid;
use crate::utils::safe_float_cmp;

/// One positioned token inside a page region.
#[derive(Debug, Clone)]
pub struct PageToken {
    /// Token text.
    pub text: String,
    /// Token bounding box in page coordinates.
    pub bbox: Rect,
}

/// Access to a raw page-addressable document.
///
/// The implementation owns opening the document by path and cropping a
/// page to a bounding box; the pipeline only ever asks for the tokens
/// inside a region.
pub trait RegionAccess {
    /// Positioned tokens inside `bbox` on the given 1-based page.
    fn tokens_in_region(&self, page: u32, bbox: &Rect) -> Result<Vec<PageToken>>;
}

/// Tokens whose row centers differ by no more than this are one row.
const ROW_TOLERANCE: f32 = 2.0;

/// Column anchors closer than this are merged.
const COLUMN_TOLERANCE: f32 = 3.0;

/// Re-derive a table's cells from token positions in a region.
///
/// Returns `Ok(None)` — repair unavailable, not an error — when the
/// region holds no tokens or when the reconstruction yields fewer than
/// two rows or two columns (a single row or column is not a table).
///
/// # Examples
///
/// ```
/// use tableract::geometry::Rect;
/// use tableract::reextract::{reextract, PageToken, RegionAccess};
/// use tableract::Result;
///
/// struct OneToken;
/// impl RegionAccess for OneToken {
///     fn tokens_in_region(&self, _page: u32, _bbox: &Rect) -> Result<Vec<PageToken>> {
///         Ok(vec![PageToken {
///             text: "lonely".to_string(),
///             bbox: Rect::new(0.0, 0.0, 30.0, 10.0),
///         }])
///     }
/// }
///
/// let bbox = Rect::from_points(0.0, 0.0, 100.0, 100.0);
/// assert!(reextract(&OneToken, 1, &bbox).unwrap().is_none());
/// ```
pub fn reextract(access: &dyn RegionAccess, page: u32, bbox: &Rect) -> Result<Option<CellGrid>> {
    let mut tokens = access.tokens_in_region(page, bbox)?;
    tokens.retain(|token| !token.text.trim().is_empty());
    if tokens.is_empty() {
        log::debug!("no tokens in region on page {}", page);
        return Ok(None);
    }

    let row_anchors = cluster_positions(
        tokens.iter().map(|t| t.bbox.center().y).collect(),
        ROW_TOLERANCE,
    );
    let col_anchors = cluster_positions(tokens.iter().map(|t| t.bbox.left()).collect(), COLUMN_TOLERANCE);

    if row_anchors.len() < 2 || col_anchors.len() < 2 {
        log::debug!(
            "region on page {} reconstructs to {}x{}; not a table",
            page,
            row_anchors.len(),
            col_anchors.len()
        );
        return Ok(None);
    }

    // Left-to-right within a row so cell text concatenates in reading order.
    tokens.sort_by(|a, b| {
        let row_a = nearest_anchor(&row_anchors, a.bbox.center().y);
        let row_b = nearest_anchor(&row_anchors, b.bbox.center().y);
        row_a
            .cmp(&row_b)
            .then_with(|| safe_float_cmp(a.bbox.left(), b.bbox.left()))
    });

    let mut texts = vec![vec![String::new(); col_anchors.len()]; row_anchors.len()];
    for token in &tokens {
        let row = nearest_anchor(&row_anchors, token.bbox.center().y);
        let col = nearest_anchor(&col_anchors, token.bbox.left());
        let cell = &mut texts[row][col];
        if !cell.is_empty() {
            cell.push(' ');
        }
        cell.push_str(token.text.trim());
    }

    let grid = prune_empty(texts);
    if grid.num_rows() < 2 || grid.num_cols() < 2 {
        return Ok(None);
    }
    Ok(Some(grid))
}

/// Cluster sorted positions into anchor values, merging neighbors
/// within the tolerance.
fn cluster_positions(mut positions: Vec<f32>, tolerance: f32) -> Vec<f32> {
    positions.sort_by(|a, b| safe_float_cmp(*a, *b));
    let mut anchors: Vec<f32> = Vec::new();
    for position in positions {
        match anchors.last() {
            Some(&last) if (position - last).abs() <= tolerance => {},
            _ => anchors.push(position),
        }
    }
    anchors
}

/// Index of the anchor closest to `value`.
fn nearest_anchor(anchors: &[f32], value: f32) -> usize {
    anchors
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| safe_float_cmp((value - **a).abs(), (value - **b).abs()))
        .map(|(idx, _)| idx)
        .unwrap_or(0)
}

/// Drop all-empty rows and columns, then build the grid.
fn prune_empty(texts: Vec<Vec<String>>) -> CellGrid {
    let num_cols = texts.first().map_or(0, |row| row.len());
    let keep_col: Vec<bool> = (0..num_cols)
        .map(|col| texts.iter().any(|row| !row[col].is_empty()))
        .collect();

    let rows: Vec<Vec<String>> = texts
        .into_iter()
        .filter(|row| row.iter().any(|cell| !cell.is_empty()))
        .map(|row| {
            row.into_iter()
                .zip(&keep_col)
                .filter_map(|(cell, keep)| keep.then_some(cell))
                .collect()
        })
        .collect();

    CellGrid::from_text_rows(rows)
}
