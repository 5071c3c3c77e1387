//! Sidecar representations for finalized tables.
//!
//! Complex tables are persisted as structured JSON (authoritative)
//! plus CSV and Markdown renderings; simple tables stay inline as
//! Markdown only. All three forms derive from the same finalized
//! [`TableCandidate`] without re-invoking detection.

use crate::error::Result;
use crate::table::{CellGrid, ComplexityAssessment, SourceMode, TableCandidate};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Render a grid as a Markdown pipe table.
///
/// The first row is rendered as the header row. Newlines inside cells
/// become spaces and pipe characters are escaped. An empty grid
/// renders a placeholder.
///
/// # Examples
///
/// ```
/// use tableract::table::{grid_to_markdown, CellGrid};
///
/// let grid = CellGrid::from_text_rows(vec![vec!["h1", "h2"], vec!["a", "b"]]);
/// let md = grid_to_markdown(&grid);
/// assert!(md.starts_with("| h1 | h2 |"));
/// assert!(md.contains("|---|---|"));
/// ```
pub fn grid_to_markdown(grid: &CellGrid) -> String {
    if grid.is_empty() {
        return "_Empty table_".to_string();
    }

    let mut lines = Vec::with_capacity(grid.num_rows() + 1);
    for (row_idx, row) in grid.rows.iter().enumerate() {
        let cells: Vec<String> = row
            .iter()
            .map(|cell| {
                cell.text
                    .replace(['\n', '\r'], " ")
                    .replace('|', "\\|")
            })
            .collect();
        lines.push(format!("| {} |", cells.join(" | ")));

        if row_idx == 0 {
            let separator: Vec<&str> = row.iter().map(|_| "---").collect();
            lines.push(format!("|{}|", separator.join("|")));
        }
    }
    lines.join("\n")
}

/// Render a grid as CSV.
///
/// Rows are written uniformly with no header assumption; ragged rows
/// are allowed.
pub fn grid_to_csv(grid: &CellGrid) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());
    for row in &grid.rows {
        writer.write_record(row.iter().map(|cell| cell.text.as_str()))?;
    }
    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// The authoritative JSON record persisted for a finalized table.
#[derive(Debug, Serialize)]
pub struct TableRecord<'a> {
    /// Zero-padded label (`"table_007"`); absent if not finalized.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_id: Option<String>,
    /// 1-based page number.
    pub page: u32,
    /// Region corners `[x1, y1, x2, y2]` in page coordinates.
    pub bbox: [f32; 4],
    /// Detector confidence in `[0, 1]`.
    pub confidence: f32,
    /// Mechanism that produced the grid.
    pub source_mode: SourceMode,
    /// Warning annotation, present when a failed validation could not
    /// be repaired.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repair_note: Option<&'a str>,
    /// Structural complexity.
    pub complexity: ComplexityAssessment,
    /// Cell structure, all rows uniform with no header assumption.
    pub grid: &'a CellGrid,
}

impl<'a> TableRecord<'a> {
    /// Build a record from a candidate and its assessment.
    pub fn new(candidate: &'a TableCandidate, complexity: ComplexityAssessment) -> Self {
        Self {
            table_id: candidate.table_id(),
            page: candidate.page,
            bbox: candidate.bbox.corners(),
            confidence: candidate.confidence,
            source_mode: candidate.source_mode,
            repair_note: candidate.repair_note.as_deref(),
            complexity,
            grid: &candidate.grid,
        }
    }
}

/// Writes sidecar files for complex tables under `<output_dir>/tables/`.
#[derive(Debug, Clone)]
pub struct SidecarWriter {
    tables_dir: PathBuf,
}

impl SidecarWriter {
    /// Create a writer rooted at a document's output directory.
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        Self {
            tables_dir: output_dir.as_ref().join("tables"),
        }
    }

    /// The directory sidecar files are written into.
    pub fn tables_dir(&self) -> &Path {
        &self.tables_dir
    }

    /// Persist a finalized candidate.
    ///
    /// Complex tables get `table_NNN.json`, `.csv` and `.md` files;
    /// simple tables produce no files (they are rendered inline by the
    /// caller) and an empty path list is returned.
    pub fn write(
        &self,
        candidate: &TableCandidate,
        complexity: &ComplexityAssessment,
    ) -> Result<Vec<PathBuf>> {
        if !complexity.is_complex {
            return Ok(Vec::new());
        }

        fs::create_dir_all(&self.tables_dir)?;
        let base = candidate
            .table_id()
            .unwrap_or_else(|| format!("table_p{:03}", candidate.page));

        let json_path = self.tables_dir.join(format!("{}.json", base));
        let record = TableRecord::new(candidate, *complexity);
        fs::write(&json_path, serde_json::to_string_pretty(&record)?)?;

        let csv_path = self.tables_dir.join(format!("{}.csv", base));
        fs::write(&csv_path, grid_to_csv(&candidate.grid)?)?;

        let md_path = self.tables_dir.join(format!("{}.md", base));
        fs::write(&md_path, grid_to_markdown(&candidate.grid))?;

        log::debug!("wrote sidecar files for {} (page {})", base, candidate.page);
        Ok(vec![json_path, csv_path, md_path])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::table::Cell;

    fn sample_grid() -> CellGrid {
        CellGrid::from_text_rows(vec![vec!["h1", "h2"], vec!["a|x", "b\nc"]])
    }

    #[test]
    fn test_markdown_escapes_and_header() {
        let md = grid_to_markdown(&sample_grid());
        let lines: Vec<&str> = md.lines().collect();
        assert_eq!(lines[0], "| h1 | h2 |");
        assert_eq!(lines[1], "|---|---|");
        assert_eq!(lines[2], "| a\\|x | b c |");
    }

    #[test]
    fn test_markdown_empty_grid_placeholder() {
        assert_eq!(grid_to_markdown(&CellGrid::new()), "_Empty table_");
    }

    #[test]
    fn test_csv_rendering() {
        let csv = grid_to_csv(&sample_grid()).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("h1,h2"));
        // Embedded pipe needs no quoting; embedded newline does.
        assert_eq!(lines.next(), Some("a|x,\"b"));
    }

    #[test]
    fn test_csv_ragged_rows() {
        let grid = CellGrid::from_text_rows(vec![vec!["a", "b", "c"], vec!["d"]]);
        let csv = grid_to_csv(&grid).unwrap();
        assert_eq!(csv, "a,b,c\nd\n");
    }

    #[test]
    fn test_record_shape() {
        let mut candidate = TableCandidate::new(
            2,
            Rect::from_points(1.0, 2.0, 3.0, 4.0),
            sample_grid(),
            0.85,
            SourceMode::Bordered,
        );
        candidate.sequence_id = Some(1);

        let complexity = crate::table::classify(&candidate, 4);
        let record = TableRecord::new(&candidate, complexity);
        let json: serde_json::Value = serde_json::from_str(&serde_json::to_string(&record).unwrap()).unwrap();

        assert_eq!(json["table_id"], "table_001");
        assert_eq!(json["page"], 2);
        assert_eq!(json["source_mode"], "bordered");
        assert_eq!(json["bbox"][2], 3.0);
        assert_eq!(json["grid"]["rows"][0][0]["text"], "h1");
        assert!(json.get("repair_note").is_none());
    }

    #[test]
    fn test_writer_skips_simple_tables() {
        let dir = tempfile::tempdir().unwrap();
        let writer = SidecarWriter::new(dir.path());

        let candidate = TableCandidate::new(
            1,
            Rect::from_points(0.0, 0.0, 10.0, 10.0),
            CellGrid::from_text_rows(vec![vec!["a", "b"], vec!["c", "d"]]),
            1.0,
            SourceMode::Borderless,
        );
        let complexity = crate::table::classify(&candidate, 4);

        let paths = writer.write(&candidate, &complexity).unwrap();
        assert!(paths.is_empty());
        assert!(!writer.tables_dir().exists());
    }

    #[test]
    fn test_writer_emits_trio_for_complex_tables() {
        let dir = tempfile::tempdir().unwrap();
        let writer = SidecarWriter::new(dir.path());

        let grid = CellGrid::from_rows(vec![
            vec![Cell::with_span("merged", 2, 1), Cell::new("b")],
            vec![Cell::new("c"), Cell::new("d")],
        ]);
        let mut candidate = TableCandidate::new(
            3,
            Rect::from_points(0.0, 0.0, 10.0, 10.0),
            grid,
            0.9,
            SourceMode::Bordered,
        );
        candidate.sequence_id = Some(5);
        let complexity = crate::table::classify(&candidate, 4);
        assert!(complexity.is_complex);

        let paths = writer.write(&candidate, &complexity).unwrap();
        assert_eq!(paths.len(), 3);
        for path in &paths {
            assert!(path.exists(), "missing {:?}", path);
            assert!(path.file_name().unwrap().to_str().unwrap().starts_with("table_005"));
        }
    }
}
