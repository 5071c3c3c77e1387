//! Table data model: candidates, complexity assessment, sidecar formats.

pub mod candidate;
pub mod complexity;
pub mod sidecar;

pub use candidate::{Cell, CellGrid, SourceMode, TableCandidate};
pub use complexity::{classify, ComplexityAssessment};
pub use sidecar::{grid_to_csv, grid_to_markdown, SidecarWriter, TableRecord};
