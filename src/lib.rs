//! # tableract
//!
//! Hybrid table extraction and validation for document-to-RAG
//! pipelines.
//!
//! Given a page-structured document, the pipeline:
//! - detects tables with two structurally different detectors — a
//!   bordered (ruled-grid) detector and a borderless (text-alignment)
//!   fallback detector;
//! - decides per page which detector's output to trust, using a
//!   confidence threshold on the bordered results;
//! - detects a known class of text-ordering corruption and repairs it
//!   by re-extracting cell structure from token (x, y) coordinates;
//! - classifies each accepted table's structural complexity to choose
//!   between inline Markdown and sidecar JSON+CSV+Markdown storage;
//! - splices the validated tables back into the rendered document
//!   text, replacing the primary parser's lower-confidence renderings.
//!
//! Detection engines, raw-document access, and the rendered document
//! are external collaborators injected behind traits
//! ([`detect::TableDetection`], [`reextract::RegionAccess`]); the
//! crate itself performs no layout detection, OCR, or model inference.
//!
//! ## Quick start
//!
//! ```ignore
//! use tableract::{ExtractionConfig, HybridOrchestrator, PageSelection, SidecarWriter};
//! use tableract::table::classify;
//!
//! let config = ExtractionConfig::new().with_confidence_threshold(0.7);
//! let orchestrator = HybridOrchestrator::new(config.clone())
//!     .with_bordered(&lattice_engine)
//!     .with_borderless(&stream_engine)
//!     .with_region_access(&raw_document);
//!
//! let run = orchestrator.run(&PageSelection::parse("all")?)?;
//! let writer = SidecarWriter::new("output/report");
//! for candidate in &run.candidates {
//!     let complexity = classify(candidate, config.complexity_threshold);
//!     writer.write(candidate, &complexity)?;
//! }
//! ```

#![warn(missing_docs)]

// Error handling
pub mod error;

// Page addressing and geometry
pub mod geometry;
pub mod pages;

// Configuration
pub mod config;

// Table data model, complexity, sidecar formats
pub mod table;

// Detection adapters and validation/repair
pub mod detect;
pub mod reextract;
pub mod validate;

// Pipeline driver and text re-integration
pub mod integrate;
pub mod orchestrator;

// Re-exports
pub use config::{BorderedTuning, BorderlessTuning, ExtractionConfig};
pub use error::{Error, Result};
pub use orchestrator::{ExtractionRun, ExtractionSummary, HybridOrchestrator};
pub use pages::PageSelection;
pub use table::{Cell, CellGrid, ComplexityAssessment, SidecarWriter, SourceMode, TableCandidate};

// Internal utilities
pub(crate) mod utils {
    //! Internal utility functions for the library.

    use std::cmp::Ordering;

    /// Safely compare two floating point numbers, handling NaN cases.
    ///
    /// NaN values are treated as equal to each other and greater than
    /// all other values, so sorting never panics on NaN.
    #[inline]
    pub fn safe_float_cmp(a: f32, b: f32) -> Ordering {
        match (a.is_nan(), b.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => a.partial_cmp(&b).unwrap(),
        }
    }

}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
