//! Detector capability interface and adapters.
//!
//! Detection itself is an external collaborator: a bordered-table
//! detector (high precision on ruled tables) and a borderless-table
//! detector (text-alignment based) are injected behind the
//! [`TableDetection`] trait. The adapters here normalize their raw
//! output into typed [`TableCandidate`]s and absorb per-call failures
//! so that one mode failing never prevents the other from running.

use crate::config::ExtractionConfig;
use crate::error::Result;
use crate::geometry::Rect;
use crate::pages::PageSelection;
use crate::table::{CellGrid, SourceMode, TableCandidate};
use std::collections::BTreeSet;
use std::fmt;

/// A raw table candidate as reported by a detection capability.
#[derive(Debug, Clone)]
pub struct DetectedTable {
    /// 1-based page number.
    pub page: u32,
    /// Table region in page coordinates.
    pub bbox: Rect,
    /// Extracted cell structure.
    pub grid: CellGrid,
    /// Detector-internal certainty in `[0, 1]`. `None` for detectors
    /// with no native confidence concept.
    pub confidence: Option<f32>,
}

/// A table detection capability.
///
/// Implementations wrap whatever engine actually locates tables. The
/// orchestrator treats capabilities as potentially absent: an
/// unavailable capability (or an injected `None`) skips that detection
/// mode entirely and the pipeline degrades to single-mode operation.
pub trait TableDetection {
    /// Whether the underlying engine is installed and reachable.
    fn is_available(&self) -> bool {
        true
    }

    /// Detect tables on the selected pages.
    ///
    /// Tuning lives in `config` (`bordered` / `borderless` sections);
    /// implementations read the section for their own mode.
    fn detect(&self, selection: &PageSelection, config: &ExtractionConfig) -> Result<Vec<DetectedTable>>;
}

/// Which adapter invoked the capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorMode {
    /// Ruled-table detection.
    Bordered,
    /// Text-alignment detection (fallback).
    Borderless,
}

impl DetectorMode {
    /// The source mode stamped onto candidates from this detector.
    pub fn source_mode(self) -> SourceMode {
        match self {
            DetectorMode::Bordered => SourceMode::Bordered,
            DetectorMode::Borderless => SourceMode::Borderless,
        }
    }
}

impl fmt::Display for DetectorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetectorMode::Bordered => write!(f, "bordered"),
            DetectorMode::Borderless => write!(f, "borderless"),
        }
    }
}

/// How a detector call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorStatus {
    /// The capability ran and returned candidates (possibly none).
    Completed,
    /// The capability is not installed or reachable; mode skipped.
    Unavailable,
    /// The capability raised; absorbed, recorded in the summary.
    Failed,
}

/// Result of one adapter invocation.
#[derive(Debug)]
pub struct DetectorOutput {
    /// Normalized candidates, in the order the capability reported them.
    pub candidates: Vec<TableCandidate>,
    /// Pages on which at least one table was found.
    pub successful_pages: BTreeSet<u32>,
    /// Call outcome.
    pub status: DetectorStatus,
}

impl DetectorOutput {
    fn empty(status: DetectorStatus) -> Self {
        Self {
            candidates: Vec::new(),
            successful_pages: BTreeSet::new(),
            status,
        }
    }
}

/// Run one detection capability over a page selection.
///
/// Normalizes raw output at the boundary: confidence defaults to the
/// 1.0 sentinel when the detector has no native score (borderless is
/// never threshold-filtered), values are clamped to `[0, 1]`, and the
/// source mode is stamped. Capability failures are absorbed: the
/// adapter logs once and returns an empty output so the other mode can
/// still run.
pub fn run_detector(
    capability: &dyn TableDetection,
    selection: &PageSelection,
    mode: DetectorMode,
    config: &ExtractionConfig,
) -> DetectorOutput {
    if !capability.is_available() {
        log::warn!("{} detection capability unavailable; skipping", mode);
        return DetectorOutput::empty(DetectorStatus::Unavailable);
    }

    let detected = match capability.detect(selection, config) {
        Ok(detected) => detected,
        Err(e) => {
            log::error!("{} detection failed: {}", mode, e);
            return DetectorOutput::empty(DetectorStatus::Failed);
        },
    };

    let mut candidates = Vec::with_capacity(detected.len());
    let mut successful_pages = BTreeSet::new();
    for raw in detected {
        successful_pages.insert(raw.page);
        let confidence = raw.confidence.unwrap_or(1.0).clamp(0.0, 1.0);
        candidates.push(TableCandidate::new(
            raw.page,
            raw.bbox,
            raw.grid,
            confidence,
            mode.source_mode(),
        ));
    }

    log::info!(
        "{}: {} tables on {} pages",
        mode,
        candidates.len(),
        successful_pages.len()
    );
    DetectorOutput {
        candidates,
        successful_pages,
        status: DetectorStatus::Completed,
    }
}
