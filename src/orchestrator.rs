//! Hybrid extraction orchestrator.
//!
//! Drives bordered detection first, decides per page whether the
//! borderless fallback is needed, validates text order on every
//! provisional candidate (repairing via coordinate re-extraction when
//! it fails), and finalizes the accepted set with contiguous sequence
//! identifiers in document reading order.

use crate::config::ExtractionConfig;
use crate::detect::{run_detector, DetectorMode, DetectorStatus, TableDetection};
use crate::error::Result;
use crate::pages::PageSelection;
use crate::reextract::{reextract, RegionAccess};
use crate::table::{SourceMode, TableCandidate};
use crate::validate::TextOrderValidator;
use serde::Serialize;
use std::collections::BTreeSet;

/// Aggregate over one document's extraction run.
///
/// Produced once per run, after the candidate list is finalized;
/// read-only afterwards.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractionSummary {
    /// Total finalized tables.
    pub total_tables: usize,
    /// Finalized tables whose grid came from the bordered detector.
    pub bordered_tables: usize,
    /// Finalized tables whose grid came from the borderless fallback.
    pub borderless_tables: usize,
    /// Tables repaired by coordinate re-extraction.
    pub coordinate_repairs: usize,
    /// Candidates that failed text-order validation (repaired or not).
    pub validation_failures: usize,
    /// Pages whose bordered confidence fell below the threshold.
    pub low_confidence_pages: Vec<u32>,
    /// Pages the borderless fallback was invoked on.
    pub fallback_pages: Vec<u32>,
    /// Detection calls that were absorbed after raising.
    pub detection_errors: usize,
}

/// The finalized output of one document run.
#[derive(Debug)]
pub struct ExtractionRun {
    /// Accepted candidates with contiguous `sequence_id`s starting at 1,
    /// in page order then within-page discovery order.
    pub candidates: Vec<TableCandidate>,
    /// Run statistics.
    pub summary: ExtractionSummary,
}

/// Hybrid bordered + borderless extraction driver.
///
/// Capabilities are injected at construction and treated as
/// potentially absent; a missing detector degrades the pipeline to
/// single-mode operation, and a missing region accessor disables
/// coordinate repair (failed candidates are kept with a warning
/// annotation — never dropped).
///
/// # Example
///
/// ```ignore
/// let orchestrator = HybridOrchestrator::new(config)
///     .with_bordered(&camelot_lattice)
///     .with_borderless(&camelot_stream)
///     .with_region_access(&plumber)
///     .with_page_count(doc.page_count());
/// let run = orchestrator.run(&PageSelection::parse("all")?)?;
/// ```
pub struct HybridOrchestrator<'a> {
    bordered: Option<&'a dyn TableDetection>,
    borderless: Option<&'a dyn TableDetection>,
    region_access: Option<&'a dyn RegionAccess>,
    page_count: Option<u32>,
    config: ExtractionConfig,
    validator: TextOrderValidator,
}

impl<'a> HybridOrchestrator<'a> {
    /// Create an orchestrator with no capabilities attached.
    pub fn new(config: ExtractionConfig) -> Self {
        let validator = TextOrderValidator::new(config.signatures.clone());
        Self {
            bordered: None,
            borderless: None,
            region_access: None,
            page_count: None,
            config,
            validator,
        }
    }

    /// Attach the bordered-table detection capability.
    pub fn with_bordered(mut self, capability: &'a dyn TableDetection) -> Self {
        self.bordered = Some(capability);
        self
    }

    /// Attach the borderless-table detection capability.
    pub fn with_borderless(mut self, capability: &'a dyn TableDetection) -> Self {
        self.borderless = Some(capability);
        self
    }

    /// Attach the raw-document accessor used for coordinate repair.
    pub fn with_region_access(mut self, access: &'a dyn RegionAccess) -> Self {
        self.region_access = Some(access);
        self
    }

    /// Supply the authoritative page count (from the layout engine).
    ///
    /// Only consulted by the strict all-pages fallback mode.
    pub fn with_page_count(mut self, pages: u32) -> Self {
        self.page_count = Some(pages);
        self
    }

    /// Run the full pipeline over a page selection.
    ///
    /// Failures local to one table or one detection call are absorbed
    /// and recorded in the summary; an error here is document-level.
    pub fn run(&self, selection: &PageSelection) -> Result<ExtractionRun> {
        let mut detection_errors = 0;

        // Step 1: bordered detection, partitioned by the threshold.
        let bordered_output = self.detect(self.bordered, selection, DetectorMode::Bordered);
        if bordered_output.status == DetectorStatus::Failed {
            detection_errors += 1;
        }
        let bordered_pages = bordered_output.successful_pages;

        let threshold = self.config.confidence_threshold;
        let mut accepted = Vec::new();
        let mut low_confidence_pages = BTreeSet::new();
        for candidate in bordered_output.candidates {
            if candidate.confidence >= threshold {
                accepted.push(candidate);
            } else {
                log::debug!(
                    "dropping page {} candidate below threshold ({:.2} < {:.2})",
                    candidate.page,
                    candidate.confidence,
                    threshold
                );
                low_confidence_pages.insert(candidate.page);
            }
        }

        // Step 2: pages needing the borderless fallback.
        let fallback_pages = self.fallback_pages(selection, &bordered_pages, &low_confidence_pages);

        // Step 3: borderless detection, restricted to the fallback set.
        let mut provisional = accepted;
        if !fallback_pages.is_empty() {
            let fallback_selection = PageSelection::Pages(fallback_pages.clone());
            log::info!("borderless fallback on pages {}", fallback_selection);
            let output = self.detect(self.borderless, &fallback_selection, DetectorMode::Borderless);
            if output.status == DetectorStatus::Failed {
                detection_errors += 1;
            }
            // Step 4: bordered first, borderless appended; integration
            // relies on this discovery order within a page.
            provisional.extend(output.candidates);
        }

        // Step 5: validate each candidate, repair on failure.
        let mut validation_failures = 0;
        let mut coordinate_repairs = 0;
        for candidate in &mut provisional {
            if self.validator.validate(candidate) {
                continue;
            }
            validation_failures += 1;
            log::warn!("page {} table has text order issues", candidate.page);
            if self.repair(candidate) {
                coordinate_repairs += 1;
            }
        }

        // Step 6: stable page sort, then contiguous sequence ids.
        provisional.sort_by_key(|candidate| candidate.page);
        for (idx, candidate) in provisional.iter_mut().enumerate() {
            candidate.sequence_id = Some(idx as u32 + 1);
        }

        // Step 7: summary over the finalized list.
        let summary = ExtractionSummary {
            total_tables: provisional.len(),
            bordered_tables: count_mode(&provisional, SourceMode::Bordered),
            borderless_tables: count_mode(&provisional, SourceMode::Borderless),
            coordinate_repairs,
            validation_failures,
            low_confidence_pages: low_confidence_pages.into_iter().collect(),
            fallback_pages: fallback_pages.into_iter().collect(),
            detection_errors,
        };
        log::info!(
            "extracted {} tables ({} bordered, {} borderless, {} repaired)",
            summary.total_tables,
            summary.bordered_tables,
            summary.borderless_tables,
            summary.coordinate_repairs
        );

        Ok(ExtractionRun {
            candidates: provisional,
            summary,
        })
    }

    fn detect(
        &self,
        capability: Option<&'a dyn TableDetection>,
        selection: &PageSelection,
        mode: DetectorMode,
    ) -> crate::detect::DetectorOutput {
        match capability {
            Some(capability) => run_detector(capability, selection, mode, &self.config),
            None => {
                log::warn!("{} detection capability not configured; skipping", mode);
                crate::detect::DetectorOutput {
                    candidates: Vec::new(),
                    successful_pages: BTreeSet::new(),
                    status: DetectorStatus::Unavailable,
                }
            },
        }
    }

    /// Compute the pages the borderless fallback should visit.
    ///
    /// For explicit requests: (requested − bordered-successful) ∪
    /// low-confidence. For "all": low-confidence pages only — without
    /// an authoritative page count there is no way to know which pages
    /// the bordered detector saw but found empty. The strict mode uses
    /// the supplied page count to close that gap.
    fn fallback_pages(
        &self,
        selection: &PageSelection,
        bordered_pages: &BTreeSet<u32>,
        low_confidence_pages: &BTreeSet<u32>,
    ) -> BTreeSet<u32> {
        match selection {
            PageSelection::All => {
                if self.config.fallback_all_pages {
                    if let Some(count) = self.page_count {
                        return (1..=count)
                            .filter(|page| !bordered_pages.contains(page))
                            .chain(low_confidence_pages.iter().copied())
                            .collect();
                    }
                    log::warn!("strict all-pages fallback requested but page count unknown");
                }
                low_confidence_pages.clone()
            },
            PageSelection::Pages(requested) => requested
                .difference(bordered_pages)
                .chain(low_confidence_pages.iter())
                .copied()
                .collect(),
        }
    }

    /// Attempt coordinate repair in place. Returns true on success;
    /// otherwise annotates the candidate and keeps it unchanged.
    fn repair(&self, candidate: &mut TableCandidate) -> bool {
        let Some(access) = self.region_access else {
            candidate.repair_note =
                Some("text order validation failed; coordinate repair unavailable".to_string());
            log::warn!("keeping page {} table as-is (no raw document access)", candidate.page);
            return false;
        };

        match reextract(access, candidate.page, &candidate.bbox) {
            Ok(Some(grid)) => {
                candidate.grid = grid;
                candidate.source_mode = SourceMode::CoordinateRepair;
                candidate.confidence = 1.0;
                log::info!("repaired page {} table via coordinate re-extraction", candidate.page);
                true
            },
            Ok(None) => {
                candidate.repair_note =
                    Some("text order validation failed; region yielded no table structure".to_string());
                log::warn!("keeping page {} table as-is (repair found nothing)", candidate.page);
                false
            },
            Err(e) => {
                candidate.repair_note =
                    Some(format!("text order validation failed; repair errored: {}", e));
                log::warn!("keeping page {} table as-is ({})", candidate.page, e);
                false
            },
        }
    }
}

fn count_mode(candidates: &[TableCandidate], mode: SourceMode) -> usize {
    candidates.iter().filter(|c| c.source_mode == mode).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::DetectedTable;
    use crate::geometry::Rect;
    use crate::reextract::PageToken;
    use crate::table::CellGrid;
    use std::cell::RefCell;

    struct StubDetector {
        tables: Vec<DetectedTable>,
        calls: RefCell<Vec<PageSelection>>,
    }

    impl StubDetector {
        fn new(tables: Vec<DetectedTable>) -> Self {
            Self {
                tables,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl TableDetection for StubDetector {
        fn detect(&self, selection: &PageSelection, _config: &ExtractionConfig) -> Result<Vec<DetectedTable>> {
            self.calls.borrow_mut().push(selection.clone());
            Ok(self
                .tables
                .iter()
                .filter(|t| selection.contains(t.page))
                .cloned()
                .collect())
        }
    }

    fn bbox() -> Rect {
        Rect::from_points(0.0, 0.0, 100.0, 50.0)
    }

    fn detected(page: u32, confidence: Option<f32>, text: &str) -> DetectedTable {
        DetectedTable {
            page,
            bbox: bbox(),
            grid: CellGrid::from_text_rows(vec![vec![text, "b"], vec!["c", "d"]]),
            confidence,
        }
    }

    #[test]
    fn test_no_capabilities_yields_empty_run() {
        let orchestrator = HybridOrchestrator::new(ExtractionConfig::new());
        let run = orchestrator.run(&PageSelection::All).unwrap();
        assert!(run.candidates.is_empty());
        assert_eq!(run.summary.total_tables, 0);
    }

    #[test]
    fn test_explicit_pages_fallback_covers_missing_pages() {
        // Bordered only finds page 1; pages 2 and 3 were requested.
        let bordered = StubDetector::new(vec![detected(1, Some(0.9), "a")]);
        let borderless = StubDetector::new(vec![detected(2, None, "a")]);

        let orchestrator = HybridOrchestrator::new(ExtractionConfig::new().with_confidence_threshold(0.7))
            .with_bordered(&bordered)
            .with_borderless(&borderless);
        let run = orchestrator.run(&PageSelection::parse("1-3").unwrap()).unwrap();

        assert_eq!(run.summary.fallback_pages, vec![2, 3]);
        assert_eq!(run.summary.total_tables, 2);
        let calls = borderless.calls.borrow();
        assert_eq!(calls[0], PageSelection::from_pages([2, 3]));
    }

    #[test]
    fn test_all_selection_falls_back_only_on_low_confidence() {
        let bordered = StubDetector::new(vec![detected(1, Some(0.9), "a"), detected(3, Some(0.4), "a")]);
        let borderless = StubDetector::new(vec![detected(3, None, "a")]);

        let orchestrator = HybridOrchestrator::new(ExtractionConfig::new().with_confidence_threshold(0.7))
            .with_bordered(&bordered)
            .with_borderless(&borderless);
        let run = orchestrator.run(&PageSelection::All).unwrap();

        assert_eq!(run.summary.low_confidence_pages, vec![3]);
        assert_eq!(run.summary.fallback_pages, vec![3]);
        let calls = borderless.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0], PageSelection::from_pages([3]));
    }

    #[test]
    fn test_strict_all_fallback_visits_unseen_pages() {
        let bordered = StubDetector::new(vec![detected(1, Some(0.9), "a")]);
        let borderless = StubDetector::new(vec![detected(2, None, "a")]);

        let config = ExtractionConfig::new()
            .with_confidence_threshold(0.7)
            .with_fallback_all_pages(true);
        let orchestrator = HybridOrchestrator::new(config)
            .with_bordered(&bordered)
            .with_borderless(&borderless)
            .with_page_count(3);
        let run = orchestrator.run(&PageSelection::All).unwrap();

        assert_eq!(run.summary.fallback_pages, vec![2, 3]);
        assert_eq!(run.summary.total_tables, 2);
    }

    #[test]
    fn test_strict_mode_without_page_count_keeps_legacy_scoping() {
        let bordered = StubDetector::new(vec![detected(1, Some(0.9), "a")]);
        let borderless = StubDetector::new(vec![]);

        let config = ExtractionConfig::new().with_fallback_all_pages(true);
        let orchestrator = HybridOrchestrator::new(config)
            .with_bordered(&bordered)
            .with_borderless(&borderless);
        let run = orchestrator.run(&PageSelection::All).unwrap();

        assert!(run.summary.fallback_pages.is_empty());
        assert!(borderless.calls.borrow().is_empty());
    }

    #[test]
    fn test_sequence_ids_contiguous_in_page_order() {
        let bordered = StubDetector::new(vec![detected(3, Some(0.9), "x"), detected(1, Some(0.9), "y")]);

        let orchestrator =
            HybridOrchestrator::new(ExtractionConfig::new()).with_bordered(&bordered);
        let run = orchestrator.run(&PageSelection::All).unwrap();

        let ids: Vec<u32> = run.candidates.iter().filter_map(|c| c.sequence_id).collect();
        assert_eq!(ids, vec![1, 2]);
        let pages: Vec<u32> = run.candidates.iter().map(|c| c.page).collect();
        assert_eq!(pages, vec![1, 3]);
    }

    #[test]
    fn test_failed_validation_without_repair_keeps_candidate() {
        let corrupted = DetectedTable {
            page: 1,
            bbox: bbox(),
            grid: CellGrid::from_text_rows(vec![vec![") 수 10.13( 월", "b"], vec!["c", "d"]]),
            confidence: Some(0.9),
        };
        let bordered = StubDetector::new(vec![corrupted.clone()]);

        let orchestrator =
            HybridOrchestrator::new(ExtractionConfig::new()).with_bordered(&bordered);
        let run = orchestrator.run(&PageSelection::All).unwrap();

        assert_eq!(run.summary.total_tables, 1);
        assert_eq!(run.summary.validation_failures, 1);
        assert_eq!(run.summary.coordinate_repairs, 0);
        let table = &run.candidates[0];
        assert_eq!(table.grid, corrupted.grid);
        assert!(table.repair_note.is_some());
    }

    #[test]
    fn test_repair_replaces_grid_and_mode() {
        struct GoodRegion;
        impl RegionAccess for GoodRegion {
            fn tokens_in_region(&self, _page: u32, _bbox: &Rect) -> Result<Vec<PageToken>> {
                Ok(vec![
                    PageToken { text: "10.13".into(), bbox: Rect::new(0.0, 0.0, 20.0, 10.0) },
                    PageToken { text: "(월)".into(), bbox: Rect::new(50.0, 0.0, 20.0, 10.0) },
                    PageToken { text: "개강".into(), bbox: Rect::new(0.0, 30.0, 20.0, 10.0) },
                    PageToken { text: "행사".into(), bbox: Rect::new(50.0, 30.0, 20.0, 10.0) },
                ])
            }
        }

        let corrupted = DetectedTable {
            page: 1,
            bbox: bbox(),
            grid: CellGrid::from_text_rows(vec![vec![") 수 10.13( 월", "b"], vec!["c", "d"]]),
            confidence: Some(0.9),
        };
        let bordered = StubDetector::new(vec![corrupted]);
        let region = GoodRegion;

        let orchestrator = HybridOrchestrator::new(ExtractionConfig::new())
            .with_bordered(&bordered)
            .with_region_access(&region);
        let run = orchestrator.run(&PageSelection::All).unwrap();

        assert_eq!(run.summary.coordinate_repairs, 1);
        let table = &run.candidates[0];
        assert_eq!(table.source_mode, SourceMode::CoordinateRepair);
        assert_eq!(table.confidence, 1.0);
        assert_eq!(table.grid.rows[0][0].text, "10.13");
        assert!(table.repair_note.is_none());
    }

    #[test]
    fn test_failing_detector_recorded_in_summary() {
        struct Failing;
        impl TableDetection for Failing {
            fn detect(&self, _s: &PageSelection, _c: &ExtractionConfig) -> Result<Vec<DetectedTable>> {
                Err(crate::Error::DetectionUnavailable("boom".to_string()))
            }
        }

        let failing = Failing;
        let borderless = StubDetector::new(vec![detected(1, None, "a")]);
        let orchestrator = HybridOrchestrator::new(ExtractionConfig::new())
            .with_bordered(&failing)
            .with_borderless(&borderless);

        // Explicit request so the fallback set is non-empty despite the
        // bordered failure.
        let run = orchestrator.run(&PageSelection::parse("1").unwrap()).unwrap();
        assert_eq!(run.summary.detection_errors, 1);
        assert_eq!(run.summary.total_tables, 1);
        assert_eq!(run.candidates[0].source_mode, SourceMode::Borderless);
    }
}
