//! Configuration for the extraction pipeline.

use crate::validate::{default_signatures, CorruptionSignature};

/// Tuning for the bordered-table detector.
///
/// These are extraction-quality parameters, not correctness-critical
/// ones. The defaults favor Latin/CJK mixed-width text: wider line
/// tolerance than generic defaults, a larger joint tolerance to merge
/// split grid intersections, and higher sampling resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct BorderedTuning {
    /// Line-detection sensitivity.
    pub line_scale: u32,
    /// Tolerance for joining incomplete ruling lines.
    pub line_tolerance: f32,
    /// Tolerance for merging split grid intersections.
    pub joint_tolerance: f32,
    /// Page sampling resolution in DPI.
    pub resolution_dpi: u32,
}

impl Default for BorderedTuning {
    fn default() -> Self {
        Self {
            line_scale: 40,
            line_tolerance: 3.0,
            joint_tolerance: 3.0,
            resolution_dpi: 400,
        }
    }
}

/// Tuning for the borderless (text-alignment) detector.
#[derive(Debug, Clone, PartialEq)]
pub struct BorderlessTuning {
    /// Tolerance for snapping text edges into a table boundary.
    pub edge_tolerance: f32,
    /// Tolerance for grouping text into rows.
    pub row_tolerance: f32,
    /// Tolerance for grouping text into columns.
    pub column_tolerance: f32,
}

impl Default for BorderlessTuning {
    fn default() -> Self {
        Self {
            edge_tolerance: 50.0,
            row_tolerance: 2.0,
            column_tolerance: 0.0,
        }
    }
}

/// Pipeline configuration.
///
/// # Example
///
/// ```
/// use tableract::config::ExtractionConfig;
///
/// let config = ExtractionConfig::new()
///     .with_confidence_threshold(0.7)
///     .with_complexity_threshold(6);
/// assert_eq!(config.confidence_threshold, 0.7);
/// ```
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    /// Minimum bordered-detector confidence τ in `[0, 1]`. Candidates
    /// below it are discarded and their pages scheduled for borderless
    /// fallback. Default 0.0 (disabled); production runs use ≈0.7.
    pub confidence_threshold: f32,

    /// Structural size at which a table is stored as sidecar files
    /// instead of inline Markdown.
    pub complexity_threshold: usize,

    /// When the request is for all pages, also run borderless fallback
    /// on pages where the bordered detector found nothing (requires an
    /// authoritative page count). Off by default: the legacy behavior
    /// only falls back on low-confidence pages, which leaves
    /// borderless-only tables on untouched pages undiscovered.
    pub fallback_all_pages: bool,

    /// Bordered-detector tuning.
    pub bordered: BorderedTuning,

    /// Borderless-detector tuning.
    pub borderless: BorderlessTuning,

    /// Text-order corruption signatures.
    pub signatures: Vec<CorruptionSignature>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionConfig {
    /// Create a configuration with defaults.
    pub fn new() -> Self {
        Self {
            confidence_threshold: 0.0,
            complexity_threshold: 4,
            fallback_all_pages: false,
            bordered: BorderedTuning::default(),
            borderless: BorderlessTuning::default(),
            signatures: default_signatures(),
        }
    }

    /// Set the bordered-detector confidence threshold τ.
    pub fn with_confidence_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    /// Set the complexity threshold (default 4).
    pub fn with_complexity_threshold(mut self, threshold: usize) -> Self {
        self.complexity_threshold = threshold;
        self
    }

    /// Enable or disable strict all-pages fallback scoping.
    pub fn with_fallback_all_pages(mut self, enable: bool) -> Self {
        self.fallback_all_pages = enable;
        self
    }

    /// Replace the bordered-detector tuning.
    pub fn with_bordered_tuning(mut self, tuning: BorderedTuning) -> Self {
        self.bordered = tuning;
        self
    }

    /// Replace the borderless-detector tuning.
    pub fn with_borderless_tuning(mut self, tuning: BorderlessTuning) -> Self {
        self.borderless = tuning;
        self
    }

    /// Replace the corruption signature set.
    pub fn with_signatures(mut self, signatures: Vec<CorruptionSignature>) -> Self {
        self.signatures = signatures;
        self
    }
}
