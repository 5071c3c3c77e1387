//! Text-order validation for extracted tables.
//!
//! Line-based text emission can reorder tokens inside a cell: a
//! closing parenthesis and weekday token may appear before the date
//! they annotate (`") 수 10.13( 월"` instead of `"10.13(월)"`), or a
//! weekday may be separated from its parentheses entirely. The
//! validator tests candidate text against a data-driven set of
//! corruption signatures; a match means the candidate is invalid and a
//! coordinate re-extraction should be attempted.
//!
//! Absence of a match means valid. This is a heuristic with false
//! negatives by design: it catches the known failure signatures, not
//! every possible reordering.

use crate::error::Result;
use crate::table::TableCandidate;
use lazy_static::lazy_static;
use regex::Regex;

/// A single corruption signature: a pattern plus what it catches.
#[derive(Debug, Clone)]
pub struct CorruptionSignature {
    /// Pattern tested against whitespace-normalized candidate text.
    pub pattern: Regex,
    /// What the pattern catches, for logs and diagnostics.
    pub description: String,
}

impl CorruptionSignature {
    /// Compile a new signature.
    ///
    /// Returns [`crate::Error::Signature`] if the pattern does not compile.
    pub fn new(pattern: &str, description: impl Into<String>) -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            description: description.into(),
        })
    }
}

lazy_static! {
    static ref DEFAULT_SIGNATURES: Vec<CorruptionSignature> = vec![
        CorruptionSignature::new(
            r"\)\s*[월화수목금토일]\s+\d+",
            "closing parenthesis and weekday emitted before the date",
        )
        .expect("default signature must compile"),
        CorruptionSignature::new(
            r"\d+\s*일\s*[월화수목금토일]",
            "weekday fused onto a day-of-month outside parentheses",
        )
        .expect("default signature must compile"),
        CorruptionSignature::new(
            r"\d+\.\d+\s*\(\s*\)\s*[월화수목금토일]",
            "weekday separated from its parentheses after a date",
        )
        .expect("default signature must compile"),
        CorruptionSignature::new(
            r"\(\s*\)\s*[월화수목금토일]",
            "empty parentheses followed by a stray weekday",
        )
        .expect("default signature must compile"),
    ];
}

/// The built-in signature set (Korean date/weekday corruption class).
pub fn default_signatures() -> Vec<CorruptionSignature> {
    DEFAULT_SIGNATURES.clone()
}

/// Validates candidate cell text against corruption signatures.
#[derive(Debug, Clone)]
pub struct TextOrderValidator {
    signatures: Vec<CorruptionSignature>,
}

impl Default for TextOrderValidator {
    fn default() -> Self {
        Self::new(default_signatures())
    }
}

impl TextOrderValidator {
    /// Create a validator with an explicit signature set.
    pub fn new(signatures: Vec<CorruptionSignature>) -> Self {
        Self { signatures }
    }

    /// Check whether a candidate's text reads in natural order.
    ///
    /// Concatenates all cell text (whitespace runs normalized to single
    /// spaces) and tests it against each signature. Returns `false` if
    /// any signature matches.
    ///
    /// # Examples
    ///
    /// ```
    /// use tableract::geometry::Rect;
    /// use tableract::table::{CellGrid, SourceMode, TableCandidate};
    /// use tableract::validate::TextOrderValidator;
    ///
    /// let grid = CellGrid::from_text_rows(vec![
    ///     vec!["일자", "내용"],
    ///     vec!["10.13(월)", "개강"],
    /// ]);
    /// let candidate = TableCandidate::new(
    ///     1,
    ///     Rect::from_points(0.0, 0.0, 100.0, 50.0),
    ///     grid,
    ///     0.9,
    ///     SourceMode::Bordered,
    /// );
    ///
    /// assert!(TextOrderValidator::default().validate(&candidate));
    /// ```
    pub fn validate(&self, candidate: &TableCandidate) -> bool {
        let combined = normalize_whitespace(candidate.grid.cell_texts());
        for signature in &self.signatures {
            if signature.pattern.is_match(&combined) {
                log::debug!(
                    "corruption signature matched ({}) on page {}: {:.80}",
                    signature.description,
                    candidate.page,
                    combined
                );
                return false;
            }
        }
        true
    }

    /// The signatures this validator tests against.
    pub fn signatures(&self) -> &[CorruptionSignature] {
        &self.signatures
    }
}

/// Join cell texts with spaces and collapse whitespace runs.
fn normalize_whitespace<'a>(texts: impl Iterator<Item = &'a str>) -> String {
    let mut out = String::new();
    for text in texts {
        for token in text.split_whitespace() {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(token);
        }
    }
    out
}
