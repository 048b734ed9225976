//! Core data types for TableMatch
//!
//! This module defines the shared types used across the comparison pipeline:
//! the in-memory table representation, configuration, the library error type,
//! and the serializable report model.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Errors that abort a comparison before any report is produced
///
/// Only malformed input is fatal. A missing usable key or an alignment that
/// matches zero rows are expected outcomes and surface as a zero report
/// instead (see [`crate::report`]).
#[derive(Debug, thiserror::Error)]
pub enum CompareError {
    /// The input file could not be opened or read
    #[error("failed to read {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The input file is not valid UTF-8
    #[error("{path} is not valid UTF-8")]
    InvalidEncoding { path: String },

    /// The input file has no header record
    #[error("CSV has no header: {path}")]
    MissingHeader { path: String },

    /// The CSV dialect itself could not be parsed
    #[error("failed to parse {path}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },
}

/// An in-memory CSV table
///
/// Holds the origin path (opaque, echoed in the report), the ordered header
/// names, and the data rows. Row order is preserved from input; headers
/// define column order. Cells are raw strings; an empty string denotes an
/// absent cell.
#[derive(Debug, Clone)]
pub struct CsvTable {
    /// Origin path as given by the caller
    pub path: String,
    /// Header names in file order (duplicates tolerated, discouraged)
    pub headers: Vec<String>,
    /// Data rows, each padded to `headers.len()` cells
    pub rows: Vec<Vec<String>>,
    /// Header name -> column index; for duplicate headers the last
    /// occurrence wins
    index: HashMap<String, usize>,
}

impl CsvTable {
    /// Build a table from raw parts, padding short rows with empty cells
    pub fn from_parts(
        path: impl Into<String>,
        headers: Vec<String>,
        mut rows: Vec<Vec<String>>,
    ) -> Self {
        let width = headers.len();
        for row in &mut rows {
            if row.len() < width {
                row.resize(width, String::new());
            }
        }
        let index = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.clone(), i))
            .collect();
        Self {
            path: path.into(),
            headers,
            rows,
            index,
        }
    }

    /// Raw cell at (row, header); empty string if the header is unknown
    pub fn cell(&self, row: usize, header: &str) -> &str {
        match self.index.get(header) {
            Some(&col) => self.rows[row].get(col).map(String::as_str).unwrap_or(""),
            None => "",
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }
}

/// Configuration for a comparison call
#[derive(Debug, Clone)]
pub struct CompareConfig {
    /// Number of aligned rows sampled by the column mapper
    pub sample_size_mapping: usize,

    /// Opaque column-weighting descriptor, echoed in the report
    ///
    /// Currently unused by scoring; kept as a pluggable hook.
    pub weights: serde_json::Value,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            sample_size_mapping: 256,
            weights: serde_json::json!({ "columns": "equal" }),
        }
    }
}

/// Top-level report status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Row alignment is complete: every row on both sides is paired
    Ok,
    /// A usable key exists but some rows could not be paired
    PartialKeyMatch,
    /// No usable key, or the key paired zero rows; scores are all zero
    NoCompleteKeyMatch,
}

impl Status {
    /// The serialized tag, for human-readable output
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Ok => "ok",
            Status::PartialKeyMatch => "partial_key_match",
            Status::NoCompleteKeyMatch => "no_complete_key_match",
        }
    }
}

/// Configuration echo embedded in the report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    pub reference_csv: String,
    pub candidate_csv: String,
    /// Absent on the zero-report path, where mapping never runs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_size_mapping: Option<usize>,
    pub column_weighting: serde_json::Value,
    pub missing_reference_column_score: f64,
    pub extra_candidate_columns_penalize: bool,
}

/// Reference-table summary: size plus which columns are unique keys
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceProfileSummary {
    pub row_count: usize,
    pub column_count: usize,
    /// Columns whose non-empty canonical values are all distinct, in
    /// header order
    pub unique_columns: Vec<String>,
}

/// Candidate-table summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateProfileSummary {
    pub row_count: usize,
    pub column_count: usize,
}

/// Row-alignment counters and coverage, as reported
///
/// Key names and duplicate/missing counters are absent when no alignment
/// was attempted (zero report without a usable key).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowAlignmentSummary {
    pub complete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidate_key: Option<String>,
    pub matched_rows: usize,
    pub reference_rows: usize,
    pub candidate_rows: usize,
    pub coverage_reference: f64,
    pub coverage_candidate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicate_reference_keys: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicate_candidate_matches: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing_candidate_keys_or_unmatched: Option<usize>,
}

/// Row alignment: ordered 1:1 row pairs plus the reportable summary
///
/// Pairs are `(reference_row_index, candidate_row_index)`, sorted ascending
/// by reference index. Injective in both directions.
#[derive(Debug, Clone)]
pub struct RowAlignment {
    pub pairs: Vec<(usize, usize)>,
    pub summary: RowAlignmentSummary,
}

/// One scored (reference column, candidate column) key pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyCandidate {
    pub reference_column: String,
    pub candidate_column: String,
    /// Canonical key sets are equal and row counts match
    pub complete_set_match: bool,
    pub intersection_count: usize,
    pub candidate_key_coverage: f64,
    pub reference_key_coverage: f64,
    pub header_similarity: f64,
    pub reference_non_empty_count: usize,
    pub candidate_non_empty_count: usize,
    pub score: f64,
}

/// Outcome of unique-key discovery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyMatch {
    pub found_usable_match: bool,
    pub found_complete_match: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_mode: Option<String>,
    pub reference_column: Option<String>,
    pub candidate_column: Option<String>,
    pub reason: String,
    /// Top candidates by score, for diagnostics (at most 10)
    pub candidates: Vec<KeyCandidate>,
}

/// Scores for one (reference column, candidate column) mapping pair
///
/// All four scores are rounded to six decimals when the record is built;
/// sorting and the admission rule operate on these rounded values so the
/// selection order always matches what the report shows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairScore {
    pub reference_column: String,
    pub candidate_column: String,
    pub header_similarity: f64,
    pub type_compatibility: f64,
    pub sample_similarity: f64,
    pub mapping_confidence: f64,
}

/// Column-mapping result: the accepted 1:1 mapping plus diagnostics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnMapping {
    /// Reference column -> accepted pair record; injective both ways
    pub mapping: BTreeMap<String, PairScore>,
    pub reference_unmatched: Vec<String>,
    pub candidate_unmatched: Vec<String>,
    /// Arithmetic mean of accepted mapping confidences; 0 if none
    pub mapping_confidence_avg: f64,
    /// Highest-scoring pair records, accepted or not (at most 50)
    pub pair_candidates_top: Vec<PairScore>,
}

/// Per-reference-column score entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnScore {
    pub reference_column: String,
    pub candidate_column: Option<String>,
    pub similarity: f64,
    pub matched: bool,
    pub mapping_confidence: f64,
    pub row_count_scored: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_similarity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_similarity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Dataset-level scores
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scores {
    /// Mean per-reference-column similarity over ALL reference columns;
    /// unmapped columns contribute 0. Not pre-rounded.
    pub dataset_similarity_equal_weighted: f64,
    /// Dataset similarity multiplied by reference coverage
    pub overall_score_with_coverage: f64,
    pub mapped_reference_columns: usize,
    pub reference_columns_total: usize,
    pub per_reference_column: Vec<ColumnScore>,
}

/// The full comparison report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub status: Status,
    pub config: ReportConfig,
    pub reference_profile: ReferenceProfileSummary,
    pub candidate_profile: CandidateProfileSummary,
    pub row_alignment: RowAlignmentSummary,
    pub key_match: KeyMatch,
    pub column_mapping: ColumnMapping,
    pub scores: Scores,
}

impl Report {
    /// Serialize the report to JSON, pretty-printed or compact
    pub fn to_json(&self, pretty: bool) -> String {
        if pretty {
            serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
        } else {
            serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
        }
    }
}

/// Round a score to six decimals for reporting and rank stability
pub(crate) fn round6(x: f64) -> f64 {
    (x * 1_000_000.0).round() / 1_000_000.0
}
