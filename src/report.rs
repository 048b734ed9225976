//! Report assembly
//!
//! Puts the pipeline outputs together into the serializable [`Report`],
//! including the zero report emitted when no usable key exists or the key
//! pairs zero rows. Those are expected outcomes, not errors: the report
//! carries an explanatory reason and all-zero scores instead.

use crate::profile::ColumnProfile;
use crate::types::{
    CandidateProfileSummary, ColumnMapping, ColumnScore, CompareConfig, CsvTable, KeyMatch,
    ReferenceProfileSummary, Report, ReportConfig, RowAlignmentSummary, Scores, Status,
};
use std::collections::{BTreeMap, HashMap, HashSet};

const ZERO_REASON: &str = "no_complete_key_match";

/// Reference columns that qualify as unique keys, in header order
fn unique_columns(table: &CsvTable, profiles: &HashMap<String, ColumnProfile>) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    table
        .headers
        .iter()
        .filter(|h| seen.insert(h.as_str()))
        .filter(|h| {
            profiles
                .get(h.as_str())
                .map(|p| p.is_unique_non_empty)
                .unwrap_or(false)
        })
        .cloned()
        .collect()
}

fn reference_summary(
    table: &CsvTable,
    profiles: &HashMap<String, ColumnProfile>,
) -> ReferenceProfileSummary {
    ReferenceProfileSummary {
        row_count: table.row_count(),
        column_count: table.column_count(),
        unique_columns: unique_columns(table, profiles),
    }
}

fn candidate_summary(table: &CsvTable) -> CandidateProfileSummary {
    CandidateProfileSummary {
        row_count: table.row_count(),
        column_count: table.column_count(),
    }
}

/// Assemble the report for a comparison that produced an alignment
#[allow(clippy::too_many_arguments)]
pub(crate) fn build_report(
    reference: &CsvTable,
    candidate: &CsvTable,
    ref_profiles: &HashMap<String, ColumnProfile>,
    key_match: KeyMatch,
    row_alignment: RowAlignmentSummary,
    column_mapping: ColumnMapping,
    mut scores: Scores,
    config: &CompareConfig,
) -> Report {
    scores.overall_score_with_coverage =
        scores.dataset_similarity_equal_weighted * row_alignment.coverage_reference;

    Report {
        status: if row_alignment.complete {
            Status::Ok
        } else {
            Status::PartialKeyMatch
        },
        config: ReportConfig {
            reference_csv: reference.path.clone(),
            candidate_csv: candidate.path.clone(),
            sample_size_mapping: Some(config.sample_size_mapping),
            column_weighting: config.weights.clone(),
            missing_reference_column_score: 0.0,
            extra_candidate_columns_penalize: false,
        },
        reference_profile: reference_summary(reference, ref_profiles),
        candidate_profile: candidate_summary(candidate),
        row_alignment,
        key_match,
        column_mapping,
        scores,
    }
}

/// Assemble the all-zero report
///
/// Used when key discovery found nothing usable, or when the chosen key
/// matched zero rows (in which case the failed alignment's counters are
/// carried through unchanged).
pub(crate) fn zero_report(
    reference: &CsvTable,
    candidate: &CsvTable,
    ref_profiles: &HashMap<String, ColumnProfile>,
    key_match: KeyMatch,
    config: &CompareConfig,
    alignment: Option<RowAlignmentSummary>,
) -> Report {
    let per_reference_column: Vec<ColumnScore> = reference
        .headers
        .iter()
        .map(|h| ColumnScore {
            reference_column: h.clone(),
            candidate_column: None,
            similarity: 0.0,
            matched: false,
            mapping_confidence: 0.0,
            row_count_scored: 0,
            header_similarity: None,
            sample_similarity: None,
            reason: Some(ZERO_REASON.to_string()),
        })
        .collect();

    let row_alignment = alignment.unwrap_or(RowAlignmentSummary {
        complete: false,
        reference_key: None,
        candidate_key: None,
        matched_rows: 0,
        reference_rows: reference.row_count(),
        candidate_rows: candidate.row_count(),
        coverage_reference: 0.0,
        coverage_candidate: 0.0,
        duplicate_reference_keys: None,
        duplicate_candidate_matches: None,
        missing_candidate_keys_or_unmatched: None,
    });

    Report {
        status: Status::NoCompleteKeyMatch,
        config: ReportConfig {
            reference_csv: reference.path.clone(),
            candidate_csv: candidate.path.clone(),
            sample_size_mapping: None,
            column_weighting: config.weights.clone(),
            missing_reference_column_score: 0.0,
            extra_candidate_columns_penalize: false,
        },
        reference_profile: reference_summary(reference, ref_profiles),
        candidate_profile: candidate_summary(candidate),
        row_alignment,
        key_match,
        column_mapping: ColumnMapping {
            mapping: BTreeMap::new(),
            reference_unmatched: reference.headers.clone(),
            candidate_unmatched: candidate.headers.clone(),
            mapping_confidence_avg: 0.0,
            pair_candidates_top: Vec::new(),
        },
        scores: Scores {
            dataset_similarity_equal_weighted: 0.0,
            overall_score_with_coverage: 0.0,
            mapped_reference_columns: 0,
            reference_columns_total: reference.column_count(),
            per_reference_column,
        },
    }
}
