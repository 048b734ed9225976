//! Key-based row alignment
//!
//! Builds the ordered 1:1 pairing of reference rows to candidate rows via
//! the chosen key pair. First occurrence wins on both sides, so the
//! alignment is injective in both row indices; everything else is counted,
//! never paired twice.

use crate::normalize::canonical_scalar;
use crate::types::{CsvTable, RowAlignment, RowAlignmentSummary};
use std::collections::{HashMap, HashSet};

/// Align candidate rows to reference rows by canonical key equality
///
/// Reference rows with an empty key are skipped; duplicate reference keys
/// keep their first row and bump `duplicate_reference_keys`. Candidate rows
/// whose key is empty or unknown bump `missing_candidate_keys_or_unmatched`;
/// a candidate row whose reference row is already taken bumps
/// `duplicate_candidate_matches`. Pairs come out sorted by reference index.
pub fn align_rows_by_key(
    reference: &CsvTable,
    candidate: &CsvTable,
    ref_key: &str,
    cand_key: &str,
) -> RowAlignment {
    let mut ref_index: HashMap<String, usize> = HashMap::new();
    let mut duplicate_reference_keys = 0usize;
    for idx in 0..reference.row_count() {
        let key = canonical_scalar(reference.cell(idx, ref_key));
        if key.is_empty() {
            continue;
        }
        if ref_index.contains_key(&key) {
            duplicate_reference_keys += 1;
            continue;
        }
        ref_index.insert(key, idx);
    }

    let mut pairs: Vec<(usize, usize)> = Vec::new();
    let mut seen_ref_indices: HashSet<usize> = HashSet::new();
    let mut missing_candidate_keys = 0usize;
    let mut duplicate_candidate_matches = 0usize;

    for cand_idx in 0..candidate.row_count() {
        let key = canonical_scalar(candidate.cell(cand_idx, cand_key));
        if key.is_empty() {
            missing_candidate_keys += 1;
            continue;
        }
        let Some(&ref_idx) = ref_index.get(&key) else {
            missing_candidate_keys += 1;
            continue;
        };
        if !seen_ref_indices.insert(ref_idx) {
            duplicate_candidate_matches += 1;
            continue;
        }
        pairs.push((ref_idx, cand_idx));
    }

    pairs.sort_by_key(|p| p.0);

    let matched = pairs.len();
    let reference_rows = reference.row_count();
    let candidate_rows = candidate.row_count();
    let complete = duplicate_reference_keys == 0
        && duplicate_candidate_matches == 0
        && missing_candidate_keys == 0
        && matched == reference_rows
        && matched == candidate_rows;

    RowAlignment {
        pairs,
        summary: RowAlignmentSummary {
            complete,
            reference_key: Some(ref_key.to_string()),
            candidate_key: Some(cand_key.to_string()),
            matched_rows: matched,
            reference_rows,
            candidate_rows,
            coverage_reference: if reference_rows > 0 {
                matched as f64 / reference_rows as f64
            } else {
                0.0
            },
            coverage_candidate: if candidate_rows > 0 {
                matched as f64 / candidate_rows as f64
            } else {
                0.0
            },
            duplicate_reference_keys: Some(duplicate_reference_keys),
            duplicate_candidate_matches: Some(duplicate_candidate_matches),
            missing_candidate_keys_or_unmatched: Some(missing_candidate_keys),
        },
    }
}
