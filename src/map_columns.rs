//! Column-to-column mapping
//!
//! Scores every (reference column, candidate column) pair with a blend of
//! header similarity, type compatibility, and canonical equality over a
//! sample of aligned rows, then selects an injective 1:1 mapping greedily
//! from the best-scoring pairs. An assignment solver would change outputs
//! in edge cases; the greedy rule with the admission threshold is the
//! contract.

use crate::normalize::{canonical_scalar, is_empty};
use crate::profile::ColumnProfile;
use crate::similarity::{header_similarity, type_compatibility_score};
use crate::types::{round6, ColumnMapping, CsvTable, PairScore};
use log::debug;
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Mapping-confidence blend weights: header / type / sample
const WEIGHT_HEADER: f64 = 0.35;
const WEIGHT_TYPE: f64 = 0.10;
const WEIGHT_SAMPLE: f64 = 0.55;

/// Admission thresholds for the greedy selection
///
/// A pair is accepted when its blended confidence clears
/// `MIN_CONFIDENCE`, or when the sample similarity alone clears
/// `MIN_SAMPLE_SIMILARITY` — the latter admits columns whose content is
/// identical but whose header was renamed beyond recognition.
const MIN_CONFIDENCE: f64 = 0.55;
const MIN_SAMPLE_SIMILARITY: f64 = 0.85;

/// How many pair records the report keeps for diagnostics
const TOP_PAIRS: usize = 50;

/// Map reference columns to candidate columns over the aligned rows
pub fn map_columns(
    reference: &CsvTable,
    candidate: &CsvTable,
    ref_profiles: &HashMap<String, ColumnProfile>,
    cand_profiles: &HashMap<String, ColumnProfile>,
    alignment_pairs: &[(usize, usize)],
    sample_size: usize,
) -> ColumnMapping {
    let sample_pairs = &alignment_pairs[..alignment_pairs.len().min(sample_size)];

    // The pair matrix is embarrassingly parallel; rows of the matrix are
    // scored concurrently and flattened in reference-header order so the
    // ordering (and therefore the report) is deterministic.
    let mut pair_scores: Vec<PairScore> = reference
        .headers
        .par_iter()
        .map(|ref_col| {
            candidate
                .headers
                .iter()
                .map(|cand_col| {
                    let h = header_similarity(ref_col, cand_col);
                    let t = match (ref_profiles.get(ref_col), cand_profiles.get(cand_col)) {
                        (Some(r), Some(c)) => type_compatibility_score(r, c),
                        _ => 0.0,
                    };
                    let s = sample_column_similarity_fast(
                        reference,
                        candidate,
                        sample_pairs,
                        ref_col,
                        cand_col,
                    );
                    let combined = WEIGHT_HEADER * h + WEIGHT_TYPE * t + WEIGHT_SAMPLE * s;
                    PairScore {
                        reference_column: ref_col.clone(),
                        candidate_column: cand_col.clone(),
                        header_similarity: round6(h),
                        type_compatibility: round6(t),
                        sample_similarity: round6(s),
                        mapping_confidence: round6(combined),
                    }
                })
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>()
        .into_iter()
        .flatten()
        .collect();

    // Stable descending sort on the rounded scores; ties keep header
    // enumeration order.
    pair_scores.sort_by(|a, b| {
        b.mapping_confidence
            .total_cmp(&a.mapping_confidence)
            .then_with(|| b.sample_similarity.total_cmp(&a.sample_similarity))
            .then_with(|| b.header_similarity.total_cmp(&a.header_similarity))
    });

    let mut used_ref: HashSet<&str> = HashSet::new();
    let mut used_cand: HashSet<&str> = HashSet::new();
    let mut mapping: BTreeMap<String, PairScore> = BTreeMap::new();
    let mut confidences: Vec<f64> = Vec::new();

    for pair in &pair_scores {
        if used_ref.contains(pair.reference_column.as_str())
            || used_cand.contains(pair.candidate_column.as_str())
        {
            continue;
        }
        // Low-scoring pairs stay out of the mapping so missing-column
        // semantics survive.
        if pair.mapping_confidence < MIN_CONFIDENCE
            && pair.sample_similarity < MIN_SAMPLE_SIMILARITY
        {
            continue;
        }
        used_ref.insert(pair.reference_column.as_str());
        used_cand.insert(pair.candidate_column.as_str());
        confidences.push(pair.mapping_confidence);
        mapping.insert(pair.reference_column.clone(), pair.clone());
    }

    let reference_unmatched: Vec<String> = reference
        .headers
        .iter()
        .filter(|h| !used_ref.contains(h.as_str()))
        .cloned()
        .collect();
    let candidate_unmatched: Vec<String> = candidate
        .headers
        .iter()
        .filter(|h| !used_cand.contains(h.as_str()))
        .cloned()
        .collect();

    debug!(
        "column mapping: {} of {} reference columns mapped",
        mapping.len(),
        reference.column_count()
    );

    let mapping_confidence_avg = if confidences.is_empty() {
        0.0
    } else {
        confidences.iter().sum::<f64>() / confidences.len() as f64
    };

    let mut pair_candidates_top = pair_scores;
    pair_candidates_top.truncate(TOP_PAIRS);

    ColumnMapping {
        mapping,
        reference_unmatched,
        candidate_unmatched,
        mapping_confidence_avg,
        pair_candidates_top,
    }
}

/// Fast canonical-equality similarity over the sampled aligned rows
///
/// Exact canonical matches dominate; the presence pattern (same emptiness
/// on both sides) keeps sparse text columns from scoring zero.
fn sample_column_similarity_fast(
    reference: &CsvTable,
    candidate: &CsvTable,
    sample_pairs: &[(usize, usize)],
    ref_col: &str,
    cand_col: &str,
) -> f64 {
    if sample_pairs.is_empty() {
        return 0.0;
    }
    let mut exact = 0.0f64;
    let mut same_presence = 0.0f64;
    for &(ref_idx, cand_idx) in sample_pairs {
        let rv = reference.cell(ref_idx, ref_col);
        let cv = candidate.cell(cand_idx, cand_col);
        let r_empty = is_empty(rv);
        let c_empty = is_empty(cv);
        if r_empty && c_empty {
            same_presence += 1.0;
            exact += 1.0;
            continue;
        }
        if r_empty == c_empty {
            same_presence += 1.0;
        }
        if canonical_scalar(rv) == canonical_scalar(cv) {
            exact += 1.0;
        }
    }
    let n = sample_pairs.len() as f64;
    0.85 * (exact / n) + 0.15 * (same_presence / n)
}
