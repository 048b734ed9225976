//! Per-column and dataset scoring
//!
//! Every mapped reference column is scored as the mean value similarity
//! over ALL aligned row pairs (not just the mapping sample). Unmapped
//! reference columns score 0 and still count in the dataset denominator,
//! so a candidate missing columns loses score proportionally.

use crate::similarity::value_similarity;
use crate::types::{ColumnScore, CsvTable, PairScore, Scores};
use rayon::prelude::*;
use std::collections::BTreeMap;

/// Score every reference column over the full alignment
pub fn score_columns(
    reference: &CsvTable,
    candidate: &CsvTable,
    alignment_pairs: &[(usize, usize)],
    mapping: &BTreeMap<String, PairScore>,
) -> Scores {
    let per_reference_column: Vec<ColumnScore> = reference
        .headers
        .par_iter()
        .map(|ref_col| match mapping.get(ref_col) {
            None => ColumnScore {
                reference_column: ref_col.clone(),
                candidate_column: None,
                similarity: 0.0,
                matched: false,
                mapping_confidence: 0.0,
                row_count_scored: 0,
                header_similarity: None,
                sample_similarity: None,
                reason: None,
            },
            Some(pair) => {
                let similarity = full_column_similarity(
                    reference,
                    candidate,
                    alignment_pairs,
                    ref_col,
                    &pair.candidate_column,
                );
                ColumnScore {
                    reference_column: ref_col.clone(),
                    candidate_column: Some(pair.candidate_column.clone()),
                    similarity,
                    matched: true,
                    mapping_confidence: pair.mapping_confidence,
                    row_count_scored: alignment_pairs.len(),
                    header_similarity: Some(pair.header_similarity),
                    sample_similarity: Some(pair.sample_similarity),
                    reason: None,
                }
            }
        })
        .collect();

    let total: f64 = per_reference_column.iter().map(|c| c.similarity).sum();
    let reference_columns_total = reference.column_count();
    let dataset_similarity_equal_weighted = if reference_columns_total > 0 {
        total / reference_columns_total as f64
    } else {
        0.0
    };

    Scores {
        dataset_similarity_equal_weighted,
        // filled in by the report once reference coverage is known
        overall_score_with_coverage: 0.0,
        mapped_reference_columns: per_reference_column.iter().filter(|c| c.matched).count(),
        reference_columns_total,
        per_reference_column,
    }
}

/// Mean value similarity of one column pair over all aligned rows
pub fn full_column_similarity(
    reference: &CsvTable,
    candidate: &CsvTable,
    alignment_pairs: &[(usize, usize)],
    ref_col: &str,
    cand_col: &str,
) -> f64 {
    if alignment_pairs.is_empty() {
        return 0.0;
    }
    let total: f64 = alignment_pairs
        .iter()
        .map(|&(ref_idx, cand_idx)| {
            value_similarity(reference.cell(ref_idx, ref_col), candidate.cell(cand_idx, cand_col))
        })
        .sum();
    total / alignment_pairs.len() as f64
}
