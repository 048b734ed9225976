//! Per-column statistics
//!
//! Profiles feed key discovery (uniqueness), column mapping (type
//! compatibility), and the report summary. Uniqueness is measured over
//! canonical scalars; type ratios and length statistics sample the FIRST
//! `min(500, non_empty)` non-empty cells in row order, which keeps profiles
//! stable under identical inputs.

use crate::normalize::{
    canonical_scalar, header_tokens, is_empty, normalize_text, parse_bool, parse_decimal,
};
use crate::types::CsvTable;
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};

/// How many leading non-empty cells feed the type and length statistics
pub const TYPE_SAMPLE_LIMIT: usize = 500;

/// Statistics for one column of a table
#[derive(Debug, Clone)]
pub struct ColumnProfile {
    pub row_count: usize,
    pub non_empty_count: usize,
    pub null_count: usize,
    pub unique_non_empty_count: usize,
    /// True iff the column has non-empty cells and all of them are
    /// canonically distinct; a fully empty column is never unique
    pub is_unique_non_empty: bool,
    pub uniqueness_ratio_non_empty: f64,
    /// Fraction of sampled cells parseable as decimal
    pub numeric_ratio: f64,
    /// Fraction of sampled cells parseable as boolean
    pub bool_ratio: f64,
    /// Mean trimmed length over the sample, in characters
    pub avg_len_sample: f64,
    /// Maximum trimmed length over the sample, in characters
    pub max_len_sample: f64,
    pub header_tokens: Vec<String>,
}

/// Profile every column of a table, keyed by header name
///
/// Columns are independent, so they are profiled in parallel; results are
/// collected in header order before keying, keeping the operation
/// deterministic.
pub fn profile_columns(table: &CsvTable) -> HashMap<String, ColumnProfile> {
    table
        .headers
        .par_iter()
        .map(|h| (h.clone(), profile_column(table, h)))
        .collect::<Vec<_>>()
        .into_iter()
        .collect()
}

fn profile_column(table: &CsvTable, header: &str) -> ColumnProfile {
    let row_count = table.row_count();

    let non_empty: Vec<&str> = (0..row_count)
        .map(|i| table.cell(i, header))
        .filter(|v| !is_empty(v))
        .collect();
    let non_empty_count = non_empty.len();

    let canon: HashSet<String> = non_empty.iter().map(|v| canonical_scalar(v)).collect();
    let unique_non_empty_count = canon.len();
    let is_unique_non_empty = non_empty_count > 0 && unique_non_empty_count == non_empty_count;

    let sample = &non_empty[..non_empty_count.min(TYPE_SAMPLE_LIMIT)];
    let (numeric_ratio, bool_ratio, avg_len_sample, max_len_sample) = if sample.is_empty() {
        (0.0, 0.0, 0.0, 0.0)
    } else {
        let numeric_hits = sample.iter().filter(|v| parse_decimal(v).is_some()).count();
        let bool_hits = sample.iter().filter(|v| parse_bool(v).is_some()).count();
        let lens: Vec<usize> = sample
            .iter()
            .map(|v| normalize_text(v).chars().count())
            .collect();
        let n = sample.len() as f64;
        (
            numeric_hits as f64 / n,
            bool_hits as f64 / n,
            lens.iter().sum::<usize>() as f64 / n,
            lens.iter().copied().max().unwrap_or(0) as f64,
        )
    };

    ColumnProfile {
        row_count,
        non_empty_count,
        null_count: row_count - non_empty_count,
        unique_non_empty_count,
        is_unique_non_empty,
        uniqueness_ratio_non_empty: if non_empty_count > 0 {
            unique_non_empty_count as f64 / non_empty_count as f64
        } else {
            0.0
        },
        numeric_ratio,
        bool_ratio,
        avg_len_sample,
        max_len_sample,
        header_tokens: header_tokens(header),
    }
}
