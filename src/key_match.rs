//! Unique-key discovery
//!
//! Finds the (reference column, candidate column) pair whose canonical
//! non-empty value sets best explain each other. Both sides must be unique
//! on their non-empty cells; pairs with an empty intersection are useless
//! and dropped. A complete set match dominates every partial one, then
//! candidate coverage (weight 2) beats reference coverage, with header
//! similarity as the final tiebreaker.

use crate::normalize::{canonical_scalar, is_empty};
use crate::profile::ColumnProfile;
use crate::similarity::header_similarity;
use crate::types::{round6, CsvTable, KeyCandidate, KeyMatch};
use log::debug;
use std::collections::{HashMap, HashSet};

const NO_KEY_REASON: &str = "no_exact_or_partial_unique_key_match";
const COMPLETE_REASON: &str = "exact_unique_key_set_match";
const PARTIAL_REASON: &str = "partial_unique_key_overlap_match";

/// How many key candidates the report keeps for diagnostics
const TOP_CANDIDATES: usize = 10;

/// Canonical non-empty values of one column, in row order
fn canonical_column(table: &CsvTable, header: &str) -> Vec<String> {
    (0..table.row_count())
        .map(|i| table.cell(i, header))
        .filter(|v| !is_empty(v))
        .map(canonical_scalar)
        .collect()
}

/// Locate the best usable unique-key column pair
pub fn find_key_match(
    reference: &CsvTable,
    candidate: &CsvTable,
    ref_profiles: &HashMap<String, ColumnProfile>,
) -> KeyMatch {
    // Candidate columns are reused against every reference key, so their
    // canonical values are computed once up front.
    let cand_columns: Vec<(&String, Vec<String>)> = candidate
        .headers
        .iter()
        .map(|h| (h, canonical_column(candidate, h)))
        .collect();

    let mut candidates: Vec<KeyCandidate> = Vec::new();

    for ref_col in &reference.headers {
        let unique = ref_profiles
            .get(ref_col)
            .map(|p| p.is_unique_non_empty)
            .unwrap_or(false);
        if !unique {
            continue;
        }

        let ref_vals = canonical_column(reference, ref_col);
        let ref_set: HashSet<&str> = ref_vals.iter().map(String::as_str).collect();
        // Recheck against the freshly computed set; the profile's
        // uniqueness flag must agree with it.
        if ref_set.len() != ref_vals.len() {
            continue;
        }

        for (cand_col, cand_vals) in &cand_columns {
            // A column with any duplicate canonical value cannot serve as
            // a key.
            let cand_set: HashSet<&str> = cand_vals.iter().map(String::as_str).collect();
            if cand_set.len() != cand_vals.len() {
                continue;
            }
            let intersection = ref_set.intersection(&cand_set).count();
            if intersection == 0 {
                continue;
            }

            let complete = reference.row_count() == candidate.row_count()
                && cand_vals.len() == ref_vals.len()
                && cand_set == ref_set;
            let cand_coverage = if cand_set.is_empty() {
                0.0
            } else {
                intersection as f64 / cand_set.len() as f64
            };
            let ref_coverage = if ref_set.is_empty() {
                0.0
            } else {
                intersection as f64 / ref_set.len() as f64
            };
            let header_score = header_similarity(ref_col, cand_col);
            // A complete set match must beat any partial one; among
            // partials, prefer keys that explain more of the candidate.
            let score = if complete { 10.0 } else { 0.0 }
                + cand_coverage * 2.0
                + ref_coverage
                + header_score;

            candidates.push(KeyCandidate {
                reference_column: ref_col.clone(),
                candidate_column: (*cand_col).clone(),
                complete_set_match: complete,
                intersection_count: intersection,
                candidate_key_coverage: round6(cand_coverage),
                reference_key_coverage: round6(ref_coverage),
                header_similarity: round6(header_score),
                reference_non_empty_count: ref_vals.len(),
                candidate_non_empty_count: cand_vals.len(),
                score,
            });
        }
    }

    if candidates.is_empty() {
        return KeyMatch {
            found_usable_match: false,
            found_complete_match: false,
            match_mode: None,
            reference_column: None,
            candidate_column: None,
            reason: NO_KEY_REASON.to_string(),
            candidates: Vec::new(),
        };
    }

    // Stable descending sort; ties keep header enumeration order.
    candidates.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| b.reference_non_empty_count.cmp(&a.reference_non_empty_count))
    });

    let best = candidates[0].clone();
    debug!(
        "key match: {} -> {} (complete={}, intersection={})",
        best.reference_column, best.candidate_column, best.complete_set_match, best.intersection_count
    );

    let complete = best.complete_set_match;
    KeyMatch {
        found_usable_match: best.intersection_count > 0,
        found_complete_match: complete,
        match_mode: Some(if complete { "complete" } else { "partial" }.to_string()),
        reference_column: Some(best.reference_column),
        candidate_column: Some(best.candidate_column),
        reason: if complete { COMPLETE_REASON } else { PARTIAL_REASON }.to_string(),
        candidates: candidates.into_iter().take(TOP_CANDIDATES).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::profile_columns;

    fn table(headers: &[&str], rows: &[&[&str]]) -> CsvTable {
        CsvTable::from_parts(
            "test.csv",
            headers.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn test_complete_key_match() {
        let reference = table(&["gtin", "name"], &[&["100", "a"], &["200", "b"]]);
        let candidate = table(&["gtin_code", "name"], &[&["200", "b"], &["100", "a"]]);
        let profiles = profile_columns(&reference);

        let km = find_key_match(&reference, &candidate, &profiles);
        assert!(km.found_usable_match);
        assert!(km.found_complete_match);
        assert_eq!(km.match_mode.as_deref(), Some("complete"));
        assert_eq!(km.reference_column.as_deref(), Some("gtin"));
        assert_eq!(km.candidate_column.as_deref(), Some("gtin_code"));
        assert_eq!(km.reason, "exact_unique_key_set_match");
    }

    #[test]
    fn test_partial_key_overlap() {
        let reference = table(&["gtin"], &[&["100"], &["200"], &["300"]]);
        let candidate = table(&["gtin"], &[&["200"], &["300"], &["400"]]);
        let profiles = profile_columns(&reference);

        let km = find_key_match(&reference, &candidate, &profiles);
        assert!(km.found_usable_match);
        assert!(!km.found_complete_match);
        assert_eq!(km.match_mode.as_deref(), Some("partial"));
        let best = &km.candidates[0];
        assert_eq!(best.intersection_count, 2);
        assert!(!best.complete_set_match);
        assert!((best.candidate_key_coverage - round6(2.0 / 3.0)).abs() < 1e-12);
        assert!((best.reference_key_coverage - round6(2.0 / 3.0)).abs() < 1e-12);
    }

    #[test]
    fn test_non_unique_candidate_column_is_skipped() {
        let reference = table(&["id"], &[&["1"], &["2"]]);
        // candidate "id" has a duplicate canonical value, so only "alt"
        // can carry the key
        let candidate = table(&["id", "alt"], &[&["2", "1"], &["2", "2"]]);
        let profiles = profile_columns(&reference);

        let km = find_key_match(&reference, &candidate, &profiles);
        assert!(km.found_usable_match);
        assert_eq!(km.candidate_column.as_deref(), Some("alt"));
    }

    #[test]
    fn test_no_intersection_yields_no_match() {
        let reference = table(&["gtin"], &[&["100"], &["200"]]);
        let candidate = table(&["sku"], &[&["x1"], &["x2"]]);
        let profiles = profile_columns(&reference);

        let km = find_key_match(&reference, &candidate, &profiles);
        assert!(!km.found_usable_match);
        assert_eq!(km.reason, "no_exact_or_partial_unique_key_match");
        assert!(km.candidates.is_empty());
        assert!(km.reference_column.is_none());
        assert!(km.match_mode.is_none());
    }

    #[test]
    fn test_complete_match_beats_better_named_partial() {
        // "code" tokenizes away, so header similarity favors neither;
        // make the complete pair win purely on the score weighting.
        let reference = table(
            &["gtin", "sku"],
            &[&["100", "a1"], &["200", "a2"], &["300", "a3"]],
        );
        let candidate = table(
            &["sku", "gtin"],
            &[&["a1", "300"], &["a9", "100"], &["a3", "200"]],
        );
        let profiles = profile_columns(&reference);

        let km = find_key_match(&reference, &candidate, &profiles);
        // gtin sets match completely; sku only overlaps on 2 of 3
        assert_eq!(km.reference_column.as_deref(), Some("gtin"));
        assert_eq!(km.candidate_column.as_deref(), Some("gtin"));
        assert!(km.found_complete_match);
    }

    #[test]
    fn test_keys_match_canonically() {
        // "007" and "7" are the same canonical decimal
        let reference = table(&["id"], &[&["007"], &["008"]]);
        let candidate = table(&["id"], &[&["7"], &["8"]]);
        let profiles = profile_columns(&reference);

        let km = find_key_match(&reference, &candidate, &profiles);
        assert!(km.found_complete_match);
    }
}
