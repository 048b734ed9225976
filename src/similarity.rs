//! Similarity kernels
//!
//! Scoring primitives used by key discovery, column mapping, and column
//! scoring: raw-cell value similarity, normalized edit-distance similarity,
//! gestalt sequence ratio, header similarity, and type-profile
//! compatibility. All results lie in [0, 1].

use crate::normalize::{header_tokens, is_empty, normalize_text, parse_bool, parse_decimal};
use crate::profile::ColumnProfile;
use rust_decimal::prelude::ToPrimitive;
use std::collections::{HashMap, HashSet};

/// Similarity of two raw cells
///
/// Typed interpretation happens here, on demand: emptiness first, then
/// trimmed equality, then boolean, then decimal, then edit distance.
/// For decimals the relative difference is floored at magnitude 1.0 so
/// near-zero values cannot blow up the denominator.
pub fn value_similarity(a: &str, b: &str) -> f64 {
    let a_empty = is_empty(a);
    let b_empty = is_empty(b);
    if a_empty && b_empty {
        return 1.0;
    }
    if a_empty || b_empty {
        return 0.0;
    }

    let a_norm = normalize_text(a);
    let b_norm = normalize_text(b);
    if a_norm == b_norm {
        return 1.0;
    }

    if let (Some(x), Some(y)) = (parse_bool(a_norm), parse_bool(b_norm)) {
        return if x == y { 1.0 } else { 0.0 };
    }

    if let (Some(x), Some(y)) = (parse_decimal(a_norm), parse_decimal(b_norm)) {
        if x == y {
            return 1.0;
        }
        if let (Some(xf), Some(yf)) = (x.to_f64(), y.to_f64()) {
            let denom = xf.abs().max(yf.abs()).max(1.0);
            return (1.0 - (xf - yf).abs() / denom).max(0.0);
        }
    }

    normalized_levenshtein_similarity(a_norm, b_norm)
}

/// Normalized edit-distance similarity: `1 - lev(a, b) / max(|a|, |b|)`
///
/// Equal strings and empty operands short-circuit before the distance runs.
pub fn normalized_levenshtein_similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let dist = strsim::levenshtein(a, b);
    let denom = a.chars().count().max(b.chars().count());
    (1.0 - dist as f64 / denom as f64).max(0.0)
}

/// Gestalt pattern-matching ratio: `2·M / (|a| + |b|)`
///
/// M is the total length of matching blocks from a greedy longest-match
/// decomposition: take the longest common substring, then recurse on the
/// regions to its left and right. Among equally long matches the one
/// starting earliest in `a`, then earliest in `b`, wins.
pub fn sequence_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_total(&a, &b) as f64 / total as f64
}

fn matching_total(a: &[char], b: &[char]) -> usize {
    let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
    for (j, &ch) in b.iter().enumerate() {
        b2j.entry(ch).or_default().push(j);
    }

    let mut total = 0;
    let mut regions = vec![(0usize, a.len(), 0usize, b.len())];
    while let Some((alo, ahi, blo, bhi)) = regions.pop() {
        let (i, j, size) = longest_match(a, &b2j, alo, ahi, blo, bhi);
        if size > 0 {
            total += size;
            regions.push((alo, i, blo, j));
            regions.push((i + size, ahi, j + size, bhi));
        }
    }
    total
}

/// Longest matching block of `a[alo..ahi]` and `b[blo..bhi]`
///
/// Returns (start in a, start in b, length). Single-row DP over positions
/// of each character in `b`.
fn longest_match(
    a: &[char],
    b2j: &HashMap<char, Vec<usize>>,
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0usize);
    let mut j2len: HashMap<usize, usize> = HashMap::new();
    for (i, ch) in a.iter().enumerate().take(ahi).skip(alo) {
        let mut next_j2len: HashMap<usize, usize> = HashMap::new();
        if let Some(js) = b2j.get(ch) {
            for &j in js {
                if j < blo {
                    continue;
                }
                if j >= bhi {
                    break;
                }
                let k = if j > blo {
                    j2len.get(&(j - 1)).copied().unwrap_or(0) + 1
                } else {
                    1
                };
                next_j2len.insert(j, k);
                if k > best_size {
                    best_i = i + 1 - k;
                    best_j = j + 1 - k;
                    best_size = k;
                }
            }
        }
        j2len = next_j2len;
    }
    (best_i, best_j, best_size)
}

/// Header similarity: max of gestalt ratio over concatenated tokens and
/// Jaccard over token sets
pub fn header_similarity(a: &str, b: &str) -> f64 {
    let ta = header_tokens(a);
    let tb = header_tokens(b);
    let a_cat = ta.concat();
    let b_cat = tb.concat();
    if a_cat.is_empty() && b_cat.is_empty() {
        return 1.0;
    }

    let seq = sequence_ratio(&a_cat, &b_cat);

    let a_set: HashSet<&str> = ta.iter().map(String::as_str).collect();
    let b_set: HashSet<&str> = tb.iter().map(String::as_str).collect();
    let jacc = if a_set.is_empty() || b_set.is_empty() {
        0.0
    } else {
        let intersection = a_set.intersection(&b_set).count();
        let union = a_set.union(&b_set).count();
        intersection as f64 / union as f64
    };

    seq.max(jacc)
}

/// Compatibility of two column type profiles
///
/// A column counts as boolean/numeric when at least 90% of its sampled
/// non-empty cells parse as such. A bool/non-bool mismatch is penalized
/// harder than a numeric/non-numeric mismatch.
pub fn type_compatibility_score(ref_profile: &ColumnProfile, cand_profile: &ColumnProfile) -> f64 {
    let r_bool = ref_profile.bool_ratio >= 0.9;
    let c_bool = cand_profile.bool_ratio >= 0.9;
    if r_bool && c_bool {
        return 1.0;
    }
    if r_bool != c_bool {
        return 0.1;
    }

    let r_num = ref_profile.numeric_ratio >= 0.9;
    let c_num = cand_profile.numeric_ratio >= 0.9;
    if r_num && c_num {
        return 1.0;
    }
    if r_num != c_num {
        return 0.2;
    }
    0.8
}
