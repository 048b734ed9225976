//! End-to-end pipeline tests over real CSV files
//!
//! Each scenario writes a reference/candidate pair to disk, runs the full
//! comparison, and checks the report against the expected alignment,
//! mapping, and scores.

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use tablematch::{compare_files, CompareConfig, Report, Status};
use tempfile::TempDir;

fn write_pair(dir: &TempDir, reference: &str, candidate: &str) -> (PathBuf, PathBuf) {
    let ref_path = dir.path().join("reference.csv");
    let cand_path = dir.path().join("candidate.csv");
    fs::write(&ref_path, reference).expect("write reference");
    fs::write(&cand_path, candidate).expect("write candidate");
    (ref_path, cand_path)
}

fn compare(reference: &str, candidate: &str) -> Report {
    let dir = TempDir::new().expect("temp dir");
    let (ref_path, cand_path) = write_pair(&dir, reference, candidate);
    compare_files(&ref_path, &cand_path, &CompareConfig::default()).expect("comparison")
}

#[test]
fn identical_tables_score_one() {
    let csv = "gtin,name\n100,Soap\n200,Shampoo\n300,Towel\n";
    let report = compare(csv, csv);

    assert_eq!(report.status, Status::Ok);
    assert_eq!(report.scores.dataset_similarity_equal_weighted, 1.0);
    assert_eq!(report.scores.overall_score_with_coverage, 1.0);
    assert_eq!(report.row_alignment.coverage_reference, 1.0);
    assert!(report.row_alignment.complete);

    assert_eq!(report.key_match.reference_column.as_deref(), Some("gtin"));
    assert_eq!(report.key_match.candidate_column.as_deref(), Some("gtin"));
    assert!(report.key_match.found_complete_match);
    assert!(report.key_match.candidates[0].complete_set_match);

    // every reference column maps to its same-named counterpart
    for (ref_col, pair) in &report.column_mapping.mapping {
        assert_eq!(ref_col, &pair.candidate_column);
    }
    assert_eq!(report.column_mapping.mapping.len(), 2);
}

#[test]
fn renamed_and_shuffled_candidate_still_scores_one() {
    let reference = "gtin,name,price_eur\n100,Soap,1.99\n200,Shampoo,3.49\n";
    let candidate = "gtin_code,product_name,price_eur_amt\n200,Shampoo,3.49\n100,Soap,1.99\n";
    let report = compare(reference, candidate);

    assert_eq!(report.status, Status::Ok);
    assert!(report.row_alignment.complete);
    assert_eq!(report.key_match.reference_column.as_deref(), Some("gtin"));
    assert_eq!(report.key_match.candidate_column.as_deref(), Some("gtin_code"));

    let mapping = &report.column_mapping.mapping;
    assert_eq!(mapping["gtin"].candidate_column, "gtin_code");
    assert_eq!(mapping["name"].candidate_column, "product_name");
    assert_eq!(mapping["price_eur"].candidate_column, "price_eur_amt");
    assert_eq!(report.scores.dataset_similarity_equal_weighted, 1.0);
}

#[test]
fn partial_key_overlap_reports_coverage() {
    let reference = "gtin\n100\n200\n300\n";
    let candidate = "gtin\n200\n300\n400\n";
    let report = compare(reference, candidate);

    assert_eq!(report.status, Status::PartialKeyMatch);
    assert_eq!(report.row_alignment.matched_rows, 2);
    assert!((report.row_alignment.coverage_reference - 2.0 / 3.0).abs() < 1e-12);
    assert!((report.row_alignment.coverage_candidate - 2.0 / 3.0).abs() < 1e-12);

    let best = &report.key_match.candidates[0];
    assert!(!best.complete_set_match);
    assert_eq!(best.intersection_count, 2);

    // gtin itself reproduces perfectly over the aligned rows, so the
    // overall score is the dataset score scaled by reference coverage
    assert_eq!(report.scores.dataset_similarity_equal_weighted, 1.0);
    assert!((report.scores.overall_score_with_coverage - 2.0 / 3.0).abs() < 1e-12);
}

#[test]
fn disjoint_key_sets_emit_zero_report() {
    let reference = "gtin,name\n100,Soap\n200,Soap\n";
    let candidate = "sku,label\nx1,a\nx2,b\n";
    let report = compare(reference, candidate);

    assert_eq!(report.status, Status::NoCompleteKeyMatch);
    assert_eq!(report.key_match.reason, "no_exact_or_partial_unique_key_match");
    assert!(!report.key_match.found_usable_match);
    assert_eq!(report.scores.dataset_similarity_equal_weighted, 0.0);
    assert_eq!(report.scores.overall_score_with_coverage, 0.0);
    assert_eq!(
        report.column_mapping.reference_unmatched,
        vec!["gtin".to_string(), "name".to_string()]
    );
    assert!(report.column_mapping.mapping.is_empty());
    for col in &report.scores.per_reference_column {
        assert_eq!(col.similarity, 0.0);
        assert!(!col.matched);
    }
}

#[test]
fn numeric_near_match_scores_per_cell_ratio() {
    let reference = "gtin,price_eur\n100,1.99\n200,3.49\n";
    let candidate = "gtin,price_eur\n100,2.00\n200,3.49\n";
    let report = compare(reference, candidate);

    assert_eq!(report.status, Status::Ok);
    let price = report
        .scores
        .per_reference_column
        .iter()
        .find(|c| c.reference_column == "price_eur")
        .expect("price column scored");
    // cell pair (1.99, 2.00) scores 1 - 0.01/2.00 = 0.995; the other is 1.0
    assert!((price.similarity - (0.995 + 1.0) / 2.0).abs() < 1e-9);
}

#[test]
fn reports_are_byte_identical_across_runs() {
    let dir = TempDir::new().expect("temp dir");
    let reference = "gtin,name,price_eur\n100,Soap,1.99\n200,Shampoo,3.49\n300,Towel,0.99\n";
    let candidate = "gtin_code,product_name,price_eur_amt\n300,Towel,0.99\n100,Soap,2.00\n200,Shampoo,3.49\n";
    let (ref_path, cand_path) = write_pair(&dir, reference, candidate);

    let config = CompareConfig::default();
    let first = compare_files(&ref_path, &cand_path, &config).expect("first run");
    let second = compare_files(&ref_path, &cand_path, &config).expect("second run");

    assert_eq!(first.to_json(true), second.to_json(true));
    assert_eq!(first.to_json(false), second.to_json(false));
    assert!(first.key_match.candidates.len() <= 10);
    assert!(first.column_mapping.pair_candidates_top.len() <= 50);
}

#[test]
fn row_and_column_shuffles_preserve_the_score() {
    let reference = "gtin,name,price_eur\n100,Soap,1.99\n200,Shampoo,3.49\n300,Towel,0.99\n";
    // same content twice: in reference order, and with shuffled rows plus
    // reordered columns; one price cell differs so the score is not 1.0
    let plain = "gtin,name,price_eur\n100,Soap,2.00\n200,Shampoo,3.49\n300,Towel,0.99\n";
    let shuffled = "price_eur,gtin,name\n0.99,300,Towel\n3.49,200,Shampoo\n2.00,100,Soap\n";

    let report_plain = compare(reference, plain);
    let report_shuffled = compare(reference, shuffled);

    assert!(report_plain.scores.dataset_similarity_equal_weighted < 1.0);
    assert!(
        (report_plain.scores.dataset_similarity_equal_weighted
            - report_shuffled.scores.dataset_similarity_equal_weighted)
            .abs()
            < 1e-12
    );
    assert_eq!(report_shuffled.status, Status::Ok);
}

#[test]
fn dataset_score_is_mean_over_all_reference_columns() {
    // candidate drops one reference column entirely
    let reference = "gtin,name,extra\n100,Soap,x\n200,Shampoo,y\n";
    let candidate = "gtin,name\n100,Soap\n200,Shampoo\n";
    let report = compare(reference, candidate);

    let per_column_mean: f64 = report
        .scores
        .per_reference_column
        .iter()
        .map(|c| c.similarity)
        .sum::<f64>()
        / report.scores.reference_columns_total as f64;
    assert!((report.scores.dataset_similarity_equal_weighted - per_column_mean).abs() < 1e-15);
    assert_eq!(report.scores.reference_columns_total, 3);
    assert_eq!(report.scores.mapped_reference_columns, 2);
    assert!((report.scores.dataset_similarity_equal_weighted - 2.0 / 3.0).abs() < 1e-12);
}

#[test]
fn alignment_and_mapping_are_injective() {
    let reference = "gtin,name,price_eur\n100,Soap,1.99\n200,Shampoo,3.49\n300,Towel,0.99\n";
    let candidate = "gtin,name,price_eur\n300,Towel,0.99\n200,Shampoo,3.49\n100,Soap,1.99\n";
    let report = compare(reference, candidate);

    let cand_cols: HashSet<&str> = report
        .column_mapping
        .mapping
        .values()
        .map(|p| p.candidate_column.as_str())
        .collect();
    assert_eq!(cand_cols.len(), report.column_mapping.mapping.len());
    assert_eq!(report.row_alignment.matched_rows, 3);
    assert!(report.row_alignment.complete);
}

#[test]
fn non_unique_candidate_columns_cannot_carry_the_key() {
    let reference = "id,v\n1,a\n2,b\n";
    let candidate = "id,v\n1,a\n1,b\n2,c\n2,d\n";
    let report = compare(reference, candidate);

    // candidate id repeats, so the key falls back to the v column pair,
    // which only covers half the candidate rows
    assert_eq!(report.status, Status::PartialKeyMatch);
    assert_eq!(report.key_match.reference_column.as_deref(), Some("v"));
    assert_eq!(report.key_match.candidate_column.as_deref(), Some("v"));
    assert_eq!(report.row_alignment.matched_rows, 2);
    assert_eq!(
        report.row_alignment.missing_candidate_keys_or_unmatched,
        Some(2)
    );
}

#[test]
fn bom_and_quoting_are_tolerated() {
    let reference = "\u{feff}gtin,desc\n100,\"Soap, mild\"\n200,Towel\n";
    let candidate = "gtin,desc\n100,\"Soap, mild\"\n200,Towel\n";
    let report = compare(reference, candidate);

    assert_eq!(report.status, Status::Ok);
    assert_eq!(report.scores.dataset_similarity_equal_weighted, 1.0);
}

#[test]
fn malformed_input_is_a_fatal_error() {
    let dir = TempDir::new().expect("temp dir");
    let ref_path = dir.path().join("reference.csv");
    fs::write(&ref_path, "id\n1\n").expect("write reference");
    let missing = dir.path().join("missing.csv");

    let err = compare_files(&ref_path, &missing, &CompareConfig::default());
    assert!(err.is_err());
}
