//! TableMatch - CSV similarity engine
//!
//! This library scores how closely a candidate CSV table reproduces a
//! reference table whose column names and row order may differ. It shares
//! one purely computational pipeline between the CLI and any embedding
//! caller: profile both tables, discover a unique-key column pair, align
//! rows through it, map columns under renames, and score every mapped
//! column over the full alignment.

pub mod align;
pub mod key_match;
pub mod map_columns;
pub mod normalize;
pub mod profile;
pub mod report;
pub mod score;
pub mod similarity;
pub mod table;
pub mod types;

use log::debug;
use std::path::Path;

use crate::align::align_rows_by_key;
use crate::key_match::find_key_match;
use crate::map_columns::map_columns;
use crate::profile::profile_columns;
use crate::score::score_columns;

pub use crate::table::load_csv;
pub use crate::types::{CompareConfig, CompareError, CsvTable, Report, Status};

/// Load both tables from disk and compare them
///
/// Malformed input (missing file, bad encoding, missing header) is the only
/// fatal outcome; everything else, including the absence of a usable key,
/// yields a report.
pub fn compare_files(
    reference: &Path,
    candidate: &Path,
    config: &CompareConfig,
) -> Result<Report, CompareError> {
    let reference = load_csv(reference)?;
    let candidate = load_csv(candidate)?;
    Ok(compare_tables(&reference, &candidate, config))
}

/// Run the full comparison pipeline over two in-memory tables
///
/// Deterministic: identical inputs produce a byte-identical report,
/// including the diagnostic top-K lists. All intermediate state is owned
/// by this call; nothing is shared across comparisons.
pub fn compare_tables(reference: &CsvTable, candidate: &CsvTable, config: &CompareConfig) -> Report {
    debug!(
        "comparing {} ({} rows) against {} ({} rows)",
        candidate.path,
        candidate.row_count(),
        reference.path,
        reference.row_count()
    );

    let ref_profiles = profile_columns(reference);
    let cand_profiles = profile_columns(candidate);

    let key_match = find_key_match(reference, candidate, &ref_profiles);
    let (ref_key, cand_key) = match (
        key_match.found_usable_match,
        key_match.reference_column.clone(),
        key_match.candidate_column.clone(),
    ) {
        (true, Some(r), Some(c)) => (r, c),
        _ => {
            debug!("no usable unique-key pair; emitting zero report");
            return report::zero_report(reference, candidate, &ref_profiles, key_match, config, None);
        }
    };

    let alignment = align_rows_by_key(reference, candidate, &ref_key, &cand_key);
    if alignment.summary.matched_rows == 0 {
        debug!("key pair ({ref_key}, {cand_key}) matched zero rows; emitting zero report");
        return report::zero_report(
            reference,
            candidate,
            &ref_profiles,
            key_match,
            config,
            Some(alignment.summary),
        );
    }

    let column_mapping = map_columns(
        reference,
        candidate,
        &ref_profiles,
        &cand_profiles,
        &alignment.pairs,
        config.sample_size_mapping,
    );
    let scores = score_columns(reference, candidate, &alignment.pairs, &column_mapping.mapping);

    report::build_report(
        reference,
        candidate,
        &ref_profiles,
        key_match,
        alignment.summary,
        column_mapping,
        scores,
        config,
    )
}
