use std::path::{Path, PathBuf};

use polars::error::PolarsResult;
use polars::frame::DataFrame;
use polars::prelude::{CsvReadOptions, SerReader};
use walkdir::WalkDir;

pub fn read_csv(file_path: &Path) -> PolarsResult<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(file_path.to_path_buf()))?
        .finish()
}

/// All files under `root` whose name contains `fragment` as a literal
/// substring and ends in `.csv`. The match is on the filename only, never the
/// directory components. Unreadable entries are skipped.
pub fn find_csvs_containing(root: &Path, fragment: &str) -> Vec<PathBuf> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            let name = e.file_name().to_string_lossy();
            name.ends_with(".csv") && name.contains(fragment)
        })
        .map(|e| e.into_path())
        .collect()
}

/// All `level-*.csv` files under `root` (any taxonomic level).
pub fn find_level_csvs(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            let name = e.file_name().to_string_lossy();
            name.starts_with("level-") && name.ends_with(".csv")
        })
        .map(|e| e.into_path())
        .collect()
}
