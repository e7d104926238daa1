use polars::frame::DataFrame;
use tracing::{debug, info};

use crate::config::ReportConfig;
use crate::helper_functions::{find_csvs_containing, read_csv};
use crate::models::StepOutcome;

/// Scan the results tree for statistical test output (pairwise comparisons,
/// significance tables, PERMANOVA results) and print a preview of each hit.
///
/// Observational only: nothing is written, and a file that fails to parse is
/// skipped without failing the scan. Matches are reported per fragment, so a
/// file whose name carries two fragments is printed twice.
pub fn run_stats_report(cfg: &ReportConfig) -> StepOutcome {
    println!("\n=== Checking for Statistical Results ===");

    let reported = scan_stat_files(cfg);
    if reported == 0 {
        info!(
            "No statistical result files found under {}",
            cfg.search_root.display()
        );
    }
    StepOutcome::Produced
}

/// Returns how many matches were actually previewed. A match that fails to
/// load does not count.
fn scan_stat_files(cfg: &ReportConfig) -> usize {
    let mut reported = 0usize;
    for fragment in &cfg.stat_fragments {
        let matches = find_csvs_containing(&cfg.search_root, fragment);
        debug!("{} file(s) match fragment '{fragment}'", matches.len());
        for path in matches {
            println!("\nFound: {}", path.display());
            match read_csv(&path) {
                Ok(df) => {
                    print_preview(&df, cfg.preview_rows);
                    reported += 1;
                }
                Err(e) => debug!("Could not read {}: {e}", path.display()),
            }
        }
    }
    reported
}

fn print_preview(df: &DataFrame, rows: usize) {
    println!("  Shape: {:?}", df.shape());
    println!("  Columns: {:?}", df.get_column_names());
    if df.height() > 0 {
        println!("  First few rows:");
        println!("{}", df.head(Some(rows)));
    }
}
