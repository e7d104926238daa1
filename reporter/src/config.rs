use std::path::PathBuf;

/// Paths and knobs for one report run.
///
/// `Default` mirrors the directory layout the upstream extraction step
/// produces, so the binary can run with no arguments from the project root.
/// Tests point the fields at a temporary tree instead.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Genus-level (level 6) taxa table the plotter expects.
    pub genus_table: PathBuf,
    /// Root of the recursive scans (level-* presence check, stats report).
    pub search_root: PathBuf,
    /// Where the PNG and summary CSV land.
    pub output_dir: PathBuf,
    /// Filename fragments that mark statistical result files.
    pub stat_fragments: Vec<String>,
    /// How many top genera to keep in the bar plot and summary.
    pub top_n: usize,
    /// How many rows of each statistical result to print.
    pub preview_rows: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            genus_table: PathBuf::from(
                "results/extracted_figures/figure1_taxa_barplot/data/level-6.csv",
            ),
            search_root: PathBuf::from("results/extracted_figures"),
            output_dir: PathBuf::from("results/plots_from_data"),
            stat_fragments: vec![
                "pairwise".to_string(),
                "significance".to_string(),
                "permanova".to_string(),
            ],
            top_n: 15,
            preview_rows: 5,
        }
    }
}
