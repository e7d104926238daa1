use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::ReportConfig;
use crate::models::StepOutcome;

mod config;
mod helper_functions;
mod models;
mod stats_report;
mod taxa_plot;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("=== Creating Plots from Extracted Data ===");

    let cfg = ReportConfig::default();

    // Idempotent; if this fails the plot step reports its own failure.
    if let Err(e) = std::fs::create_dir_all(&cfg.output_dir) {
        warn!("Could not create {}: {e}", cfg.output_dir.display());
    }

    log_outcome("taxa bar plot", &taxa_plot::run_taxa_barplot(&cfg));
    log_outcome("statistics report", &stats_report::run_stats_report(&cfg));

    println!("\n=== DONE ===");
    println!("Plots saved to: {}/", cfg.output_dir.display());
    println!("Use these for your report and presentation.");
}

fn log_outcome(step: &str, outcome: &StepOutcome) {
    match outcome {
        StepOutcome::Failed(_) => warn!("{step}: {outcome}"),
        _ => info!("{step}: {outcome}"),
    }
}
