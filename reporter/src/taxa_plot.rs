use std::cmp::Ordering;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context, Result};
use plotters::prelude::*;
use polars::frame::DataFrame;
use polars::prelude::DataType;
use tracing::{error, info, warn};

use crate::config::ReportConfig;
use crate::helper_functions::{find_level_csvs, read_csv};
use crate::models::StepOutcome;

const CANVAS_SIZE: (u32, u32) = (1200, 800);
const PNG_NAME: &str = "top_genera.png";
const SUMMARY_NAME: &str = "top_genera_summary.csv";

/// Load the genus-level taxa table, rank genera by mean relative abundance
/// and write the top-N as a bar chart plus a summary CSV.
///
/// A missing table skips the step; anything that breaks mid-way is logged and
/// contained so the rest of the run continues.
pub fn run_taxa_barplot(cfg: &ReportConfig) -> StepOutcome {
    // Best-effort presence check across the whole tree. Logged only; the
    // main load below goes straight for the configured genus table.
    let level_files = find_level_csvs(&cfg.search_root);
    if level_files.is_empty() {
        info!(
            "No taxonomic level-*.csv files found under {}",
            cfg.search_root.display()
        );
    } else {
        info!(
            "{} taxonomic level-*.csv file(s) under {}",
            level_files.len(),
            cfg.search_root.display()
        );
    }

    if !cfg.genus_table.exists() {
        let reason = format!("genus table {} not found", cfg.genus_table.display());
        warn!("{reason}; skipping taxa bar plot");
        return StepOutcome::Skipped(reason);
    }

    match plot_top_genera(cfg) {
        Ok(()) => StepOutcome::Produced,
        Err(e) => {
            error!("Error creating taxonomic plot: {e:#}");
            StepOutcome::Failed(format!("{e:#}"))
        }
    }
}

fn plot_top_genera(cfg: &ReportConfig) -> Result<()> {
    std::fs::create_dir_all(&cfg.output_dir)
        .with_context(|| format!("creating {}", cfg.output_dir.display()))?;

    let df = read_csv(&cfg.genus_table)
        .with_context(|| format!("loading {}", cfg.genus_table.display()))?;
    info!(
        "Loaded genus data: {} (shape {:?})",
        cfg.genus_table.display(),
        df.shape()
    );

    let top = top_mean_columns(&df, cfg.top_n);
    if top.is_empty() {
        bail!("no numeric columns in {}", cfg.genus_table.display());
    }

    let summary_path = cfg.output_dir.join(SUMMARY_NAME);
    write_summary_csv(&summary_path, &top)
        .with_context(|| format!("writing {}", summary_path.display()))?;
    info!("Saved: {}", summary_path.display());

    let png_path = cfg.output_dir.join(PNG_NAME);
    draw_bar_chart(&png_path, &top)
        .with_context(|| format!("rendering {}", png_path.display()))?;
    info!("Saved: {}", png_path.display());

    Ok(())
}

/// Mean of every numeric column, sorted descending, truncated to `n`.
///
/// Non-numeric columns (the sample-id index, metadata strings) are excluded,
/// as are columns whose mean is undefined (all null). The sort is stable so
/// ties keep the table's column order.
pub fn top_mean_columns(df: &DataFrame, n: usize) -> Vec<(String, f64)> {
    let mut means: Vec<(String, f64)> = df
        .get_columns()
        .iter()
        .filter(|c| is_numeric(c.dtype()))
        .filter_map(|c| {
            c.as_materialized_series()
                .mean()
                .map(|m| (c.name().to_string(), m))
        })
        .collect();
    means.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    means.truncate(n);
    means
}

fn is_numeric(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Two-column CSV, one row per genus, fixed precision so identical inputs
/// give byte-identical output.
fn write_summary_csv(path: &Path, series: &[(String, f64)]) -> Result<()> {
    let mut file = File::create(path)?;
    writeln!(file, "genus,mean_abundance")?;
    for (genus, mean) in series {
        writeln!(file, "{},{mean:.6}", csv_field(genus))?;
    }
    Ok(())
}

// QIIME lineage strings occasionally carry commas.
fn csv_field(s: &str) -> String {
    if s.contains(',') || s.contains('"') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn draw_bar_chart(output_path: &Path, series: &[(String, f64)]) -> Result<()> {
    let root = BitMapBackend::new(output_path, CANVAS_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let max_val = series
        .iter()
        .map(|(_, v)| *v)
        .fold(f64::NEG_INFINITY, f64::max);
    let y_hi = if max_val > 0.0 { max_val * 1.05 } else { 1.0 };
    let n = series.len() as f64;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            "Top 15 Bacterial Genera (Average Relative Abundance)",
            ("sans-serif", 26),
        )
        .margin(15)
        .x_label_area_size(240)
        .y_label_area_size(70)
        .build_cartesian_2d(-0.5..n - 0.5, 0.0..y_hi)?;

    // Genus lineages are long, so the tick labels run vertically.
    let x_label_style = TextStyle::from(("sans-serif", 14)).transform(FontTransform::Rotate270);

    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(series.len())
        .x_label_style(x_label_style)
        .x_label_formatter(&|val: &f64| {
            let idx = val.round() as usize;
            series
                .get(idx)
                .map(|(genus, _)| genus.clone())
                .unwrap_or_default()
        })
        .x_desc("Genus")
        .y_desc("Relative Abundance")
        .axis_desc_style(("sans-serif", 18))
        .draw()?;

    chart.draw_series(series.iter().enumerate().map(|(i, (_, v))| {
        let x0 = i as f64 - 0.4;
        let x1 = i as f64 + 0.4;
        Rectangle::new([(x0, 0.0), (x1, *v)], BLUE.mix(0.6).filled())
    }))?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;
    use std::fs;

    #[test]
    fn means_are_ranked_descending_and_capped() {
        let df = df![
            "index" => &["s1", "s2", "s3"],
            "g_low" => &[0.1, 0.1, 0.1],
            "g_high" => &[0.5, 0.7, 0.6],
            "g_mid" => &[0.3, 0.3, 0.3]
        ]
        .unwrap();

        let top = top_mean_columns(&df, 15);
        let labels: Vec<&str> = top.iter().map(|(g, _)| g.as_str()).collect();
        assert_eq!(labels, vec!["g_high", "g_mid", "g_low"]);
        for pair in top.windows(2) {
            assert!(pair[0].1 >= pair[1].1);
        }

        let top2 = top_mean_columns(&df, 2);
        assert_eq!(top2.len(), 2);
        assert_eq!(top2[0].0, "g_high");
    }

    #[test]
    fn string_and_all_null_columns_are_excluded() {
        let df = df![
            "index" => &["s1", "s2"],
            "empty" => &[None::<f64>, None::<f64>],
            "g" => &[1.0, 3.0]
        ]
        .unwrap();

        let top = top_mean_columns(&df, 15);
        assert_eq!(top, vec![("g".to_string(), 2.0)]);
    }

    #[test]
    fn summary_csv_is_byte_identical_across_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.csv");
        let series = vec![
            ("d__Bacteria;g__Prevotella".to_string(), 0.31),
            ("with,comma".to_string(), 0.12),
        ];

        write_summary_csv(&path, &series).unwrap();
        let first = fs::read(&path).unwrap();
        write_summary_csv(&path, &series).unwrap();
        let second = fs::read(&path).unwrap();

        assert_eq!(first, second);
        let text = String::from_utf8(first).unwrap();
        assert!(text.starts_with("genus,mean_abundance\n"));
        assert!(text.contains("d__Bacteria;g__Prevotella,0.310000"));
        assert!(text.contains("\"with,comma\",0.120000"));
    }

    #[test]
    fn missing_genus_table_skips_without_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = ReportConfig {
            genus_table: dir.path().join("level-6.csv"),
            search_root: dir.path().to_path_buf(),
            output_dir: dir.path().join("out"),
            ..ReportConfig::default()
        };

        let outcome = run_taxa_barplot(&cfg);
        assert!(matches!(outcome, StepOutcome::Skipped(_)));
        assert!(!cfg.output_dir.join(PNG_NAME).exists());
        assert!(!cfg.output_dir.join(SUMMARY_NAME).exists());
    }

    #[test]
    fn step_creates_missing_output_dir_itself() {
        let dir = tempfile::tempdir().unwrap();
        let table = dir.path().join("level-6.csv");
        fs::write(&table, "index,g__A,g__B\ns1,0.25,0.5\n").unwrap();

        let cfg = ReportConfig {
            genus_table: table,
            search_root: dir.path().to_path_buf(),
            output_dir: dir.path().join("out"),
            ..ReportConfig::default()
        };
        assert!(!cfg.output_dir.exists());

        let outcome = run_taxa_barplot(&cfg);
        assert!(cfg.output_dir.is_dir());
        assert!(cfg.output_dir.join(SUMMARY_NAME).exists());
        assert!(!matches!(outcome, StepOutcome::Skipped(_)));
    }

    #[test]
    fn real_table_produces_summary_matching_aggregate() {
        let dir = tempfile::tempdir().unwrap();
        let table = dir.path().join("figure1/data/level-6.csv");
        fs::create_dir_all(table.parent().unwrap()).unwrap();
        fs::write(
            &table,
            "index,g__A,g__B,g__C\ns1,0.125,0.5,0.25\ns2,0.375,0.75,0.25\n",
        )
        .unwrap();

        let cfg = ReportConfig {
            genus_table: table.clone(),
            search_root: dir.path().to_path_buf(),
            output_dir: dir.path().join("out"),
            ..ReportConfig::default()
        };

        let outcome = run_taxa_barplot(&cfg);
        let summary = fs::read_to_string(cfg.output_dir.join(SUMMARY_NAME)).unwrap();
        let mut lines = summary.lines();
        assert_eq!(lines.next(), Some("genus,mean_abundance"));
        let labels: Vec<&str> = lines.map(|l| l.split(',').next().unwrap()).collect();
        assert_eq!(labels, vec!["g__B", "g__A", "g__C"]);

        match outcome {
            StepOutcome::Produced => assert!(cfg.output_dir.join(PNG_NAME).exists()),
            // Chart text needs a system font; headless hosts without one
            // still get the summary CSV, written before the render.
            StepOutcome::Failed(_) => {}
            StepOutcome::Skipped(r) => panic!("unexpected skip: {r}"),
        }
    }
}
