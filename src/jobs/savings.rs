//! Emission savings: before-JIT minus after-JIT totals per vessel.

use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::io::Write;
use std::path::PathBuf;
use tracing::{error, info, warn};

use super::ensure_output_dir;
use crate::config::RunConfig;
use crate::loader::load_vessel_totals;
use crate::model::{Imo, VesselEmissions, VesselSavings};
use crate::output::{MetricRow, write_records};
use crate::ranges::SAVINGS_RANGES;
use crate::report::{Prompt, print_savings_table, tonnes, write_distribution, write_summary};
use crate::savings::{SavingsSummary, calculate_savings};

#[derive(Debug, Clone)]
pub struct SavingsPaths {
    pub before: PathBuf,
    pub after: PathBuf,
    pub output_dir: PathBuf,
}

impl SavingsPaths {
    pub fn savings(&self) -> PathBuf {
        self.output_dir.join("anc_savings_after_jit.csv")
    }

    pub fn summary_stats(&self) -> PathBuf {
        self.output_dir.join("savings_summary_stats.csv")
    }
}

const TROUBLESHOOTING: &[&str] = &[
    "Check that both CSV files exist in the data directory",
    "Verify the CSV files have the expected columns (imo, anc_before_jit, anc_after_jit)",
    "Check the CSV files for formatting issues",
];

/// Joins the before/after totals, reports the savings and writes
/// `anc_savings_after_jit.csv` and `savings_summary_stats.csv`.
///
/// On failure the troubleshooting hints are written to `out` before the
/// error is returned.
#[tracing::instrument(skip_all, fields(before = %paths.before.display(), after = %paths.after.display()))]
pub fn run<W: Write>(
    paths: &SavingsPaths,
    config: &RunConfig,
    out: &mut W,
    prompt: &mut dyn Prompt,
) -> Result<Vec<VesselSavings>> {
    match run_inner(paths, config, out, prompt) {
        Ok(rows) => Ok(rows),
        Err(e) => {
            error!(error = %e, "Emission savings calculation failed");
            writeln!(out, "\nError calculating emission savings: {e:#}")?;
            writeln!(out, "\nTroubleshooting suggestions:")?;
            for (i, hint) in TROUBLESHOOTING.iter().enumerate() {
                writeln!(out, "{}. {hint}", i + 1)?;
            }
            Err(e)
        }
    }
}

fn run_inner<W: Write>(
    paths: &SavingsPaths,
    config: &RunConfig,
    out: &mut W,
    prompt: &mut dyn Prompt,
) -> Result<Vec<VesselSavings>> {
    let before = load_vessel_totals(&paths.before, "anc_before_jit")
        .context("loading before-JIT emissions")?;
    let after = load_vessel_totals(&paths.after, "anc_after_jit")
        .context("loading after-JIT emissions")?;

    write_summary(
        out,
        "Initial Data Validation:",
        &[
            ("Records in before JIT", before.len().to_string()),
            ("Records in after JIT", after.len().to_string()),
            ("Unique IMOs before JIT", unique_imos(&before).to_string()),
            ("Unique IMOs after JIT", unique_imos(&after).to_string()),
        ],
    )?;
    info!(
        before_records = before.len(),
        after_records = after.len(),
        "Emission tables loaded"
    );

    let rows = calculate_savings(&before, &after);
    let summary = SavingsSummary::from_rows(&rows);
    if summary.negative > 0 {
        warn!(
            vessels = summary.negative,
            "Vessels with negative savings (data anomaly)"
        );
    }
    info!(
        vessels = summary.vessels,
        total_savings = summary.total,
        "Emission savings calculated"
    );

    write_summary(
        out,
        "Emission Savings Summary:",
        &[
            ("Total unique IMOs", summary.vessels.to_string()),
            ("IMOs with positive savings", summary.positive.to_string()),
            ("IMOs with no savings", summary.zero.to_string()),
            (
                "IMOs with negative savings (data anomaly)",
                summary.negative.to_string(),
            ),
        ],
    )?;
    write_summary(
        out,
        "Emission Savings Statistics:",
        &[
            ("Total savings (tonnes)", tonnes(Some(summary.total))),
            ("Average savings per IMO (tonnes)", tonnes(summary.mean)),
            ("Maximum savings (tonnes)", tonnes(summary.max)),
            ("Minimum savings (tonnes)", tonnes(summary.min)),
            ("Median savings (tonnes)", tonnes(summary.median)),
        ],
    )?;

    let distribution =
        SAVINGS_RANGES.distribution(rows.iter().map(|r| r.anc_savings_after_jit));
    write_distribution(
        out,
        "Emission Savings Ranges Distribution:",
        &distribution,
        Some(rows.len()),
    )?;

    print_savings_table(out, &rows, &config.report, prompt)?;

    ensure_output_dir(&paths.output_dir)?;
    write_records(&paths.savings(), &rows)?;
    write_records(&paths.summary_stats(), summary_metrics(&summary))?;

    writeln!(out, "\nOutput files generated:")?;
    writeln!(out, "1. {} - Complete savings data", paths.savings().display())?;
    writeln!(out, "2. {} - Summary statistics", paths.summary_stats().display())?;
    info!(output_dir = %paths.output_dir.display(), "Savings analysis complete");

    Ok(rows)
}

fn unique_imos(rows: &[VesselEmissions]) -> usize {
    rows.iter().map(|r| &r.imo).collect::<BTreeSet<&Imo>>().len()
}

/// Rows of `savings_summary_stats.csv`.
pub fn summary_metrics(summary: &SavingsSummary) -> Vec<MetricRow> {
    vec![
        MetricRow {
            metric: "Total IMOs",
            value: Some(summary.vessels as f64),
        },
        MetricRow {
            metric: "Total Savings",
            value: Some(summary.total),
        },
        MetricRow {
            metric: "Average Savings",
            value: summary.mean,
        },
        MetricRow {
            metric: "Max Savings",
            value: summary.max,
        },
        MetricRow {
            metric: "Min Savings",
            value: summary.min,
        },
        MetricRow {
            metric: "Median Savings",
            value: summary.median,
        },
    ]
}
