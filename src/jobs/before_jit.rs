//! Before-JIT analysis of the precomputed `anc_before_jit.csv` table.

use anyhow::{Context, Result};
use std::io::Write;
use std::path::PathBuf;
use tracing::{error, info};

use super::{ensure_output_dir, write_emission_summary};
use crate::config::RunConfig;
use crate::loader::load_vessel_totals;
use crate::model::VesselEmissions;
use crate::output::{BeforeJitDetailedRow, RangeSummaryRow, SimpleListRow, write_records};
use crate::ranges::EMISSION_RANGES;
use crate::report::{Prompt, print_blocks, write_distribution};
use crate::stats::{EmissionSummary, max, mean, min, round6};

pub const VALUE_COLUMN: &str = "anc_before_jit";

#[derive(Debug, Clone)]
pub struct BeforeJitPaths {
    pub input: PathBuf,
    pub output_dir: PathBuf,
}

impl BeforeJitPaths {
    pub fn detailed(&self) -> PathBuf {
        self.output_dir.join("emissions_detailed_analysis.csv")
    }

    pub fn simple_list(&self) -> PathBuf {
        self.output_dir.join("emissions_simple_list.csv")
    }

    pub fn range_summary(&self) -> PathBuf {
        self.output_dir.join("emissions_range_summary.csv")
    }
}

/// Loads the before-JIT totals, reports on them and writes the detailed
/// analysis, the simple list and the per-range summary.
#[tracing::instrument(skip_all, fields(input = %paths.input.display()))]
pub fn run<W: Write>(
    paths: &BeforeJitPaths,
    config: &RunConfig,
    out: &mut W,
    prompt: &mut dyn Prompt,
) -> Result<Vec<VesselEmissions>> {
    run_inner(paths, config, out, prompt)
        .inspect_err(|e| error!(error = ?e, "Before-JIT analysis failed"))
}

fn run_inner<W: Write>(
    paths: &BeforeJitPaths,
    config: &RunConfig,
    out: &mut W,
    prompt: &mut dyn Prompt,
) -> Result<Vec<VesselEmissions>> {
    let mut rows = load_vessel_totals(&paths.input, VALUE_COLUMN)
        .context("loading before-JIT emissions")?;
    rows.sort_by(|a, b| a.imo.cmp(&b.imo));

    let values: Vec<f64> = rows.iter().map(|r| r.tonnes).collect();
    let summary = EmissionSummary::from_values(&values);
    info!(
        vessels = summary.vessels,
        non_zero = summary.non_zero,
        total_tonnes = summary.total,
        "Before-JIT emissions loaded"
    );

    write_emission_summary(out, &summary, "Before JIT")?;
    write_distribution(
        out,
        "Emission Ranges Distribution:",
        &EMISSION_RANGES.distribution(values.iter().copied()),
        None,
    )?;

    writeln!(out, "\nComplete List of All IMOs and Their Emissions:")?;
    writeln!(out, "{}", "=".repeat(50))?;
    print_blocks(out, &rows, VALUE_COLUMN, &config.report, prompt)?;

    ensure_output_dir(&paths.output_dir)?;

    let mut by_emissions: Vec<&VesselEmissions> = rows.iter().collect();
    by_emissions.sort_by(|a, b| b.tonnes.total_cmp(&a.tonnes));
    write_records(
        &paths.detailed(),
        by_emissions.iter().map(|r| BeforeJitDetailedRow {
            imo: &r.imo,
            anc_before_jit: r.tonnes,
            emission_range: EMISSION_RANGES.label(r.tonnes),
        }),
    )?;

    write_records(
        &paths.simple_list(),
        rows.iter().map(|r| SimpleListRow {
            imo: &r.imo,
            anc_before_jit: round6(r.tonnes),
        }),
    )?;

    write_records(&paths.range_summary(), range_summary(&rows))?;

    writeln!(out, "\nOutput files generated:")?;
    writeln!(out, "1. {} - Full detailed analysis", paths.detailed().display())?;
    writeln!(out, "2. {} - Simple IMO and emissions list", paths.simple_list().display())?;
    writeln!(out, "3. {} - Summary by emission ranges", paths.range_summary().display())?;
    info!(output_dir = %paths.output_dir.display(), "Before-JIT analysis complete");

    Ok(rows)
}

/// Count, sum, mean, min and max per emission range, every range included.
pub fn range_summary(rows: &[VesselEmissions]) -> Vec<RangeSummaryRow> {
    EMISSION_RANGES
        .labels()
        .iter()
        .map(|&label| {
            let values: Vec<f64> = rows
                .iter()
                .filter(|r| EMISSION_RANGES.label(r.tonnes) == Some(label))
                .map(|r| r.tonnes)
                .collect();

            RangeSummaryRow {
                emission_range: label,
                imo_count: values.len(),
                anc_before_jit_sum: round6(values.iter().sum()),
                anc_before_jit_mean: mean(&values).map(round6),
                anc_before_jit_min: min(&values).map(round6),
                anc_before_jit_max: max(&values).map(round6),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_summary_covers_every_range() {
        let rows = vec![
            VesselEmissions::new("1", 0.0),
            VesselEmissions::new("2", 0.5),
            VesselEmissions::new("3", 0.25),
            VesselEmissions::new("4", 120.0),
        ];

        let summary = range_summary(&rows);

        assert_eq!(summary.len(), 6);
        assert_eq!(summary[0].emission_range, "Zero");
        assert_eq!(summary[0].imo_count, 1);
        assert_eq!(summary[1].imo_count, 2);
        assert_eq!(summary[1].anc_before_jit_sum, 0.75);
        assert_eq!(summary[1].anc_before_jit_mean, Some(0.375));
        assert_eq!(summary[1].anc_before_jit_min, Some(0.25));
        assert_eq!(summary[1].anc_before_jit_max, Some(0.5));
        assert_eq!(summary[2].imo_count, 0);
        assert_eq!(summary[2].anc_before_jit_sum, 0.0);
        assert_eq!(summary[2].anc_before_jit_mean, None);
        assert_eq!(summary[5].imo_count, 1);
    }

    #[test]
    fn test_unwritable_output_dir_is_an_error() {
        let dir = std::env::temp_dir().join("jit_emissions_before_jit_blocked");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let input = dir.join("anc_before_jit.csv");
        std::fs::write(&input, "imo,anc_before_jit\n9000001,1.5\n").unwrap();
        let blocker = dir.join("out");
        std::fs::write(&blocker, "not a directory").unwrap();

        let paths = BeforeJitPaths {
            input,
            output_dir: blocker.clone(),
        };
        let result = run(
            &paths,
            &RunConfig::default(),
            &mut Vec::<u8>::new(),
            &mut crate::report::NoPrompt,
        );

        let err = result.unwrap_err();
        assert!(format!("{err:#}").contains("creating"));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
