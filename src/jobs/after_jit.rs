//! After-JIT emissions computed from the AIS dataset and the emission
//! factor tables.

use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::io::Write;
use std::path::PathBuf;
use tracing::{error, info};

use super::{ensure_output_dir, write_emission_summary};
use crate::config::RunConfig;
use crate::duration::durations_or_default;
use crate::emissions::{FactorTable, aggregate_by_vessel, calculate_after_jit};
use crate::loader::{load_activity, read_rows};
use crate::model::{ActivityRecord, AuxFactor, BoilerFactor, Imo, VesselEmissions};
use crate::output::{AfterJitDetailedRow, AfterJitRow, write_records};
use crate::ranges::EMISSION_RANGES;
use crate::report::{Prompt, print_blocks, write_distribution};
use crate::stats::EmissionSummary;

pub const VALUE_COLUMN: &str = "anc_after_jit";

#[derive(Debug, Clone)]
pub struct AfterJitPaths {
    pub ais: PathBuf,
    pub aux_factors: PathBuf,
    pub boiler_factors: PathBuf,
    pub output_dir: PathBuf,
}

impl AfterJitPaths {
    pub fn totals(&self) -> PathBuf {
        self.output_dir.join("anc_after_jit.csv")
    }

    pub fn detailed(&self) -> PathBuf {
        self.output_dir.join("emissions_after_jit_detailed.csv")
    }
}

/// Computes per-vessel emissions with activity durations capped by the JIT
/// policy, reports on them and writes `anc_after_jit.csv` and
/// `emissions_after_jit_detailed.csv`.
#[tracing::instrument(skip_all, fields(ais = %paths.ais.display()))]
pub fn run<W: Write>(
    paths: &AfterJitPaths,
    config: &RunConfig,
    out: &mut W,
    prompt: &mut dyn Prompt,
) -> Result<Vec<VesselEmissions>> {
    run_inner(paths, config, out, prompt)
        .inspect_err(|e| error!(error = ?e, "After-JIT analysis failed"))
}

fn run_inner<W: Write>(
    paths: &AfterJitPaths,
    config: &RunConfig,
    out: &mut W,
    prompt: &mut dyn Prompt,
) -> Result<Vec<VesselEmissions>> {
    let params = &config.emissions;
    params.validate()?;

    let (records, aux, boiler) = load_inputs(paths)?;

    let universe: BTreeSet<Imo> = records.iter().map(|r| r.imo.clone()).collect();
    info!(
        records = records.len(),
        vessels = universe.len(),
        "AIS dataset loaded"
    );
    writeln!(out, "Loaded {} AIS records", records.len())?;
    writeln!(out, "Found {} unique IMOs", universe.len())?;

    let durations = durations_or_default(&records, params);
    let factors = FactorTable::merge(&aux, &boiler);
    let per_record = calculate_after_jit(&records, &durations, &factors, params);
    let totals = aggregate_by_vessel(universe, &per_record);

    let values: Vec<f64> = totals.iter().map(|t| t.tonnes).collect();
    let summary = EmissionSummary::from_values(&values);
    info!(
        vessels = summary.vessels,
        non_zero = summary.non_zero,
        total_tonnes = summary.total,
        jit_cap_hours = params.jit_cap_hours,
        "After-JIT emissions aggregated"
    );

    write_emission_summary(out, &summary, "After JIT")?;
    write_distribution(
        out,
        "Emission Ranges Distribution (After JIT):",
        &EMISSION_RANGES.distribution(values.iter().copied()),
        None,
    )?;

    writeln!(out, "\nComplete List of IMOs and Their After-JIT Emissions:")?;
    writeln!(out, "{}", "=".repeat(50))?;
    print_blocks(out, &totals, VALUE_COLUMN, &config.report, prompt)?;

    ensure_output_dir(&paths.output_dir)?;
    write_records(
        &paths.totals(),
        totals.iter().map(|t| AfterJitRow {
            imo: &t.imo,
            anc_after_jit: t.tonnes,
        }),
    )?;
    write_records(
        &paths.detailed(),
        totals.iter().map(|t| AfterJitDetailedRow {
            imo: &t.imo,
            anc_after_jit: t.tonnes,
            emission_range: EMISSION_RANGES.label(t.tonnes),
        }),
    )?;

    writeln!(
        out,
        "\nAnalysis complete. Results saved to '{}' and '{}'",
        paths.totals().display(),
        paths.detailed().display()
    )?;
    info!(output_dir = %paths.output_dir.display(), "After-JIT analysis complete");

    Ok(totals)
}

type Inputs = (Vec<ActivityRecord>, Vec<AuxFactor>, Vec<BoilerFactor>);

fn load_inputs(paths: &AfterJitPaths) -> Result<Inputs> {
    let records = load_activity(&paths.ais).context("loading AIS dataset")?;
    let aux = read_rows(&paths.aux_factors).context("loading auxiliary engine factors")?;
    let boiler = read_rows(&paths.boiler_factors).context("loading boiler engine factors")?;
    Ok((records, aux, boiler))
}
