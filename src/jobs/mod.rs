//! The three batch jobs.
//!
//! Each job reads its input CSVs once, writes its report to the given
//! writer, persists its output CSVs into an output directory and returns the
//! per-vessel table it computed. Jobs share nothing but files.

pub mod after_jit;
pub mod before_jit;
pub mod savings;

use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

use crate::report::{tonnes, write_summary};
use crate::stats::EmissionSummary;

fn ensure_output_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))
}

/// Count and tonnage blocks shared by the before- and after-JIT reports.
fn write_emission_summary<W: Write>(
    out: &mut W,
    summary: &EmissionSummary,
    scenario: &str,
) -> Result<()> {
    write_summary(
        out,
        &format!("{scenario} Summary:"),
        &[
            ("Total unique IMOs", summary.vessels.to_string()),
            ("IMOs with non-zero emissions", summary.non_zero.to_string()),
            ("IMOs with zero emissions", summary.zero.to_string()),
        ],
    )?;
    write_summary(
        out,
        &format!("Emission Statistics ({scenario}):"),
        &[
            ("Total emissions (tonnes)", tonnes(Some(summary.total))),
            ("Average emissions per IMO (tonnes)", tonnes(summary.mean)),
            ("Maximum emissions (tonnes)", tonnes(summary.max)),
            ("Minimum non-zero emissions (tonnes)", tonnes(summary.min_non_zero)),
        ],
    )
}
