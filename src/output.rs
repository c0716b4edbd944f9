//! CSV persistence of the job results.
//!
//! Each output file is rewritten from scratch on every run.

use anyhow::{Context, Result};
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::File;
use std::path::Path;
use tracing::debug;

use crate::model::Imo;

/// Row of `anc_after_jit.csv`.
#[derive(Debug, Serialize)]
pub struct AfterJitRow<'a> {
    pub imo: &'a Imo,
    pub anc_after_jit: f64,
}

/// Row of `emissions_after_jit_detailed.csv`.
#[derive(Debug, Serialize)]
pub struct AfterJitDetailedRow<'a> {
    pub imo: &'a Imo,
    pub anc_after_jit: f64,
    pub emission_range: Option<&'static str>,
}

/// Row of `emissions_detailed_analysis.csv`.
#[derive(Debug, Serialize)]
pub struct BeforeJitDetailedRow<'a> {
    pub imo: &'a Imo,
    pub anc_before_jit: f64,
    pub emission_range: Option<&'static str>,
}

/// Row of `emissions_simple_list.csv`.
#[derive(Debug, Serialize)]
pub struct SimpleListRow<'a> {
    pub imo: &'a Imo,
    pub anc_before_jit: f64,
}

/// Row of `emissions_range_summary.csv`. Empty bins leave mean/min/max blank.
#[derive(Debug, PartialEq, Serialize)]
pub struct RangeSummaryRow {
    pub emission_range: &'static str,
    pub imo_count: usize,
    pub anc_before_jit_sum: f64,
    pub anc_before_jit_mean: Option<f64>,
    pub anc_before_jit_min: Option<f64>,
    pub anc_before_jit_max: Option<f64>,
}

/// Row of `savings_summary_stats.csv`.
#[derive(Debug, PartialEq, Serialize)]
pub struct MetricRow {
    #[serde(rename = "Metric")]
    pub metric: &'static str,
    #[serde(rename = "Value")]
    pub value: Option<f64>,
}

/// Writes `rows` to `path` with a header line, replacing any existing file.
/// Returns the number of data rows written.
pub fn write_records<T, I>(path: &Path, rows: I) -> Result<usize>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    debug!(path = %path.display(), "Writing CSV");

    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(file);

    let mut count = 0;
    for row in rows {
        writer
            .serialize(row)
            .with_context(|| format!("writing {}", path.display()))?;
        count += 1;
    }
    writer.flush()?;

    debug!(path = %path.display(), rows = count, "CSV written");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> std::path::PathBuf {
        env::temp_dir().join(name)
    }

    #[test]
    fn test_write_records_creates_file_with_header() {
        let path = temp_path("jit_emissions_test_create.csv");
        let _ = fs::remove_file(&path);

        let imo = Imo::from("9321483");
        let n = write_records(
            &path,
            [AfterJitRow {
                imo: &imo,
                anc_after_jit: 0.5,
            }],
        )
        .unwrap();

        assert_eq!(n, 1);
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "imo,anc_after_jit\n9321483,0.5\n");

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_records_replaces_existing_content() {
        let path = temp_path("jit_emissions_test_replace.csv");
        let imo = Imo::from("1");
        let rows = || {
            [SimpleListRow {
                imo: &imo,
                anc_before_jit: 1.0,
            }]
        };

        write_records(&path, rows()).unwrap();
        write_records(&path, rows()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_metric_row_headers_and_blank_values() {
        let path = temp_path("jit_emissions_test_metrics.csv");

        write_records(
            &path,
            [
                MetricRow {
                    metric: "Total IMOs",
                    value: Some(3.0),
                },
                MetricRow {
                    metric: "Median Savings",
                    value: None,
                },
            ],
        )
        .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "Metric,Value\nTotal IMOs,3.0\nMedian Savings,\n");

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_records_empty_input_writes_nothing() {
        let path = temp_path("jit_emissions_test_empty.csv");

        let n = write_records(&path, Vec::<MetricRow>::new()).unwrap();

        assert_eq!(n, 0);
        fs::remove_file(&path).unwrap();
    }
}
