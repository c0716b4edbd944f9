//! CSV loading for the pipeline's input tables.

use anyhow::{Context, Result, anyhow};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::path::Path;
use tracing::{debug, warn};

use crate::model::{ActivityRecord, Imo, VesselEmissions};

/// Deserializes every row of a headed CSV file into `T`.
pub fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut rdr = csv::Reader::from_reader(file);
    let mut rows = Vec::new();

    for result in rdr.deserialize() {
        let record: T = result.with_context(|| format!("reading {}", path.display()))?;
        rows.push(record);
    }

    debug!(path = %path.display(), rows = rows.len(), "CSV loaded");
    Ok(rows)
}

/// Loads the AIS dataset, dropping rows without an IMO.
pub fn load_activity(path: &Path) -> Result<Vec<ActivityRecord>> {
    let mut records: Vec<ActivityRecord> = read_rows(path)?;

    let before = records.len();
    records.retain(|r| !r.imo.is_blank());
    let dropped = before - records.len();
    if dropped > 0 {
        warn!(path = %path.display(), dropped, "AIS rows without IMO dropped");
    }

    Ok(records)
}

/// Loads an `imo` + `value_column` table. Empty or non-numeric values read as 0.
pub fn load_vessel_totals(path: &Path, value_column: &str) -> Result<Vec<VesselEmissions>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut rdr = csv::Reader::from_reader(file);

    let headers = rdr
        .headers()
        .with_context(|| format!("reading header of {}", path.display()))?
        .clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| anyhow!("{} has no `{}` column", path.display(), name))
    };
    let imo_idx = column("imo")?;
    let value_idx = column(value_column)?;

    let mut rows = Vec::new();
    let mut blank = 0usize;

    for result in rdr.records() {
        let record = result.with_context(|| format!("reading {}", path.display()))?;

        let imo = Imo::new(record.get(imo_idx).unwrap_or_default());
        if imo.is_blank() {
            blank += 1;
            continue;
        }

        let tonnes = record
            .get(value_idx)
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|v| !v.is_nan())
            .unwrap_or(0.0);

        rows.push(VesselEmissions { imo, tonnes });
    }

    if blank > 0 {
        warn!(path = %path.display(), blank, "Rows without IMO skipped");
    }
    debug!(path = %path.display(), rows = rows.len(), value_column, "Vessel totals loaded");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AuxFactor;
    use std::env;
    use std::fs;
    use std::path::PathBuf;

    fn temp_file(name: &str, content: &str) -> PathBuf {
        let path = env::temp_dir().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_read_rows_missing_file_errors() {
        let path = env::temp_dir().join("jit_emissions_does_not_exist.csv");
        let err = read_rows::<AuxFactor>(&path).unwrap_err();
        assert!(err.to_string().contains("jit_emissions_does_not_exist.csv"));
    }

    #[test]
    fn test_load_activity_drops_blank_imo() {
        let path = temp_file(
            "jit_emissions_test_ais.csv",
            "imo,timestamp,ael,abl,fuel_category\n1,2024-01-01 00:00:00,1,1,MDO\n,2024-01-01 00:00:00,1,1,MDO\n",
        );

        let records = load_activity(&path).unwrap();
        assert_eq!(records.len(), 1);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_vessel_totals_fills_missing_with_zero() {
        let path = temp_file(
            "jit_emissions_test_totals.csv",
            "imo,anc_before_jit\n9321483,1.5\n9321484,\n9321485,n/a\n,3.0\n",
        );

        let rows = load_vessel_totals(&path, "anc_before_jit").unwrap();
        assert_eq!(
            rows,
            vec![
                VesselEmissions::new("9321483", 1.5),
                VesselEmissions::new("9321484", 0.0),
                VesselEmissions::new("9321485", 0.0),
            ]
        );

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_vessel_totals_missing_column_errors() {
        let path = temp_file("jit_emissions_test_wrong_cols.csv", "imo,emissions\n1,2\n");

        let err = load_vessel_totals(&path, "anc_after_jit").unwrap_err();
        assert!(err.to_string().contains("anc_after_jit"));

        fs::remove_file(&path).unwrap();
    }
}
