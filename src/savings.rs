//! Per-vessel savings between the before- and after-JIT totals.

use std::collections::BTreeMap;
use tracing::warn;

use crate::model::{Imo, VesselEmissions, VesselSavings};
use crate::stats::{max, mean, median, min};

/// Collapses a vessel table to one total per IMO, summing repeated rows.
pub fn totals_by_imo(rows: &[VesselEmissions], table: &str) -> BTreeMap<Imo, f64> {
    let mut totals: BTreeMap<Imo, f64> = BTreeMap::new();
    for row in rows {
        *totals.entry(row.imo.clone()).or_default() += row.tonnes;
    }

    let duplicates = rows.len() - totals.len();
    if duplicates > 0 {
        warn!(table, duplicates, "Repeated IMO rows summed into one total");
    }
    totals
}

/// Outer-joins the two tables on IMO and computes `before - after`.
///
/// A vessel missing from one side counts as 0 on that side. The result holds
/// one row per IMO seen in either table, ascending by IMO. Negative savings
/// are kept as they are.
pub fn calculate_savings(before: &[VesselEmissions], after: &[VesselEmissions]) -> Vec<VesselSavings> {
    let before = totals_by_imo(before, "before_jit");
    let mut after = totals_by_imo(after, "after_jit");

    let mut joined: BTreeMap<Imo, (f64, f64)> = before
        .into_iter()
        .map(|(imo, b)| {
            let a = after.remove(&imo).unwrap_or(0.0);
            (imo, (b, a))
        })
        .collect();
    joined.extend(after.into_iter().map(|(imo, a)| (imo, (0.0, a))));

    joined
        .into_iter()
        .map(|(imo, (b, a))| VesselSavings {
            imo,
            anc_before_jit: b,
            anc_after_jit: a,
            anc_savings_after_jit: b - a,
        })
        .collect()
}

/// Headline figures of the savings table.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SavingsSummary {
    pub vessels: usize,
    pub positive: usize,
    pub zero: usize,
    /// Vessels whose after-JIT total exceeds the before-JIT one.
    pub negative: usize,
    pub total: f64,
    pub mean: Option<f64>,
    pub max: Option<f64>,
    pub min: Option<f64>,
    pub median: Option<f64>,
}

impl SavingsSummary {
    pub fn from_rows(rows: &[VesselSavings]) -> Self {
        let values: Vec<f64> = rows.iter().map(|r| r.anc_savings_after_jit).collect();

        SavingsSummary {
            vessels: values.len(),
            positive: values.iter().filter(|v| **v > 0.0).count(),
            zero: values.iter().filter(|v| **v == 0.0).count(),
            negative: values.iter().filter(|v| **v < 0.0).count(),
            total: values.iter().sum(),
            mean: mean(&values),
            max: max(&values),
            min: min(&values),
            median: median(&values),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[(&str, f64)]) -> Vec<VesselEmissions> {
        rows.iter()
            .map(|(imo, t)| VesselEmissions::new(*imo, *t))
            .collect()
    }

    #[test]
    fn test_vessel_missing_after_keeps_full_savings() {
        let before = table(&[("1013315", 12.5)]);
        let after = table(&[]);

        let s = calculate_savings(&before, &after);

        assert_eq!(s.len(), 1);
        assert_eq!(s[0].anc_after_jit, 0.0);
        assert_eq!(s[0].anc_savings_after_jit, 12.5);
    }

    #[test]
    fn test_outer_join_covers_both_sides_once() {
        let before = table(&[("3", 5.0), ("1", 2.0)]);
        let after = table(&[("2", 1.0), ("1", 0.5)]);

        let s = calculate_savings(&before, &after);
        let imos: Vec<&str> = s.iter().map(|r| r.imo.as_str()).collect();

        assert_eq!(imos, vec!["1", "2", "3"]);
        for row in &s {
            assert_eq!(
                row.anc_savings_after_jit,
                row.anc_before_jit - row.anc_after_jit
            );
        }
        assert_eq!(s[1].anc_before_jit, 0.0);
        assert_eq!(s[1].anc_savings_after_jit, -1.0);
    }

    #[test]
    fn test_duplicate_rows_are_summed() {
        let before = table(&[("7", 1.0), ("7", 2.0)]);
        let after = table(&[("7", 0.5)]);

        let s = calculate_savings(&before, &after);

        assert_eq!(s.len(), 1);
        assert_eq!(s[0].anc_before_jit, 3.0);
        assert_eq!(s[0].anc_savings_after_jit, 2.5);
    }

    #[test]
    fn test_summary_counts_negative_without_clamping() {
        let before = table(&[("1", 5.0), ("2", 1.0), ("3", 2.0)]);
        let after = table(&[("1", 1.0), ("2", 3.0), ("3", 2.0)]);

        let summary = SavingsSummary::from_rows(&calculate_savings(&before, &after));

        assert_eq!(summary.vessels, 3);
        assert_eq!(summary.positive, 1);
        assert_eq!(summary.zero, 1);
        assert_eq!(summary.negative, 1);
        assert_eq!(summary.total, 2.0);
        assert_eq!(summary.min, Some(-2.0));
        assert_eq!(summary.max, Some(4.0));
        assert_eq!(summary.median, Some(0.0));
    }
}
