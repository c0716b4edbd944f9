/// Computes the arithmetic mean of a slice of values. Returns `None` for empty input.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Median of a slice of values, averaging the middle pair for even lengths.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

pub fn max(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

pub fn min(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}

pub fn pct(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        (part as f64 / total as f64) * 100.0
    }
}

/// Rounds to 6 decimal places, the precision of the listings and summary files.
pub fn round6(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}

/// Headline figures of a per-vessel emissions table.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct EmissionSummary {
    pub vessels: usize,
    pub non_zero: usize,
    pub zero: usize,
    pub total: f64,
    pub mean: Option<f64>,
    pub max: Option<f64>,
    pub min_non_zero: Option<f64>,
}

impl EmissionSummary {
    pub fn from_values(values: &[f64]) -> Self {
        let non_zero: Vec<f64> = values.iter().copied().filter(|v| *v > 0.0).collect();

        EmissionSummary {
            vessels: values.len(),
            non_zero: non_zero.len(),
            zero: values.iter().filter(|v| **v == 0.0).count(),
            total: values.iter().sum(),
            mean: mean(values),
            max: max(values),
            min_non_zero: min(&non_zero),
        }
    }
}
