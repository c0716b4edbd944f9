//! Fixed emission/savings range bins for distribution reporting.
//!
//! Bins are left-open and right-closed, `(lo, hi]`, except the first bin
//! which also includes its left edge. With the emission bins:
//!
//! | Value       | Label  |
//! |-------------|--------|
//! | 0           | Zero   |
//! | 0.001       | Zero   |
//! | 0.5, 1.0    | 0-1    |
//! | 1.0000001   | 1-10   |
//! | 100.0       | 50-100 |
//! | > 100       | 100+   |
//! | < 0, NaN    | none   |

/// Ordered bin edges with one label per consecutive pair of edges.
#[derive(Debug, Clone, Copy)]
pub struct RangeBins {
    edges: &'static [f64],
    labels: &'static [&'static str],
}

pub const EMISSION_RANGES: RangeBins = RangeBins {
    edges: &[0.0, 0.001, 1.0, 10.0, 50.0, 100.0, f64::INFINITY],
    labels: &["Zero", "0-1", "1-10", "10-50", "50-100", "100+"],
};

/// Savings can be negative when the after-JIT total exceeds the before-JIT
/// one; those land in `Negative`.
pub const SAVINGS_RANGES: RangeBins = RangeBins {
    edges: &[
        f64::NEG_INFINITY,
        -0.001,
        0.001,
        1.0,
        10.0,
        50.0,
        100.0,
        f64::INFINITY,
    ],
    labels: &["Negative", "Zero", "0-1", "1-10", "10-50", "50-100", "100+"],
};

impl RangeBins {
    pub fn labels(&self) -> &'static [&'static str] {
        self.labels
    }

    /// Label of the bin holding `value`, or `None` when it falls outside every bin.
    pub fn label(&self, value: f64) -> Option<&'static str> {
        self.bin_index(value).map(|i| self.labels[i])
    }

    /// Count per label in bin order. Every label is present, empty bins included.
    pub fn distribution<I>(&self, values: I) -> Vec<(&'static str, usize)>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut counts = vec![0usize; self.labels.len()];
        for i in values.into_iter().filter_map(|v| self.bin_index(v)) {
            counts[i] += 1;
        }
        self.labels.iter().copied().zip(counts).collect()
    }

    fn bin_index(&self, value: f64) -> Option<usize> {
        if value.is_nan() {
            return None;
        }

        self.edges
            .windows(2)
            .take(self.labels.len())
            .enumerate()
            .position(|(i, edge)| {
                let above_lo = if i == 0 {
                    value >= edge[0]
                } else {
                    value > edge[0]
                };
                above_lo && value <= edge[1]
            })
    }
}
