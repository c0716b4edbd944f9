//! Activity duration derivation from consecutive AIS timestamps.

use anyhow::{Result, ensure};
use std::cmp::Ordering;
use tracing::{debug, warn};

use crate::config::EmissionParams;
use crate::model::ActivityRecord;

/// Hours spent on each record, aligned with the input order.
///
/// Records are walked per vessel in timestamp order (missing timestamps
/// last). A record's duration is the gap since the previous record of the
/// same vessel. The first record of a vessel, and any record where either
/// side of the gap has no timestamp, gets `default_duration_hours`. Results
/// are capped at `raw_cap_hours`.
pub fn activity_durations(records: &[ActivityRecord], params: &EmissionParams) -> Result<Vec<f64>> {
    params.validate()?;

    let mut order: Vec<usize> = (0..records.len()).collect();
    order.sort_by(|&a, &b| {
        let (ra, rb) = (&records[a], &records[b]);
        ra.imo.cmp(&rb.imo).then_with(|| match (ra.timestamp, rb.timestamp) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
    });

    let mut durations = vec![params.default_duration_hours; records.len()];

    for pair in order.windows(2) {
        let (prev, cur) = (&records[pair[0]], &records[pair[1]]);
        if prev.imo != cur.imo {
            continue;
        }
        let (Some(from), Some(to)) = (prev.timestamp, cur.timestamp) else {
            continue;
        };

        let hours = (to - from).num_milliseconds() as f64 / 3_600_000.0;
        ensure!(
            hours.is_finite() && hours >= 0.0,
            "negative gap of {hours} h for vessel {} at {to}",
            cur.imo
        );
        durations[pair[1]] = hours;
    }

    for d in durations.iter_mut() {
        *d = d.min(params.raw_cap_hours);
    }

    debug!(records = records.len(), "Activity durations derived");
    Ok(durations)
}

/// Duration given to every record when derivation fails. Independent of the
/// configured default, which may itself be the cause of the failure.
pub const FALLBACK_DURATION_HOURS: f64 = 1.0;

/// Like [`activity_durations`], but degrades to [`FALLBACK_DURATION_HOURS`]
/// for every record when derivation fails.
pub fn durations_or_default(records: &[ActivityRecord], params: &EmissionParams) -> Vec<f64> {
    match activity_durations(records, params) {
        Ok(durations) => durations,
        Err(e) => {
            warn!(
                error = %e,
                fallback_hours = FALLBACK_DURATION_HOURS,
                "Duration derivation failed, using fallback duration for all records"
            );
            vec![FALLBACK_DURATION_HOURS; records.len()]
        }
    }
}

/// Clips a raw duration to the JIT cap. A cap that is not a finite
/// non-negative number clips everything to zero.
pub fn jit_cap(hours: f64, params: &EmissionParams) -> f64 {
    let cap = params.jit_cap_hours;
    if cap.is_finite() && cap >= 0.0 {
        hours.min(cap)
    } else {
        0.0
    }
}
