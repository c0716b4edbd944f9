//! Row types read from the pipeline's input CSV files, and the in-memory
//! per-vessel tables the jobs build from them.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// IMO vessel number, the key every table is joined on.
///
/// All-digit identifiers sort numerically and come before any other
/// identifier; the rest sort as text. Numeric ties (`"007"` vs `"7"`) fall
/// back to the text so that the ordering stays consistent with equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Imo(String);

impl Imo {
    pub fn new(raw: impl AsRef<str>) -> Self {
        let trimmed = raw.as_ref().trim();
        // Integer columns that went through a float round-trip come back as "1234567.0".
        let normalized = match trimmed.strip_suffix(".0") {
            Some(digits) if is_digits(digits) => digits,
            _ => trimmed,
        };
        Imo(normalized.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.is_empty()
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

impl From<String> for Imo {
    fn from(raw: String) -> Self {
        Imo::new(raw)
    }
}

impl From<&str> for Imo {
    fn from(raw: &str) -> Self {
        Imo::new(raw)
    }
}

impl From<Imo> for String {
    fn from(imo: Imo) -> Self {
        imo.0
    }
}

impl fmt::Display for Imo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Ord for Imo {
    fn cmp(&self, other: &Self) -> Ordering {
        match (is_digits(&self.0), is_digits(&other.0)) {
            (true, true) => {
                let a = self.0.trim_start_matches('0');
                let b = other.0.trim_start_matches('0');
                a.len()
                    .cmp(&b.len())
                    .then_with(|| a.cmp(b))
                    .then_with(|| self.0.cmp(&other.0))
            }
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for Imo {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A single AIS observation from `ais_dataset.csv`.
///
/// Only `imo` is mandatory. Unparseable numbers and timestamps are read as
/// missing rather than failing the whole load.
#[derive(Debug, Clone, Deserialize)]
pub struct ActivityRecord {
    pub imo: Imo,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub timestamp: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub ael: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub abl: Option<f64>,
    #[serde(default)]
    pub fuel_category: Option<String>,
}

/// Row of `auxiliary_engine_emission_factors.csv`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuxFactor {
    pub fuel_category: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub sfc_ae: Option<f64>,
}

/// Row of `boiler_engine_emission_factors.csv`.
#[derive(Debug, Clone, Deserialize)]
pub struct BoilerFactor {
    pub fuel_category: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub sfc_ab: Option<f64>,
}

/// Total emissions (tonnes) of one vessel for one scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct VesselEmissions {
    pub imo: Imo,
    pub tonnes: f64,
}

impl VesselEmissions {
    pub fn new(imo: impl Into<Imo>, tonnes: f64) -> Self {
        Self {
            imo: imo.into(),
            tonnes,
        }
    }
}

/// Before/after totals of one vessel and the difference between them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VesselSavings {
    pub imo: Imo,
    pub anc_before_jit: f64,
    pub anc_after_jit: f64,
    pub anc_savings_after_jit: f64,
}

fn deserialize_timestamp<'de, D>(de: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(de)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

/// Parses the timestamp layouts seen in AIS exports. Returns `None` for
/// anything else, which downstream treats as a missing timestamp.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    const LAYOUTS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];

    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }

    LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(raw, layout).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
