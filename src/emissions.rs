//! Per-record auxiliary and boiler emissions under the JIT duration cap,
//! and their aggregation to per-vessel totals.

use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

use crate::config::EmissionParams;
use crate::duration::jit_cap;
use crate::model::{ActivityRecord, AuxFactor, BoilerFactor, Imo, VesselEmissions};

const GRAMS_PER_TONNE: f64 = 1_000_000.0;

/// Specific fuel consumption for one fuel category.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Sfc {
    pub ae: f64,
    pub ab: f64,
}

/// Fuel category → specific fuel consumption, built from both factor tables.
#[derive(Debug, Default)]
pub struct FactorTable {
    aux: HashMap<String, f64>,
    boiler: HashMap<String, f64>,
}

impl FactorTable {
    /// Indexes both factor tables by fuel category. The first row of a
    /// duplicated category wins.
    pub fn merge(aux: &[AuxFactor], boiler: &[BoilerFactor]) -> Self {
        let mut table = FactorTable::default();

        for f in aux {
            insert_first(&mut table.aux, &f.fuel_category, f.sfc_ae, "sfc_ae");
        }
        for f in boiler {
            insert_first(&mut table.boiler, &f.fuel_category, f.sfc_ab, "sfc_ab");
        }

        debug!(
            aux_categories = table.aux.len(),
            boiler_categories = table.boiler.len(),
            "Emission factor table built"
        );
        table
    }

    /// Factors for `fuel_category`; unknown categories and missing values are 0.
    pub fn lookup(&self, fuel_category: Option<&str>) -> Sfc {
        let Some(category) = fuel_category.map(str::trim) else {
            return Sfc::default();
        };
        Sfc {
            ae: self.aux.get(category).copied().unwrap_or(0.0),
            ab: self.boiler.get(category).copied().unwrap_or(0.0),
        }
    }
}

fn insert_first(map: &mut HashMap<String, f64>, category: &str, value: Option<f64>, column: &str) {
    let key = category.trim().to_string();
    if map.contains_key(&key) {
        warn!(fuel_category = %key, column, "Duplicate fuel category, keeping first row");
        return;
    }
    map.insert(key, non_negative(value));
}

/// Missing, negative and non-finite inputs contribute nothing.
fn non_negative(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => v,
        _ => 0.0,
    }
}

/// `load × hours × sfc × carbon fraction × CO2/carbon ratio`, in grams.
pub fn emissions_grams(load: f64, hours: f64, sfc: f64, params: &EmissionParams) -> f64 {
    load * hours * sfc * params.carbon_fraction * params.co2_per_carbon
}

/// Emissions attributed to a single activity record.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordEmissions {
    pub imo: Imo,
    pub jit_hours: f64,
    pub aux_grams: f64,
    pub boiler_grams: f64,
}

impl RecordEmissions {
    pub fn total_grams(&self) -> f64 {
        self.aux_grams + self.boiler_grams
    }

    pub fn total_tonnes(&self) -> f64 {
        self.total_grams() / GRAMS_PER_TONNE
    }
}

/// Emissions of one record given its raw activity duration.
pub fn record_emissions(
    record: &ActivityRecord,
    raw_hours: f64,
    factors: &FactorTable,
    params: &EmissionParams,
) -> RecordEmissions {
    let jit_hours = jit_cap(raw_hours, params);
    let sfc = factors.lookup(record.fuel_category.as_deref());

    RecordEmissions {
        imo: record.imo.clone(),
        jit_hours,
        aux_grams: emissions_grams(non_negative(record.ael), jit_hours, sfc.ae, params),
        boiler_grams: emissions_grams(non_negative(record.abl), jit_hours, sfc.ab, params),
    }
}

/// Emissions for every record under the JIT cap. `durations` is aligned with `records`.
pub fn calculate_after_jit(
    records: &[ActivityRecord],
    durations: &[f64],
    factors: &FactorTable,
    params: &EmissionParams,
) -> Vec<RecordEmissions> {
    records
        .iter()
        .zip(durations)
        .map(|(record, &hours)| record_emissions(record, hours, factors, params))
        .collect()
}

/// Sums per-record tonnes by vessel over `universe`, ascending by IMO.
///
/// Every vessel in `universe` gets exactly one row, 0 when it has no
/// records. Records of vessels outside `universe` are ignored.
pub fn aggregate_by_vessel<I>(universe: I, per_record: &[RecordEmissions]) -> Vec<VesselEmissions>
where
    I: IntoIterator<Item = Imo>,
{
    let mut totals: BTreeMap<Imo, f64> = universe.into_iter().map(|imo| (imo, 0.0)).collect();

    for e in per_record {
        if let Some(total) = totals.get_mut(&e.imo) {
            *total += e.total_tonnes();
        }
    }

    totals
        .into_iter()
        .map(|(imo, tonnes)| VesselEmissions { imo, tonnes })
        .collect()
}
