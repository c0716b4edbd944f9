//! Run configuration: emission constants and console report layout.
//!
//! Every field has a default, so a config file only needs the values it
//! overrides:
//! ```json
//! {
//!   "emissions": { "jit_cap_hours": 2.0 },
//!   "report": { "block_size": 100 }
//! }
//! ```

use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

/// Constants of the per-record emissions formula and the duration caps.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct EmissionParams {
    /// Carbon mass fraction of fuel.
    pub carbon_fraction: f64,
    /// CO2 to carbon molar mass ratio (44/12).
    pub co2_per_carbon: f64,
    /// Upper bound for a raw activity duration.
    pub raw_cap_hours: f64,
    /// Upper bound for an activity duration under the JIT policy.
    pub jit_cap_hours: f64,
    /// Duration used when no previous timestamp is available.
    pub default_duration_hours: f64,
}

impl EmissionParams {
    /// Rejects constants that would make a duration or an emission negative,
    /// or leave a cap without effect.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("carbon_fraction", self.carbon_fraction),
            ("co2_per_carbon", self.co2_per_carbon),
            ("raw_cap_hours", self.raw_cap_hours),
            ("jit_cap_hours", self.jit_cap_hours),
            ("default_duration_hours", self.default_duration_hours),
        ] {
            ensure!(
                value.is_finite() && value >= 0.0,
                "{name} must be a finite non-negative number, got {value}"
            );
        }
        Ok(())
    }
}

impl Default for EmissionParams {
    fn default() -> Self {
        Self {
            carbon_fraction: 0.867,
            co2_per_carbon: 3.667,
            raw_cap_hours: 24.0,
            jit_cap_hours: 3.0,
            default_duration_hours: 1.0,
        }
    }
}

/// Layout of the paginated console listings.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub block_size: usize,
    /// Rows between pauses in the per-vessel emission listings.
    pub pause_every: usize,
    /// Rows between pauses in the savings table.
    pub savings_pause_every: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            block_size: 50,
            pause_every: 500,
            savings_pause_every: 50,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub emissions: EmissionParams,
    pub report: ReportConfig,
}

impl RunConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: RunConfig = serde_json::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config
            .emissions
            .validate()
            .with_context(|| format!("invalid config {}", path.display()))?;
        info!(path = %path.display(), "Loaded run config");
        Ok(config)
    }

    /// Loads `path` when given, otherwise returns the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }
}
