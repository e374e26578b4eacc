use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::province::ProvinceCode;

/// Per-province generation totals, live or reference-derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvinceSummary {
    pub province: ProvinceCode,
    pub renewable_mwh: f64,
    pub fossil_mwh: f64,
    pub total_mwh: f64,
    pub renewable_pct: f64,
    /// Fuel label to MWh.
    pub sources: BTreeMap<String, f64>,
    pub has_live_data: bool,
}

/// Static renewable-mix estimate for one province.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceEntry {
    pub province: ProvinceCode,
    pub renewable_pct: f64,
    /// Fuel label to percentage of generation.
    pub sources: BTreeMap<String, f64>,
}
