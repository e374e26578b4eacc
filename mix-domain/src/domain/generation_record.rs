use serde::{Deserialize, Serialize};

/// One fuel/time/province observation as delivered by an upstream feed.
///
/// Feeds disagree on field names, so every field is optional here and the
/// normalizer decides which convention applies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    #[serde(default, alias = "province_code", skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    /// Short source tag, e.g. "Coal".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Descriptive label, e.g. "hydraulic turbine".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub megawatt_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gigawatt_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completeness_pct: Option<f64>,
    /// Legacy name for `completeness_pct`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_completeness_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl GenerationRecord {
    /// Record with a province, a short source tag and an MWh quantity.
    pub fn mwh(province: &str, source: &str, megawatt_hours: f64) -> Self {
        Self {
            province: Some(province.to_string()),
            source: Some(source.to_string()),
            megawatt_hours: Some(megawatt_hours),
            ..Self::default()
        }
    }

    pub fn with_completeness(mut self, pct: f64) -> Self {
        self.completeness_pct = Some(pct);
        self
    }

    /// Completeness score, primary field first, then the legacy alias.
    pub fn completeness(&self) -> Option<f64> {
        self.completeness_pct.or(self.data_completeness_percent)
    }
}
