use mix_domain::domain::ProvinceCode;

use super::normalize::NormalizedRecord;

/// Substrings marking a fuel label as clean generation, nuclear included.
pub const DEFAULT_CLEAN_PATTERNS: [&str; 8] = [
    "hydraulic",
    "hydro",
    "wind",
    "solar",
    "biomass",
    "geothermal",
    "tidal",
    "nuclear",
];

#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedRecord {
    pub province: ProvinceCode,
    pub fuel_label: String,
    pub megawatt_hours: f64,
    pub clean: bool,
}

/// Clean/fossil verdict by substring containment. Anything unmatched is fossil.
#[derive(Debug, Clone)]
pub struct CleanEnergyClassifier {
    patterns: Vec<String>,
}

impl CleanEnergyClassifier {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }

    /// Expects an already lower-cased label.
    pub fn is_clean(&self, fuel_label: &str) -> bool {
        self.patterns.iter().any(|p| fuel_label.contains(p.as_str()))
    }

    pub fn classify(&self, record: NormalizedRecord) -> ClassifiedRecord {
        let clean = self.is_clean(&record.fuel_label);
        ClassifiedRecord {
            province: record.province,
            fuel_label: record.fuel_label,
            megawatt_hours: record.megawatt_hours,
            clean,
        }
    }
}

impl Default for CleanEnergyClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_CLEAN_PATTERNS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nuclear_is_clean_and_natural_gas_is_fossil() {
        let c = CleanEnergyClassifier::default();
        assert!(c.is_clean("nuclear"));
        assert!(!c.is_clean("natural gas"));
    }

    #[test]
    fn matches_by_containment() {
        let c = CleanEnergyClassifier::default();
        assert!(c.is_clean("hydraulic turbine"));
        assert!(c.is_clean("wind power turbine"));
        assert!(c.is_clean("solar photovoltaic"));
        assert!(c.is_clean("tidal"));
        assert!(!c.is_clean("combustion turbine"));
        assert!(!c.is_clean("coal"));
    }

    #[test]
    fn unknown_and_unnormalized_labels_default_to_fossil() {
        let c = CleanEnergyClassifier::default();
        assert!(!c.is_clean("other"));
        assert!(!c.is_clean("Wind"));
        assert!(!c.is_clean(""));
    }

    #[test]
    fn injected_patterns_replace_defaults() {
        let c = CleanEnergyClassifier::new(["wind"]);
        assert!(c.is_clean("wind"));
        assert!(!c.is_clean("nuclear"));
    }

    #[test]
    fn classify_carries_record_fields() {
        let c = CleanEnergyClassifier::default();
        let out = c.classify(NormalizedRecord {
            province: ProvinceCode::Mb,
            fuel_label: "hydro".into(),
            megawatt_hours: 42.0,
        });
        assert!(out.clean);
        assert_eq!(out.province, ProvinceCode::Mb);
        assert_eq!(out.megawatt_hours, 42.0);
    }
}
