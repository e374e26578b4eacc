use std::collections::HashMap;

use mix_domain::domain::{GenerationRecord, ProvinceCode, UnknownProvince};

/// Fuel label used when a record names neither a source nor a generation type.
pub const DEFAULT_FUEL_LABEL: &str = "other";

const GWH_TO_MWH: f64 = 1000.0;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum NormalizationError {
    #[error(transparent)]
    UnknownProvince(#[from] UnknownProvince),
    #[error("quantity must be a finite non-negative number, got {0}")]
    InvalidQuantity(f64),
}

impl NormalizationError {
    /// Stable label for drop counters.
    pub fn reason(&self) -> &'static str {
        match self {
            NormalizationError::UnknownProvince(_) => "unknown_province",
            NormalizationError::InvalidQuantity(_) => "invalid_quantity",
        }
    }
}

/// Canonical `(province, fuel label, MWh)` triple.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    pub province: ProvinceCode,
    pub fuel_label: String,
    pub megawatt_hours: f64,
}

/// Lower-cased province name to code lookup.
#[derive(Debug, Clone)]
pub struct ProvinceDirectory {
    names: HashMap<String, ProvinceCode>,
}

impl ProvinceDirectory {
    /// Full English names plus the spellings seen in the upstream feeds.
    pub fn canadian() -> Self {
        let mut dir = Self {
            names: HashMap::new(),
        };
        for p in ProvinceCode::ALL {
            dir = dir.with_alias(p.name(), p);
        }
        dir.with_alias("Québec", ProvinceCode::Qc)
            .with_alias("Province of Quebec", ProvinceCode::Qc)
            .with_alias("Newfoundland", ProvinceCode::Nl)
            .with_alias("Newfoundland & Labrador", ProvinceCode::Nl)
            .with_alias("PEI", ProvinceCode::Pe)
            .with_alias("P.E.I.", ProvinceCode::Pe)
            .with_alias("Yukon Territory", ProvinceCode::Yt)
            .with_alias("NWT", ProvinceCode::Nt)
            .with_alias("B.C.", ProvinceCode::Bc)
    }

    pub fn with_alias(mut self, name: &str, code: ProvinceCode) -> Self {
        self.names.insert(name.trim().to_lowercase(), code);
        self
    }

    /// Name lookup first, then the raw value read as a two-letter code.
    pub fn resolve(&self, raw: &str) -> Result<ProvinceCode, UnknownProvince> {
        let key = raw.trim().to_lowercase();
        if let Some(code) = self.names.get(&key) {
            return Ok(*code);
        }
        raw.parse::<ProvinceCode>()
    }
}

impl Default for ProvinceDirectory {
    fn default() -> Self {
        Self::canadian()
    }
}

#[derive(Debug, Clone, Default)]
pub struct FieldNormalizer {
    directory: ProvinceDirectory,
}

impl FieldNormalizer {
    pub fn new(directory: ProvinceDirectory) -> Self {
        Self { directory }
    }

    pub fn normalize(&self, record: &GenerationRecord) -> Result<NormalizedRecord, NormalizationError> {
        let raw_province = record.province.as_deref().unwrap_or("");
        let province = self.directory.resolve(raw_province)?;
        let megawatt_hours = resolve_quantity(record)?;

        Ok(NormalizedRecord {
            province,
            fuel_label: resolve_fuel_label(record),
            megawatt_hours,
        })
    }
}

fn non_blank(s: &Option<String>) -> Option<&str> {
    s.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// `source` wins over `generation_type`; the result is always lower-case.
pub fn resolve_fuel_label(record: &GenerationRecord) -> String {
    non_blank(&record.source)
        .or_else(|| non_blank(&record.generation_type))
        .unwrap_or(DEFAULT_FUEL_LABEL)
        .to_lowercase()
}

/// MWh when present and non-zero, otherwise GWh scaled to MWh. With neither
/// the record still counts, at zero weight.
pub fn resolve_quantity(record: &GenerationRecord) -> Result<f64, NormalizationError> {
    let quantity = match (record.megawatt_hours, record.gigawatt_hours) {
        (Some(mwh), _) if mwh != 0.0 => mwh,
        (_, Some(gwh)) => gwh * GWH_TO_MWH,
        _ => 0.0,
    };

    if !quantity.is_finite() || quantity < 0.0 {
        return Err(NormalizationError::InvalidQuantity(quantity));
    }
    Ok(quantity)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(province: &str) -> GenerationRecord {
        GenerationRecord {
            province: Some(province.to_string()),
            megawatt_hours: Some(1.0),
            ..GenerationRecord::default()
        }
    }

    #[test]
    fn resolves_names_variants_and_codes() {
        let dir = ProvinceDirectory::canadian();
        assert_eq!(dir.resolve("Ontario"), Ok(ProvinceCode::On));
        assert_eq!(dir.resolve("  NEWFOUNDLAND AND LABRADOR "), Ok(ProvinceCode::Nl));
        assert_eq!(dir.resolve("Québec"), Ok(ProvinceCode::Qc));
        assert_eq!(dir.resolve("pei"), Ok(ProvinceCode::Pe));
        assert_eq!(dir.resolve("ab"), Ok(ProvinceCode::Ab));
    }

    #[test]
    fn unfamiliar_province_is_an_error_not_a_new_code() {
        let n = FieldNormalizer::default();
        let err = n.normalize(&record("Atlantis")).unwrap_err();
        assert_eq!(err, NormalizationError::UnknownProvince(UnknownProvince("Atlantis".into())));
        assert_eq!(err.reason(), "unknown_province");

        let missing = GenerationRecord {
            megawatt_hours: Some(1.0),
            ..GenerationRecord::default()
        };
        assert!(matches!(n.normalize(&missing), Err(NormalizationError::UnknownProvince(_))));
    }

    #[test]
    fn fuel_label_prefers_source_then_generation_type_then_other() {
        let mut r = record("ON");
        r.source = Some("Coal".into());
        r.generation_type = Some("Steam Turbine".into());
        assert_eq!(resolve_fuel_label(&r), "coal");

        r.source = Some("   ".into());
        assert_eq!(resolve_fuel_label(&r), "steam turbine");

        r.source = None;
        r.generation_type = None;
        assert_eq!(resolve_fuel_label(&r), "other");
    }

    #[test]
    fn quantity_prefers_non_zero_mwh_then_converts_gwh() {
        let mut r = record("ON");
        r.megawatt_hours = Some(250.0);
        r.gigawatt_hours = Some(9.0);
        assert_eq!(resolve_quantity(&r), Ok(250.0));

        r.megawatt_hours = Some(0.0);
        assert_eq!(resolve_quantity(&r), Ok(9000.0));

        r.megawatt_hours = None;
        r.gigawatt_hours = Some(0.5);
        assert_eq!(resolve_quantity(&r), Ok(500.0));
    }

    #[test]
    fn zero_and_absent_quantities_both_count_as_zero() {
        let mut r = record("ON");
        r.megawatt_hours = Some(0.0);
        assert_eq!(resolve_quantity(&r), Ok(0.0));

        r.megawatt_hours = None;
        r.gigawatt_hours = Some(0.0);
        assert_eq!(resolve_quantity(&r), Ok(0.0));

        r.gigawatt_hours = None;
        assert_eq!(resolve_quantity(&r), Ok(0.0));
    }

    #[test]
    fn record_without_quantity_still_normalizes() {
        let r = GenerationRecord {
            province: Some("Quebec".into()),
            source: Some("Hydro".into()),
            ..GenerationRecord::default()
        };
        let n = FieldNormalizer::default().normalize(&r).unwrap();
        assert_eq!(n.province, ProvinceCode::Qc);
        assert_eq!(n.fuel_label, "hydro");
        assert_eq!(n.megawatt_hours, 0.0);
    }

    #[test]
    fn negative_and_non_finite_quantities_are_rejected() {
        let mut r = record("ON");
        r.megawatt_hours = Some(-5.0);
        assert_eq!(resolve_quantity(&r), Err(NormalizationError::InvalidQuantity(-5.0)));

        r.megawatt_hours = None;
        r.gigawatt_hours = Some(f64::INFINITY);
        assert!(matches!(resolve_quantity(&r), Err(NormalizationError::InvalidQuantity(_))));
    }

    #[test]
    fn normalize_produces_canonical_triple() {
        let r = GenerationRecord {
            province: Some("British Columbia".into()),
            generation_type: Some("Wind Power Turbine".into()),
            gigawatt_hours: Some(1.25),
            ..GenerationRecord::default()
        };
        let n = FieldNormalizer::default().normalize(&r).unwrap();
        assert_eq!(
            n,
            NormalizedRecord {
                province: ProvinceCode::Bc,
                fuel_label: "wind power turbine".into(),
                megawatt_hours: 1250.0,
            }
        );
    }
}
