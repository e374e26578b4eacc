use std::collections::BTreeMap;

use mix_domain::domain::{ProvinceCode, ProvinceSummary};

use super::classify::ClassifiedRecord;

#[derive(Default)]
struct ProvinceTotals {
    renewable_mwh: f64,
    fossil_mwh: f64,
    total_mwh: f64,
    sources: BTreeMap<String, f64>,
}

impl ProvinceTotals {
    fn add(&mut self, record: ClassifiedRecord) {
        if record.clean {
            self.renewable_mwh += record.megawatt_hours;
        } else {
            self.fossil_mwh += record.megawatt_hours;
        }
        self.total_mwh += record.megawatt_hours;
        *self.sources.entry(record.fuel_label).or_insert(0.0) += record.megawatt_hours;
    }

    fn into_summary(self, province: ProvinceCode) -> ProvinceSummary {
        ProvinceSummary {
            province,
            renewable_pct: renewable_share_pct(self.renewable_mwh, self.total_mwh),
            renewable_mwh: self.renewable_mwh,
            fossil_mwh: self.fossil_mwh,
            total_mwh: self.total_mwh,
            sources: self.sources,
            has_live_data: true,
        }
    }
}

/// `renewable / total * 100`, or 0 when there is no generation.
///
/// Dividing first keeps an all-clean row at exactly 100.
pub fn renewable_share_pct(renewable_mwh: f64, total_mwh: f64) -> f64 {
    if total_mwh > 0.0 {
        renewable_mwh / total_mwh * 100.0
    } else {
        0.0
    }
}

/// One live summary per province observed in `records`, in canonical order.
pub fn aggregate<I>(records: I) -> Vec<ProvinceSummary>
where
    I: IntoIterator<Item = ClassifiedRecord>,
{
    let mut groups: BTreeMap<ProvinceCode, ProvinceTotals> = BTreeMap::new();
    for record in records {
        groups.entry(record.province).or_default().add(record);
    }

    groups
        .into_iter()
        .map(|(province, totals)| totals.into_summary(province))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(province: ProvinceCode, label: &str, mwh: f64, clean: bool) -> ClassifiedRecord {
        ClassifiedRecord {
            province,
            fuel_label: label.to_string(),
            megawatt_hours: mwh,
            clean,
        }
    }

    #[test]
    fn splits_clean_and_fossil_per_province() {
        let rows = aggregate(vec![
            rec(ProvinceCode::Ab, "natural gas", 300.0, false),
            rec(ProvinceCode::On, "hydraulic turbine", 500.0, true),
            rec(ProvinceCode::On, "coal", 500.0, false),
            rec(ProvinceCode::Ab, "wind", 100.0, true),
        ]);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].province, ProvinceCode::On);
        assert_eq!(rows[0].renewable_mwh, 500.0);
        assert_eq!(rows[0].fossil_mwh, 500.0);
        assert_eq!(rows[0].renewable_pct, 50.0);

        let ab = &rows[1];
        assert_eq!(ab.total_mwh, 400.0);
        assert_eq!(ab.renewable_pct, 25.0);
        assert!(ab.has_live_data);
    }

    #[test]
    fn sources_accumulate_by_label() {
        let rows = aggregate(vec![
            rec(ProvinceCode::Qc, "hydro", 10.0, true),
            rec(ProvinceCode::Qc, "hydro", 15.0, true),
            rec(ProvinceCode::Qc, "other", 5.0, false),
        ]);
        let qc = &rows[0];
        assert_eq!(qc.sources.get("hydro"), Some(&25.0));
        assert_eq!(qc.sources.get("other"), Some(&5.0));
        assert_eq!(qc.sources.values().sum::<f64>(), qc.total_mwh);
    }

    #[test]
    fn zero_generation_yields_zero_percent() {
        let rows = aggregate(vec![rec(ProvinceCode::Nu, "diesel", 0.0, false)]);
        assert_eq!(rows[0].total_mwh, 0.0);
        assert_eq!(rows[0].renewable_pct, 0.0);
        assert_eq!(rows[0].sources.get("diesel"), Some(&0.0));
    }

    #[test]
    fn all_clean_share_never_exceeds_one_hundred() {
        let mwh = 30890.402148282563;
        assert_eq!(renewable_share_pct(mwh, mwh), 100.0);

        let rows = aggregate(vec![rec(ProvinceCode::On, "hydraulic turbine", mwh, true)]);
        assert!(rows[0].renewable_pct <= 100.0);
    }

    #[test]
    fn empty_input_yields_no_rows() {
        assert!(aggregate(Vec::new()).is_empty());
    }
}
