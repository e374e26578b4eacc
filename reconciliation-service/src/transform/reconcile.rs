use std::collections::BTreeMap;

use mix_domain::domain::{ProvinceCode, ProvinceSummary, ReferenceEntry};
use serde::Serialize;

use crate::reference::ReferenceStore;

/// Below this many live provinces the live data is discarded entirely.
pub const MIN_LIVE_PROVINCES: usize = 3;

/// Generation total each reference row is scaled to.
pub const NOTIONAL_TOTAL_MWH: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ReconcileMode {
    /// Every row comes from the reference table.
    ReferenceOnly { discarded_live: usize },
    /// Live rows kept, reference rows fill the gaps.
    Blended { live: usize, injected: usize },
}

#[derive(Debug, Clone)]
pub struct Reconciliation {
    /// Exactly one row per [`ProvinceCode`], in canonical order.
    pub rows: Vec<ProvinceSummary>,
    pub mode: ReconcileMode,
}

#[derive(Debug, Clone, Copy)]
pub struct Reconciler {
    pub min_live_provinces: usize,
    pub notional_total_mwh: f64,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self {
            min_live_provinces: MIN_LIVE_PROVINCES,
            notional_total_mwh: NOTIONAL_TOTAL_MWH,
        }
    }
}

impl Reconciler {
    pub fn reconcile(&self, live: Vec<ProvinceSummary>, reference: &ReferenceStore) -> Reconciliation {
        let mut live: BTreeMap<ProvinceCode, ProvinceSummary> =
            live.into_iter().map(|row| (row.province, row)).collect();

        if live.is_empty() || live.len() < self.min_live_provinces {
            if live.is_empty() {
                tracing::debug!("no live provincial data; using reference mix");
            } else {
                tracing::info!(
                    live_provinces = live.len(),
                    min_live_provinces = self.min_live_provinces,
                    "live data below minimum province coverage; using reference mix"
                );
            }
            let rows = reference
                .entries()
                .map(|entry| self.scale_reference(entry))
                .collect();
            return Reconciliation {
                rows,
                mode: ReconcileMode::ReferenceOnly {
                    discarded_live: live.len(),
                },
            };
        }

        let live_count = live.len();
        let rows: Vec<ProvinceSummary> = ProvinceCode::ALL
            .into_iter()
            .map(|code| match live.remove(&code) {
                Some(row) => ProvinceSummary {
                    has_live_data: true,
                    ..row
                },
                None => self.scale_reference(reference.entry(code)),
            })
            .collect();

        let injected = rows.len() - live_count;
        tracing::debug!(live = live_count, injected, "blended live data with reference mix");

        Reconciliation {
            rows,
            mode: ReconcileMode::Blended {
                live: live_count,
                injected,
            },
        }
    }

    /// Reference percentages expressed against the notional total.
    pub fn scale_reference(&self, entry: &ReferenceEntry) -> ProvinceSummary {
        let total = self.notional_total_mwh;
        let renewable_mwh = total * entry.renewable_pct / 100.0;
        ProvinceSummary {
            province: entry.province,
            renewable_mwh,
            fossil_mwh: total - renewable_mwh,
            total_mwh: total,
            renewable_pct: entry.renewable_pct,
            sources: entry
                .sources
                .iter()
                .map(|(label, pct)| (label.clone(), total * pct / 100.0))
                .collect(),
            has_live_data: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn live_row(province: ProvinceCode, renewable: f64, fossil: f64) -> ProvinceSummary {
        let total = renewable + fossil;
        ProvinceSummary {
            province,
            renewable_mwh: renewable,
            fossil_mwh: fossil,
            total_mwh: total,
            renewable_pct: 100.0 * renewable / total,
            sources: BTreeMap::from([
                ("hydro".to_string(), renewable),
                ("coal".to_string(), fossil),
            ]),
            has_live_data: true,
        }
    }

    fn store() -> ReferenceStore {
        ReferenceStore::builtin().unwrap()
    }

    fn assert_full_coverage(rows: &[ProvinceSummary]) {
        let codes: Vec<ProvinceCode> = rows.iter().map(|r| r.province).collect();
        assert_eq!(codes, ProvinceCode::ALL.to_vec());
    }

    #[test]
    fn no_live_rows_returns_scaled_reference() {
        let out = Reconciler::default().reconcile(Vec::new(), &store());
        assert_full_coverage(&out.rows);
        assert_eq!(out.mode, ReconcileMode::ReferenceOnly { discarded_live: 0 });
        assert!(out.rows.iter().all(|r| !r.has_live_data));
        assert!(out.rows.iter().all(|r| r.total_mwh == NOTIONAL_TOTAL_MWH));

        let on = &out.rows[ProvinceCode::On.index()];
        assert_eq!(on.renewable_pct, 93.0);
        assert!((on.renewable_mwh - 930.0).abs() < 1e-9);
        assert!((on.sources["nuclear"] - 580.0).abs() < 1e-9);
    }

    #[test]
    fn two_live_provinces_fall_back_entirely() {
        let live = vec![
            live_row(ProvinceCode::On, 500.0, 500.0),
            live_row(ProvinceCode::Ab, 10.0, 90.0),
        ];
        let out = Reconciler::default().reconcile(live, &store());
        assert_full_coverage(&out.rows);
        assert_eq!(out.mode, ReconcileMode::ReferenceOnly { discarded_live: 2 });
        assert!(out.rows.iter().all(|r| !r.has_live_data));
        assert_eq!(out.rows[ProvinceCode::On.index()].renewable_pct, 93.0);
    }

    #[test]
    fn three_live_provinces_are_kept_unchanged() {
        let live = vec![
            live_row(ProvinceCode::On, 500.0, 500.0),
            live_row(ProvinceCode::Ab, 10.0, 90.0),
            live_row(ProvinceCode::Nu, 1.0, 3.0),
        ];
        let out = Reconciler::default().reconcile(live.clone(), &store());
        assert_full_coverage(&out.rows);
        assert_eq!(out.mode, ReconcileMode::Blended { live: 3, injected: 10 });

        for row in &live {
            assert_eq!(&out.rows[row.province.index()], row);
        }
        let reference_rows = out.rows.iter().filter(|r| !r.has_live_data).count();
        assert_eq!(reference_rows, 10);
    }

    #[test]
    fn custom_floor_and_notional_total_apply() {
        let reconciler = Reconciler {
            min_live_provinces: 1,
            notional_total_mwh: 10.0,
        };
        let out = reconciler.reconcile(vec![live_row(ProvinceCode::Yt, 1.0, 1.0)], &store());
        assert_eq!(out.mode, ReconcileMode::Blended { live: 1, injected: 12 });
        assert_eq!(out.rows[ProvinceCode::Qc.index()].total_mwh, 10.0);
    }

    #[test]
    fn scaled_reference_rows_conserve_energy() {
        let out = Reconciler::default().reconcile(Vec::new(), &store());
        for row in &out.rows {
            let sources: f64 = row.sources.values().sum();
            assert!((row.renewable_mwh + row.fossil_mwh - row.total_mwh).abs() < 1e-6);
            assert!((sources - row.total_mwh).abs() < 1e-6, "{}", row.province);
        }
    }
}
