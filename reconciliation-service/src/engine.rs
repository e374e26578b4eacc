//! The full refresh chain: quality gate, normalization, classification,
//! aggregation, reconciliation and presentation, as one synchronous call.

use std::time::Instant;

use mix_domain::domain::{GenerationRecord, ProvinceCode, ProvinceSummary};
use serde::Serialize;

use crate::{
    config::AppConfig,
    reference::{ReferenceError, ReferenceStore},
    transform::{
        aggregate::aggregate,
        classify::{ClassifiedRecord, CleanEnergyClassifier},
        normalize::{FieldNormalizer, NormalizationError},
        presentation::{self, HeatmapCell},
        quality::{QualityGate, QualityGrade},
        reconcile::{ReconcileMode, Reconciler},
    },
};

#[derive(thiserror::Error, Debug)]
pub enum EngineConfigError {
    #[error(transparent)]
    Reference(#[from] ReferenceError),
    #[error("invalid {setting} = {value}: expected {expected}")]
    InvalidSetting {
        setting: &'static str,
        value: f64,
        expected: &'static str,
    },
}

/// Records the normalizer could not use, by reason.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DropCounts {
    pub unknown_province: usize,
    pub invalid_quantity: usize,
}

impl DropCounts {
    fn record(&mut self, err: &NormalizationError) {
        match err {
            NormalizationError::UnknownProvince(_) => self.unknown_province += 1,
            NormalizationError::InvalidQuantity(_) => self.invalid_quantity += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.unknown_province + self.invalid_quantity
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityReport {
    pub received: usize,
    pub accepted: usize,
    pub excluded: usize,
    pub threshold: f64,
    pub mean_completeness: Option<f64>,
    pub grade: Option<QualityGrade>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub quality: QualityReport,
    pub dropped: DropCounts,
    pub mode: ReconcileMode,
    pub reference_version: String,
    pub reference_digest: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EngineOutput {
    /// One row per province, canonical order.
    pub summaries: Vec<ProvinceSummary>,
    pub heatmap: Vec<HeatmapCell>,
    pub national_average_pct: f64,
    pub top_performers: Vec<ProvinceCode>,
    pub report: RunReport,
}

#[derive(Debug, Clone)]
pub struct ReconciliationEngine {
    gate: QualityGate,
    normalizer: FieldNormalizer,
    classifier: CleanEnergyClassifier,
    reconciler: Reconciler,
    reference: ReferenceStore,
}

impl ReconciliationEngine {
    pub fn new(reference: ReferenceStore) -> Self {
        Self {
            gate: QualityGate::default(),
            normalizer: FieldNormalizer::default(),
            classifier: CleanEnergyClassifier::default(),
            reconciler: Reconciler::default(),
            reference,
        }
    }

    pub fn from_config(cfg: &AppConfig) -> Result<Self, EngineConfigError> {
        let threshold = cfg.quality.completeness_threshold;
        if !(0.0..=100.0).contains(&threshold) {
            return Err(EngineConfigError::InvalidSetting {
                setting: "quality.completeness_threshold",
                value: threshold,
                expected: "a percentage in 0..=100",
            });
        }
        let notional = cfg.reconcile.notional_total_mwh;
        if !notional.is_finite() || notional <= 0.0 {
            return Err(EngineConfigError::InvalidSetting {
                setting: "reconcile.notional_total_mwh",
                value: notional,
                expected: "a finite positive MWh total",
            });
        }

        let reference = match &cfg.reference.path {
            Some(path) => ReferenceStore::load(path)?,
            None => ReferenceStore::builtin()?,
        };
        tracing::info!(
            version = reference.version(),
            digest = reference.digest(),
            "reference mix loaded"
        );

        Ok(Self::new(reference)
            .with_gate(QualityGate::new(cfg.quality.completeness_threshold))
            .with_reconciler(Reconciler {
                min_live_provinces: cfg.reconcile.min_live_provinces,
                notional_total_mwh: cfg.reconcile.notional_total_mwh,
            }))
    }

    pub fn with_gate(mut self, gate: QualityGate) -> Self {
        self.gate = gate;
        self
    }

    pub fn with_normalizer(mut self, normalizer: FieldNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn with_classifier(mut self, classifier: CleanEnergyClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_reconciler(mut self, reconciler: Reconciler) -> Self {
        self.reconciler = reconciler;
        self
    }

    pub fn run(&self, records: &[GenerationRecord]) -> EngineOutput {
        let started = Instant::now();
        metrics::counter!("reconcile_records_received_total").increment(records.len() as u64);

        let gated = self.gate.apply(records);
        if gated.excluded > 0 {
            metrics::counter!("reconcile_records_excluded_total").increment(gated.excluded as u64);
            tracing::info!(
                excluded = gated.excluded,
                threshold = self.gate.threshold(),
                "records below completeness threshold excluded"
            );
        }

        let mut dropped = DropCounts::default();
        let classified: Vec<ClassifiedRecord> = gated
            .accepted
            .iter()
            .filter_map(|record| match self.normalizer.normalize(record) {
                Ok(normalized) => Some(self.classifier.classify(normalized)),
                Err(e) => {
                    tracing::debug!(error = %e, "dropping unusable generation record");
                    metrics::counter!("reconcile_records_dropped_total", "reason" => e.reason())
                        .increment(1);
                    dropped.record(&e);
                    None
                }
            })
            .collect();

        if dropped.unknown_province > 0 {
            tracing::warn!(
                count = dropped.unknown_province,
                "records with unrecognized province dropped"
            );
        }

        let live = aggregate(classified);
        metrics::gauge!("reconcile_live_provinces").set(live.len() as f64);

        let reconciliation = self.reconciler.reconcile(live, &self.reference);
        if matches!(reconciliation.mode, ReconcileMode::ReferenceOnly { .. }) {
            metrics::counter!("reconcile_reference_only_runs_total").increment(1);
        }

        let summaries = reconciliation.rows;
        let output = EngineOutput {
            heatmap: presentation::heatmap(&summaries),
            national_average_pct: presentation::national_average_pct(&summaries),
            top_performers: presentation::top_performers(&summaries),
            report: RunReport {
                quality: QualityReport {
                    received: records.len(),
                    accepted: gated.accepted.len(),
                    excluded: gated.excluded,
                    threshold: self.gate.threshold(),
                    mean_completeness: gated.mean_completeness,
                    grade: gated.grade(),
                },
                dropped,
                mode: reconciliation.mode,
                reference_version: self.reference.version().to_string(),
                reference_digest: self.reference.digest().to_string(),
            },
            summaries,
        };

        metrics::histogram!("reconcile_run_duration_seconds").record(started.elapsed().as_secs_f64());
        output
    }
}
