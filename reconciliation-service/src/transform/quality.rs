use mix_domain::domain::GenerationRecord;
use serde::Serialize;

pub const DEFAULT_COMPLETENESS_THRESHOLD: f64 = 95.0;

/// Score assumed for records that carry no completeness field.
const ASSUMED_COMPLETENESS: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityGrade {
    Excellent,
    Good,
    Acceptable,
    Poor,
    Insufficient,
}

impl QualityGrade {
    pub fn from_completeness(pct: f64) -> Self {
        if pct >= 98.0 {
            QualityGrade::Excellent
        } else if pct >= 95.0 {
            QualityGrade::Good
        } else if pct >= 90.0 {
            QualityGrade::Acceptable
        } else if pct >= 70.0 {
            QualityGrade::Poor
        } else {
            QualityGrade::Insufficient
        }
    }
}

/// Accepted subset plus the figures behind the data-quality banner.
#[derive(Debug)]
pub struct GateOutcome<'a> {
    pub accepted: Vec<&'a GenerationRecord>,
    pub excluded: usize,
    /// Mean effective completeness over every input record.
    pub mean_completeness: Option<f64>,
}

impl GateOutcome<'_> {
    pub fn grade(&self) -> Option<QualityGrade> {
        self.mean_completeness.map(QualityGrade::from_completeness)
    }
}

/// Drops records whose completeness is strictly below the threshold.
#[derive(Debug, Clone, Copy)]
pub struct QualityGate {
    threshold: f64,
}

impl QualityGate {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn effective_completeness(record: &GenerationRecord) -> f64 {
        record.completeness().unwrap_or(ASSUMED_COMPLETENESS)
    }

    /// NaN scores never pass.
    pub fn accepts(&self, record: &GenerationRecord) -> bool {
        Self::effective_completeness(record) >= self.threshold
    }

    pub fn apply<'a>(&self, records: &'a [GenerationRecord]) -> GateOutcome<'a> {
        let (accepted, rejected): (Vec<&GenerationRecord>, Vec<&GenerationRecord>) =
            records.iter().partition(|r| self.accepts(r));

        let mean_completeness = if records.is_empty() {
            None
        } else {
            let sum: f64 = records.iter().map(Self::effective_completeness).sum();
            Some(sum / records.len() as f64)
        };

        GateOutcome {
            accepted,
            excluded: rejected.len(),
            mean_completeness,
        }
    }
}

impl Default for QualityGate {
    fn default() -> Self {
        Self::new(DEFAULT_COMPLETENESS_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(pct: f64) -> GenerationRecord {
        GenerationRecord::mwh("ON", "hydro", 1.0).with_completeness(pct)
    }

    #[test]
    fn threshold_is_inclusive() {
        let gate = QualityGate::default();
        assert!(gate.accepts(&scored(95.0)));
        assert!(!gate.accepts(&scored(94.999)));
    }

    #[test]
    fn missing_score_passes_and_legacy_alias_is_read() {
        let gate = QualityGate::default();
        assert!(gate.accepts(&GenerationRecord::mwh("ON", "hydro", 1.0)));

        let legacy = GenerationRecord {
            data_completeness_percent: Some(50.0),
            ..GenerationRecord::mwh("ON", "hydro", 1.0)
        };
        assert!(!gate.accepts(&legacy));
    }

    #[test]
    fn nan_score_is_excluded() {
        assert!(!QualityGate::default().accepts(&scored(f64::NAN)));
    }

    #[test]
    fn apply_reports_excluded_count_and_mean() {
        let records = vec![scored(100.0), scored(90.0), scored(96.0), scored(94.0)];
        let outcome = QualityGate::default().apply(&records);
        assert_eq!(outcome.accepted.len(), 2);
        assert_eq!(outcome.excluded, 2);
        assert_eq!(outcome.mean_completeness, Some(95.0));
        assert_eq!(outcome.grade(), Some(QualityGrade::Good));
    }

    #[test]
    fn empty_input_has_no_grade() {
        let outcome = QualityGate::default().apply(&[]);
        assert!(outcome.accepted.is_empty());
        assert_eq!(outcome.excluded, 0);
        assert_eq!(outcome.grade(), None);
    }

    #[test]
    fn grade_bands() {
        assert_eq!(QualityGrade::from_completeness(99.0), QualityGrade::Excellent);
        assert_eq!(QualityGrade::from_completeness(92.0), QualityGrade::Acceptable);
        assert_eq!(QualityGrade::from_completeness(70.0), QualityGrade::Poor);
        assert_eq!(QualityGrade::from_completeness(12.0), QualityGrade::Insufficient);
    }
}
