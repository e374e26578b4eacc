use std::{fs::File, path::PathBuf};

use csv::StringRecord;
use mix_domain::domain::GenerationRecord;

use crate::{
    pipeline::{Envelope, EnvelopeStream, PipelineError, Source},
    transform::RecordBatch,
};

/// CSV export of generation records, emitted as a single refresh batch.
///
/// Columns are matched by header name and all are optional:
/// - province (or province_code)
/// - source, generation_type
/// - megawatt_hours, gigawatt_hours
/// - completeness_pct, data_completeness_percent
/// - date
pub struct RecordCsvFileSource {
    path: PathBuf,
}

impl RecordCsvFileSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

fn parse_optional_string(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_optional_f64(name: &str, s: &str) -> Result<Option<f64>, PipelineError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse()
        .map(Some)
        .map_err(|e| PipelineError::Source(format!("invalid {name} '{trimmed}': {e}")))
}

fn record_to_generation_record(record: &StringRecord, headers: &StringRecord) -> Result<GenerationRecord, PipelineError> {
    let get = |name: &str| -> &str {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .and_then(|idx| record.get(idx))
            .unwrap_or("")
    };

    let province = parse_optional_string(get("province")).or_else(|| parse_optional_string(get("province_code")));

    Ok(GenerationRecord {
        province,
        source: parse_optional_string(get("source")),
        generation_type: parse_optional_string(get("generation_type")),
        megawatt_hours: parse_optional_f64("megawatt_hours", get("megawatt_hours"))?,
        gigawatt_hours: parse_optional_f64("gigawatt_hours", get("gigawatt_hours"))?,
        completeness_pct: parse_optional_f64("completeness_pct", get("completeness_pct"))?,
        data_completeness_percent: parse_optional_f64(
            "data_completeness_percent",
            get("data_completeness_percent"),
        )?,
        date: parse_optional_string(get("date")),
    })
}

#[async_trait::async_trait]
impl Source<RecordBatch> for RecordCsvFileSource {
    async fn stream(&self) -> EnvelopeStream<RecordBatch> {
        // Blocking CSV reader inside one async task; refresh files are small.
        let path = self.path.clone();
        let s = async_stream::try_stream! {
            let file = File::open(&path)
                .map_err(|e| PipelineError::Source(format!("failed to open CSV file: {e}")))?;
            let mut rdr = csv::Reader::from_reader(file);
            let headers = rdr
                .headers()
                .map_err(|e| PipelineError::Source(format!("failed to read CSV headers: {e}")))?
                .clone();

            let mut batch = Vec::new();
            for (row, result) in rdr.records().enumerate() {
                let parsed = result
                    .map_err(|e| PipelineError::Source(format!("failed to read CSV record: {e}")))
                    .and_then(|record| record_to_generation_record(&record, &headers));

                match parsed {
                    Ok(r) => batch.push(r),
                    Err(e) => {
                        metrics::counter!("records_csv_parse_errors_total").increment(1);
                        tracing::warn!(row = row + 1, error = %e, "skipping unparseable CSV row");
                    }
                }
            }

            yield Envelope::now(batch);
        };

        Box::pin(s)
    }
}
