use std::path::PathBuf;

use async_stream::try_stream;
use mix_domain::domain::GenerationRecord;
use tokio::{fs::File, io::{AsyncBufReadExt, BufReader}};

use crate::{
    pipeline::{Envelope, EnvelopeStream, PipelineError, Source},
    transform::RecordBatch,
};

/// NDJSON file of generation records, emitted as a single refresh batch.
///
/// Each non-blank line is one JSON object in either feed convention. Lines
/// that fail to parse are counted and skipped.
pub struct RecordNdjsonFileSource {
    path: PathBuf,
}

impl RecordNdjsonFileSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

pub(crate) fn parse_line(line: &str) -> Option<Result<GenerationRecord, serde_json::Error>> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(serde_json::from_str(trimmed))
    }
}

#[async_trait::async_trait]
impl Source<RecordBatch> for RecordNdjsonFileSource {
    async fn stream(&self) -> EnvelopeStream<RecordBatch> {
        let path = self.path.clone();
        let s = try_stream! {
            let file = File::open(&path).await.map_err(|e| {
                PipelineError::Source(format!("failed to open records file: {e}"))
            })?;
            let reader = BufReader::new(file);
            let mut lines = reader.lines();
            let mut batch = Vec::new();
            let mut line_no: usize = 0;

            while let Some(line) = lines.next_line().await.map_err(|e| {
                PipelineError::Source(format!("failed to read records line: {e}"))
            })? {
                line_no += 1;
                match parse_line(&line) {
                    Some(Ok(record)) => batch.push(record),
                    Some(Err(e)) => {
                        metrics::counter!("records_ndjson_parse_errors_total").increment(1);
                        tracing::warn!(line = line_no, error = %e, "skipping unparseable record line");
                    }
                    None => {}
                }
            }

            yield Envelope::now(batch);
        };

        Box::pin(s)
    }
}
