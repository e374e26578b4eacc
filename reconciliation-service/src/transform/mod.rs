pub mod aggregate;
pub mod classify;
pub mod normalize;
pub mod presentation;
pub mod quality;
pub mod reconcile;

use std::sync::Arc;

use mix_domain::domain::GenerationRecord;

use crate::{
    engine::{EngineOutput, ReconciliationEngine},
    pipeline::{Envelope, PipelineError, Transform},
};

pub type RecordBatch = Vec<GenerationRecord>;

/// Pure size check of a refresh batch.
///
/// Empty batches are valid: they reconcile to the reference mix.
pub fn validate_batch(env: Envelope<RecordBatch>, max_records: usize) -> Result<Envelope<RecordBatch>, PipelineError> {
    if env.payload.len() > max_records {
        return Err(PipelineError::Transform(format!(
            "batch of {} records exceeds limit of {max_records}",
            env.payload.len()
        )));
    }
    Ok(env)
}

#[derive(Clone)]
pub struct BatchSizeLimit {
    pub max_records: usize,
}

#[async_trait::async_trait]
impl Transform<RecordBatch, RecordBatch> for BatchSizeLimit {
    async fn apply(&self, input: Envelope<RecordBatch>) -> Result<Envelope<RecordBatch>, PipelineError> {
        match validate_batch(input, self.max_records) {
            Ok(env) => Ok(env),
            Err(e) => {
                metrics::counter!("reconcile_batches_rejected_total").increment(1);
                Err(e)
            }
        }
    }
}

/// Runs the synchronous engine over each batch.
#[derive(Clone)]
pub struct ReconcileStage {
    engine: Arc<ReconciliationEngine>,
}

impl ReconcileStage {
    pub fn new(engine: Arc<ReconciliationEngine>) -> Self {
        Self { engine }
    }
}

#[async_trait::async_trait]
impl Transform<RecordBatch, EngineOutput> for ReconcileStage {
    async fn apply(&self, input: Envelope<RecordBatch>) -> Result<Envelope<EngineOutput>, PipelineError> {
        Ok(Envelope {
            payload: self.engine.run(&input.payload),
            received_at: input.received_at,
        })
    }
}
