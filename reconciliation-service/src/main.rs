use anyhow::Result;
use reconciliation_service::{
    config::AppConfig,
    metrics_server,
    observability,
    pipeline::Pipeline,
    sinks::{SnapshotSink, SnapshotStore},
    sources::HttpRecordBatchSource,
    transform::{BatchSizeLimit, RecordBatch, ReconcileStage},
    EngineOutput, ReconciliationEngine,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    // Load configuration
    let cfg = AppConfig::load()?;

    // Start metrics server if configured
    if let Some(metrics_cfg) = &cfg.metrics {
        metrics_server::init(&metrics_cfg.bind_addr)?;
    }

    // Reference table is loaded once and shared read-only by every refresh.
    let engine = Arc::new(ReconciliationEngine::from_config(&cfg)?);

    let store = SnapshotStore::new();
    store.serve(&cfg.snapshot.bind_addr)?;

    let source = HttpRecordBatchSource::new(&cfg.source.http_bind_addr, cfg.source.channel_capacity).await?;
    tracing::info!(
        ingest_addr = %cfg.source.http_bind_addr,
        snapshot_addr = %cfg.snapshot.bind_addr,
        "provincial mix reconciliation service started"
    );

    let pipeline: Pipeline<_, RecordBatch, EngineOutput, _> = Pipeline {
        source,
        transforms: vec![Arc::new(BatchSizeLimit {
            max_records: cfg.source.max_batch_records,
        })],
        stage: Arc::new(ReconcileStage::new(engine)),
        sink: SnapshotSink::new(store),
    };

    pipeline.run().await?;

    Ok(())
}
