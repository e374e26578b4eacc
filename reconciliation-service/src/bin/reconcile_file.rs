use anyhow::{bail, Context, Result};
use reconciliation_service::{
    config::AppConfig,
    observability,
    pipeline::{Pipeline, Source},
    sinks::{SnapshotSink, SnapshotStore},
    sources::{RecordCsvFileSource, RecordNdjsonFileSource},
    transform::{BatchSizeLimit, RecordBatch, ReconcileStage},
    EngineOutput, ReconciliationEngine,
};
use std::{env, path::Path, sync::Arc};

/// Reconcile one exported file and print the snapshot as JSON on stdout.
#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        bail!("usage: reconcile_file <records.ndjson|records.csv>");
    }
    let file_path = Path::new(&args[1]);

    // Missing config file is fine here: every section has defaults.
    let cfg = if env::var_os("RECONCILIATION_CONFIG").is_some() {
        AppConfig::load()?
    } else {
        AppConfig::default()
    };
    let engine = Arc::new(ReconciliationEngine::from_config(&cfg)?);
    let store = SnapshotStore::new();

    let is_csv = file_path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if is_csv {
        run(RecordCsvFileSource::new(file_path), &cfg, engine, store.clone()).await?;
    } else {
        run(RecordNdjsonFileSource::new(file_path), &cfg, engine, store.clone()).await?;
    }

    let snapshot = store
        .latest()
        .await
        .context("records file produced no batch")?;
    println!("{}", serde_json::to_string_pretty(&*snapshot)?);

    Ok(())
}

async fn run<S>(source: S, cfg: &AppConfig, engine: Arc<ReconciliationEngine>, store: SnapshotStore) -> Result<()>
where
    S: Source<RecordBatch> + 'static,
{
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
