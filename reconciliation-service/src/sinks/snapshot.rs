use std::{net::SocketAddr, sync::Arc};

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use futures::StreamExt;
use serde::Serialize;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use crate::{
    engine::EngineOutput,
    pipeline::{Envelope, PipelineError, Sink},
};

/// Latest reconciled view, as served to the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    #[serde(with = "time::serde::rfc3339")]
    pub computed_at: OffsetDateTime,
    #[serde(flatten)]
    pub output: EngineOutput,
}

/// Shared handle to the most recent snapshot.
#[derive(Clone, Default)]
pub struct SnapshotStore {
    latest: Arc<RwLock<Option<Arc<Snapshot>>>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn latest(&self) -> Option<Arc<Snapshot>> {
        self.latest.read().await.clone()
    }

    pub async fn publish(&self, output: EngineOutput) -> Arc<Snapshot> {
        let snapshot = Arc::new(Snapshot {
            computed_at: OffsetDateTime::now_utc(),
            output,
        });
        *self.latest.write().await = Some(snapshot.clone());
        snapshot
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/snapshot", get(latest_snapshot))
            .with_state(self.clone())
    }

    /// Serve `GET /snapshot` on `bind_addr` in the background.
    pub fn serve(&self, bind_addr: &str) -> Result<(), PipelineError> {
        let addr: SocketAddr = bind_addr
            .parse()
            .map_err(|e| PipelineError::Sink(format!("invalid snapshot bind addr: {e}")))?;
        let app = self.router();

        tokio::spawn(async move {
            match tokio::net::TcpListener::bind(addr).await {
                Ok(listener) => {
                    if let Err(e) = axum::serve(listener, app.into_make_service()).await {
                        tracing::error!(error = %e, "snapshot server error");
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "failed to bind snapshot listener");
                }
            }
        });
        Ok(())
    }
}

async fn latest_snapshot(State(store): State<SnapshotStore>) -> Result<Json<Snapshot>, StatusCode> {
    store
        .latest()
        .await
        .map(|snapshot| Json(Snapshot::clone(&snapshot)))
        .ok_or(StatusCode::SERVICE_UNAVAILABLE)
}

/// Publishes each reconciled batch to a [`SnapshotStore`].
pub struct SnapshotSink {
    store: SnapshotStore,
}

impl SnapshotSink {
    pub fn new(store: SnapshotStore) -> Self {
        Self { store }
    }
}

#[async_trait::async_trait]
impl Sink<EngineOutput> for SnapshotSink {
    async fn run<S>(&self, mut input: S) -> Result<(), PipelineError>
    where
        S: futures::Stream<Item = Result<Envelope<EngineOutput>, PipelineError>> + Send + Unpin + 'static,
    {
        while let Some(item) = input.next().await {
            let env = match item {
                Ok(env) => env,
                Err(e) => {
                    tracing::error!(error = %e, "error in upstream pipeline for SnapshotSink");
                    continue;
                }
            };

            let received_at = env.received_at;
            let snapshot = self.store.publish(env.payload).await;
            metrics::counter!("snapshots_published_total").increment(1);

            if let Ok(dur) = std::time::SystemTime::now().duration_since(received_at) {
                metrics::histogram!("refresh_end_to_end_latency_seconds").record(dur.as_secs_f64());
            }

            let report = &snapshot.output.report;
            tracing::info!(
                received = report.quality.received,
                excluded = report.quality.excluded,
                dropped = report.dropped.total(),
                mode = ?report.mode,
                "provincial mix snapshot published"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{engine::ReconciliationEngine, reference::ReferenceStore};

    fn output() -> EngineOutput {
        ReconciliationEngine::new(ReferenceStore::builtin().unwrap()).run(&[])
    }

    #[tokio::test]
    async fn sink_publishes_latest_and_skips_errors() {
        let store = SnapshotStore::new();
        let sink = SnapshotSink::new(store.clone());
        let items = vec![
            Ok(Envelope::now(output())),
            Err(PipelineError::Transform("too big".into())),
        ];

        sink.run(futures::stream::iter(items)).await.unwrap();

        let latest = store.latest().await.unwrap();
        assert_eq!(latest.output.summaries.len(), 13);
    }

    #[tokio::test]
    async fn handler_reports_unavailable_until_first_publish() {
        let store = SnapshotStore::new();
        assert_eq!(
            latest_snapshot(State(store.clone())).await.err(),
            Some(StatusCode::SERVICE_UNAVAILABLE)
        );

        store.publish(output()).await;
        assert!(latest_snapshot(State(store)).await.is_ok());
    }

    #[test]
    fn snapshot_serializes_flat_with_rfc3339_timestamp() {
        let snapshot = Snapshot {
            computed_at: time::macros::datetime!(2024-01-01 00:00:00 UTC),
            output: output(),
        };
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["computed_at"], "2024-01-01T00:00:00Z");
        assert_eq!(json["summaries"].as_array().unwrap().len(), 13);
        assert_eq!(json["report"]["mode"]["mode"], "reference_only");
    }
}
