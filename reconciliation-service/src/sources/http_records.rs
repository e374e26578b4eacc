use std::{net::SocketAddr, sync::Arc};

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use futures::StreamExt;
use mix_domain::domain::GenerationRecord;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::{
    pipeline::{Envelope, EnvelopeStream, PipelineError, Source},
    transform::RecordBatch,
};

#[derive(Clone)]
struct SharedSender {
    tx: mpsc::Sender<Envelope<RecordBatch>>,
}

/// `POST /ingest/provincial_generation` with a JSON array of records. Each
/// request body is one refresh batch.
#[derive(Clone)]
pub struct HttpRecordBatchSource {
    receiver: Arc<tokio::sync::Mutex<Option<mpsc::Receiver<Envelope<RecordBatch>>>>>,
}

fn router(shared: SharedSender) -> Router {
    Router::new()
        .route("/ingest/provincial_generation", post(ingest_records))
        .with_state(shared)
}

impl HttpRecordBatchSource {
    pub async fn new(bind_addr: &str, channel_capacity: usize) -> Result<Self, PipelineError> {
        let (tx, rx) = mpsc::channel(channel_capacity);
        let app = router(SharedSender { tx });

        let addr: SocketAddr = bind_addr
            .parse()
            .map_err(|e| PipelineError::Source(format!("invalid bind addr: {e}")))?;

        tokio::spawn(async move {
            match tokio::net::TcpListener::bind(addr).await {
                Ok(listener) => {
                    if let Err(e) = axum::serve(listener, app.into_make_service()).await {
                        tracing::error!(error = %e, "HTTP provincial_generation source server error");
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "failed to bind provincial_generation listener");
                }
            }
        });

        Ok(Self::from_receiver(rx))
    }

    fn from_receiver(rx: mpsc::Receiver<Envelope<RecordBatch>>) -> Self {
        Self {
            receiver: Arc::new(tokio::sync::Mutex::new(Some(rx))),
        }
    }
}

#[async_trait::async_trait]
impl Source<RecordBatch> for HttpRecordBatchSource {
    async fn stream(&self) -> EnvelopeStream<RecordBatch> {
        let mut guard = self.receiver.lock().await;
        let stream: EnvelopeStream<RecordBatch> = match guard.take() {
            Some(rx) => Box::pin(ReceiverStream::new(rx).map(Ok::<_, PipelineError>)),
            None => Box::pin(futures::stream::once(async {
                Err::<Envelope<RecordBatch>, _>(PipelineError::Source(
                    "HttpRecordBatchSource stream already taken; only one consumer supported".to_string(),
                ))
            })),
        };
        stream
    }
}

async fn ingest_records(
    State(sender): State<SharedSender>,
    Json(payload): Json<Vec<GenerationRecord>>,
) -> Result<StatusCode, StatusCode> {
    metrics::counter!("http_generation_ingest_requests_total").increment(1);

    if let Err(_e) = sender.tx.send(Envelope::now(payload)).await {
        // Channel closed; treat as server error
        metrics::counter!("http_generation_ingest_failed_total").increment(1);
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    Ok(StatusCode::ACCEPTED)
}
