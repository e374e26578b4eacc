pub mod config;
pub mod engine;
pub mod metrics_server;
pub mod observability;
pub mod pipeline;
pub mod reference;
pub mod sinks;
pub mod sources;
pub mod transform;

pub use engine::{EngineOutput, ReconciliationEngine};
pub use pipeline::{Envelope, Pipeline};
