use serde::Deserialize;
use std::fs;

use crate::transform::{quality::DEFAULT_COMPLETENESS_THRESHOLD, reconcile};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    pub completeness_threshold: f64,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            completeness_threshold: DEFAULT_COMPLETENESS_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    pub min_live_provinces: usize,
    pub notional_total_mwh: f64,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            min_live_provinces: reconcile::MIN_LIVE_PROVINCES,
            notional_total_mwh: reconcile::NOTIONAL_TOTAL_MWH,
        }
    }
}

/// Without a path the built-in table is used.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReferenceConfig {
    pub path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpSourceConfig {
    pub http_bind_addr: String,
    pub channel_capacity: usize,
    pub max_batch_records: usize,
}

impl Default for HttpSourceConfig {
    fn default() -> Self {
        Self {
            http_bind_addr: "0.0.0.0:8080".to_string(),
            channel_capacity: 16,
            max_batch_records: 50_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    pub bind_addr: String,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8081".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    pub bind_addr: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub quality: QualityConfig,
    pub reconcile: ReconcileConfig,
    pub reference: ReferenceConfig,
    pub source: HttpSourceConfig,
    pub snapshot: SnapshotConfig,
    pub metrics: Option<MetricsConfig>,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        use std::env;

        let path = env::var("RECONCILIATION_CONFIG")
            .unwrap_or_else(|_| "reconciliation-config.toml".to_string());
        let contents = fs::read_to_string(&path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> anyhow::Result<Self> {
        let cfg: AppConfig = toml::from_str(contents)?;
        Ok(cfg)
    }
}
