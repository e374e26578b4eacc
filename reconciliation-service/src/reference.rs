//! Versioned provincial mix estimates, shipped with the binary.

use std::{fs, path::Path};

use mix_domain::domain::{ProvinceCode, ReferenceEntry};
use serde::Deserialize;

/// Reference table compiled into the binary.
pub const BUILTIN_REFERENCE: &str = include_str!("../data/reference_mix.toml");

const PCT_TOLERANCE: f64 = 1e-6;

#[derive(thiserror::Error, Debug)]
pub enum ReferenceError {
    #[error("failed to read reference table: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse reference table: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("province {0} appears more than once")]
    Duplicate(ProvinceCode),
    #[error("province {0} is missing")]
    Missing(ProvinceCode),
    #[error("province {province}: {reason}")]
    Invalid {
        province: ProvinceCode,
        reason: String,
    },
}

#[derive(Deserialize)]
struct ReferenceFile {
    version: String,
    provinces: Vec<ReferenceEntry>,
}

/// One entry per tracked province, indexed by [`ProvinceCode::index`].
#[derive(Debug, Clone)]
pub struct ReferenceStore {
    version: String,
    digest: String,
    entries: Vec<ReferenceEntry>,
}

impl ReferenceStore {
    pub fn builtin() -> Result<Self, ReferenceError> {
        Self::from_toml_str(BUILTIN_REFERENCE)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ReferenceError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ReferenceError> {
        let file: ReferenceFile = toml::from_str(contents)?;

        let mut slots: Vec<Option<ReferenceEntry>> = vec![None; ProvinceCode::ALL.len()];
        for entry in file.provinces {
            validate_entry(&entry)?;
            let slot = &mut slots[entry.province.index()];
            if slot.is_some() {
                return Err(ReferenceError::Duplicate(entry.province));
            }
            *slot = Some(entry);
        }

        let entries = ProvinceCode::ALL
            .into_iter()
            .zip(slots)
            .map(|(code, slot)| slot.ok_or(ReferenceError::Missing(code)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            version: file.version,
            digest: blake3::hash(contents.as_bytes()).to_hex().to_string(),
            entries,
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// blake3 digest of the table text, for provenance in snapshots.
    pub fn digest(&self) -> &str {
        &self.digest
    }

    pub fn entry(&self, province: ProvinceCode) -> &ReferenceEntry {
        &self.entries[province.index()]
    }

    pub fn entries(&self) -> impl Iterator<Item = &ReferenceEntry> {
        self.entries.iter()
    }
}

fn validate_entry(entry: &ReferenceEntry) -> Result<(), ReferenceError> {
    let invalid = |reason: String| ReferenceError::Invalid {
        province: entry.province,
        reason,
    };

    if !(0.0..=100.0).contains(&entry.renewable_pct) {
        return Err(invalid(format!(
            "renewable_pct {} outside 0..=100",
            entry.renewable_pct
        )));
    }
    if let Some((label, pct)) = entry.sources.iter().find(|(_, pct)| !(**pct >= 0.0)) {
        return Err(invalid(format!("source {label:?} has negative share {pct}")));
    }
    let total: f64 = entry.sources.values().sum();
    if (total - 100.0).abs() > PCT_TOLERANCE {
        return Err(invalid(format!("source shares sum to {total}, expected 100")));
    }
    Ok(())
}
