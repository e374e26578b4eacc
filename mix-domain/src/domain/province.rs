use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// The 13 Canadian provinces and territories tracked by the dashboard.
///
/// Declaration order is the canonical display order and drives `Ord`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProvinceCode {
    On,
    Qc,
    Bc,
    Ab,
    Sk,
    Mb,
    Ns,
    Nb,
    Pe,
    Nl,
    Yt,
    Nt,
    Nu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Region {
    West,
    Central,
    East,
    North,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown province or territory: {0:?}")]
pub struct UnknownProvince(pub String);

impl ProvinceCode {
    pub const ALL: [ProvinceCode; 13] = [
        ProvinceCode::On,
        ProvinceCode::Qc,
        ProvinceCode::Bc,
        ProvinceCode::Ab,
        ProvinceCode::Sk,
        ProvinceCode::Mb,
        ProvinceCode::Ns,
        ProvinceCode::Nb,
        ProvinceCode::Pe,
        ProvinceCode::Nl,
        ProvinceCode::Yt,
        ProvinceCode::Nt,
        ProvinceCode::Nu,
    ];

    /// Position in [`ProvinceCode::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn code(self) -> &'static str {
        match self {
            ProvinceCode::On => "ON",
            ProvinceCode::Qc => "QC",
            ProvinceCode::Bc => "BC",
            ProvinceCode::Ab => "AB",
            ProvinceCode::Sk => "SK",
            ProvinceCode::Mb => "MB",
            ProvinceCode::Ns => "NS",
            ProvinceCode::Nb => "NB",
            ProvinceCode::Pe => "PE",
            ProvinceCode::Nl => "NL",
            ProvinceCode::Yt => "YT",
            ProvinceCode::Nt => "NT",
            ProvinceCode::Nu => "NU",
        }
    }

    /// Full English name, as used by the upstream feeds.
    pub fn name(self) -> &'static str {
        match self {
            ProvinceCode::On => "Ontario",
            ProvinceCode::Qc => "Quebec",
            ProvinceCode::Bc => "British Columbia",
            ProvinceCode::Ab => "Alberta",
            ProvinceCode::Sk => "Saskatchewan",
            ProvinceCode::Mb => "Manitoba",
            ProvinceCode::Ns => "Nova Scotia",
            ProvinceCode::Nb => "New Brunswick",
            ProvinceCode::Pe => "Prince Edward Island",
            ProvinceCode::Nl => "Newfoundland and Labrador",
            ProvinceCode::Yt => "Yukon",
            ProvinceCode::Nt => "Northwest Territories",
            ProvinceCode::Nu => "Nunavut",
        }
    }

    pub fn region(self) -> Region {
        match self {
            ProvinceCode::Bc | ProvinceCode::Ab | ProvinceCode::Sk => Region::West,
            ProvinceCode::On | ProvinceCode::Qc | ProvinceCode::Mb => Region::Central,
            ProvinceCode::Ns | ProvinceCode::Nb | ProvinceCode::Pe | ProvinceCode::Nl => Region::East,
            ProvinceCode::Yt | ProvinceCode::Nt | ProvinceCode::Nu => Region::North,
        }
    }
}

impl fmt::Display for ProvinceCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Parses an exact two-letter code (case-insensitive). Name variants are
/// resolved by the normalizer's directory, not here.
impl FromStr for ProvinceCode {
    type Err = UnknownProvince;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        ProvinceCode::ALL
            .into_iter()
            .find(|p| p.code() == upper)
            .ok_or_else(|| UnknownProvince(s.to_string()))
    }
}
