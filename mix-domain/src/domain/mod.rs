pub mod generation_record;
pub mod province;
pub mod summary;

pub use generation_record::GenerationRecord;
pub use province::{ProvinceCode, Region, UnknownProvince};
pub use summary::{ProvinceSummary, ReferenceEntry};
