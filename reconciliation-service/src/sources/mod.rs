pub mod csv_file;
pub mod http_records;
pub mod ndjson_file;

pub use csv_file::RecordCsvFileSource;
pub use http_records::HttpRecordBatchSource;
pub use ndjson_file::RecordNdjsonFileSource;
