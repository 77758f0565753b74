pub mod aggregate_reporter;
pub mod collection_processor;
pub mod freshness;
pub mod station_parser;

pub use aggregate_reporter::{AggregateReporter, FieldStatistics};
pub use collection_processor::{CollectionProcessor, CollectionReport};
pub use freshness::{is_fresh, FreshnessWindow};
pub use station_parser::{ParsedBatch, StationRecordParser};
