//! Sensitivity extraction and reporting.
//!
//! - [`SensitivityExtractor`]: finite differences from a filled cube
//! - [`SensitivityStream`]: lazy per-trade record iteration
//! - [`RiskFilter`]: record selection
//! - [`aggregate`], [`SensitivityAggregator`]: portfolio reductions
//! - [`write_csv`], [`read_csv`]: the record wire format

mod aggregate;
mod export;
mod extractor;
mod filter;
mod record;
mod stream;

pub use aggregate::{
    aggregate, aggregate_parallel, AggregatedValue, CategoryGroup, FactorGroup,
    SensitivityAggregator,
};
pub use export::{
    format_value, parse_value, read_csv, read_csv_file, write_csv, write_csv_file, ReportError,
    CSV_HEADER, UNAVAILABLE_PREFIX,
};
pub use extractor::{SensitivityExtractor, MIN_ABS_SHIFT};
pub use filter::RiskFilter;
pub use record::{SensitivityKind, SensitivityRecord, SensitivityValue, UnavailableReason};
pub use stream::SensitivityStream;
