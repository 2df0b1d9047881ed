//! CSV wire format for sensitivity records.
//!
//! ```text
//! TradeId,Factor1,ShiftSize1,Factor2,ShiftSize2,Kind,Value,BaseNpv,Currency
//! SWAP1,DiscountCurve/EUR/5/10Y,0.00001,,,Delta,-8731.2,1520.4,EUR
//! SWAP1,DiscountCurve/EUR/5/10Y,0.00001,,,Gamma,#N/A:PricingFailure,1520.4,EUR
//! ```
//!
//! Factors use the `Category/Qualifier/index/label` key form and are parsed
//! back into [`RiskFactorKey`]s on import. Unavailable values are written
//! as `#N/A:<reason>`.

use std::borrow::Borrow;
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};

use sensi_core::market::RiskFactorKey;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::record::{SensitivityRecord, SensitivityValue, UnavailableReason};

/// Column names, in order.
pub const CSV_HEADER: [&str; 9] = [
    "TradeId",
    "Factor1",
    "ShiftSize1",
    "Factor2",
    "ShiftSize2",
    "Kind",
    "Value",
    "BaseNpv",
    "Currency",
];

/// Prefix of an unavailable value.
pub const UNAVAILABLE_PREFIX: &str = "#N/A:";

/// Errors reading or writing record files.
#[derive(Debug, Error)]
pub enum ReportError {
    /// CSV encoding or decoding failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// File could not be opened or created.
    #[error("Cannot open {path}: {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// A row decoded but holds an invalid field.
    #[error("Line {line}: {message}")]
    Parse {
        /// 1-based line number
        line: u64,
        /// What was wrong
        message: String,
    },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CsvRow {
    trade_id: String,
    factor1: String,
    shift_size1: f64,
    factor2: Option<String>,
    shift_size2: Option<f64>,
    kind: String,
    value: String,
    base_npv: Option<f64>,
    currency: String,
}

impl From<&SensitivityRecord> for CsvRow {
    fn from(record: &SensitivityRecord) -> Self {
        Self {
            trade_id: record.trade_id.clone(),
            factor1: record.factor1.to_string(),
            shift_size1: record.shift_size1,
            factor2: record.factor2.as_ref().map(ToString::to_string),
            shift_size2: record.shift_size2,
            kind: record.kind.to_string(),
            value: format_value(&record.value),
            base_npv: record.base_npv,
            currency: record.currency.to_string(),
        }
    }
}

impl CsvRow {
    fn into_record(self) -> Result<SensitivityRecord, String> {
        let factor1: RiskFactorKey = self.factor1.parse().map_err(|e| format!("Factor1: {e}"))?;
        let factor2 = self
            .factor2
            .map(|f| f.parse::<RiskFactorKey>())
            .transpose()
            .map_err(|e| format!("Factor2: {e}"))?;
        Ok(SensitivityRecord {
            trade_id: self.trade_id,
            factor1,
            shift_size1: self.shift_size1,
            factor2,
            shift_size2: self.shift_size2,
            kind: self.kind.parse()?,
            value: parse_value(&self.value)?,
            base_npv: self.base_npv,
            currency: self.currency.parse().map_err(|e| format!("Currency: {e}"))?,
        })
    }
}

/// Formats a value for the `Value` column.
pub fn format_value(value: &SensitivityValue) -> String {
    match value {
        SensitivityValue::Available(v) => v.to_string(),
        SensitivityValue::Unavailable(reason) => format!("{UNAVAILABLE_PREFIX}{reason}"),
    }
}

/// Parses a `Value` column.
pub fn parse_value(s: &str) -> Result<SensitivityValue, String> {
    match s.strip_prefix(UNAVAILABLE_PREFIX) {
        Some(reason) => Ok(SensitivityValue::Unavailable(reason.parse::<UnavailableReason>()?)),
        None => s
            .parse::<f64>()
            .map(SensitivityValue::Available)
            .map_err(|_| format!("invalid value '{s}'")),
    }
}

/// Writes `records` with a header row. Returns the number of records.
pub fn write_csv<W, I, R>(writer: W, records: I) -> Result<usize, ReportError>
where
    W: io::Write,
    I: IntoIterator<Item = R>,
    R: Borrow<SensitivityRecord>,
{
    let mut csv = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv.write_record(CSV_HEADER)?;
    let mut count = 0;
    for record in records {
        csv.serialize(CsvRow::from(record.borrow()))?;
        count += 1;
    }
    csv.flush().map_err(csv::Error::from)?;
    Ok(count)
}

/// Writes `records` to a file, replacing it.
pub fn write_csv_file<I, R>(path: impl AsRef<Path>, records: I) -> Result<usize, ReportError>
where
    I: IntoIterator<Item = R>,
    R: Borrow<SensitivityRecord>,
{
    let path = path.as_ref();
    let file = File::create(path).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let count = write_csv(BufWriter::new(file), records)?;
    tracing::info!(path = %path.display(), records = count, "Wrote sensitivity records");
    Ok(count)
}

/// Reads every record from CSV with a header row.
pub fn read_csv<R: io::Read>(reader: R) -> Result<Vec<SensitivityRecord>, ReportError> {
    let mut csv = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
    let headers = csv.headers()?.clone();
    let mut records = Vec::new();
    for row in csv.records() {
        let row = row?;
        let line = row.position().map_or(0, |p| p.line());
        let decoded: CsvRow = row.deserialize(Some(&headers))?;
        let record = decoded
            .into_record()
            .map_err(|message| ReportError::Parse { line, message })?;
        records.push(record);
    }
    Ok(records)
}

/// Reads every record from a file.
pub fn read_csv_file(path: impl AsRef<Path>) -> Result<Vec<SensitivityRecord>, ReportError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_csv(BufReader::new(file))
}
