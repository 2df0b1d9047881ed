//! CLI error types.

use std::path::PathBuf;

use sensi_core::market::MarketDataError;
use sensi_models::InstrumentError;
use sensi_risk::config::ConfigError;
use sensi_risk::sensitivity::ReportError;
use sensi_risk::SensiError;
use thiserror::Error;

/// Errors raised by the `sensi` commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// An input file does not exist.
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// A file could not be read or written.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The run configuration is malformed.
    #[error("Invalid run configuration {}: {source}", path.display())]
    RunConfig {
        /// Configuration file
        path: PathBuf,
        /// Parse error
        #[source]
        source: toml::de::Error,
    },

    /// A JSON input is malformed.
    #[error("Invalid JSON in {}: {source}", path.display())]
    Json {
        /// Input file
        path: PathBuf,
        /// Parse error
        #[source]
        source: serde_json::Error,
    },

    /// The market description does not build a snapshot.
    #[error("Invalid market data: {0}")]
    Market(#[from] MarketDataError),

    /// A portfolio trade failed validation.
    #[error("Invalid trade '{trade_id}': {source}")]
    Trade {
        /// Offending trade
        trade_id: String,
        /// Validation error
        #[source]
        source: InstrumentError,
    },

    /// The shift configuration is invalid.
    #[error(transparent)]
    Shifts(#[from] ConfigError),

    /// The sensitivity run failed.
    #[error(transparent)]
    Run(#[from] SensiError),

    /// Report export or import failed.
    #[error(transparent)]
    Report(#[from] ReportError),

    /// Invalid command line argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result type for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;
