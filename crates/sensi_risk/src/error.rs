//! Crate-level error type.

use thiserror::Error;

use crate::config::ConfigError;
use crate::cube::CubeError;
use crate::sensitivity::ReportError;
use crate::valuation::ValuationError;

/// Any error that aborts a sensitivity run.
///
/// Per-record problems are not errors; they surface as
/// [`SensitivityValue::Unavailable`](crate::sensitivity::SensitivityValue::Unavailable).
#[derive(Debug, Error)]
pub enum SensiError {
    /// Malformed configuration, raised before any scenario is generated.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Valuation aborted.
    #[error("Valuation error: {0}")]
    Valuation(#[from] ValuationError),

    /// Inconsistent cube.
    #[error("Cube error: {0}")]
    Cube(#[from] CubeError),

    /// Record export or import failed.
    #[error("Report error: {0}")]
    Report(#[from] ReportError),
}
