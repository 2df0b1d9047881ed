//! Run configuration for the `sensi` binary.
//!
//! A run file names the inputs, the outputs and the valuation options:
//!
//! ```toml
//! log_level = "info"
//!
//! [inputs]
//! shifts = "shifts.toml"
//! market = "market.json"
//! portfolio = "portfolio.json"
//!
//! [output]
//! sensitivities = "out/sensitivities.csv"
//! diagnostics = "out/diagnostics.json"
//!
//! [valuation]
//! backend = "Sparse"
//! threads = 0
//! ```
//!
//! Relative paths are resolved against the directory of the run file.
//! `threads = 0` sizes the pool to the number of logical CPUs.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use sensi_risk::valuation::ValuationConfig;

use crate::error::{CliError, Result};

/// Log levels accepted in the run file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl std::str::FromStr for LogLevel {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(CliError::InvalidArgument(format!("log level '{s}'"))),
        }
    }
}

impl LogLevel {
    /// Convert log level to tracing filter string
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

/// Input files of a run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputPaths {
    /// Shift configuration (TOML)
    pub shifts: PathBuf,
    /// Market description (JSON)
    pub market: PathBuf,
    /// Portfolio (JSON)
    pub portfolio: PathBuf,
}

/// Output files of a run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputPaths {
    /// Sensitivity report (CSV)
    pub sensitivities: PathBuf,
    /// Diagnostics sidecar (JSON); skipped when absent
    pub diagnostics: Option<PathBuf>,
}

impl Default for OutputPaths {
    fn default() -> Self {
        Self {
            sensitivities: PathBuf::from("sensitivities.csv"),
            diagnostics: None,
        }
    }
}

/// Everything `sensi run` needs.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Default log level, overridden by `RUST_LOG` and `--verbose`
    #[serde(default)]
    pub log_level: LogLevel,
    /// Input files
    pub inputs: InputPaths,
    /// Output files
    #[serde(default)]
    pub output: OutputPaths,
    /// Cube backing, threading and batching
    #[serde(default)]
    pub valuation: ValuationConfig,
}

impl RunConfig {
    /// Parses a run file held in memory. Paths are left as written.
    pub fn from_toml_str(s: &str, path: &Path) -> Result<Self> {
        let mut config: RunConfig = toml::from_str(s).map_err(|source| CliError::RunConfig {
            path: path.to_path_buf(),
            source,
        })?;
        if config.valuation.threads == Some(0) {
            config.valuation.threads = Some(num_cpus::get());
        }
        Ok(config)
    }

    /// Loads a run file and resolves its relative paths.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CliError::FileNotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path).map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&text, path)?;
        if let Some(dir) = path.parent() {
            config.resolve_against(dir);
        }
        Ok(config)
    }

    fn resolve_against(&mut self, dir: &Path) {
        let join = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = dir.join(&*p);
            }
        };
        join(&mut self.inputs.shifts);
        join(&mut self.inputs.market);
        join(&mut self.inputs.portfolio);
        join(&mut self.output.sensitivities);
        if let Some(p) = self.output.diagnostics.as_mut() {
            join(p);
        }
    }
}
