//! `sensi` - bump-and-revalue sensitivity runner
//!
//! # Commands
//!
//! - `sensi run` - Value the portfolio under every scenario and write the
//!   sensitivity CSV plus a diagnostics sidecar
//! - `sensi check` - Validate the inputs and report the scenario counts
//! - `sensi scenarios` - List the generated scenarios in cube order
//! - `sensi aggregate --input <csv>` - Total a written report by group
//!
//! Every command except `aggregate` reads a run file (`--config`, default
//! `sensi.toml`); see [`config::RunConfig`].

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use sensi_core::market::RiskFactorKind;
use sensi_core::types::Currency;
use sensi_risk::cube::CubeBackend;
use sensi_risk::sensitivity::{RiskFilter, SensitivityKind};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod error;
mod inputs;

use commands::aggregate::GroupBy;
use config::{LogLevel, RunConfig};

/// Bump-and-revalue sensitivity runner
#[derive(Parser)]
#[command(name = "sensi")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Run file path
    #[arg(short, long, global = true, default_value = "sensi.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Cube backing selectable on the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Backend {
    Dense,
    Sparse,
}

impl From<Backend> for CubeBackend {
    fn from(backend: Backend) -> Self {
        match backend {
            Backend::Dense => CubeBackend::Dense,
            Backend::Sparse => CubeBackend::Sparse,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Compute and export sensitivities
    Run {
        /// Sensitivity CSV, overriding the run file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Cube backing, overriding the run file
        #[arg(short, long, value_enum)]
        backend: Option<Backend>,

        /// Worker threads (0 = one per CPU), overriding the run file
        #[arg(short, long)]
        threads: Option<usize>,

        /// Only export these trades
        #[arg(long = "trade")]
        trades: Vec<String>,

        /// Only export factors of these categories
        #[arg(long = "category")]
        categories: Vec<RiskFactorKind>,

        /// Only export these NPV currencies
        #[arg(long = "currency")]
        currencies: Vec<Currency>,

        /// Only export these kinds (Delta, Gamma, CrossGamma)
        #[arg(long = "kind")]
        kinds: Vec<SensitivityKind>,

        /// Drop available values smaller than this in magnitude
        #[arg(long)]
        min_abs: Option<f64>,
    },

    /// Validate the run without pricing
    Check,

    /// List the generated scenarios
    Scenarios,

    /// Aggregate a sensitivity CSV
    Aggregate {
        /// Sensitivity CSV written by `sensi run`
        #[arg(short, long)]
        input: PathBuf,

        /// Grouping
        #[arg(long, value_enum, default_value = "category")]
        by: GroupBy,
    },
}

fn init_tracing(verbose: bool, level: LogLevel) {
    let level = if verbose { LogLevel::Debug } else { level };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.as_filter_str()));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load_run_config(cli: &Cli) -> anyhow::Result<RunConfig> {
    let config = RunConfig::load(&cli.config)
        .with_context(|| format!("loading run file {}", cli.config.display()))?;
    init_tracing(cli.verbose, config.log_level);
    info!(path = %cli.config.display(), "Run file loaded");
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Run {
            output,
            backend,
            threads,
            trades,
            categories,
            currencies,
            kinds,
            min_abs,
        } => {
            let mut config = load_run_config(&cli)?;
            if let Some(path) = output {
                config.output.sensitivities = path.clone();
            }
            if let Some(backend) = backend {
                config.valuation.backend = (*backend).into();
            }
            match threads {
                Some(0) => config.valuation.threads = Some(num_cpus::get()),
                Some(n) => config.valuation.threads = Some(*n),
                None => {}
            }

            let mut filter = RiskFilter::new().with_trades(trades.iter().cloned());
            for category in categories {
                filter = filter.with_category(*category);
            }
            for currency in currencies {
                filter = filter.with_currency(*currency);
            }
            for kind in kinds {
                filter = filter.with_kind(*kind);
            }
            if let Some(threshold) = min_abs {
                filter = filter.with_min_abs_value(*threshold);
            }
            commands::run::run(&config, &filter).context("sensitivity run failed")
        }
        Commands::Check => {
            let config = load_run_config(&cli)?;
            commands::check::run(&config).context("check failed")
        }
        Commands::Scenarios => {
            let config = load_run_config(&cli)?;
            commands::scenarios::run(&config).context("scenario listing failed")
        }
        Commands::Aggregate { input, by } => {
            init_tracing(cli.verbose, LogLevel::default());
            commands::aggregate::run(input, *by).context("aggregation failed")
        }
    }
}
