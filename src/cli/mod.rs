//! Command-line parsing for the cross-rate forecaster.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! forecasting and auditing code.

use chrono::NaiveDate;
use clap::{ArgGroup, Args, Parser, Subcommand};

use crate::domain::Currency;
use crate::model::DEFAULT_LAGS;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "fxc", version, about = "Synthetic cross-rate forecaster with trust auditing")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Forecast a currency pair and print the bridged timeline.
    Forecast(ForecastArgs),
    /// Resolve pending audits and print the latest verdict per pair.
    Scoreboard(ScoreboardArgs),
    /// Train per-leg return models from ECB history.
    Train(TrainArgs),
    /// Inspect or seed the audit store.
    #[command(subcommand)]
    Audit(AuditCommand),
}

#[derive(Debug, Args, Clone)]
pub struct ForecastArgs {
    /// Base currency (e.g. GBP).
    #[arg(long)]
    pub from: Currency,

    /// Quote currency (e.g. INR).
    #[arg(long)]
    pub to: Currency,

    /// Number of business days to forecast.
    #[arg(short = 'd', long, default_value_t = 30)]
    pub days: usize,

    /// Override "today" (YYYY-MM-DD). Defaults to the local date.
    #[arg(long, value_name = "DATE")]
    pub today: Option<NaiveDate>,

    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,

    /// Store the first forecast point as a pending audit.
    #[arg(long)]
    pub record: bool,

    /// Render an ASCII chart of the timeline.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

#[derive(Debug, Args, Clone)]
pub struct ScoreboardArgs {
    /// Override "today" (YYYY-MM-DD). Defaults to the local date.
    #[arg(long, value_name = "DATE")]
    pub today: Option<NaiveDate>,

    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args, Clone)]
#[command(group(ArgGroup::new("target").required(true).args(["currency", "all"])))]
pub struct TrainArgs {
    /// Train a single leg (EUR→currency).
    #[arg(long)]
    pub currency: Option<Currency>,

    /// Train every supported leg.
    #[arg(long)]
    pub all: bool,

    /// Retrain even if an artifact already exists.
    #[arg(long)]
    pub force: bool,

    /// Autoregressive lag count.
    #[arg(long, default_value_t = DEFAULT_LAGS)]
    pub lags: usize,
}

#[derive(Debug, Subcommand)]
pub enum AuditCommand {
    /// Print every stored audit record.
    List {
        /// Print as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Append demonstration records (already resolved) to the store.
    Seed {
        /// Reference date for the demo target dates. Defaults to the local date.
        #[arg(long, value_name = "DATE")]
        today: Option<NaiveDate>,
    },
}
