//! CLI argument definitions for logpull.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `appmetrica export` | Poll an AppMetrica export until ready and save it |
//! | `metrika run` | Evaluate, submit, poll, download and clean a Metrica log request |
//! | `metrika evaluate` | Check whether a log request fits the quota |
//! | `metrika status` | Show the state of a log request |
//! | `metrika cancel` | Cancel a log request that is not processed yet |
//! | `metrika clean` | Delete the prepared data of a processed log request |
//! | `metrika list` | List the counter's log requests |
//!
//! Credentials come from the environment:
//! `LOGPULL_APPMETRICA_APP_ID` / `LOGPULL_APPMETRICA_TOKEN` and
//! `LOGPULL_METRIKA_COUNTER_ID` / `LOGPULL_METRIKA_TOKEN`.
//!
//! # Examples
//!
//! ```bash
//! logpull appmetrica export --source installs --format csv \
//!     -p date_since=2023-01-01 -p date_until=2023-01-31 -p fields=install_datetime
//!
//! logpull metrika run -p date1=2023-01-01 -p date2=2023-01-31 \
//!     -p source=visits -p fields=ym:s:visitID,ym:s:date
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use logpull_core::ParamPair;

/// Pull analytics export logs from the AppMetrica and Metrica Logs APIs.
#[derive(Debug, Parser)]
#[command(name = "logpull", author, version, about = "Analytics Logs API export tool")]
pub struct Cli {
    /// Per-request timeout in milliseconds.
    #[arg(long, global = true, default_value_t = 30_000)]
    pub timeout_ms: u64,

    /// Seconds to wait between two status checks.
    #[arg(long, global = true, default_value_t = 30)]
    pub poll_interval_secs: u64,

    /// Maximum number of status checks before giving up (at least 1).
    #[arg(
        long,
        global = true,
        default_value_t = 100,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub max_attempts: u32,

    /// Directory receiving exported files.
    #[arg(long, global = true, default_value = ".")]
    pub output_dir: PathBuf,

    /// Override the vendor API host (e.g. a proxy).
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Pretty-print the JSON report.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// AppMetrica Logs API (single request, re-issued while preparing).
    Appmetrica(AppMetricaArgs),
    /// Metrica Logs API (evaluate / submit / poll / download / clean).
    Metrika(MetrikaArgs),
}

#[derive(Debug, Args)]
pub struct AppMetricaArgs {
    #[command(subcommand)]
    pub command: AppMetricaCommand,
}

#[derive(Debug, Subcommand)]
pub enum AppMetricaCommand {
    /// Export a log source to `{source}_{date_since}_{date_until}.{format}`.
    Export(ExportArgs),
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Log source, e.g. installs, events, sessions_starts.
    #[arg(long)]
    pub source: String,

    /// Export format.
    #[arg(long, value_enum, default_value_t = FormatArg::Json)]
    pub format: FormatArg,

    /// Request parameter as key=value; repeatable.
    #[arg(short = 'p', long = "param")]
    pub params: Vec<ParamPair>,

    /// Cache option: 0 sends `no-cache`, N sends `max-age=N`.
    #[arg(long)]
    pub cache: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Json,
    Csv,
}

#[derive(Debug, Args)]
pub struct MetrikaArgs {
    #[command(subcommand)]
    pub command: MetrikaCommand,
}

#[derive(Debug, Subcommand)]
pub enum MetrikaCommand {
    /// Run the whole job and save parts as `{request_id}-{part}.csv`.
    Run(JobArgs),
    /// Only evaluate the request against the quota.
    Evaluate(JobArgs),
    /// Show the state of a log request.
    Status(RequestArgs),
    /// Cancel a log request that is not processed yet.
    Cancel(RequestArgs),
    /// Delete the prepared data of a processed log request.
    Clean(RequestArgs),
    /// List the counter's log requests.
    List,
}

#[derive(Debug, Args)]
pub struct JobArgs {
    /// Request parameter as key=value; repeatable. `date1` and `date2` are required.
    #[arg(short = 'p', long = "param")]
    pub params: Vec<ParamPair>,
}

#[derive(Debug, Args)]
pub struct RequestArgs {
    /// Server-issued request id.
    pub request_id: String,
}
