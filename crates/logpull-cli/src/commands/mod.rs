mod appmetrica;
mod metrika;

use std::time::Duration;

use logpull_core::{ClientConfig, PollPolicy, RequestParams};
use serde::Serialize;
use serde_json::Value;

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub const APPMETRICA_APP_ID_ENV: &str = "LOGPULL_APPMETRICA_APP_ID";
pub const APPMETRICA_TOKEN_ENV: &str = "LOGPULL_APPMETRICA_TOKEN";
pub const METRIKA_COUNTER_ID_ENV: &str = "LOGPULL_METRIKA_COUNTER_ID";
pub const METRIKA_TOKEN_ENV: &str = "LOGPULL_METRIKA_TOKEN";

/// JSON report printed on stdout; `success` drives the exit code.
pub struct CommandResult {
    pub data: Value,
    pub success: bool,
}

impl CommandResult {
    pub fn new(data: &impl Serialize, success: bool) -> Result<Self, CliError> {
        Ok(Self {
            data: serde_json::to_value(data)?,
            success,
        })
    }
}

pub async fn run(cli: &Cli) -> Result<CommandResult, CliError> {
    let config = client_config(cli);

    match &cli.command {
        Command::Appmetrica(args) => appmetrica::run(&args.command, config).await,
        Command::Metrika(args) => metrika::run(&args.command, config).await,
    }
}

fn client_config(cli: &Cli) -> ClientConfig {
    let policy = PollPolicy::fixed(Duration::from_secs(cli.poll_interval_secs), cli.max_attempts);
    let config = ClientConfig::default()
        .with_timeout_ms(cli.timeout_ms)
        .with_poll_policy(policy)
        .with_output_dir(&cli.output_dir);

    match &cli.base_url {
        Some(base_url) => config.with_base_url(base_url.clone()),
        None => config,
    }
}

fn request_params(pairs: &[logpull_core::ParamPair]) -> RequestParams {
    pairs
        .iter()
        .map(|pair| (pair.key.clone(), pair.value.clone()))
        .collect()
}
