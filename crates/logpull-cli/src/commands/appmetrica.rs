use logpull_core::{AppMetricaClient, ClientConfig, Credentials, ExportFormat};
use tracing::info;

use super::{request_params, CommandResult, APPMETRICA_APP_ID_ENV, APPMETRICA_TOKEN_ENV};
use crate::cli::{AppMetricaCommand, ExportArgs, FormatArg};
use crate::error::CliError;

pub async fn run(command: &AppMetricaCommand, config: ClientConfig) -> Result<CommandResult, CliError> {
    match command {
        AppMetricaCommand::Export(args) => export(args, config).await,
    }
}

async fn export(args: &ExportArgs, config: ClientConfig) -> Result<CommandResult, CliError> {
    let credentials = Credentials::from_env(APPMETRICA_APP_ID_ENV, APPMETRICA_TOKEN_ENV)?;
    let client = AppMetricaClient::new(credentials, args.cache, config);
    let params = request_params(&args.params);
    let format = export_format(args.format);
    info!(source = %args.source, %format, "starting appmetrica export");

    let outcome = client
        .export(&params, &args.source, format)
        .await?;

    CommandResult::new(&outcome, outcome.is_saved())
}

const fn export_format(format: FormatArg) -> ExportFormat {
    match format {
        FormatArg::Json => ExportFormat::Json,
        FormatArg::Csv => ExportFormat::Csv,
    }
}
