use logpull_core::{ClientConfig, Credentials, MetrikaClient, RequestId};
use tracing::info;

use super::{request_params, CommandResult, METRIKA_COUNTER_ID_ENV, METRIKA_TOKEN_ENV};
use crate::cli::MetrikaCommand;
use crate::error::CliError;

pub async fn run(command: &MetrikaCommand, config: ClientConfig) -> Result<CommandResult, CliError> {
    let credentials = Credentials::from_env(METRIKA_COUNTER_ID_ENV, METRIKA_TOKEN_ENV)?;
    let client = MetrikaClient::new(credentials, config);

    match command {
        MetrikaCommand::Run(args) => {
            info!(counter = client.credentials().account_id(), "starting metrika log job");
            let outcome = client.run_job(&request_params(&args.params)).await?;
            CommandResult::new(&outcome, outcome.is_completed())
        }
        MetrikaCommand::Evaluate(args) => {
            let response = client.evaluate(&request_params(&args.params)).await?;
            let possible = response.success().is_some_and(|evaluation| evaluation.possible);
            CommandResult::new(&response, possible)
        }
        MetrikaCommand::Status(args) => {
            let response = client.status(&RequestId::new(args.request_id.as_str())).await?;
            CommandResult::new(&response, response.is_success())
        }
        MetrikaCommand::Cancel(args) => {
            let response = client.cancel(&RequestId::new(args.request_id.as_str())).await?;
            CommandResult::new(&response, response.is_success())
        }
        MetrikaCommand::Clean(args) => {
            let response = client.clean(&RequestId::new(args.request_id.as_str())).await?;
            CommandResult::new(&response, response.is_success())
        }
        MetrikaCommand::List => {
            let response = client.list_requests().await?;
            CommandResult::new(&response, response.is_success())
        }
    }
}
