use logpull_core::{ConfigError, LogsApiError};
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    LogsApi(#[from] LogsApiError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) => 2,
            Self::LogsApi(error) => match error {
                LogsApiError::Params(_) | LogsApiError::Config(_) => 2,
                LogsApiError::Json(_) => 4,
                LogsApiError::Transport(_) | LogsApiError::Csv(_) | LogsApiError::Io(_) => 10,
            },
            Self::Serialization(_) => 4,
            Self::Io(_) => 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logpull_core::{HttpError, ParamsError};

    #[test]
    fn exit_codes_separate_usage_from_runtime_faults() {
        let missing = CliError::from(ConfigError::MissingEnv {
            name: String::from("LOGPULL_METRIKA_TOKEN"),
        });
        let params = CliError::from(LogsApiError::from(ParamsError::Missing { key: "date1" }));
        let transport = CliError::from(LogsApiError::from(HttpError::new("connection failed")));

        assert_eq!(missing.exit_code(), 2);
        assert_eq!(params.exit_code(), 2);
        assert_eq!(transport.exit_code(), 10);
    }
}
