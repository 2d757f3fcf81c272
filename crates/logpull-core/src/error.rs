use thiserror::Error;

use crate::http_client::HttpError;

/// Validation errors for caller-supplied request parameters.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParamsError {
    #[error("parameter '{key}' is required")]
    Missing { key: &'static str },
    #[error("parameter '{key}' must be a YYYY-MM-DD date: '{value}'")]
    InvalidDate { key: &'static str, value: String },
    #[error("parameter must be written as key=value: '{value}'")]
    InvalidPair { value: String },
    #[error("export source cannot be empty")]
    EmptySource,
    #[error("export source must be a plain name: '{value}'")]
    InvalidSource { value: String },
}

/// Configuration errors raised while assembling a client.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("environment variable '{name}' is not set")]
    MissingEnv { name: String },
    #[error("environment variable '{name}' is empty")]
    EmptyEnv { name: String },
    #[error("poll budget must allow at least one attempt")]
    NoPollAttempts,
}

/// Faults raised by the Logs API clients.
///
/// Non-success HTTP statuses are not faults; they are reported through
/// [`ApiResponse`](crate::ApiResponse) and the job outcome enums.
#[derive(Debug, Error)]
pub enum LogsApiError {
    #[error("transport error: {0}")]
    Transport(#[from] HttpError),

    #[error(transparent)]
    Params(#[from] ParamsError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("malformed response payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv conversion failed: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
