//! AppMetrica Logs API client.
//!
//! An export is a single GET against `/logs/v1/export/{source}.{format}`.
//! While the server prepares the data it answers `202 Accepted`; the same
//! request is re-issued after the poll interval until a `200 OK` carries the
//! payload or any other status ends the exchange.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::credentials::Credentials;
use crate::error::{LogsApiError, ParamsError};
use crate::http_client::{HttpClient, HttpRequest, HttpResponse, ReqwestHttpClient};
use crate::output::{export_file_name, write_json, write_tsv_as_csv};
use crate::params::RequestParams;

pub const DEFAULT_BASE_URL: &str = "https://api.appmetrica.yandex.ru";

const STATUS_OK: u16 = 200;
const STATUS_ACCEPTED: u16 = 202;

/// Export payload format, also used as the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

impl Display for ExportFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `Cache-Control` value for a cache option: none, `no-cache` for zero,
/// `max-age=N` otherwise.
pub fn cache_control(cache_option: Option<u32>) -> Option<String> {
    match cache_option {
        None => None,
        Some(0) => Some(String::from("no-cache")),
        Some(seconds) => Some(format!("max-age={seconds}")),
    }
}

/// A source names one log table and also becomes part of the output file name.
fn validate_source(source: &str) -> Result<(), ParamsError> {
    if source.trim().is_empty() {
        return Err(ParamsError::EmptySource);
    }
    if source.contains(['/', '\\']) || source == "." || source == ".." {
        return Err(ParamsError::InvalidSource {
            value: source.to_string(),
        });
    }
    Ok(())
}

/// Terminal result of [`AppMetricaClient::export`].
///
/// Every variant carries the headers of the last response received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ExportOutcome {
    /// `200 OK`; the payload was written to `path`.
    Saved {
        path: PathBuf,
        headers: BTreeMap<String, String>,
    },
    /// A status other than 200 or 202; nothing was written.
    NotSaved {
        status: u16,
        headers: BTreeMap<String, String>,
    },
    /// Every attempt answered `202 Accepted`.
    Exhausted {
        attempts: u32,
        headers: BTreeMap<String, String>,
    },
}

impl ExportOutcome {
    pub fn headers(&self) -> &BTreeMap<String, String> {
        match self {
            Self::Saved { headers, .. }
            | Self::NotSaved { headers, .. }
            | Self::Exhausted { headers, .. } => headers,
        }
    }

    pub const fn is_saved(&self) -> bool {
        matches!(self, Self::Saved { .. })
    }
}

/// Client for the AppMetrica Logs API of a single application.
#[derive(Clone)]
pub struct AppMetricaClient {
    http_client: Arc<dyn HttpClient>,
    credentials: Credentials,
    config: ClientConfig,
    headers: BTreeMap<String, String>,
}

impl AppMetricaClient {
    /// Client using the reqwest transport. `credentials` carry the application id.
    pub fn new(credentials: Credentials, cache_option: Option<u32>, config: ClientConfig) -> Self {
        Self::with_http_client(
            Arc::new(ReqwestHttpClient::new()),
            credentials,
            cache_option,
            config,
        )
    }

    pub fn with_http_client(
        http_client: Arc<dyn HttpClient>,
        credentials: Credentials,
        cache_option: Option<u32>,
        config: ClientConfig,
    ) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert(String::from("accept"), String::from("application/json"));
        credentials.apply(&mut headers);
        if let Some(value) = cache_control(cache_option) {
            headers.insert(String::from("cache-control"), value);
        }

        Self {
            http_client,
            credentials,
            config,
            headers,
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Headers sent with every export request.
    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn export_url(&self, source: &str, format: ExportFormat) -> String {
        format!(
            "{}/logs/v1/export/{}.{}?application_id={}",
            self.config.base_url_or(DEFAULT_BASE_URL),
            source,
            format,
            self.credentials.account_id()
        )
    }

    /// Issue one export request and return the raw response.
    pub async fn fetch(
        &self,
        params: &RequestParams,
        source: &str,
        format: ExportFormat,
    ) -> Result<HttpResponse, LogsApiError> {
        validate_source(source)?;

        let request = HttpRequest::get(self.export_url(source, format))
            .with_headers(&self.headers)
            .with_query(params.query_pairs())
            .with_timeout_ms(self.config.timeout_ms);
        debug!(url = %request.url, "appmetrica request");

        Ok(self.http_client.execute(request).await?)
    }

    /// Poll the export endpoint until the data is ready, then save it to
    /// `{source}_{date_since}_{date_until}.{format}` in the output directory.
    pub async fn export(
        &self,
        params: &RequestParams,
        source: &str,
        format: ExportFormat,
    ) -> Result<ExportOutcome, LogsApiError> {
        let policy = self.config.poll;
        policy.ensure_attempts()?;
        let mut last_headers = BTreeMap::new();

        for attempt in 0..policy.max_attempts {
            let response = self.fetch(params, source, format).await?;
            info!(attempt, source, status = response.status, "appmetrica export response");

            match response.status {
                STATUS_ACCEPTED => {
                    last_headers = response.headers;
                    if attempt + 1 < policy.max_attempts {
                        policy.wait().await;
                    }
                }
                STATUS_OK => {
                    let path = self.persist(&response, params, source, format)?;
                    return Ok(ExportOutcome::Saved {
                        path,
                        headers: response.headers,
                    });
                }
                status => {
                    warn!(source, status, body = %response.text(), "appmetrica export not saved");
                    return Ok(ExportOutcome::NotSaved {
                        status,
                        headers: response.headers,
                    });
                }
            }
        }

        warn!(source, attempts = policy.max_attempts, "appmetrica export still being prepared");
        Ok(ExportOutcome::Exhausted {
            attempts: policy.max_attempts,
            headers: last_headers,
        })
    }

    fn persist(
        &self,
        response: &HttpResponse,
        params: &RequestParams,
        source: &str,
        format: ExportFormat,
    ) -> Result<PathBuf, LogsApiError> {
        let file_name = export_file_name(
            source,
            params.get("date_since"),
            params.get("date_until"),
            format.as_str(),
        );
        let path = self.config.output_path(file_name);

        match format {
            ExportFormat::Json => {
                let body: Value = response.json()?;
                write_json(&path, &body)?;
            }
            ExportFormat::Csv => write_tsv_as_csv(&path, &response.body)?,
        }

        Ok(path)
    }
}
