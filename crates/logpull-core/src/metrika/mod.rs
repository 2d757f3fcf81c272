//! Yandex.Metrica Logs API client.
//!
//! A log request moves through several remote operations tracked by a
//! server-issued request id:
//!
//! | Stage | Endpoint |
//! |-------|----------|
//! | Evaluate | `GET  /logrequests/evaluate` |
//! | Submit | `POST /logrequests` |
//! | Poll | `GET  /logrequest/{id}` |
//! | Download | `GET  /logrequest/{id}/part/{n}/download` |
//! | Clean | `POST /logrequest/{id}/clean` |
//! | Cancel | `POST /logrequest/{id}/cancel` |
//!
//! [`MetrikaClient::run_job`] drives the whole sequence; the individual stages
//! are public for callers that need finer control.

mod model;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::credentials::Credentials;
use crate::error::LogsApiError;
use crate::http_client::{HttpClient, HttpMethod, HttpRequest, HttpResponse, ReqwestHttpClient};
use crate::output::{part_file_name, write_tsv_as_csv};
use crate::params::RequestParams;
use crate::response::{ActionReceipt, ApiError, ApiResponse};

pub use model::{
    bytes_to_gb, Evaluation, JobOutcome, JobStage, LogRequest, LogRequestStatus, PartOutcome,
    PartReport, PossibleVolume, RequestId, RequestedVolume, Submission,
};

use model::{EvaluationEnvelope, LogRequestEnvelope, LogRequestListEnvelope};

pub const DEFAULT_BASE_URL: &str = "https://api-metrika.yandex.net";

/// Client for the Metrica Logs API of a single counter.
#[derive(Clone)]
pub struct MetrikaClient {
    http_client: Arc<dyn HttpClient>,
    credentials: Credentials,
    config: ClientConfig,
    headers: BTreeMap<String, String>,
}

impl MetrikaClient {
    /// Client using the reqwest transport. `credentials` carry the counter id.
    pub fn new(credentials: Credentials, config: ClientConfig) -> Self {
        Self::with_http_client(Arc::new(ReqwestHttpClient::new()), credentials, config)
    }

    pub fn with_http_client(
        http_client: Arc<dyn HttpClient>,
        credentials: Credentials,
        config: ClientConfig,
    ) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert(String::from("accept"), String::from("application/json"));
        headers.insert(String::from("content-encoding"), String::from("gzip"));
        credentials.apply(&mut headers);

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

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Headers sent with every call.
    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    fn counter_url(&self, path: &str) -> String {
        format!(
            "{}/management/v1/counter/{}{}",
            self.config.base_url_or(DEFAULT_BASE_URL),
            self.credentials.account_id(),
            path
        )
    }

    fn request(&self, method: HttpMethod, path: &str) -> HttpRequest {
        HttpRequest::new(method, self.counter_url(path))
            .with_headers(&self.headers)
            .with_timeout_ms(self.config.timeout_ms)
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, LogsApiError> {
        debug!(method = request.method.as_str(), url = %request.url, "metrika request");
        let response = self.http_client.execute(request).await?;
        debug!(status = response.status, "metrika response");
        Ok(response)
    }

    /// List the log requests known for the counter.
    pub async fn list_requests(&self) -> Result<ApiResponse<Vec<LogRequest>>, LogsApiError> {
        let response = self
            .send(self.request(HttpMethod::Get, "/logrequests"))
            .await?;
        if !response.is_ok() {
            return Ok(ApiResponse::ApiError(ApiError::from_response(&response)));
        }

        let envelope: LogRequestListEnvelope = response.json()?;
        let requests = envelope
            .requests
            .into_iter()
            .filter_map(LogRequest::from_listed)
            .collect();
        Ok(ApiResponse::Success(requests))
    }

    /// Check whether the requested export fits the counter's quota.
    pub async fn evaluate(
        &self,
        params: &RequestParams,
    ) -> Result<ApiResponse<Evaluation>, LogsApiError> {
        let request = self
            .request(HttpMethod::Get, "/logrequests/evaluate")
            .with_query(params.query_pairs());
        let response = self.send(request).await?;
        if !response.is_ok() {
            return Ok(ApiResponse::ApiError(ApiError::from_response(&response)));
        }

        let envelope: EvaluationEnvelope = response.json()?;
        let evaluation = Evaluation::from_payload(params, envelope.log_request_evaluation)?;
        Ok(ApiResponse::Success(evaluation))
    }

    /// Submit a log request for preparation.
    pub async fn create(
        &self,
        params: &RequestParams,
    ) -> Result<ApiResponse<Submission>, LogsApiError> {
        let request = self
            .request(HttpMethod::Post, "/logrequests")
            .with_query(params.query_pairs());
        let response = self.send(request).await?;
        if !response.is_ok() {
            return Ok(ApiResponse::ApiError(ApiError::from_response(&response)));
        }

        let body: Value = response.json()?;
        let request_id = serde_json::from_value::<LogRequestEnvelope>(body.clone())
            .ok()
            .and_then(|envelope| envelope.log_request)
            .and_then(|log_request| log_request.request_id);

        Ok(ApiResponse::Success(Submission {
            request_id,
            response: body,
        }))
    }

    /// Current state of a log request.
    pub async fn status(
        &self,
        request_id: &RequestId,
    ) -> Result<ApiResponse<LogRequest>, LogsApiError> {
        let path = format!("/logrequest/{request_id}");
        let response = self.send(self.request(HttpMethod::Get, &path)).await?;
        if !response.is_ok() {
            return Ok(ApiResponse::ApiError(ApiError::from_response(&response)));
        }

        let envelope: LogRequestEnvelope = response.json()?;
        let payload = envelope.log_request.unwrap_or_default();
        Ok(ApiResponse::Success(LogRequest::from_payload(payload, request_id)))
    }

    /// Raw tab-separated content of one processed part.
    pub async fn download_part(
        &self,
        request_id: &RequestId,
        part_number: u32,
    ) -> Result<ApiResponse<Vec<u8>>, LogsApiError> {
        let path = format!("/logrequest/{request_id}/part/{part_number}/download");
        let response = self.send(self.request(HttpMethod::Get, &path)).await?;
        if !response.is_ok() {
            return Ok(ApiResponse::ApiError(ApiError::from_response(&response)));
        }
        Ok(ApiResponse::Success(response.body))
    }

    /// Delete the prepared data of a processed request.
    pub async fn clean(
        &self,
        request_id: &RequestId,
    ) -> Result<ApiResponse<ActionReceipt>, LogsApiError> {
        self.terminal_action(request_id, "clean", "deleted").await
    }

    /// Cancel a request that has not been processed yet.
    pub async fn cancel(
        &self,
        request_id: &RequestId,
    ) -> Result<ApiResponse<ActionReceipt>, LogsApiError> {
        self.terminal_action(request_id, "cancel", "canceled").await
    }

    async fn terminal_action(
        &self,
        request_id: &RequestId,
        action: &str,
        verb: &str,
    ) -> Result<ApiResponse<ActionReceipt>, LogsApiError> {
        let path = format!("/logrequest/{request_id}/{action}");
        let response = self.send(self.request(HttpMethod::Post, &path)).await?;
        if !response.is_ok() {
            return Ok(ApiResponse::ApiError(ApiError::from_response(&response)));
        }
        Ok(ApiResponse::Success(ActionReceipt {
            status_code: response.status,
            message: format!("request {request_id} {verb}"),
        }))
    }

    /// Evaluate, submit, poll until processed, download every part, then clean up.
    ///
    /// A zero attempt budget is rejected before anything is submitted. Non-200 answers end the job with [`JobOutcome::Rejected`]; transport
    /// faults and file errors are returned as `Err`.
    pub async fn run_job(&self, params: &RequestParams) -> Result<JobOutcome, LogsApiError> {
        let policy = self.config.poll;
        policy.ensure_attempts()?;

        let evaluation = match self.evaluate(params).await? {
            ApiResponse::Success(evaluation) => evaluation,
            ApiResponse::ApiError(error) => {
                return Ok(JobOutcome::Rejected {
                    stage: JobStage::Evaluate,
                    error,
                })
            }
        };
        if !evaluation.possible {
            info!(
                size_requested_gb = evaluation.query_params.size_requested_gb,
                days_requested = evaluation.query_params.days_requested,
                max_possible_size_gb = evaluation.max_possible_params.max_possible_size_gb,
                max_possible_days = evaluation.max_possible_params.max_possible_days,
                "log request exceeds quota"
            );
            return Ok(JobOutcome::NotPossible { evaluation });
        }

        let submission = match self.create(params).await? {
            ApiResponse::Success(submission) => submission,
            ApiResponse::ApiError(error) => {
                return Ok(JobOutcome::Rejected {
                    stage: JobStage::Submit,
                    error,
                })
            }
        };
        let Submission {
            request_id,
            response,
        } = submission;
        let Some(request_id) = request_id else {
            warn!("submission accepted without a request id");
            return Ok(JobOutcome::MissingRequestId { response });
        };
        info!(
            request_id = %request_id,
            size_requested_gb = evaluation.query_params.size_requested_gb,
            days_requested = evaluation.query_params.days_requested,
            "log request submitted"
        );

        for attempt in 0..policy.max_attempts {
            policy.wait().await;

            let log_request = match self.status(&request_id).await? {
                ApiResponse::Success(log_request) => log_request,
                ApiResponse::ApiError(error) => {
                    return Ok(JobOutcome::Rejected {
                        stage: JobStage::Status,
                        error,
                    })
                }
            };

            match log_request.status {
                LogRequestStatus::Created => {
                    info!(attempt, request_id = %request_id, "log request is being prepared");
                }
                LogRequestStatus::Processed => {
                    return self.download_and_clean(&request_id, &log_request.parts).await;
                }
                _ => {
                    warn!(
                        request_id = %request_id,
                        status = %log_request.status,
                        "log request stopped before processing"
                    );
                    return Ok(JobOutcome::Stopped { log_request });
                }
            }
        }

        warn!(request_id = %request_id, attempts = policy.max_attempts, "poll budget exhausted");
        Ok(JobOutcome::Exhausted {
            request_id,
            attempts: policy.max_attempts,
        })
    }

    async fn download_and_clean(
        &self,
        request_id: &RequestId,
        parts: &[u32],
    ) -> Result<JobOutcome, LogsApiError> {
        let mut reports = Vec::with_capacity(parts.len());

        for &part_number in parts {
            let outcome = match self.download_part(request_id, part_number).await? {
                ApiResponse::Success(content) => {
                    let path = self.save_part(request_id, part_number, content)?;
                    PartOutcome::Saved { path }
                }
                ApiResponse::ApiError(error) => {
                    warn!(
                        request_id = %request_id,
                        part_number,
                        status_code = error.status_code,
                        message = %error.message,
                        "part download failed; skipping"
                    );
                    PartOutcome::Failed { error }
                }
            };
            reports.push(PartReport {
                part_number,
                outcome,
            });
        }

        let cleanup = self.clean(request_id).await?;
        Ok(JobOutcome::Completed {
            request_id: request_id.clone(),
            parts: reports,
            cleanup,
        })
    }

    fn save_part(
        &self,
        request_id: &RequestId,
        part_number: u32,
        content: Vec<u8>,
    ) -> Result<PathBuf, LogsApiError> {
        let path = self
            .config
            .output_path(part_file_name(request_id, part_number));
        write_tsv_as_csv(&path, &content)?;
        Ok(path)
    }
}
