use std::fmt::{Display, Formatter};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ParamsError;
use crate::params::{days_requested, RequestParams};
use crate::response::{ActionReceipt, ApiError, ApiResponse, UNKNOWN};

const BYTES_PER_GB: f64 = 1e9;

/// Server-issued identifier of a log request.
///
/// Metrica returns it as a JSON number; strings are accepted too.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawRequestId")]
pub struct RequestId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRequestId {
    Number(u64),
    Text(String),
}

impl From<RawRequestId> for RequestId {
    fn from(raw: RawRequestId) -> Self {
        match raw {
            RawRequestId::Number(value) => Self(value.to_string()),
            RawRequestId::Text(value) => Self(value),
        }
    }
}

impl RequestId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for RequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle state of a log request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum LogRequestStatus {
    Created,
    Processing,
    Processed,
    Canceled,
    Error,
    Unknown(String),
}

impl LogRequestStatus {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("created") => Self::Created,
            Some("processing") => Self::Processing,
            Some("processed") => Self::Processed,
            Some("canceled") => Self::Canceled,
            Some("error") | Some("processing_failed") => Self::Error,
            Some(other) => Self::Unknown(other.to_string()),
            None => Self::Unknown(String::from(UNKNOWN)),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Created => "created",
            Self::Processing => "processing",
            Self::Processed => "processed",
            Self::Canceled => "canceled",
            Self::Error => "error",
            Self::Unknown(raw) => raw,
        }
    }
}

impl Display for LogRequestStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<LogRequestStatus> for String {
    fn from(status: LogRequestStatus) -> Self {
        status.as_str().to_string()
    }
}

/// Snapshot of a log request as reported by the status endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogRequest {
    pub request_id: RequestId,
    pub status: LogRequestStatus,
    pub size: Option<u64>,
    /// Part numbers, populated once the request is processed.
    pub parts: Vec<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct LogRequestEnvelope {
    pub(crate) log_request: Option<LogRequestPayload>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct LogRequestListEnvelope {
    #[serde(default)]
    pub(crate) requests: Vec<LogRequestPayload>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct LogRequestPayload {
    pub(crate) request_id: Option<RequestId>,
    status: Option<String>,
    size: Option<u64>,
    #[serde(default)]
    parts: Vec<PartPayload>,
}

#[derive(Debug, Deserialize)]
struct PartPayload {
    part_number: Option<u32>,
}

impl LogRequest {
    /// Snapshot of a known request; the body may omit the id.
    pub(crate) fn from_payload(payload: LogRequestPayload, known_id: &RequestId) -> Self {
        let request_id = payload
            .request_id
            .clone()
            .unwrap_or_else(|| known_id.clone());
        Self::build(request_id, payload)
    }

    /// Snapshot of a listed request; entries without an id are dropped.
    pub(crate) fn from_listed(payload: LogRequestPayload) -> Option<Self> {
        let request_id = payload.request_id.clone()?;
        Some(Self::build(request_id, payload))
    }

    fn build(request_id: RequestId, payload: LogRequestPayload) -> Self {
        let parts = payload
            .parts
            .into_iter()
            .filter_map(|part| part.part_number)
            .collect();

        Self {
            request_id,
            status: LogRequestStatus::parse(payload.status.as_deref()),
            size: payload.size,
            parts,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct EvaluationEnvelope {
    #[serde(default)]
    pub(crate) log_request_evaluation: EvaluationPayload,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct EvaluationPayload {
    #[serde(default)]
    possible: bool,
    #[serde(default)]
    expected_size: f64,
    #[serde(default)]
    log_request_sum_max_size: f64,
    #[serde(default)]
    max_possible_day_quantity: u64,
}

/// Size and span of the requested export.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RequestedVolume {
    pub size_requested_gb: f64,
    pub days_requested: i64,
}

/// Quota limits reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PossibleVolume {
    pub max_possible_size_gb: f64,
    pub max_possible_days: u64,
}

/// Feasibility verdict for a log request, computed before submission.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Evaluation {
    pub possible: bool,
    pub query_params: RequestedVolume,
    pub max_possible_params: PossibleVolume,
}

impl Evaluation {
    pub(crate) fn from_payload(
        params: &RequestParams,
        payload: EvaluationPayload,
    ) -> Result<Self, ParamsError> {
        Ok(Self {
            possible: payload.possible,
            query_params: RequestedVolume {
                size_requested_gb: bytes_to_gb(payload.expected_size),
                days_requested: days_requested(params)?,
            },
            max_possible_params: PossibleVolume {
                max_possible_size_gb: bytes_to_gb(payload.log_request_sum_max_size),
                max_possible_days: payload.max_possible_day_quantity,
            },
        })
    }
}

pub fn bytes_to_gb(bytes: f64) -> f64 {
    bytes / BYTES_PER_GB
}

/// Accepted submission. `request_id` is `None` when the server omitted it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Submission {
    pub request_id: Option<RequestId>,
    pub response: Value,
}

/// Job stage that produced a rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStage {
    Evaluate,
    Submit,
    Status,
}

/// Result of downloading one part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum PartOutcome {
    Saved { path: PathBuf },
    Failed { error: ApiError },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartReport {
    pub part_number: u32,
    #[serde(flatten)]
    pub outcome: PartOutcome,
}

impl PartReport {
    pub const fn is_saved(&self) -> bool {
        matches!(self.outcome, PartOutcome::Saved { .. })
    }
}

/// Terminal outcome of [`MetrikaClient::run_job`](super::MetrikaClient::run_job).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum JobOutcome {
    /// A stage answered with a non-200 status.
    Rejected { stage: JobStage, error: ApiError },
    /// The evaluation said the request exceeds the quota.
    NotPossible { evaluation: Evaluation },
    /// The submission was accepted but carried no request id.
    MissingRequestId { response: Value },
    /// The request reached a state other than `created` or `processed`.
    Stopped { log_request: LogRequest },
    /// Parts were downloaded (or skipped) and cleanup was attempted.
    Completed {
        request_id: RequestId,
        parts: Vec<PartReport>,
        cleanup: ApiResponse<ActionReceipt>,
    },
    /// The poll budget ran out while the request was still `created`.
    Exhausted { request_id: RequestId, attempts: u32 },
}

impl JobOutcome {
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}
