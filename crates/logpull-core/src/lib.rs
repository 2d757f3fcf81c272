//! # logpull core
//!
//! Clients for two analytics "Logs API" services that prepare bulk exports
//! asynchronously on the server and hand them out once ready.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`appmetrica`] | Single-request export poller (AppMetrica) |
//! | [`metrika`] | Evaluate / submit / poll / download / clean job poller (Metrica) |
//! | [`http_client`] | HTTP transport abstraction and reqwest implementation |
//! | [`poll`] | Bounded poll policy |
//! | [`config`] | Per-client configuration |
//! | [`credentials`] | Account id and OAuth token |
//! | [`params`] | Request parameters and date arithmetic |
//! | [`response`] | Normalized API-level results |
//! | [`output`] | CSV and JSON file output |
//! | [`error`] | Fault types |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use logpull_core::{ClientConfig, Credentials, MetrikaClient, RequestParams};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let credentials = Credentials::from_env("LOGPULL_METRIKA_COUNTER_ID", "LOGPULL_METRIKA_TOKEN")?;
//!     let client = MetrikaClient::new(credentials, ClientConfig::default());
//!
//!     let params = RequestParams::new()
//!         .with("date1", "2023-01-01")
//!         .with("date2", "2023-01-31")
//!         .with("source", "visits")
//!         .with("fields", "ym:s:visitID,ym:s:date");
//!
//!     let outcome = client.run_job(&params).await?;
//!     println!("{}", serde_json::to_string_pretty(&outcome)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! A non-success HTTP status is a value ([`ApiResponse::ApiError`] or a job
//! outcome variant). Only transport faults, malformed payloads, invalid
//! parameters and file errors surface as [`LogsApiError`].

pub mod appmetrica;
pub mod config;
pub mod credentials;
pub mod error;
pub mod http_client;
pub mod metrika;
pub mod output;
pub mod params;
pub mod poll;
pub mod response;

pub use appmetrica::{cache_control, AppMetricaClient, ExportFormat, ExportOutcome};
pub use config::ClientConfig;
pub use credentials::Credentials;
pub use error::{ConfigError, LogsApiError, ParamsError};
pub use http_client::{
    HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, ReqwestHttpClient,
};
pub use metrika::{
    Evaluation, JobOutcome, JobStage, LogRequest, LogRequestStatus, MetrikaClient, PartOutcome,
    PartReport, RequestId, Submission,
};
pub use params::{days_requested, ParamPair, RequestParams};
pub use poll::PollPolicy;
pub use response::{ActionReceipt, ApiError, ApiResponse};
