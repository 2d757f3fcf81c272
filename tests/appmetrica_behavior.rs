//! Behaviour tests for the AppMetrica export poller.
//!
//! The scripted transport stands in for the Logs API so every scenario runs
//! offline with a zero poll interval.

mod support;

use std::sync::Arc;
use std::time::Duration;

use logpull_core::{
    AppMetricaClient, ClientConfig, ConfigError, Credentials, ExportFormat, ExportOutcome,
    HttpError, HttpResponse, LogsApiError, ParamsError, PollPolicy, RequestParams,
};
use support::{files_in, ScriptedHttpClient};

const EXPORT_CSV: &str = "/logs/v1/export/installs.csv?application_id=1111";
const EXPORT_JSON: &str = "/logs/v1/export/events.json?application_id=1111";

fn accepted() -> HttpResponse {
    HttpResponse::new(202, "Your query is added to the queue.").with_header("retry-after", "30")
}

fn params() -> RequestParams {
    RequestParams::new()
        .with("date_since", "2023-01-01")
        .with("date_until", "2023-01-31")
        .with("fields", "appmetrica_device_id,install_datetime")
}

fn client(
    transport: Arc<ScriptedHttpClient>,
    dir: &std::path::Path,
    cache_option: Option<u32>,
    max_attempts: u32,
) -> AppMetricaClient {
    let config = ClientConfig::default()
        .with_poll_policy(PollPolicy::immediate(max_attempts))
        .with_output_dir(dir);
    AppMetricaClient::with_http_client(
        transport,
        Credentials::new("1111", "app-token"),
        cache_option,
        config,
    )
}

// =============================================================================
// Polling
// =============================================================================

#[tokio::test]
async fn when_export_is_accepted_twice_the_same_request_is_reissued_until_ready() {
    // Given: the server is still preparing the log for the first two calls
    let dir = tempfile::tempdir().expect("temp dir");
    let transport = Arc::new(ScriptedHttpClient::new().on(
        EXPORT_CSV,
        vec![
            accepted(),
            accepted(),
            HttpResponse::new(200, "install_datetime\tappmetrica_device_id\n2023-01-01 10:00:00\t42\n")
                .with_header("x-request-id", "abc"),
        ],
    ));
    let client = client(Arc::clone(&transport), dir.path(), None, 100);

    // When: the export runs
    let outcome = client
        .export(&params(), "installs", ExportFormat::Csv)
        .await
        .expect("export should finish");

    // Then: three identical requests were issued and exactly one file was written
    let requests = transport.requests();
    assert_eq!(requests.len(), 3);
    assert!(requests.iter().all(|request| request == &requests[0]));
    assert_eq!(files_in(dir.path()), vec!["installs_2023-01-01_2023-01-31.csv"]);

    let (path, headers) = match outcome {
        ExportOutcome::Saved { path, headers } => (path, headers),
        other => panic!("expected a saved export, got {other:?}"),
    };
    assert_eq!(headers.get("x-request-id").map(String::as_str), Some("abc"));
    assert_eq!(
        std::fs::read_to_string(path).expect("readable"),
        "install_datetime,appmetrica_device_id\r\n2023-01-01 10:00:00,42\r\n"
    );
}

#[tokio::test]
async fn when_export_never_leaves_the_queue_the_poller_reports_exhaustion() {
    // Given: a server that keeps answering 202
    let dir = tempfile::tempdir().expect("temp dir");
    let transport = Arc::new(ScriptedHttpClient::new().on(EXPORT_CSV, vec![accepted()]));
    let client = client(Arc::clone(&transport), dir.path(), None, 3);

    // When: the export runs with a budget of three attempts
    let outcome = client
        .export(&params(), "installs", ExportFormat::Csv)
        .await
        .expect("export should finish");

    // Then: the budget is spent and the outcome says so explicitly
    assert_eq!(transport.requests().len(), 3);
    assert!(files_in(dir.path()).is_empty());
    assert!(matches!(outcome, ExportOutcome::Exhausted { attempts: 3, .. }));
    assert_eq!(
        outcome.headers().get("retry-after").map(String::as_str),
        Some("30")
    );
}

#[tokio::test(start_paused = true)]
async fn each_accepted_answer_waits_one_interval_before_retrying() {
    // Given: a 30 s interval and a log that is ready on the third call
    let dir = tempfile::tempdir().expect("temp dir");
    let transport = Arc::new(ScriptedHttpClient::new().on(
        EXPORT_CSV,
        vec![accepted(), accepted(), HttpResponse::new(200, "a\tb\n")],
    ));
    let config = ClientConfig::default()
        .with_poll_policy(PollPolicy::fixed(Duration::from_secs(30), 100))
        .with_output_dir(dir.path());
    let client = AppMetricaClient::with_http_client(
        transport.clone(),
        Credentials::new("1111", "app-token"),
        None,
        config,
    );
    let started = tokio::time::Instant::now();

    // When: the export runs
    let outcome = client
        .export(&params(), "installs", ExportFormat::Csv)
        .await
        .expect("export should finish");

    // Then: the two 202 answers cost exactly two intervals
    assert!(outcome.is_saved());
    assert_eq!(transport.requests().len(), 3);
    assert_eq!(started.elapsed(), Duration::from_secs(60));
}

#[tokio::test]
async fn zero_attempt_budget_is_rejected_before_any_request() {
    let dir = tempfile::tempdir().expect("temp dir");
    let transport = Arc::new(ScriptedHttpClient::new().on(EXPORT_CSV, vec![accepted()]));
    let client = client(Arc::clone(&transport), dir.path(), None, 0);

    let error = client
        .export(&params(), "installs", ExportFormat::Csv)
        .await
        .expect_err("a zero budget is a configuration fault");

    assert!(matches!(error, LogsApiError::Config(ConfigError::NoPollAttempts)));
    assert!(transport.requests().is_empty());
}

// =============================================================================
// Terminal statuses
// =============================================================================

#[tokio::test]
async fn when_export_is_ready_as_json_the_body_is_written_compactly() {
    let dir = tempfile::tempdir().expect("temp dir");
    let transport = Arc::new(ScriptedHttpClient::new().on(
        EXPORT_JSON,
        vec![HttpResponse::ok_json(
            r#"{ "data": [ { "event_name": "app_open" } ] }"#,
        )],
    ));
    let client = client(Arc::clone(&transport), dir.path(), None, 100);
    let params = RequestParams::new()
        .with("date_since", "2023-02-01")
        .with("date_until", "2023-02-02");

    let outcome = client
        .export(&params, "events", ExportFormat::Json)
        .await
        .expect("export should finish");

    assert!(outcome.is_saved());
    let written = std::fs::read_to_string(dir.path().join("events_2023-02-01_2023-02-02.json"))
        .expect("json file should exist");
    assert_eq!(written, r#"{"data":[{"event_name":"app_open"}]}"#);
}

#[tokio::test]
async fn when_export_is_rejected_nothing_is_written_and_headers_are_returned() {
    // Given: the server rejects the request outright
    let dir = tempfile::tempdir().expect("temp dir");
    let transport = Arc::new(ScriptedHttpClient::new().on(
        EXPORT_CSV,
        vec![HttpResponse::new(400, r#"{"message":"bad fields"}"#).with_header("x-trace", "t-1")],
    ));
    let client = client(Arc::clone(&transport), dir.path(), None, 100);

    // When: the export runs
    let outcome = client
        .export(&params(), "installs", ExportFormat::Csv)
        .await
        .expect("a rejection is not a fault");

    // Then: a single request was made and no file exists
    assert_eq!(transport.requests().len(), 1);
    assert!(files_in(dir.path()).is_empty());
    assert!(matches!(outcome, ExportOutcome::NotSaved { status: 400, .. }));
    assert_eq!(outcome.headers().get("x-trace").map(String::as_str), Some("t-1"));
}

#[tokio::test]
async fn when_dates_are_missing_the_file_name_keeps_empty_segments() {
    let dir = tempfile::tempdir().expect("temp dir");
    let transport = Arc::new(
        ScriptedHttpClient::new().on(EXPORT_JSON, vec![HttpResponse::ok_json(r#"{"data":[]}"#)]),
    );
    let client = client(transport, dir.path(), None, 100);

    client
        .export(&RequestParams::new(), "events", ExportFormat::Json)
        .await
        .expect("export should finish");

    assert_eq!(files_in(dir.path()), vec!["events__.json"]);
}

// =============================================================================
// Request shape
// =============================================================================

#[tokio::test]
async fn export_requests_carry_parameters_and_cache_control() {
    let dir = tempfile::tempdir().expect("temp dir");
    let transport = Arc::new(
        ScriptedHttpClient::new().on(EXPORT_CSV, vec![HttpResponse::new(200, "a\tb\n")]),
    );
    let client = client(Arc::clone(&transport), dir.path(), Some(600), 100);

    client
        .export(&params(), "installs", ExportFormat::Csv)
        .await
        .expect("export should finish");

    let request = &transport.requests()[0];
    assert_eq!(
        request.url,
        "https://api.appmetrica.yandex.ru/logs/v1/export/installs.csv?application_id=1111"
    );
    assert!(request
        .query
        .contains(&(String::from("date_since"), String::from("2023-01-01"))));
    assert!(request.query.contains(&(
        String::from("fields"),
        String::from("appmetrica_device_id,install_datetime")
    )));
    assert_eq!(
        request.headers.get("cache-control").map(String::as_str),
        Some("max-age=600")
    );
    assert_eq!(
        request.headers.get("authorization").map(String::as_str),
        Some("OAuth app-token")
    );
    assert_eq!(request.timeout_ms, 30_000);
}

// =============================================================================
// Faults
// =============================================================================

#[tokio::test]
async fn transport_failures_propagate_as_errors() {
    let dir = tempfile::tempdir().expect("temp dir");
    let transport = Arc::new(
        ScriptedHttpClient::new().fail(EXPORT_CSV, HttpError::new("request timeout: 30s elapsed")),
    );
    let client = client(transport, dir.path(), None, 100);

    let error = client
        .export(&params(), "installs", ExportFormat::Csv)
        .await
        .expect_err("timeouts are faults");

    assert!(matches!(error, LogsApiError::Transport(_)));
    assert!(error.to_string().contains("request timeout"));
}

#[tokio::test]
async fn empty_source_is_rejected_before_any_request() {
    let dir = tempfile::tempdir().expect("temp dir");
    let transport = Arc::new(ScriptedHttpClient::new());
    let client = client(Arc::clone(&transport), dir.path(), None, 100);

    let error = client
        .export(&params(), " ", ExportFormat::Csv)
        .await
        .expect_err("empty source is invalid");

    assert!(matches!(error, LogsApiError::Params(_)));
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn source_with_path_separators_cannot_escape_the_output_directory() {
    let dir = tempfile::tempdir().expect("temp dir");
    let transport = Arc::new(ScriptedHttpClient::new());
    let client = client(Arc::clone(&transport), dir.path(), None, 100);

    let error = client
        .export(&params(), "../installs", ExportFormat::Csv)
        .await
        .expect_err("a path is not a source name");

    assert!(matches!(
        error,
        LogsApiError::Params(ParamsError::InvalidSource { .. })
    ));
    assert!(transport.requests().is_empty());
    assert!(files_in(dir.path()).is_empty());
}
