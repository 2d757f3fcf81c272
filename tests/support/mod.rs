//! Scripted transport shared by the behaviour tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;

use logpull_core::{HttpClient, HttpError, HttpRequest, HttpResponse};

/// Answers requests from per-endpoint queues and records every request.
///
/// A route matches when the request URL (without query pairs) ends with its
/// suffix. The last queued response of a route is repeated once the others
/// have been consumed.
#[derive(Debug, Default)]
pub struct ScriptedHttpClient {
    routes: Mutex<Vec<(String, VecDeque<Result<HttpResponse, HttpError>>)>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(self, suffix: &str, responses: Vec<HttpResponse>) -> Self {
        self.routes
            .lock()
            .expect("route table should not be poisoned")
            .push((suffix.to_string(), responses.into_iter().map(Ok).collect()));
        self
    }

    pub fn fail(self, suffix: &str, error: HttpError) -> Self {
        self.routes
            .lock()
            .expect("route table should not be poisoned")
            .push((suffix.to_string(), VecDeque::from([Err(error)])));
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .expect("request store should not be poisoned")
            .clone()
    }

    pub fn calls_to(&self, suffix: &str) -> usize {
        self.requests()
            .iter()
            .filter(|request| request.url.ends_with(suffix))
            .count()
    }

    fn next_response(&self, url: &str) -> Result<HttpResponse, HttpError> {
        let mut routes = self
            .routes
            .lock()
            .expect("route table should not be poisoned");
        let queue = routes
            .iter_mut()
            .find(|(suffix, _)| url.ends_with(suffix.as_str()))
            .map(|(_, queue)| queue)
            .ok_or_else(|| HttpError::new(format!("no scripted response for {url}")))?;

        if queue.len() > 1 {
            queue
                .pop_front()
                .unwrap_or_else(|| Err(HttpError::new("empty script")))
        } else {
            queue
                .front()
                .cloned()
                .unwrap_or_else(|| Err(HttpError::new("empty script")))
        }
    }
}

impl HttpClient for ScriptedHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        let response = self.next_response(&request.url);
        self.requests
            .lock()
            .expect("request store should not be poisoned")
            .push(request);
        Box::pin(async move { response })
    }
}

/// Names of the files currently present in `dir`, sorted.
pub fn files_in(dir: &std::path::Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("output dir should be readable")
        .map(|entry| {
            entry
                .expect("dir entry")
                .file_name()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    names.sort();
    names
}
