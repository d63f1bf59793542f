//! [`reqwest`]-backed implementation of [`HttpEngine`].
//!
//! Each request runs as a task on a tokio runtime; the completion callback is
//! invoked from that task.

use std::time::Duration;

use thiserror::Error;
use tokio::runtime::Handle;
use tracing::trace;

use super::engine::{Completion, HttpEngine};
use super::request::{HttpMethod, HttpRequest, HttpResponse, RequestOutcome};

/// Errors while constructing a [`ReqwestEngine`].
#[derive(Debug, Error)]
pub enum EngineError {
    /// No tokio runtime is running on the current thread.
    #[error("no tokio runtime available: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),

    /// The reqwest client could not be built.
    #[error("HTTP client build failed: {0}")]
    Build(#[from] reqwest::Error),
}

/// An [`HttpEngine`] running requests through a shared [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct ReqwestEngine {
    client: reqwest::Client,
    runtime: Handle,
}

impl ReqwestEngine {
    /// Create an engine spawning onto `runtime` with a default client.
    pub fn new(runtime: Handle) -> Self {
        Self::with_client(reqwest::Client::new(), runtime)
    }

    /// Create an engine spawning onto the runtime of the calling thread.
    pub fn current() -> Result<Self, EngineError> {
        Ok(Self::new(Handle::try_current()?))
    }

    /// Create an engine whose client enforces `connect_timeout` when dialing.
    pub fn with_connect_timeout(
        runtime: Handle,
        connect_timeout: Duration,
    ) -> Result<Self, EngineError> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()?;
        Ok(Self::with_client(client, runtime))
    }

    /// Create an engine from an existing client.
    pub fn with_client(client: reqwest::Client, runtime: Handle) -> Self {
        Self { client, runtime }
    }
}

impl HttpEngine for ReqwestEngine {
    fn send(&self, request: HttpRequest, on_complete: Completion) {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };

        trace!(method = %request.method, uri = %request.uri, "dispatching request");

        let mut builder = self.client.request(method, request.uri);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        self.runtime.spawn(async move {
            let outcome = execute(builder).await;
            on_complete(outcome);
        });
    }
}

async fn execute(builder: reqwest::RequestBuilder) -> RequestOutcome {
    let resp = match builder.send().await {
        Ok(resp) => resp,
        Err(e) => return classify(&e),
    };

    let status = resp.status();
    let message = status.canonical_reason().unwrap_or_default().to_string();
    let headers: Vec<(String, String)> = resp
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_lowercase(), v.to_string()))
        })
        .collect();

    match resp.bytes().await {
        Ok(body) => RequestOutcome::Finished(HttpResponse {
            status: status.as_u16(),
            message,
            headers,
            body,
        }),
        Err(e) => classify(&e),
    }
}

fn classify(err: &reqwest::Error) -> RequestOutcome {
    if err.is_timeout() {
        if err.is_connect() {
            RequestOutcome::ConnectionTimedOut
        } else {
            RequestOutcome::TimedOut
        }
    } else {
        RequestOutcome::Error(err.to_string())
    }
}
