//! The seam between request building and network I/O.
//!
//! # Design
//! A `Transport` receives a fully built `HttpRequest` and reports the raw
//! outcome through a one-shot callback. It does not interpret status codes:
//! a 500 is a successful round-trip carrying a 500. Mapping statuses to
//! `ApiError` is the requester's job, so every transport behaves the same.
//!
//! `UreqTransport` is the default. It runs each request on its own thread
//! with a blocking `ureq` agent, which keeps the core free of an async
//! runtime while the caller's thread is never blocked.

use std::thread;
use std::time::Duration;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// One-shot completion handed to a transport.
pub type TransportCallback = Box<dyn FnOnce(Result<HttpResponse, ApiError>) + Send + 'static>;

/// Executes requests built by a `BackendRequester`.
///
/// Implementations must invoke `on_complete` exactly once per call, either
/// with the response (whatever its status) or with
/// `ApiError::TransportError`.
pub trait Transport: Send + Sync {
    fn execute(&self, request: HttpRequest, on_complete: TransportCallback);
}

/// Blocking `ureq` agent driven from a thread per request.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(None)
    }
}

impl UreqTransport {
    /// Disables ureq's status-code-as-error behavior so 4xx/5xx responses
    /// come back as data.
    pub fn new(timeout: Option<Duration>) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout)
            .build()
            .new_agent();
        Self { agent }
    }

    /// Execute `request` on the current thread.
    pub fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let result = match method {
            HttpMethod::Get => with_headers(self.agent.get(&url), &headers).call(),
            HttpMethod::Post => {
                let builder = with_headers(self.agent.post(&url), &headers);
                match body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
        };

        let mut response = result.map_err(|e| ApiError::TransportError(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_vec()
            .map_err(|e| ApiError::TransportError(e.to_string()))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: HttpRequest, on_complete: TransportCallback) {
        let transport = self.clone();
        thread::spawn(move || on_complete(transport.send(request)));
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}
