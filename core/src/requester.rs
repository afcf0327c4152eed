//! Generic requester: endpoint in, one completion out.
//!
//! # Design
//! `BackendRequester` holds only a base URL and a transport, and carries no
//! mutable state between calls. Building is split from dispatch:
//! `build_request*` turns an endpoint into an `HttpRequest` without touching
//! the network, and `request*` hands that request to the transport.
//!
//! Failures found while building (a URL that does not parse, a payload that
//! does not serialize) complete the call on the caller's thread before the
//! transport is involved. The completion is `FnOnce`, and both paths
//! consume it, so it runs exactly once per call.

use std::collections::HashMap;
use std::marker::PhantomData;

use serde::Serialize;
use url::Url;

use crate::config::RequesterConfig;
use crate::endpoint::Endpoint;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::{Transport, UreqTransport};

/// Caller-supplied request headers.
pub type Headers = HashMap<String, String>;

const CONTENT_TYPE: &str = "content-type";
const APPLICATION_JSON: &str = "application/json";

/// Sends requests for the endpoints of one backend domain.
///
/// `E` fixes which endpoints this requester accepts; `T` performs the I/O.
pub struct BackendRequester<E, T = UreqTransport> {
    base_url: String,
    transport: T,
    _endpoint: PhantomData<fn(E)>,
}

impl<E, T: Clone> Clone for BackendRequester<E, T> {
    fn clone(&self) -> Self {
        Self {
            base_url: self.base_url.clone(),
            transport: self.transport.clone(),
            _endpoint: PhantomData,
        }
    }
}

impl<E, T: std::fmt::Debug> std::fmt::Debug for BackendRequester<E, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendRequester")
            .field("base_url", &self.base_url)
            .field("transport", &self.transport)
            .finish()
    }
}

impl<E: Endpoint> Default for BackendRequester<E, UreqTransport> {
    fn default() -> Self {
        Self::new(&RequesterConfig::default())
    }
}

impl<E: Endpoint> BackendRequester<E, UreqTransport> {
    pub fn new(config: &RequesterConfig) -> Self {
        Self::with_transport(config, UreqTransport::new(config.timeout))
    }
}

impl<E: Endpoint, T> BackendRequester<E, T> {
    pub fn with_transport(config: &RequesterConfig, transport: T) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            transport,
            _endpoint: PhantomData,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Compose `base_url + "/" + path` and validate it.
    ///
    /// A path whose segments would climb out of the endpoint once the URL
    /// is normalized (`..`, `.`, their percent-encoded forms, or a `\`
    /// separator) is rejected as `InvalidUrl`.
    pub fn endpoint_url(&self, endpoint: &E) -> Result<Url, ApiError> {
        let path = endpoint.path();
        let composed = format!("{}/{}", self.base_url, path);
        if has_dot_segment(&path) {
            tracing::warn!(url = %composed, "endpoint path contains a dot segment");
            return Err(ApiError::InvalidUrl { url: composed });
        }
        Url::parse(&composed).map_err(|err| {
            tracing::warn!(url = %composed, error = %err, "composed endpoint URL does not parse");
            ApiError::InvalidUrl { url: composed }
        })
    }

    /// Build a request without a body.
    pub fn build_request(
        &self,
        endpoint: &E,
        headers: Option<&Headers>,
    ) -> Result<HttpRequest, ApiError> {
        self.assemble(endpoint, None, headers)
    }

    /// Build a request carrying `input` encoded as JSON.
    pub fn build_request_with_input<I: Serialize + ?Sized>(
        &self,
        endpoint: &E,
        input: &I,
        headers: Option<&Headers>,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(input).map_err(|err| {
            tracing::warn!(path = %endpoint.path(), error = %err, "request payload does not serialize");
            ApiError::SerializationError(err.to_string())
        })?;
        self.assemble(endpoint, Some(body), headers)
    }

    fn assemble(
        &self,
        endpoint: &E,
        body: Option<String>,
        headers: Option<&Headers>,
    ) -> Result<HttpRequest, ApiError> {
        let url = self.endpoint_url(endpoint)?;

        let mut outgoing: Vec<(String, String)> = Vec::new();
        if body.is_some() {
            outgoing.push((CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string()));
        }
        // HashMap order is random; sort first so the same map always
        // resolves case-insensitive duplicates to the same entry.
        let mut supplied: Vec<(&String, &String)> = headers.into_iter().flatten().collect();
        supplied.sort();
        for (name, value) in supplied {
            outgoing.retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
            outgoing.push((name.clone(), value.clone()));
        }
        outgoing.sort();

        Ok(HttpRequest {
            method: endpoint.method(),
            url: url.into(),
            headers: outgoing,
            body,
        })
    }
}

impl<E: Endpoint, T: Transport> BackendRequester<E, T> {
    /// Send a request without a body to `to`.
    pub fn request<F>(&self, to: E, headers: Option<&Headers>, completion: F)
    where
        F: FnOnce(Result<HttpResponse, ApiError>) + Send + 'static,
    {
        self.dispatch(self.build_request(&to, headers), completion);
    }

    /// Send `input` as the JSON body of a request to `to`.
    pub fn request_with_input<I, F>(
        &self,
        to: E,
        input: &I,
        headers: Option<&Headers>,
        completion: F,
    ) where
        I: Serialize + ?Sized,
        F: FnOnce(Result<HttpResponse, ApiError>) + Send + 'static,
    {
        self.dispatch(self.build_request_with_input(&to, input, headers), completion);
    }

    fn dispatch<F>(&self, built: Result<HttpRequest, ApiError>, completion: F)
    where
        F: FnOnce(Result<HttpResponse, ApiError>) + Send + 'static,
    {
        let request = match built {
            Ok(request) => request,
            Err(err) => {
                completion(Err(err));
                return;
            }
        };

        tracing::debug!(method = %request.method, url = %request.url, "dispatching backend request");
        let method = request.method;
        let url = request.url.clone();
        self.transport.execute(
            request,
            Box::new(move |outcome| {
                let result = outcome.and_then(parse_response);
                match &result {
                    Ok(response) => {
                        tracing::debug!(%method, %url, status = response.status, "backend request succeeded")
                    }
                    Err(err) => tracing::debug!(%method, %url, error = %err, "backend request failed"),
                }
                completion(result);
            }),
        );
    }
}

/// Map a raw response onto the requester's result.
///
/// Any 2xx is success and the response is returned untouched. 404 becomes
/// `NotFound`; every other status becomes `HttpError`.
pub fn parse_response(response: HttpResponse) -> Result<HttpResponse, ApiError> {
    if response.is_success() {
        return Ok(response);
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: String::from_utf8_lossy(&response.body).into_owned(),
    })
}

/// True when any `/`-separated segment of the path part of `path` is a dot
/// segment, or the path uses `\` as a separator.
fn has_dot_segment(path: &str) -> bool {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    path.contains('\\')
        || path.split('/').any(|segment| {
            matches!(
                segment.to_ascii_lowercase().as_str(),
                "." | ".." | "%2e" | ".%2e" | "%2e." | "%2e%2e"
            )
        })
}
