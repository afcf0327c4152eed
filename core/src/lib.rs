//! Typed requesters for the user and product backends.
//!
//! # Overview
//! Each backend domain exposes a closed set of endpoints. A
//! `BackendRequester` bound to one of those sets composes the endpoint URL
//! from a shared base, attaches headers and an optional JSON payload, and
//! hands the request to a `Transport`. The outcome reaches the caller through
//! a completion that runs exactly once.
//!
//! # Design
//! - Building and dispatch are separate. `build_request*` produces a plain
//!   `HttpRequest` with no I/O, so hosts that do their own networking (see
//!   the FFI crate) reuse the same URL and header rules.
//! - The endpoint type is a generic parameter, so handing a product endpoint
//!   to the user requester does not compile.
//! - Transports never interpret status codes; `parse_response` does, in one
//!   place.

pub mod config;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod product;
pub mod requester;
pub mod transport;
pub mod types;
pub mod user;

pub use config::{RequesterConfig, DEFAULT_BASE_URL};
pub use endpoint::Endpoint;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use product::{ProductBackendRequester, ProductEndpoint};
pub use requester::{parse_response, BackendRequester, Headers};
pub use transport::{Transport, TransportCallback, UreqTransport};
pub use types::{Credentials, PasswordReset, Registration};
pub use user::{UserBackendRequester, UserEndpoint};
