//! Endpoints of the product backend: catalog listing and product detail.

use std::borrow::Cow;

use crate::endpoint::Endpoint;
use crate::http::HttpMethod;
use crate::requester::BackendRequester;
use crate::transport::UreqTransport;

/// Operations exposed by the product backend. Both are reads.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProductEndpoint {
    List,
    /// A single product. `code` is interpolated into the path as-is.
    Detail { code: String },
}

impl ProductEndpoint {
    pub fn detail(code: impl Into<String>) -> Self {
        ProductEndpoint::Detail { code: code.into() }
    }
}

impl Endpoint for ProductEndpoint {
    fn path(&self) -> Cow<'static, str> {
        match self {
            ProductEndpoint::List => Cow::Borrowed("list"),
            ProductEndpoint::Detail { code } => Cow::Owned(format!("detail/{code}")),
        }
    }

    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }
}

/// Requester bound to the product backend.
pub type ProductBackendRequester<T = UreqTransport> = BackendRequester<ProductEndpoint, T>;
