//! The contract every per-domain endpoint enumeration implements.

use std::borrow::Cow;

use crate::http::HttpMethod;

/// A backend operation that knows its relative path and HTTP method.
///
/// Implementors are closed enums, one per backend domain. A
/// `BackendRequester` is bound to exactly one implementor, so handing it an
/// endpoint from another domain is a compile error.
pub trait Endpoint {
    /// Path relative to the base URL, without a leading `/`.
    ///
    /// Associated data is rendered verbatim; callers are responsible for
    /// sanitizing values that contain `/`, `?` or `#`.
    fn path(&self) -> Cow<'static, str>;

    fn method(&self) -> HttpMethod;
}
