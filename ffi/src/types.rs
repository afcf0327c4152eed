//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type with C-compatible representations:
//! `*mut c_char` instead of `String`, pointer plus length instead of `Vec`
//! (including response bodies, which are bytes rather than text), and enums
//! with explicit discriminants. Conversions live here to keep
//! `lib.rs` focused on the `extern "C"` surface.

use std::ffi::CString;
use std::os::raw::c_char;

use backend_core::{
    ApiError, BackendRequester, HttpMethod, HttpRequest, HttpResponse, ProductEndpoint,
    UserEndpoint,
};

/// Opaque handle to a requester bound to the user backend.
///
/// The host executes requests itself, so the handle carries no transport.
pub struct FfiUserRequester {
    pub(crate) inner: BackendRequester<UserEndpoint, ()>,
}

/// Opaque handle to a requester bound to the product backend.
pub struct FfiProductRequester {
    pub(crate) inner: BackendRequester<ProductEndpoint, ()>,
}

// ---------------------------------------------------------------------------
// Endpoints
// ---------------------------------------------------------------------------

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiUserEndpoint {
    Login = 0,
    ResetPassword = 1,
    Register = 2,
}

impl From<FfiUserEndpoint> for UserEndpoint {
    fn from(e: FfiUserEndpoint) -> Self {
        match e {
            FfiUserEndpoint::Login => UserEndpoint::Login,
            FfiUserEndpoint::ResetPassword => UserEndpoint::ResetPassword,
            FfiUserEndpoint::Register => UserEndpoint::Register,
        }
    }
}

/// `Detail` takes its code from the separate `code` argument.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiProductEndpoint {
    List = 0,
    Detail = 1,
}

impl FfiProductEndpoint {
    pub(crate) fn into_core(self, code: Option<String>) -> Option<ProductEndpoint> {
        match self {
            FfiProductEndpoint::List => Some(ProductEndpoint::List),
            FfiProductEndpoint::Detail => code.map(ProductEndpoint::detail),
        }
    }
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
        }
    }
}

/// A header supplied by the C caller. The library only reads these.
#[repr(C)]
pub struct FfiHeaderInput {
    pub key: *const c_char,
    pub value: *const c_char,
}

/// A header on a request built by the library.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request described as C-compatible plain data.
///
/// Built by `backend_build_*` functions. The C caller executes the request
/// and passes the response back through `backend_parse_response`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub url: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: HttpRequest) -> *mut Self {
        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Box<[FfiHeader]> = req
                .headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: c_string(k),
                    value: c_string(v),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        let ffi_req = Box::new(FfiHttpRequest {
            method: req.method.into(),
            url: c_string(req.url),
            headers,
            headers_len,
            body: req.body.map(c_string).unwrap_or(std::ptr::null_mut()),
        });
        Box::into_raw(ffi_req)
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response described as C-compatible plain data.
///
/// The C caller constructs this after executing a request, then passes a
/// pointer to `backend_parse_response`. The library reads but does not free
/// these fields. `body` points at `body_len` raw bytes; a null `body` is
/// read as empty.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const u8,
    pub body_len: u32,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiBackendResult`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    InvalidUrl = 1,
    NotFound = 2,
    Http = 3,
    Serialization = 4,
    Transport = 5,
    Panic = 6,
    NullArg = 7,
}

impl From<&ApiError> for FfiErrorCode {
    fn from(err: &ApiError) -> Self {
        match err {
            ApiError::InvalidUrl { .. } => FfiErrorCode::InvalidUrl,
            ApiError::NotFound => FfiErrorCode::NotFound,
            ApiError::HttpError { .. } => FfiErrorCode::Http,
            ApiError::SerializationError(_) => FfiErrorCode::Serialization,
            ApiError::TransportError(_) => FfiErrorCode::Transport,
        }
    }
}

/// Result envelope for `backend_parse_response` and
/// `backend_transport_failure`.
///
/// On success `error_code` is `Ok`, `error_message` is null and
/// `body`/`body_len` hold the raw response bytes (null and 0 when the body
/// is empty). On failure `error_code` names the category, `error_message`
/// is human-readable and `body` is null.
#[repr(C)]
pub struct FfiBackendResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub body: *mut u8,
    pub body_len: u32,
}

impl FfiBackendResult {
    pub(crate) fn ok(response: HttpResponse) -> *mut Self {
        let body_len = response.body.len() as u32;
        let body = if response.body.is_empty() {
            std::ptr::null_mut()
        } else {
            Box::into_raw(response.body.into_boxed_slice()) as *mut u8
        };
        Box::into_raw(Box::new(FfiBackendResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            http_status: response.status,
            body,
            body_len,
        }))
    }

    pub(crate) fn from_error(err: ApiError) -> *mut Self {
        let http_status = match &err {
            ApiError::NotFound => 404,
            ApiError::HttpError { status, .. } => *status,
            _ => 0,
        };
        Self::failure(FfiErrorCode::from(&err), http_status, err.to_string())
    }

    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::failure(FfiErrorCode::NullArg, 0, format!("null argument: {name}"))
    }

    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::failure(FfiErrorCode::Panic, 0, msg.to_string())
    }

    fn failure(error_code: FfiErrorCode, http_status: u16, msg: String) -> *mut Self {
        Box::into_raw(Box::new(FfiBackendResult {
            error_code,
            error_message: c_string(msg),
            http_status,
            body: std::ptr::null_mut(),
            body_len: 0,
        }))
    }
}

/// Hand a Rust string to C. Interior NULs cannot occur in the strings this
/// crate produces; if one did, the caller receives an empty string.
pub(crate) fn c_string(s: String) -> *mut c_char {
    CString::new(s).unwrap_or_default().into_raw()
}
