//! C-ABI wrapper around `backend-core`.
//!
//! # Overview
//! Exposes the user and product requesters through `extern "C"` functions
//! so a host with a C FFI can build requests and map responses with the same
//! URL, header and status rules as the Rust transport, while executing the
//! HTTP round-trip itself.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Builders return null on any failure and, when the caller passes a
//!   non-null `error` out-parameter, write the `FfiErrorCode` that says why
//!   (`NullArg`, `Serialization`, `InvalidUrl` or `Panic`; `Ok` on success).
//! - `backend_parse_response` and `backend_transport_failure` always return a
//!   result envelope carrying an `FfiErrorCode`.
//! - The C caller owns all returned pointers and must call the matching
//!   `backend_free_*` function to release them.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use backend_core::{
    parse_response, ApiError, BackendRequester, Headers, HttpRequest, HttpResponse,
    RequesterConfig, UserEndpoint,
};

use types::*;

/// Read a borrowed C string. Invalid UTF-8 is replaced rather than rejected.
fn read_str(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    Some(unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned())
}

/// Read `len` caller-owned headers. Entries with a null key or value are
/// skipped; a null array yields no headers.
fn read_headers(headers: *const FfiHeaderInput, len: u32) -> Headers {
    if headers.is_null() || len == 0 {
        return Headers::new();
    }
    let entries = unsafe { std::slice::from_raw_parts(headers, len as usize) };
    entries
        .iter()
        .filter_map(|h| Some((read_str(h.key)?, read_str(h.value)?)))
        .collect()
}

/// Parse an optional JSON body. `Err(())` means the body was present but
/// not valid JSON.
fn read_body(body_json: *const c_char) -> Result<Option<serde_json::Value>, ()> {
    match read_str(body_json) {
        None => Ok(None),
        Some(raw) => serde_json::from_str(&raw).map(Some).map_err(|_| ()),
    }
}

/// Read `len` caller-owned bytes. A null pointer yields no bytes.
fn read_bytes(ptr: *const u8, len: u32) -> Vec<u8> {
    if ptr.is_null() || len == 0 {
        return Vec::new();
    }
    unsafe { std::slice::from_raw_parts(ptr, len as usize) }.to_vec()
}

fn config_from(base_url: *const c_char) -> Option<RequesterConfig> {
    read_str(base_url).map(|url| RequesterConfig::new(&url))
}

/// Write `code` through the optional out-parameter.
fn report(error: *mut FfiErrorCode, code: FfiErrorCode) {
    if !error.is_null() {
        unsafe { *error = code };
    }
}

/// Hand a built request to C, or report why there is none.
fn finish_build(
    built: Result<HttpRequest, FfiErrorCode>,
    error: *mut FfiErrorCode,
) -> *mut FfiHttpRequest {
    match built {
        Ok(req) => {
            report(error, FfiErrorCode::Ok);
            FfiHttpRequest::from_core(req)
        }
        Err(code) => {
            report(error, code);
            std::ptr::null_mut()
        }
    }
}

// ---------------------------------------------------------------------------
// Requester lifecycle
// ---------------------------------------------------------------------------

/// Create a user requester bound to `base_url`.
///
/// Returns null if `base_url` is null or if an internal panic occurs.
/// The caller must free the returned pointer with `backend_user_requester_free`.
#[unsafe(no_mangle)]
pub extern "C" fn backend_user_requester_new(base_url: *const c_char) -> *mut FfiUserRequester {
    catch_unwind(AssertUnwindSafe(|| match config_from(base_url) {
        Some(config) => Box::into_raw(Box::new(FfiUserRequester {
            inner: BackendRequester::with_transport(&config, ()),
        })),
        None => std::ptr::null_mut(),
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Free a requester created by `backend_user_requester_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn backend_user_requester_free(requester: *mut FfiUserRequester) {
    if !requester.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(requester) });
        }));
    }
}

/// Create a product requester bound to `base_url`.
///
/// Returns null if `base_url` is null or if an internal panic occurs.
/// The caller must free the returned pointer with `backend_product_requester_free`.
#[unsafe(no_mangle)]
pub extern "C" fn backend_product_requester_new(base_url: *const c_char) -> *mut FfiProductRequester {
    catch_unwind(AssertUnwindSafe(|| match config_from(base_url) {
        Some(config) => Box::into_raw(Box::new(FfiProductRequester {
            inner: BackendRequester::with_transport(&config, ()),
        })),
        None => std::ptr::null_mut(),
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Free a requester created by `backend_product_requester_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn backend_product_requester_free(requester: *mut FfiProductRequester) {
    if !requester.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(requester) });
        }));
    }
}

// ---------------------------------------------------------------------------
// Build request functions
// ---------------------------------------------------------------------------

/// Build a request for a user endpoint.
///
/// `body_json` may be null (no body) or a JSON document sent as the body.
/// `headers` may be null when `headers_len` is 0. `error` may be null; when
/// it is not, it receives `Ok` on success, `NullArg` for a null requester,
/// `Serialization` for a malformed `body_json`, `InvalidUrl` when the
/// composed URL is rejected, or `Panic`.
/// Returns null on failure.
/// The caller must free the returned pointer with `backend_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn backend_build_user_request(
    requester: *const FfiUserRequester,
    endpoint: FfiUserEndpoint,
    body_json: *const c_char,
    headers: *const FfiHeaderInput,
    headers_len: u32,
    error: *mut FfiErrorCode,
) -> *mut FfiHttpRequest {
    catch_unwind(AssertUnwindSafe(|| {
        if requester.is_null() {
            return finish_build(Err(FfiErrorCode::NullArg), error);
        }
        let requester = unsafe { &*requester };
        let body = match read_body(body_json) {
            Ok(body) => body,
            Err(()) => return finish_build(Err(FfiErrorCode::Serialization), error),
        };
        let headers = read_headers(headers, headers_len);
        let endpoint: UserEndpoint = endpoint.into();
        let built = match body {
            Some(input) => requester
                .inner
                .build_request_with_input(&endpoint, &input, Some(&headers)),
            None => requester.inner.build_request(&endpoint, Some(&headers)),
        };
        finish_build(built.map_err(|e| FfiErrorCode::from(&e)), error)
    }))
    .unwrap_or_else(|_| finish_build(Err(FfiErrorCode::Panic), error))
}

/// Build a request for a product endpoint.
///
/// `code` is required for `Detail` and ignored for `List`.
/// `headers` may be null when `headers_len` is 0. `error` may be null; when
/// it is not, it receives `Ok` on success, `NullArg` for a null requester or
/// a missing `Detail` code, `InvalidUrl` when the composed URL is rejected,
/// or `Panic`.
/// Returns null on failure.
/// The caller must free the returned pointer with `backend_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn backend_build_product_request(
    requester: *const FfiProductRequester,
    endpoint: FfiProductEndpoint,
    code: *const c_char,
    headers: *const FfiHeaderInput,
    headers_len: u32,
    error: *mut FfiErrorCode,
) -> *mut FfiHttpRequest {
    catch_unwind(AssertUnwindSafe(|| {
        if requester.is_null() {
            return finish_build(Err(FfiErrorCode::NullArg), error);
        }
        let requester = unsafe { &*requester };
        let endpoint = match endpoint.into_core(read_str(code)) {
            Some(endpoint) => endpoint,
            None => return finish_build(Err(FfiErrorCode::NullArg), error),
        };
        let headers = read_headers(headers, headers_len);
        let built = requester.inner.build_request(&endpoint, Some(&headers));
        finish_build(built.map_err(|e| FfiErrorCode::from(&e)), error)
    }))
    .unwrap_or_else(|_| finish_build(Err(FfiErrorCode::Panic), error))
}

// ---------------------------------------------------------------------------
// Response mapping
// ---------------------------------------------------------------------------

/// Map an executed response onto a result envelope.
///
/// 2xx is `Ok` with the body copied out; 404 is `NotFound`; any other
/// status is `Http` with `http_status` set.
/// The caller must free the returned pointer with `backend_free_result`.
#[unsafe(no_mangle)]
pub extern "C" fn backend_parse_response(response: *const FfiHttpResponse) -> *mut FfiBackendResult {
    catch_unwind(AssertUnwindSafe(|| {
        if response.is_null() {
            return FfiBackendResult::null_arg("response");
        }
        let resp = unsafe { &*response };
        let core_resp = HttpResponse {
            status: resp.status,
            headers: Vec::new(),
            body: read_bytes(resp.body, resp.body_len),
        };
        match parse_response(core_resp) {
            Ok(response) => FfiBackendResult::ok(response),
            Err(e) => FfiBackendResult::from_error(e),
        }
    }))
    .unwrap_or_else(|_| FfiBackendResult::panic("panic in backend_parse_response"))
}

/// Report a round-trip the host could not complete (connection refused,
/// timeout, TLS failure, ...) as a `Transport` result.
///
/// `message` may be null.
/// The caller must free the returned pointer with `backend_free_result`.
#[unsafe(no_mangle)]
pub extern "C" fn backend_transport_failure(message: *const c_char) -> *mut FfiBackendResult {
    catch_unwind(AssertUnwindSafe(|| {
        let message = read_str(message).unwrap_or_default();
        FfiBackendResult::from_error(ApiError::TransportError(message))
    }))
    .unwrap_or_else(|_| FfiBackendResult::panic("panic in backend_transport_failure"))
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiHttpRequest` returned by any `backend_build_*` function.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn backend_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| {
        let req = unsafe { Box::from_raw(req) };
        free_c_string(req.url);
        free_c_string(req.body);
        if !req.headers.is_null() && req.headers_len > 0 {
            let headers = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    req.headers,
                    req.headers_len as usize,
                ))
            };
            for h in headers.iter() {
                free_c_string(h.key);
                free_c_string(h.value);
            }
        }
    }));
}

/// Free an `FfiBackendResult` returned by `backend_parse_response` or
/// `backend_transport_failure`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn backend_free_result(result: *mut FfiBackendResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| {
        let result = unsafe { Box::from_raw(result) };
        free_c_string(result.error_message);
        if !result.body.is_null() {
            drop(unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    result.body,
                    result.body_len as usize,
                ))
            });
        }
    }));
}

fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
