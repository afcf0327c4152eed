//! End-to-end requests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives both requesters
//! through the default `UreqTransport`. Completions run on transport
//! threads, so each call waits on a channel and also checks that nothing
//! else arrives afterwards.

use std::io::{Read, Write};
use std::sync::mpsc;
use std::time::{Duration, Instant};

use backend_core::{
    ApiError, BackendRequester, Credentials, Endpoint, Headers, HttpResponse, PasswordReset,
    ProductBackendRequester, ProductEndpoint, Registration, RequesterConfig, UserBackendRequester,
    UserEndpoint,
};

fn start_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

/// A one-connection server that answers with `reply` verbatim, or holds the
/// connection open without answering when `reply` is `None`.
fn start_raw_server(reply: Option<&'static [u8]>) -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut head = Vec::new();
        let mut buf = [0u8; 1024];
        while !head.windows(4).any(|w| w == b"\r\n\r\n") {
            match stream.read(&mut buf) {
                Ok(0) | Err(_) => return,
                Ok(n) => head.extend_from_slice(&buf[..n]),
            }
        }
        match reply {
            Some(bytes) => {
                let _ = stream.write_all(bytes);
            }
            None => std::thread::sleep(Duration::from_secs(30)),
        }
    });

    format!("http://{addr}")
}

fn config(base_url: &str) -> RequesterConfig {
    RequesterConfig::new(base_url).with_timeout(Duration::from_secs(5))
}

/// Run one request and return its single completion.
fn await_completion<R>(run: R) -> Result<HttpResponse, ApiError>
where
    R: FnOnce(Box<dyn FnOnce(Result<HttpResponse, ApiError>) + Send>),
{
    let (tx, rx) = mpsc::channel();
    run(Box::new(move |result| tx.send(result).unwrap()));
    let result = rx.recv_timeout(Duration::from_secs(10)).expect("completion never ran");
    assert!(rx.recv_timeout(Duration::from_millis(50)).is_err(), "completion ran twice");
    result
}

#[test]
fn user_account_flow() {
    let base = start_server();
    let users: UserBackendRequester = BackendRequester::new(&config(&base));

    let registration = Registration {
        name: "Ana".to_string(),
        email: "ana@example.com".to_string(),
        password: "hunter2".to_string(),
    };
    let created = await_completion(|done| {
        users.request_with_input(UserEndpoint::Register, &registration, None, done)
    })
    .unwrap();
    assert_eq!(created.status, 201);
    let account: serde_json::Value = serde_json::from_slice(&created.body).unwrap();
    assert_eq!(account["email"], "ana@example.com");

    let duplicate = await_completion(|done| {
        users.request_with_input(UserEndpoint::Register, &registration, None, done)
    })
    .unwrap_err();
    assert!(matches!(duplicate, ApiError::HttpError { status: 409, .. }));

    let credentials = Credentials {
        email: "ana@example.com".to_string(),
        password: "hunter2".to_string(),
    };
    let logged_in = await_completion(|done| {
        users.request_with_input(UserEndpoint::Login, &credentials, None, done)
    })
    .unwrap();
    assert_eq!(logged_in.status, 200);

    let wrong = Credentials {
        password: "nope".to_string(),
        ..credentials
    };
    let rejected = await_completion(|done| {
        users.request_with_input(UserEndpoint::Login, &wrong, None, done)
    })
    .unwrap_err();
    assert!(matches!(rejected, ApiError::HttpError { status: 401, .. }));

    let reset = PasswordReset {
        email: "ana@example.com".to_string(),
    };
    let accepted = await_completion(|done| {
        users.request_with_input(UserEndpoint::ResetPassword, &reset, None, done)
    })
    .unwrap();
    assert_eq!(accepted.status, 202);

    let unknown = PasswordReset {
        email: "ghost@example.com".to_string(),
    };
    let missing = await_completion(|done| {
        users.request_with_input(UserEndpoint::ResetPassword, &unknown, None, done)
    })
    .unwrap_err();
    assert_eq!(missing, ApiError::NotFound);
}

#[test]
fn product_catalog_flow() {
    let base = start_server();
    let products: ProductBackendRequester = BackendRequester::new(&config(&base));

    let listed = await_completion(|done| products.request(ProductEndpoint::List, None, done)).unwrap();
    let catalog: Vec<serde_json::Value> = serde_json::from_slice(&listed.body).unwrap();
    assert_eq!(catalog.len(), 2);

    let detail = await_completion(|done| {
        products.request(ProductEndpoint::detail("123asdf"), None, done)
    })
    .unwrap();
    let product: serde_json::Value = serde_json::from_slice(&detail.body).unwrap();
    assert_eq!(product["name"], "Notebook");

    let missing = await_completion(|done| {
        products.request(ProductEndpoint::detail("does-not-exist"), None, done)
    })
    .unwrap_err();
    assert_eq!(missing, ApiError::NotFound);
}

#[test]
fn headers_reach_the_server() {
    let base = start_server();
    let products: ProductBackendRequester = BackendRequester::new(&config(&base));
    let headers: Headers = [("X-Request-Id".to_string(), "trace-99".to_string())]
        .into_iter()
        .collect();

    let response = await_completion(|done| {
        products.request(ProductEndpoint::List, Some(&headers), done)
    })
    .unwrap();

    assert_eq!(response.header("x-request-id"), Some("trace-99"));
}

#[test]
fn every_user_endpoint_completes_exactly_once() {
    let base = start_server();
    let users: UserBackendRequester = BackendRequester::new(&config(&base));

    // No body: the server rejects each one, but each still completes once.
    for endpoint in UserEndpoint::ALL {
        let result = await_completion(|done| users.request(endpoint, None, done));
        assert!(result.is_err(), "{}", endpoint.path());
    }
}

#[test]
fn unreachable_backend_is_a_transport_error() {
    // Bind then drop to get a port nothing listens on.
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let users: UserBackendRequester = BackendRequester::new(&config(&format!("http://127.0.0.1:{port}")));

    let err = await_completion(|done| users.request(UserEndpoint::Login, None, done)).unwrap_err();
    assert!(matches!(err, ApiError::TransportError(_)));
}

#[test]
fn invalid_base_url_completes_synchronously() {
    let users: UserBackendRequester = BackendRequester::new(&config("::not-a-url::"));
    let (tx, rx) = mpsc::channel();

    users.request(UserEndpoint::Login, None, move |result| tx.send(result).unwrap());

    // Already delivered by the time `request` returns.
    let err = rx.try_recv().unwrap().unwrap_err();
    assert!(matches!(err, ApiError::InvalidUrl { .. }));
}

#[test]
fn binary_body_arrives_byte_for_byte() {
    let base = start_raw_server(Some(
        b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\n\xff\xfe",
    ));
    let products: ProductBackendRequester = BackendRequester::new(&config(&base));

    let response = await_completion(|done| products.request(ProductEndpoint::List, None, done)).unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.body, [0xff, 0xfe]);
}

#[test]
fn silent_backend_times_out() {
    let base = start_raw_server(None);
    let products: ProductBackendRequester =
        BackendRequester::new(&RequesterConfig::new(&base).with_timeout(Duration::from_millis(300)));

    let started = Instant::now();
    let err = await_completion(|done| products.request(ProductEndpoint::List, None, done)).unwrap_err();

    assert!(matches!(err, ApiError::TransportError(_)), "{err:?}");
    assert!(started.elapsed() < Duration::from_secs(5));
}
