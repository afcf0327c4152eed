//! Endpoints of the user backend: authentication and account management.

use std::borrow::Cow;

use crate::endpoint::Endpoint;
use crate::http::HttpMethod;
use crate::requester::BackendRequester;
use crate::transport::UreqTransport;

/// Operations exposed by the user backend.
///
/// Every variant is a write, so all of them are sent as `POST`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserEndpoint {
    Login,
    ResetPassword,
    Register,
}

impl UserEndpoint {
    pub const ALL: [UserEndpoint; 3] = [
        UserEndpoint::Login,
        UserEndpoint::ResetPassword,
        UserEndpoint::Register,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            UserEndpoint::Login => "login",
            UserEndpoint::ResetPassword => "resetPassword",
            UserEndpoint::Register => "register",
        }
    }
}

impl Endpoint for UserEndpoint {
    fn path(&self) -> Cow<'static, str> {
        Cow::Borrowed(self.name())
    }

    fn method(&self) -> HttpMethod {
        HttpMethod::Post
    }
}

/// Requester bound to the user backend.
pub type UserBackendRequester<T = UreqTransport> = BackendRequester<UserEndpoint, T>;
