//! Request payloads for the user endpoints.
//!
//! # Design
//! The requester accepts any `Serialize` value as a payload; these types are
//! the shapes the backend expects and are what the mock server decodes.
//! They are defined independently from the mock server so integration tests
//! catch schema drift.

use serde::{Deserialize, Serialize};

/// Body of a `login` request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Body of a `register` request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Body of a `resetPassword` request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PasswordReset {
    pub email: String,
}
