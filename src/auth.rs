use async_trait::async_trait;
use axum::http::{header, HeaderMap};
use base64::{engine::general_purpose::STANDARD, Engine};

use crate::error::{Error, Result};

/// The authenticated actor behind a mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
}

impl Identity {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Credentials {
    Basic { username: String, password: String },
    Malformed,
    Missing,
}

impl Credentials {
    /// Read HTTP Basic credentials from the `Authorization` header.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let Some(value) = headers.get(header::AUTHORIZATION) else {
            return Credentials::Missing;
        };

        let Some(encoded) = value
            .to_str()
            .ok()
            .and_then(|v| v.strip_prefix("Basic "))
        else {
            return Credentials::Malformed;
        };

        let decoded = STANDARD
            .decode(encoded.trim())
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok());

        match decoded.as_deref().and_then(|pair| pair.split_once(':')) {
            Some((username, password)) => Credentials::Basic {
                username: username.to_string(),
                password: password.to_string(),
            },
            None => Credentials::Malformed,
        }
    }

    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials::Basic {
            username: username.into(),
            password: password.into(),
        }
    }
}

#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Resolve credentials to an identity, or fail with `Error::Unauthorized`.
    async fn check(&self, credentials: &Credentials) -> Result<Identity>;
}

/// A single configured user.
pub struct StaticAuthenticator {
    username: String,
    password: String,
}

impl StaticAuthenticator {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

#[async_trait]
impl Authenticator for StaticAuthenticator {
    async fn check(&self, credentials: &Credentials) -> Result<Identity> {
        match credentials {
            Credentials::Basic { username, password }
                if *username == self.username && *password == self.password =>
            {
                Ok(Identity::new(username.clone()))
            }
            Credentials::Basic { .. } => {
                Err(Error::Unauthorized("invalid username or password".to_string()))
            }
            Credentials::Malformed => {
                Err(Error::Unauthorized("malformed Authorization header".to_string()))
            }
            Credentials::Missing => Err(Error::Unauthorized("credentials required".to_string())),
        }
    }
}
