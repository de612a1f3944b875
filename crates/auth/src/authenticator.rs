//! Request gate: one capability, two credential schemes.
//!
//! Each scheme names the header it reads; the HTTP layer looks that header
//! up and hands the raw value to [`Authenticator::authenticate`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;
use crate::token::TokenService;

pub const BEARER_PREFIX: &str = "Bearer ";
pub const AUTHORIZATION_HEADER: &str = "authorization";
pub const DEFAULT_SHARED_SECRET_HEADER: &str = "x-scr";

/// Credential scheme selected per route group in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthScheme {
    Token,
    SharedSecret,
}

/// Who passed the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    /// A user holding a valid session token.
    User { username: String },
    /// A caller that knew the shared secret. Carries no per-user identity.
    SharedSecret,
}

impl Identity {
    pub fn username(&self) -> Option<&str> {
        match self {
            Identity::User { username } => Some(username.as_str()),
            Identity::SharedSecret => None,
        }
    }
}

/// Bearer-token scheme: `Authorization: Bearer <token>`.
#[derive(Debug, Clone)]
pub struct TokenAuth {
    tokens: TokenService,
}

impl TokenAuth {
    pub fn new(tokens: TokenService) -> Self {
        Self { tokens }
    }

    fn authenticate(&self, value: Option<&str>, now: DateTime<Utc>) -> Result<Identity, AuthError> {
        let value = value.ok_or(AuthError::MissingCredentials)?;
        let token = value
            .strip_prefix(BEARER_PREFIX)
            .ok_or_else(|| AuthError::malformed("expected 'Bearer' authorization scheme"))?
            .trim();
        if token.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let claims = self.tokens.validate(token, now)?;
        Ok(Identity::User { username: claims.sub })
    }
}

/// Static shared-secret scheme: a header that must equal a configured value.
#[derive(Clone)]
pub struct SharedSecretAuth {
    header: String,
    secret: String,
}

impl core::fmt::Debug for SharedSecretAuth {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SharedSecretAuth")
            .field("header", &self.header)
            .finish_non_exhaustive()
    }
}

impl SharedSecretAuth {
    pub fn new(header: impl Into<String>, secret: impl Into<String>) -> Result<Self, AuthError> {
        let header = header.into().trim().to_ascii_lowercase();
        let secret = secret.into();
        if header.is_empty() {
            return Err(AuthError::config("shared secret header name must not be empty"));
        }
        if secret.is_empty() {
            return Err(AuthError::config("shared secret must not be empty"));
        }
        Ok(Self { header, secret })
    }

    fn authenticate(&self, value: Option<&str>) -> Result<Identity, AuthError> {
        let value = value.ok_or(AuthError::MissingCredentials)?;
        if constant_time_eq(value.as_bytes(), self.secret.as_bytes()) {
            Ok(Identity::SharedSecret)
        } else {
            Err(AuthError::SecretMismatch)
        }
    }
}

/// All-or-nothing request gate.
#[derive(Debug, Clone)]
pub enum Authenticator {
    Token(TokenAuth),
    SharedSecret(SharedSecretAuth),
}

impl Authenticator {
    pub fn scheme(&self) -> AuthScheme {
        match self {
            Authenticator::Token(_) => AuthScheme::Token,
            Authenticator::SharedSecret(_) => AuthScheme::SharedSecret,
        }
    }

    /// Lowercase name of the header carrying the credential.
    pub fn header_name(&self) -> &str {
        match self {
            Authenticator::Token(_) => AUTHORIZATION_HEADER,
            Authenticator::SharedSecret(s) => &s.header,
        }
    }

    pub fn authenticate(
        &self,
        header_value: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Identity, AuthError> {
        match self {
            Authenticator::Token(t) => t.authenticate(header_value, now),
            Authenticator::SharedSecret(s) => s.authenticate(header_value),
        }
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
