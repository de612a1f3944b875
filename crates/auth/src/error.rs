use thiserror::Error;

/// Authentication failures.
///
/// Everything except `Hashing`, `Signing` and `Config` is a client-side
/// credential problem and maps to 401 at the HTTP edge.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing credentials")]
    MissingCredentials,

    #[error("invalid token signature")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("shared secret mismatch")]
    SecretMismatch,

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("token signing failed: {0}")]
    Signing(String),

    #[error("invalid auth configuration: {0}")]
    Config(String),
}

impl AuthError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this error is the caller's fault (bad or missing credentials).
    pub fn is_credential_error(&self) -> bool {
        matches!(
            self,
            Self::MissingCredentials
                | Self::InvalidSignature
                | Self::Expired
                | Self::Malformed(_)
                | Self::SecretMismatch
        )
    }
}
