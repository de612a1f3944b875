use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Session token claims.
///
/// Times are unix seconds, as in registered JWT claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject: the authenticated username.
    pub sub: String,

    /// Issued-at timestamp.
    pub iat: i64,

    /// Expiration timestamp.
    pub exp: i64,
}

impl SessionClaims {
    pub fn new(username: impl Into<String>, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        let expires_at = issued_at + ttl;
        Self {
            sub: username.into(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    pub fn username(&self) -> &str {
        &self.sub
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.iat, 0)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

/// Deterministically validate the time window of decoded claims.
///
/// Signature verification happens before this, in [`crate::TokenService`].
pub fn validate_claims(claims: &SessionClaims, now: DateTime<Utc>) -> Result<(), AuthError> {
    if claims.exp <= claims.iat {
        return Err(AuthError::malformed("invalid token time window (exp <= iat)"));
    }
    let now = now.timestamp();
    if now < claims.iat {
        return Err(AuthError::malformed("token not yet valid (iat is in the future)"));
    }
    if now >= claims.exp {
        return Err(AuthError::Expired);
    }
    if claims.sub.trim().is_empty() {
        return Err(AuthError::malformed("token has no subject"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_inside_window() {
        let t0 = Utc::now();
        let claims = SessionClaims::new("ada", t0, Duration::hours(24));
        assert_eq!(validate_claims(&claims, t0), Ok(()));
        assert_eq!(validate_claims(&claims, t0 + Duration::hours(23)), Ok(()));
    }

    #[test]
    fn expired_at_and_after_exp() {
        let t0 = Utc::now();
        let claims = SessionClaims::new("ada", t0, Duration::hours(24));
        assert_eq!(
            validate_claims(&claims, t0 + Duration::hours(24)),
            Err(AuthError::Expired)
        );
        assert_eq!(
            validate_claims(&claims, t0 + Duration::hours(25)),
            Err(AuthError::Expired)
        );
    }

    #[test]
    fn future_issued_at_is_rejected() {
        let t0 = Utc::now();
        let claims = SessionClaims::new("ada", t0 + Duration::minutes(5), Duration::hours(1));
        assert!(matches!(validate_claims(&claims, t0), Err(AuthError::Malformed(_))));
    }

    #[test]
    fn inverted_window_is_rejected() {
        let claims = SessionClaims {
            sub: "ada".to_string(),
            iat: 100,
            exp: 100,
        };
        let now = DateTime::from_timestamp(100, 0).unwrap();
        assert!(matches!(validate_claims(&claims, now), Err(AuthError::Malformed(_))));
    }
}
