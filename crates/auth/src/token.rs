//! Signed, time-limited session tokens (JWT, HMAC only).

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};

use crate::claims::{SessionClaims, validate_claims};
use crate::error::AuthError;

pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

const HMAC_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// Parse an algorithm name from configuration, accepting HMAC variants only.
pub fn parse_hmac_algorithm(name: &str) -> Result<Algorithm, AuthError> {
    let algorithm: Algorithm = name
        .trim()
        .to_ascii_uppercase()
        .parse()
        .map_err(|_| AuthError::config(format!("unknown token algorithm '{name}'")))?;
    if !HMAC_ALGORITHMS.contains(&algorithm) {
        return Err(AuthError::config(format!(
            "token algorithm '{name}' is not an HMAC algorithm"
        )));
    }
    Ok(algorithm)
}

/// A freshly issued token and its expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and validates session tokens.
///
/// Validity is a pure function of (token, now, secret): nothing is stored and
/// tokens cannot be revoked before they expire.
#[derive(Clone)]
pub struct TokenService {
    algorithm: Algorithm,
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl core::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &self.algorithm)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(secret: &[u8], algorithm: Algorithm, ttl: Duration) -> Result<Self, AuthError> {
        if !HMAC_ALGORITHMS.contains(&algorithm) {
            return Err(AuthError::config(format!(
                "{algorithm:?} is not an HMAC algorithm"
            )));
        }
        if secret.is_empty() {
            return Err(AuthError::config("token secret must not be empty"));
        }
        if ttl <= Duration::zero() {
            return Err(AuthError::config("token ttl must be positive"));
        }

        Ok(Self {
            algorithm,
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        })
    }

    /// HS256 with the default 24 hour lifetime.
    pub fn hs256(secret: &[u8]) -> Result<Self, AuthError> {
        Self::new(secret, Algorithm::HS256, Duration::hours(DEFAULT_TOKEN_TTL_HOURS))
    }

    pub fn issue(&self, username: &str) -> Result<IssuedToken, AuthError> {
        self.issue_at(username, Utc::now())
    }

    pub fn issue_at(&self, username: &str, now: DateTime<Utc>) -> Result<IssuedToken, AuthError> {
        let claims = SessionClaims::new(username, now, self.ttl);
        let expires_at = claims
            .expires_at()
            .ok_or_else(|| AuthError::Signing("expiry out of range".to_string()))?;

        let token = jsonwebtoken::encode(&Header::new(self.algorithm), &claims, &self.encoding)
            .map_err(|e| AuthError::Signing(e.to_string()))?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Verify signature and algorithm, then check the time window against `now`.
    pub fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, AuthError> {
        // Exactly one accepted algorithm: a token whose header names anything
        // else (another HMAC size, an asymmetric algorithm, "none") is refused
        // before the signature is looked at.
        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let data = jsonwebtoken::decode::<SessionClaims>(token, &self.decoding, &validation)
            .map_err(map_jwt_error)?;

        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

fn map_jwt_error(err: jsonwebtoken::errors::Error) -> AuthError {
    match err.kind() {
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => AuthError::InvalidSignature,
        ErrorKind::ExpiredSignature => AuthError::Expired,
        _ => AuthError::malformed(err.to_string()),
    }
}
