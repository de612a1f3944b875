//! `satchel-auth` — authentication boundary.
//!
//! Password hashing, signed session tokens and the request gate logic.
//! This crate is intentionally decoupled from HTTP and storage: the gate
//! works on raw header values and the caller decides where they come from.

pub mod authenticator;
pub mod claims;
pub mod error;
pub mod password;
pub mod token;
pub mod user;

pub use authenticator::{AuthScheme, Authenticator, Identity, SharedSecretAuth, TokenAuth};
pub use claims::{SessionClaims, validate_claims};
pub use error::AuthError;
pub use password::{PasswordCost, PasswordHasher};
pub use token::{IssuedToken, TokenService, parse_hmac_algorithm};
pub use user::{Credentials, User, Username};
