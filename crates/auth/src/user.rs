//! Registered users and login credentials.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use satchel_core::{DomainError, Entity, Timestamps, UserId};

pub const MAX_USERNAME_LEN: usize = 64;

/// A validated username: trimmed, non-empty, no whitespace or control chars.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(DomainError::validation("username must not be empty"));
        }
        if name.chars().count() > MAX_USERNAME_LEN {
            return Err(DomainError::validation(format!(
                "username must be at most {MAX_USERNAME_LEN} characters"
            )));
        }
        if name.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(DomainError::validation(
                "username must not contain whitespace or control characters",
            ));
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Username {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Username + plaintext password as submitted to register/login.
#[derive(Clone)]
pub struct Credentials {
    pub username: Username,
    password: String,
}

impl Credentials {
    pub fn new(username: &str, password: impl Into<String>) -> Result<Self, DomainError> {
        let username = Username::parse(username)?;
        let password = password.into();
        if password.is_empty() {
            return Err(DomainError::validation("password must not be empty"));
        }
        Ok(Self { username, password })
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl core::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A registered user. Never mutated after registration.
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub password_hash: String,
    pub timestamps: Timestamps,
}

impl User {
    pub fn new(
        username: Username,
        password_hash: String,
        at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if password_hash.is_empty() {
            return Err(DomainError::validation("password hash must not be empty"));
        }
        Ok(Self {
            id: UserId::new(),
            username,
            password_hash,
            timestamps: Timestamps::new(at),
        })
    }
}

impl core::fmt::Debug for User {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("timestamps", &self.timestamps)
            .finish_non_exhaustive()
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn timestamps(&self) -> &Timestamps {
        &self.timestamps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_is_trimmed() {
        assert_eq!(Username::parse("  ada ").unwrap().as_str(), "ada");
    }

    #[test]
    fn blank_username_is_rejected() {
        assert!(Username::parse("   ").is_err());
        assert!(Username::parse("").is_err());
    }

    #[test]
    fn inner_whitespace_is_rejected() {
        assert!(Username::parse("ada lovelace").is_err());
    }

    #[test]
    fn overlong_username_is_rejected() {
        let name = "a".repeat(MAX_USERNAME_LEN + 1);
        assert!(Username::parse(&name).is_err());
        assert!(Username::parse(&name[..MAX_USERNAME_LEN]).is_ok());
    }

    #[test]
    fn empty_password_is_rejected() {
        assert!(Credentials::new("ada", "").is_err());
    }

    #[test]
    fn debug_output_hides_secrets() {
        let creds = Credentials::new("ada", "hunter2").unwrap();
        assert!(!format!("{creds:?}").contains("hunter2"));

        let user =
            User::new(creds.username.clone(), "$argon2id$x".to_string(), Utc::now()).unwrap();
        assert!(!format!("{user:?}").contains("$argon2id$x"));
    }

    #[test]
    fn user_requires_a_hash() {
        let name = Username::parse("ada").unwrap();
        assert!(User::new(name, String::new(), Utc::now()).is_err());
    }
}
