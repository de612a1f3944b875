//! Registration and login.

use std::sync::Arc;

use chrono::Utc;

use satchel_auth::{Credentials, IssuedToken, PasswordHasher, TokenService, User, Username};

use crate::error::ServiceError;
use crate::store::{StoreError, UserStore};

const INVALID_CREDENTIALS: &str = "invalid username or password";

#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserStore>,
    hasher: PasswordHasher,
    tokens: TokenService,
}

impl AccountService {
    pub fn new(users: Arc<dyn UserStore>, hasher: PasswordHasher, tokens: TokenService) -> Self {
        Self {
            users,
            hasher,
            tokens,
        }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Create a user. A taken username is [`ServiceError::Conflict`].
    pub async fn register(&self, username: &str, password: &str) -> Result<Username, ServiceError> {
        let credentials = Credentials::new(username, password)?;

        let hasher = self.hasher.clone();
        let password = credentials.password().to_string();
        let hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await?
            .map_err(|e| ServiceError::internal(e.to_string()))?;

        let user = User::new(credentials.username.clone(), hash, Utc::now())?;
        match self.users.insert(user).await {
            Ok(()) => {
                tracing::info!(username = %credentials.username, "user registered");
                Ok(credentials.username)
            }
            Err(StoreError::Conflict(_)) => {
                tracing::info!(
                    username = %credentials.username,
                    "registration rejected, username taken"
                );
                Err(ServiceError::Conflict("username already exists".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Check credentials and issue a session token.
    ///
    /// Unknown user and wrong password are indistinguishable to the caller.
    /// Registration rules are not applied here: a name or password that could
    /// never have been registered is just another mismatch.
    pub async fn login(&self, username: &str, password: &str) -> Result<IssuedToken, ServiceError> {
        let Ok(name) = Username::parse(username) else {
            tracing::info!("login failed, unregistrable username");
            return Err(invalid_credentials());
        };
        if password.is_empty() {
            tracing::info!(username = %name, "login failed, empty password");
            return Err(invalid_credentials());
        }

        let Some(user) = self.users.find_by_username(&name).await? else {
            tracing::info!(username = %name, "login failed, unknown user");
            return Err(invalid_credentials());
        };

        let hasher = self.hasher.clone();
        let password = password.to_string();
        let stored = user.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || hasher.verify(&password, &stored)).await?;
        if !matches {
            tracing::info!(username = %name, "login failed, wrong password");
            return Err(invalid_credentials());
        }

        let issued = self
            .tokens
            .issue(user.username.as_str())
            .map_err(|e| ServiceError::internal(e.to_string()))?;
        tracing::info!(username = %user.username, expires_at = %issued.expires_at, "token issued");
        Ok(issued)
    }
}

fn invalid_credentials() -> ServiceError {
    ServiceError::Auth(INVALID_CREDENTIALS.to_string())
}

#[cfg(test)]
mod tests {
    use satchel_auth::PasswordCost;

    use super::*;
    use crate::store::InMemoryUserStore;

    fn service() -> AccountService {
        let hasher = PasswordHasher::new(PasswordCost {
            memory_kib: 64,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap();
        let tokens = TokenService::hs256(b"account-tests").unwrap();
        AccountService::new(Arc::new(InMemoryUserStore::new()), hasher, tokens)
    }

    #[tokio::test]
    async fn register_then_login_issues_a_valid_token() {
        let accounts = service();
        accounts.register("ada", "correct horse").await.unwrap();

        let issued = accounts.login("ada", "correct horse").await.unwrap();
        let claims = accounts.tokens().validate(&issued.token, Utc::now()).unwrap();
        assert_eq!(claims.username(), "ada");
    }

    #[tokio::test]
    async fn second_registration_conflicts() {
        let accounts = service();
        accounts.register("ada", "pw-1").await.unwrap();

        let err = accounts.register("ada", "pw-2").await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
        // First password still works.
        assert!(accounts.login("ada", "pw-1").await.is_ok());
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_look_the_same() {
        let accounts = service();
        accounts.register("ada", "right").await.unwrap();

        let wrong = accounts.login("ada", "wrong").await.unwrap_err();
        let unknown = accounts.login("bob", "right").await.unwrap_err();
        assert_eq!(wrong, unknown);
        assert!(matches!(wrong, ServiceError::Auth(_)));
    }

    #[tokio::test]
    async fn blank_fields_are_validation_errors() {
        let accounts = service();
        assert!(matches!(
            accounts.register("  ", "pw").await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            accounts.register("ada", "").await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn login_never_applies_registration_rules() {
        let accounts = service();
        accounts.register("ada", "right").await.unwrap();
        let expected = accounts.login("bob", "right").await.unwrap_err();

        let too_long = "a".repeat(65);
        for (username, password) in [
            ("ada lovelace", "right"),
            (too_long.as_str(), "right"),
            ("   ", "right"),
            ("ada", ""),
        ] {
            let err = accounts.login(username, password).await.unwrap_err();
            assert_eq!(err, expected, "login({username:?}, {password:?})");
        }
    }

    #[tokio::test]
    async fn login_trims_the_username() {
        let accounts = service();
        accounts.register("ada", "right").await.unwrap();
        assert!(accounts.login("  ada ", "right").await.is_ok());
    }
}
