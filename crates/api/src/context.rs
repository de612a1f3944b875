use satchel_auth::Identity;

/// Authenticated caller of a request. Inserted by the auth gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    identity: Identity,
}

impl AuthContext {
    pub fn new(identity: Identity) -> Self {
        Self { identity }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// `None` for shared-secret callers.
    pub fn username(&self) -> Option<&str> {
        self.identity.username()
    }
}
