use atrium_auth::Principal;

/// Authenticated session for a request.
///
/// Inserted by the auth middleware; handlers on protected routes can rely on it
/// being present. The raw token is kept only for the lifetime of the request
/// so logout can revoke it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    principal: Principal,
    token: String,
}

impl SessionContext {
    pub fn new(principal: Principal, token: impl Into<String>) -> Self {
        Self {
            principal,
            token: token.into(),
        }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}
