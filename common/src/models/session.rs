// common/src/models/session.rs
use crate::credential::{self, UnverifiedClaims};

/// Role shown when the token's claims cannot be read or carry no role
pub const UNKNOWN_ROLE: &str = "unknown";

/// An authenticated client session: the raw bearer token and the role it claims.
///
/// The role is always derived from the token itself, so a session cannot
/// carry a role its token does not claim. It is still unverified and is for
/// display only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    token: String,
    role: String,
}

impl Session {
    /// Build a session from a raw token. Never fails: unreadable claims give
    /// [`UNKNOWN_ROLE`].
    pub fn from_token(token: impl Into<String>) -> Self {
        let token = token.into();
        let role = match credential::decode(&token) {
            Ok(claims) => claims.role().unwrap_or(UNKNOWN_ROLE).to_string(),
            Err(e) => {
                tracing::debug!("Token claims unreadable, using unknown role: {}", e);
                UNKNOWN_ROLE.to_string()
            }
        };

        Self { token, role }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    /// Re-decode the token's claims. `None` when the token is malformed.
    pub fn claims(&self) -> Option<UnverifiedClaims> {
        credential::decode(&self.token).ok()
    }

    /// Subject the resource lists are scoped to, if the token names one
    pub fn subject(&self) -> Option<String> {
        self.claims().and_then(|claims| claims.subject())
    }

    /// Value for the `Authorization` header
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}
