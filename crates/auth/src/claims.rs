//! Access-token claims model.

use serde::{Deserialize, Serialize};

use warden_core::{DomainError, UserId};

use crate::RoleName;

/// Claims carried by a signed access token.
///
/// These are the only claims the rest of the system may rely on once a token
/// has been verified: the numeric subject, the username/email it was minted
/// for, and the system-names of the roles held at issuance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject: the user id as a decimal string.
    pub sub: String,

    /// Username at issuance.
    pub name: String,

    /// Email at issuance.
    pub email: String,

    /// Role system-names held at issuance.
    #[serde(default)]
    pub roles: Vec<RoleName>,

    /// Issuer.
    pub iss: String,

    /// Audience.
    pub aud: String,

    /// Issued-at (Unix timestamp).
    pub iat: i64,

    /// Expiration (Unix timestamp).
    pub exp: i64,
}

impl AccessClaims {
    /// Parse the subject claim back into a user id.
    pub fn user_id(&self) -> Result<UserId, DomainError> {
        self.sub.parse()
    }

    /// True when the claims carry the given role system-name.
    pub fn has_role(&self, system_name: &str) -> bool {
        self.roles.iter().any(|r| r.as_str() == system_name)
    }
}
