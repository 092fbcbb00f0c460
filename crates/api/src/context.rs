use warden_auth::RoleName;
use warden_core::UserId;

/// Principal context for a request (authenticated identity + role claims).
///
/// Inserted by the bearer middleware once the access token verifies; routes
/// behind that middleware can rely on its presence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    user_id: UserId,
    username: String,
    roles: Vec<RoleName>,
}

impl PrincipalContext {
    pub fn new(user_id: UserId, username: String, roles: Vec<RoleName>) -> Self {
        Self {
            user_id,
            username,
            roles,
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn roles(&self) -> &[RoleName] {
        &self.roles
    }
}
