//! Name-driven authorization policy requirements.
//!
//! Protected operations declare a policy string such as
//! `"permission:roles.edit"`. The prefix marks it as a permission policy;
//! the remainder is the permission system-name. One generic evaluator
//! handles every requirement — there is no per-permission handler.

use serde::{Deserialize, Serialize};

use crate::names::PermissionName;

/// Prefix distinguishing permission policies from other policy names.
pub const PERMISSION_POLICY_PREFIX: &str = "permission:";

/// A structured authorization requirement parsed from a policy name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionRequirement {
    permission: PermissionName,
}

impl PermissionRequirement {
    pub fn new(permission: PermissionName) -> Self {
        Self { permission }
    }

    /// Parse a policy name into a requirement.
    ///
    /// Returns `None` for names without the permission prefix; those belong
    /// to some other policy scheme and are not handled here.
    pub fn from_policy_name(policy: &str) -> Option<Self> {
        let name = policy.strip_prefix(PERMISSION_POLICY_PREFIX)?;
        Some(Self::new(PermissionName::new(name.to_string())))
    }

    /// The policy name this requirement round-trips to.
    pub fn policy_name(&self) -> String {
        format!("{PERMISSION_POLICY_PREFIX}{}", self.permission)
    }

    pub fn permission(&self) -> &PermissionName {
        &self.permission
    }

    /// True when no permission is required (empty name = open access).
    pub fn is_open(&self) -> bool {
        self.permission.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_prefixed_policy_names() {
        let req = PermissionRequirement::from_policy_name("permission:users.view").unwrap();
        assert_eq!(req.permission().as_str(), "users.view");
        assert!(!req.is_open());
    }

    #[test]
    fn rejects_unprefixed_names() {
        assert!(PermissionRequirement::from_policy_name("users.view").is_none());
        assert!(PermissionRequirement::from_policy_name("role:admin").is_none());
    }

    #[test]
    fn empty_name_is_open_access() {
        let req = PermissionRequirement::from_policy_name("permission:").unwrap();
        assert!(req.is_open());
    }

    #[test]
    fn policy_name_round_trips() {
        let req = PermissionRequirement::from_policy_name("permission:menus.manage").unwrap();
        assert_eq!(
            PermissionRequirement::from_policy_name(&req.policy_name()),
            Some(req)
        );
    }
}
