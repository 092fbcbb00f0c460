//! Permission record.

use serde::{Deserialize, Serialize};

use crate::id::PermissionId;

/// A named permission.
///
/// `system_name` (e.g. `"users.view"`) is the globally-unique comparison key
/// for policy checks. Matching is case-sensitive and exact: holding
/// `"users"` does not imply `"users.view"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub id: PermissionId,
    pub name: String,
    pub system_name: String,
    pub description: String,
    pub category: String,
    pub action: String,
    pub resource: String,
}
