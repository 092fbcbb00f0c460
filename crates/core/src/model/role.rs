//! Role record.

use serde::{Deserialize, Serialize};

use crate::id::RoleId;

/// A role grouping permissions.
///
/// `system_name` is the stable identifier used in authorization checks and
/// token claims; `name` is the human-readable label. System roles are
/// built-in: their system-name is immutable and they cannot be deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    pub system_name: String,
    pub description: String,
    pub is_system_role: bool,
}
