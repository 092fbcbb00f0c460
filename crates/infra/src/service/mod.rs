//! Domain services over the credential store and cache ports.

use thiserror::Error;

use warden_core::DomainError;

use crate::store::StoreError;

pub mod accounts;
pub mod menu;
pub mod menu_admin;
pub mod permission_admin;
pub mod permissions;
pub mod roles;

pub use accounts::{AccountService, Registration, UserInfo};
pub use menu::MenuResolver;
pub use menu_admin::{MenuItemInput, MenuService};
pub use permission_admin::{PermissionAdminService, PermissionInput};
pub use permissions::PermissionResolver;
pub use roles::{RoleInput, RoleService};

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Error raised by a service operation.
///
/// Domain failures (validation, invariants, lookups, uniform auth
/// rejection) pass through; store failures stay opaque.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ServiceError {
    /// Convenience for the uniform authentication rejection.
    pub fn unauthorized() -> Self {
        Self::Domain(DomainError::Unauthorized)
    }
}
