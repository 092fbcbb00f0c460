//! Infrastructure layer: credential store adapters, caches, mail delivery,
//! and the services that orchestrate them.

pub mod cache;
pub mod email;
pub mod service;
pub mod store;

pub use cache::{AuthCache, CacheConfig, MokaAuthCache, NullAuthCache};
pub use email::{Mailer, TracingMailer};
pub use service::{
    AccountService, MenuItemInput, MenuResolver, MenuService, PermissionAdminService,
    PermissionInput, PermissionResolver, Registration, RoleInput, RoleService, ServiceError,
    ServiceResult, UserInfo,
};
pub use store::{CredentialStore, MemoryCredentialStore, PgCredentialStore, StoreError};
