//! Service wiring shared by the routers.

use std::sync::Arc;

use warden_auth::{TokenConfig, TokenIssuer};
use warden_infra::{
    AccountService, AuthCache, CredentialStore, Mailer, MemoryCredentialStore, MenuResolver,
    MenuService, MokaAuthCache, PermissionAdminService, PermissionResolver, RoleService,
    TracingMailer,
    cache::CacheConfig,
};

/// The assembled application services, one instance per process.
pub struct AppServices {
    pub issuer: Arc<TokenIssuer>,
    pub permissions: PermissionResolver,
    pub menus: MenuResolver,
    pub roles: RoleService,
    pub permission_admin: PermissionAdminService,
    pub menu_admin: MenuService,
    pub accounts: AccountService,
}

impl AppServices {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        cache: Arc<dyn AuthCache>,
        issuer: Arc<TokenIssuer>,
        mailer: Arc<dyn Mailer>,
    ) -> Arc<Self> {
        Arc::new(Self {
            issuer: issuer.clone(),
            permissions: PermissionResolver::new(store.clone(), cache.clone()),
            menus: MenuResolver::new(store.clone(), cache.clone()),
            roles: RoleService::new(store.clone(), cache.clone()),
            permission_admin: PermissionAdminService::new(store.clone()),
            menu_admin: MenuService::new(store.clone()),
            accounts: AccountService::new(store, issuer, mailer),
        })
    }

    /// Wire the given store with the default cache and log-only mailer.
    pub fn with_store(store: Arc<dyn CredentialStore>, token: TokenConfig) -> Arc<Self> {
        Self::new(
            store,
            Arc::new(MokaAuthCache::new(CacheConfig::default())),
            Arc::new(TokenIssuer::new(token)),
            Arc::new(TracingMailer),
        )
    }

    /// In-memory wiring (dev/test): seeded store, default cache, log mailer.
    pub fn in_memory(token: TokenConfig) -> Arc<Self> {
        Self::with_store(Arc::new(MemoryCredentialStore::with_system_roles()), token)
    }
}
