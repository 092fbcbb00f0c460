//! Time-bounded cache for resolved permission and menu sets.
//!
//! The cache is an explicit, injected service — never implicit global state —
//! so mutation paths can evict precisely and tests can substitute a
//! deterministic fake. Three keyspaces exist: per-user permission sets,
//! per-role permission sets, and per-user menu lists. Concurrent misses for
//! the same key may recompute simultaneously; recomputation is idempotent,
//! so no single-flight guard is taken.

use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;

use warden_core::{MenuItem, Permission, RoleId, UserId};

/// Configuration for the auth cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Time-to-live for every entry.
    pub ttl: Duration,
    /// Maximum entries per keyspace.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(10 * 60),
            max_capacity: 10_000,
        }
    }
}

impl CacheConfig {
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

/// Cache service consumed by the resolvers and mutation paths.
///
/// `get` returning `None` means "absent or expired"; the caller recomputes
/// and `put`s. Eviction is explicit per keyspace.
pub trait AuthCache: Send + Sync {
    fn user_permissions(&self, user: UserId) -> Option<Arc<Vec<Permission>>>;
    fn put_user_permissions(&self, user: UserId, permissions: Arc<Vec<Permission>>);
    fn evict_user_permissions(&self, user: UserId);

    fn role_permissions(&self, role: RoleId) -> Option<Arc<Vec<Permission>>>;
    fn put_role_permissions(&self, role: RoleId, permissions: Arc<Vec<Permission>>);
    fn evict_role_permissions(&self, role: RoleId);

    fn user_menu(&self, user: UserId) -> Option<Arc<Vec<MenuItem>>>;
    fn put_user_menu(&self, user: UserId, items: Arc<Vec<MenuItem>>);
    fn evict_user_menu(&self, user: UserId);
}

/// Moka-backed cache with TTL eviction.
///
/// Lock-free concurrent reads; safe to share across request tasks.
pub struct MokaAuthCache {
    user_permissions: Cache<UserId, Arc<Vec<Permission>>>,
    role_permissions: Cache<RoleId, Arc<Vec<Permission>>>,
    user_menu: Cache<UserId, Arc<Vec<MenuItem>>>,
}

impl MokaAuthCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            user_permissions: Cache::builder()
                .max_capacity(config.max_capacity)
                .time_to_live(config.ttl)
                .build(),
            role_permissions: Cache::builder()
                .max_capacity(config.max_capacity)
                .time_to_live(config.ttl)
                .build(),
            user_menu: Cache::builder()
                .max_capacity(config.max_capacity)
                .time_to_live(config.ttl)
                .build(),
        }
    }

    /// Run pending eviction housekeeping. Useful when testing TTL behavior.
    pub fn run_pending_tasks(&self) {
        self.user_permissions.run_pending_tasks();
        self.role_permissions.run_pending_tasks();
        self.user_menu.run_pending_tasks();
    }
}

impl std::fmt::Debug for MokaAuthCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaAuthCache")
            .field("user_permission_entries", &self.user_permissions.entry_count())
            .field("role_permission_entries", &self.role_permissions.entry_count())
            .field("user_menu_entries", &self.user_menu.entry_count())
            .finish()
    }
}

impl AuthCache for MokaAuthCache {
    fn user_permissions(&self, user: UserId) -> Option<Arc<Vec<Permission>>> {
        self.user_permissions.get(&user)
    }

    fn put_user_permissions(&self, user: UserId, permissions: Arc<Vec<Permission>>) {
        self.user_permissions.insert(user, permissions);
    }

    fn evict_user_permissions(&self, user: UserId) {
        self.user_permissions.invalidate(&user);
    }

    fn role_permissions(&self, role: RoleId) -> Option<Arc<Vec<Permission>>> {
        self.role_permissions.get(&role)
    }

    fn put_role_permissions(&self, role: RoleId, permissions: Arc<Vec<Permission>>) {
        self.role_permissions.insert(role, permissions);
    }

    fn evict_role_permissions(&self, role: RoleId) {
        self.role_permissions.invalidate(&role);
    }

    fn user_menu(&self, user: UserId) -> Option<Arc<Vec<MenuItem>>> {
        self.user_menu.get(&user)
    }

    fn put_user_menu(&self, user: UserId, items: Arc<Vec<MenuItem>>) {
        self.user_menu.insert(user, items);
    }

    fn evict_user_menu(&self, user: UserId) {
        self.user_menu.invalidate(&user);
    }
}

/// A cache that never holds anything.
///
/// Deterministic fake for tests that must observe every recomputation.
#[derive(Debug, Default)]
pub struct NullAuthCache;

impl AuthCache for NullAuthCache {
    fn user_permissions(&self, _user: UserId) -> Option<Arc<Vec<Permission>>> {
        None
    }

    fn put_user_permissions(&self, _user: UserId, _permissions: Arc<Vec<Permission>>) {}

    fn evict_user_permissions(&self, _user: UserId) {}

    fn role_permissions(&self, _role: RoleId) -> Option<Arc<Vec<Permission>>> {
        None
    }

    fn put_role_permissions(&self, _role: RoleId, _permissions: Arc<Vec<Permission>>) {}

    fn evict_role_permissions(&self, _role: RoleId) {}

    fn user_menu(&self, _user: UserId) -> Option<Arc<Vec<MenuItem>>> {
        None
    }

    fn put_user_menu(&self, _user: UserId, _items: Arc<Vec<MenuItem>>) {}

    fn evict_user_menu(&self, _user: UserId) {}
}
