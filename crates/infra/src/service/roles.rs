//! Role administration and role↔permission / user↔role links.

use std::sync::Arc;

use warden_core::{DomainError, Permission, PermissionId, Role, RoleId, User, UserId};

use crate::cache::AuthCache;
use crate::store::CredentialStore;

use super::{ServiceError, ServiceResult};

/// Fields accepted when creating or updating a role.
#[derive(Debug, Clone)]
pub struct RoleInput {
    pub name: String,
    pub system_name: String,
    pub description: String,
}

/// Role CRUD plus link management.
///
/// This is the only mutation path for role permissions, so it owns the
/// role-level cache eviction. The per-user permission cache is deliberately
/// left to its TTL: after a role mutation, users holding the role may see
/// stale effective permissions for up to the cache TTL.
pub struct RoleService {
    store: Arc<dyn CredentialStore>,
    cache: Arc<dyn AuthCache>,
}

impl RoleService {
    pub fn new(store: Arc<dyn CredentialStore>, cache: Arc<dyn AuthCache>) -> Self {
        Self { store, cache }
    }

    pub async fn list_roles(&self) -> ServiceResult<Vec<Role>> {
        Ok(self.store.list_roles().await?)
    }

    pub async fn role_by_id(&self, id: RoleId) -> ServiceResult<Role> {
        self.store
            .role_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found().into())
    }

    pub async fn create_role(&self, input: RoleInput) -> ServiceResult<Role> {
        if input.system_name.is_empty() {
            return Err(DomainError::validation("system name must not be empty").into());
        }
        if self
            .store
            .role_by_system_name(&input.system_name)
            .await?
            .is_some()
        {
            return Err(
                DomainError::validation("a role with this system name already exists").into(),
            );
        }

        Ok(self
            .store
            .create_role(Role {
                id: RoleId::from_i64(0),
                name: input.name,
                system_name: input.system_name,
                description: input.description,
                is_system_role: false,
            })
            .await?)
    }

    pub async fn update_role(&self, id: RoleId, input: RoleInput) -> ServiceResult<Role> {
        let existing = self.role_by_id(id).await?;

        if existing.is_system_role && existing.system_name != input.system_name {
            return Err(DomainError::invariant(
                "cannot change the system name of a system role",
            )
            .into());
        }
        if existing.system_name != input.system_name {
            if let Some(other) = self.store.role_by_system_name(&input.system_name).await? {
                if other.id != id {
                    return Err(DomainError::validation(
                        "a role with this system name already exists",
                    )
                    .into());
                }
            }
        }

        let updated = Role {
            id,
            name: input.name,
            system_name: input.system_name,
            description: input.description,
            is_system_role: existing.is_system_role,
        };
        self.store.update_role(&updated).await?;
        Ok(updated)
    }

    /// Delete a role. System roles are rejected before any store mutation.
    pub async fn delete_role(&self, id: RoleId) -> ServiceResult<()> {
        let role = self.role_by_id(id).await?;
        if role.is_system_role {
            return Err(DomainError::invariant("system roles cannot be deleted").into());
        }
        self.store.delete_role(id).await?;
        self.cache.evict_role_permissions(id);
        Ok(())
    }

    /// The role's permissions, cached per role.
    pub async fn role_permissions(&self, id: RoleId) -> ServiceResult<Arc<Vec<Permission>>> {
        if let Some(hit) = self.cache.role_permissions(id) {
            return Ok(hit);
        }
        let permissions = Arc::new(self.store.role_permissions(id).await?);
        self.cache.put_role_permissions(id, permissions.clone());
        Ok(permissions)
    }

    /// Grant a permission to a role (idempotent) and evict the role's
    /// cached permission set.
    pub async fn add_permission_to_role(
        &self,
        role: RoleId,
        permission: PermissionId,
    ) -> ServiceResult<()> {
        self.ensure_role_exists(role).await?;
        if self.store.permission_by_id(permission).await?.is_none() {
            return Err(DomainError::not_found().into());
        }
        self.store.add_permission_to_role(role, permission).await?;
        self.cache.evict_role_permissions(role);
        Ok(())
    }

    pub async fn remove_permission_from_role(
        &self,
        role: RoleId,
        permission: PermissionId,
    ) -> ServiceResult<()> {
        self.ensure_role_exists(role).await?;
        self.store
            .remove_permission_from_role(role, permission)
            .await?;
        self.cache.evict_role_permissions(role);
        Ok(())
    }

    pub async fn users_in_role(&self, role: RoleId) -> ServiceResult<Vec<User>> {
        self.ensure_role_exists(role).await?;
        Ok(self.store.users_in_role(role).await?)
    }

    /// Add a user to a role (idempotent).
    pub async fn add_user_to_role(&self, user: UserId, role: RoleId) -> ServiceResult<()> {
        self.ensure_role_exists(role).await?;
        if self.store.user_by_id(user).await?.is_none() {
            return Err(DomainError::not_found().into());
        }
        self.store.add_user_to_role(user, role).await?;
        Ok(())
    }

    pub async fn remove_user_from_role(&self, user: UserId, role: RoleId) -> ServiceResult<()> {
        self.ensure_role_exists(role).await?;
        self.store.remove_user_from_role(user, role).await?;
        Ok(())
    }

    async fn ensure_role_exists(&self, role: RoleId) -> ServiceResult<()> {
        if self.store.role_by_id(role).await?.is_none() {
            return Err(ServiceError::Domain(DomainError::NotFound));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheConfig, MokaAuthCache};
    use crate::store::MemoryCredentialStore;
    use warden_core::Permission;

    fn service_with_cache() -> (Arc<MemoryCredentialStore>, Arc<MokaAuthCache>, RoleService) {
        let store = Arc::new(MemoryCredentialStore::with_system_roles());
        let cache = Arc::new(MokaAuthCache::new(CacheConfig::default()));
        let service = RoleService::new(store.clone(), cache.clone());
        (store, cache, service)
    }

    fn input(system_name: &str) -> RoleInput {
        RoleInput {
            name: system_name.to_string(),
            system_name: system_name.to_string(),
            description: String::new(),
        }
    }

    async fn seed_permission(store: &MemoryCredentialStore, system_name: &str) -> PermissionId {
        store
            .create_permission(Permission {
                id: PermissionId::from_i64(0),
                name: system_name.to_string(),
                system_name: system_name.to_string(),
                description: String::new(),
                category: String::new(),
                action: String::new(),
                resource: String::new(),
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn duplicate_system_name_is_rejected() {
        let (_store, _cache, service) = service_with_cache();
        service.create_role(input("editor")).await.unwrap();
        let err = service.create_role(input("editor")).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Domain(DomainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn system_role_deletion_is_rejected_without_mutation() {
        let (store, _cache, service) = service_with_cache();
        let admin = store
            .role_by_system_name("Administrator")
            .await
            .unwrap()
            .unwrap();

        let err = service.delete_role(admin.id).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Domain(DomainError::InvariantViolation(_))
        ));
        assert!(store.role_by_id(admin.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn system_role_system_name_is_immutable() {
        let (store, _cache, service) = service_with_cache();
        let admin = store
            .role_by_system_name("Administrator")
            .await
            .unwrap()
            .unwrap();

        let err = service
            .update_role(
                admin.id,
                RoleInput {
                    name: "Admins".to_string(),
                    system_name: "Root".to_string(),
                    description: String::new(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Domain(DomainError::InvariantViolation(_))
        ));
    }

    #[tokio::test]
    async fn granting_a_permission_evicts_the_role_cache() {
        let (store, _cache, service) = service_with_cache();
        let role = service.create_role(input("editor")).await.unwrap();
        let perm = seed_permission(&store, "posts.edit").await;

        // Warm the role cache with the empty set.
        let before = service.role_permissions(role.id).await.unwrap();
        assert!(before.is_empty());

        service
            .add_permission_to_role(role.id, perm)
            .await
            .unwrap();

        // Eviction means the next read reflects the grant immediately.
        let after = service.role_permissions(role.id).await.unwrap();
        assert_eq!(after.len(), 1);
        assert_eq!(after[0].system_name, "posts.edit");
    }

    #[tokio::test]
    async fn user_level_permission_cache_stays_stale_until_ttl() {
        use crate::service::PermissionResolver;
        use warden_auth::PermissionName;
        use warden_core::User;

        let (store, cache, service) = service_with_cache();
        let role = service.create_role(input("editor")).await.unwrap();
        let user = store
            .create_user(User {
                id: UserId::from_i64(0),
                username: "bob".to_string(),
                email: "bob@example.com".to_string(),
                password_hash: String::new(),
                is_active: true,
                email_confirmed: true,
                email_verification_token: None,
                email_verification_token_expiry: None,
                password_reset_token: None,
                password_reset_token_expiry: None,
                refresh_token: None,
                refresh_token_expiry: None,
            })
            .await
            .unwrap()
            .id;
        service.add_user_to_role(user, role.id).await.unwrap();

        let resolver = PermissionResolver::new(store.clone(), cache.clone());
        // Warm the user-level cache before the grant.
        assert!(!resolver
            .authorize(user, &PermissionName::new("posts.edit"))
            .await
            .unwrap());

        let perm = seed_permission(&store, "posts.edit").await;
        service.add_permission_to_role(role.id, perm).await.unwrap();

        // Role-level view is fresh; user-level view is still the stale
        // cached set until its TTL lapses.
        assert_eq!(service.role_permissions(role.id).await.unwrap().len(), 1);
        assert!(!resolver
            .authorize(user, &PermissionName::new("posts.edit"))
            .await
            .unwrap());

        // Once the user-level entry is evicted, the grant becomes visible.
        cache.evict_user_permissions(user);
        assert!(resolver
            .authorize(user, &PermissionName::new("posts.edit"))
            .await
            .unwrap());
    }
}
