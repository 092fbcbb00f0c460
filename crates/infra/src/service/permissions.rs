//! Effective-permission resolution.

use std::collections::HashSet;
use std::sync::Arc;

use warden_auth::PermissionName;
use warden_core::{Permission, UserId};

use crate::cache::AuthCache;
use crate::store::CredentialStore;

use super::ServiceResult;

/// Resolves the effective permission set of a user.
///
/// Effective permissions are the deduplicated union of the permissions of
/// every role the user holds, computed through flat join lookups and cached
/// per user for the cache TTL. The resolver never evicts proactively;
/// mutation paths own eviction (see `RoleService`), and the per-user
/// keyspace is left to expire on its own.
pub struct PermissionResolver {
    store: Arc<dyn CredentialStore>,
    cache: Arc<dyn AuthCache>,
}

impl PermissionResolver {
    pub fn new(store: Arc<dyn CredentialStore>, cache: Arc<dyn AuthCache>) -> Self {
        Self { store, cache }
    }

    /// The user's effective permissions, cached per user.
    ///
    /// Repeated calls within the TTL return the same shared value.
    pub async fn user_permissions(&self, user: UserId) -> ServiceResult<Arc<Vec<Permission>>> {
        if let Some(hit) = self.cache.user_permissions(user) {
            return Ok(hit);
        }
        let permissions = Arc::new(self.store.user_permissions(user).await?);
        self.cache.put_user_permissions(user, permissions.clone());
        Ok(permissions)
    }

    /// Distinct system-names of the user's effective permissions.
    pub async fn user_permission_names(&self, user: UserId) -> ServiceResult<Vec<String>> {
        let permissions = self.user_permissions(user).await?;
        let mut seen = HashSet::new();
        Ok(permissions
            .iter()
            .filter(|p| seen.insert(p.system_name.clone()))
            .map(|p| p.system_name.clone())
            .collect())
    }

    /// Case-sensitive exact membership test. No wildcard, no hierarchy.
    pub async fn has_permission(
        &self,
        user: UserId,
        system_name: &PermissionName,
    ) -> ServiceResult<bool> {
        let permissions = self.user_permissions(user).await?;
        Ok(permissions
            .iter()
            .any(|p| p.system_name == system_name.as_str()))
    }

    /// The single entry point for policy checks.
    ///
    /// An empty requirement means "no permission required" and always
    /// grants; callers must not shortcut to [`Self::has_permission`], which
    /// would deny the empty name.
    pub async fn authorize(
        &self,
        user: UserId,
        required: &PermissionName,
    ) -> ServiceResult<bool> {
        if required.is_empty() {
            return Ok(true);
        }
        self.has_permission(user, required).await
    }
}


#[cfg(test)]
mod union_property {
    use super::*;
    use crate::cache::NullAuthCache;
    use crate::store::MemoryCredentialStore;
    use proptest::prelude::*;
    use std::collections::BTreeSet;
    use warden_core::{PermissionId, Role, RoleId, User};

    proptest! {
        // The resolved set always equals the union of the user's role
        // permission sets, whatever the assignment shape.
        #[test]
        fn resolution_equals_union(assignments in proptest::collection::vec(
            proptest::collection::btree_set(0usize..12, 0..6),
            1..5,
        )) {
            let rt = tokio::runtime::Builder::new_current_thread()
                .build()
                .unwrap();
            rt.block_on(async {
                let store = Arc::new(MemoryCredentialStore::new());
                let user = store
                    .create_user(User {
                        id: UserId::from_i64(0),
                        username: "p".to_string(),
                        email: "p@example.com".to_string(),
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

                let mut permission_ids = Vec::new();
                for i in 0..12 {
                    let p = store
                        .create_permission(warden_core::Permission {
                            id: PermissionId::from_i64(0),
                            name: format!("perm{i}"),
                            system_name: format!("perm{i}.view"),
                            description: String::new(),
                            category: String::new(),
                            action: String::new(),
                            resource: String::new(),
                        })
                        .await
                        .unwrap();
                    permission_ids.push(p.id);
                }

                let mut expected: BTreeSet<String> = BTreeSet::new();
                for (ri, grants) in assignments.iter().enumerate() {
                    let role = store
                        .create_role(Role {
                            id: RoleId::from_i64(0),
                            name: format!("role{ri}"),
                            system_name: format!("role{ri}"),
                            description: String::new(),
                            is_system_role: false,
                        })
                        .await
                        .unwrap();
                    store.add_user_to_role(user, role.id).await.unwrap();
                    for &g in grants {
                        store
                            .add_permission_to_role(role.id, permission_ids[g])
                            .await
                            .unwrap();
                        expected.insert(format!("perm{g}.view"));
                    }
                }

                let resolver = PermissionResolver::new(store, Arc::new(NullAuthCache));
                let resolved: BTreeSet<String> = resolver
                    .user_permission_names(user)
                    .await
                    .unwrap()
                    .into_iter()
                    .collect();
                prop_assert_eq!(resolved, expected);
                Ok(())
            })?;
        }
    }
}
