//! Permission administration.

use std::sync::Arc;

use warden_core::{DomainError, Permission, PermissionId};

use crate::store::CredentialStore;

use super::ServiceResult;

/// Fields accepted when creating or updating a permission.
#[derive(Debug, Clone)]
pub struct PermissionInput {
    pub name: String,
    pub system_name: String,
    pub description: String,
    pub category: String,
    pub action: String,
    pub resource: String,
}

/// Permission CRUD with system-name uniqueness enforcement.
pub struct PermissionAdminService {
    store: Arc<dyn CredentialStore>,
}

impl PermissionAdminService {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    pub async fn list_permissions(&self) -> ServiceResult<Vec<Permission>> {
        Ok(self.store.list_permissions().await?)
    }

    pub async fn permission_by_id(&self, id: PermissionId) -> ServiceResult<Permission> {
        self.store
            .permission_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found().into())
    }

    pub async fn permissions_by_category(
        &self,
        category: &str,
    ) -> ServiceResult<Vec<Permission>> {
        Ok(self.store.permissions_by_category(category).await?)
    }

    pub async fn create_permission(&self, input: PermissionInput) -> ServiceResult<Permission> {
        if input.system_name.is_empty() {
            return Err(DomainError::validation("system name must not be empty").into());
        }
        if self
            .store
            .permission_by_system_name(&input.system_name)
            .await?
            .is_some()
        {
            return Err(DomainError::validation(
                "a permission with this system name already exists",
            )
            .into());
        }

        Ok(self
            .store
            .create_permission(Permission {
                id: PermissionId::from_i64(0),
                name: input.name,
                system_name: input.system_name,
                description: input.description,
                category: input.category,
                action: input.action,
                resource: input.resource,
            })
            .await?)
    }

    pub async fn update_permission(
        &self,
        id: PermissionId,
        input: PermissionInput,
    ) -> ServiceResult<Permission> {
        let existing = self.permission_by_id(id).await?;

        if existing.system_name != input.system_name {
            if let Some(other) = self
                .store
                .permission_by_system_name(&input.system_name)
                .await?
            {
                if other.id != id {
                    return Err(DomainError::validation(
                        "a permission with this system name already exists",
                    )
                    .into());
                }
            }
        }

        let updated = Permission {
            id,
            name: input.name,
            system_name: input.system_name,
            description: input.description,
            category: input.category,
            action: input.action,
            resource: input.resource,
        };
        self.store.update_permission(&updated).await?;
        Ok(updated)
    }

    pub async fn delete_permission(&self, id: PermissionId) -> ServiceResult<()> {
        self.permission_by_id(id).await?;
        self.store.delete_permission(id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::ServiceError;
    use crate::store::MemoryCredentialStore;

    fn input(system_name: &str) -> PermissionInput {
        PermissionInput {
            name: system_name.to_string(),
            system_name: system_name.to_string(),
            description: String::new(),
            category: "users".to_string(),
            action: "view".to_string(),
            resource: "users".to_string(),
        }
    }

    #[tokio::test]
    async fn duplicate_system_name_rejected_on_create_and_rename() {
        let service = PermissionAdminService::new(Arc::new(MemoryCredentialStore::new()));
        service.create_permission(input("users.view")).await.unwrap();
        let other = service.create_permission(input("users.edit")).await.unwrap();

        let err = service.create_permission(input("users.view")).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Domain(DomainError::Validation(_))
        ));

        let err = service
            .update_permission(other.id, input("users.view"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Domain(DomainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn category_filter_returns_matches_only() {
        let service = PermissionAdminService::new(Arc::new(MemoryCredentialStore::new()));
        service.create_permission(input("users.view")).await.unwrap();
        let mut roles_input = input("roles.view");
        roles_input.category = "roles".to_string();
        service.create_permission(roles_input).await.unwrap();

        let users = service.permissions_by_category("users").await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].system_name, "users.view");
    }

    #[tokio::test]
    async fn missing_permission_is_not_found() {
        let service = PermissionAdminService::new(Arc::new(MemoryCredentialStore::new()));
        let err = service
            .permission_by_id(PermissionId::from_i64(7))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::NotFound)));
    }
}
