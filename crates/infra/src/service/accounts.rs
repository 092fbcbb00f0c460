//! Account lifecycle and credential workflows.
//!
//! Login and refresh report one uniform rejection whatever the cause: the
//! caller cannot tell a missing account from a wrong password, a revoked
//! token from an expired one. Verification/reset flows that take an email
//! address never reveal whether the address exists.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::Serialize;

use warden_auth::{hash_password, opaque_token, verify_password, IssuedTokens, TokenIssuer};
use warden_core::{DomainError, User, UserId};

use crate::email::Mailer;
use crate::store::{CredentialStore, StoreError};

use super::{ServiceError, ServiceResult};

fn hash_or_internal(plain: &str) -> ServiceResult<String> {
    hash_password(plain).map_err(|e| {
        tracing::error!(error = %e, "password hashing failed");
        ServiceError::Store(StoreError::backend("password hashing failed"))
    })
}

/// Validity window for emailed verification and reset tokens.
const EMAIL_TOKEN_TTL_HOURS: i64 = 24;

/// System-name of the role every new registration receives.
const DEFAULT_ROLE: &str = "Student";

/// Input for registration.
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Identity summary returned to authenticated callers.
#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub is_active: bool,
    pub email_confirmed: bool,
    pub roles: Vec<String>,
}

/// Account registration, login, token refresh, and credential recovery.
pub struct AccountService {
    store: Arc<dyn CredentialStore>,
    issuer: Arc<TokenIssuer>,
    mailer: Arc<dyn Mailer>,
}

impl AccountService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        issuer: Arc<TokenIssuer>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            store,
            issuer,
            mailer,
        }
    }

    /// Create an unconfirmed account and send the verification email.
    ///
    /// The default role is attached when it exists; a missing default role
    /// is not an error. Mail delivery failures do not undo the creation.
    pub async fn register(&self, input: Registration) -> ServiceResult<User> {
        if self
            .store
            .user_by_username(&input.username)
            .await?
            .is_some()
        {
            return Err(DomainError::validation("username already exists").into());
        }
        if self.store.user_by_email(&input.email).await?.is_some() {
            return Err(DomainError::validation("email already exists").into());
        }

        let verification_token = opaque_token();
        let user = self
            .store
            .create_user(User {
                id: UserId::from_i64(0),
                username: input.username,
                email: input.email,
                password_hash: hash_or_internal(&input.password)?,
                is_active: true,
                email_confirmed: false,
                email_verification_token: Some(verification_token.clone()),
                email_verification_token_expiry: Some(
                    Utc::now() + Duration::hours(EMAIL_TOKEN_TTL_HOURS),
                ),
                password_reset_token: None,
                password_reset_token_expiry: None,
                refresh_token: None,
                refresh_token_expiry: None,
            })
            .await?;

        if let Some(default_role) = self.store.role_by_system_name(DEFAULT_ROLE).await? {
            self.store.add_user_to_role(user.id, default_role.id).await?;
        } else {
            tracing::warn!(role = DEFAULT_ROLE, "default registration role missing");
        }

        self.mailer
            .send_verification_email(&user.email, user.id, &verification_token)
            .await;

        Ok(user)
    }

    /// Confirm an email address with the mailed token.
    pub async fn verify_email(&self, user_id: UserId, token: &str) -> ServiceResult<()> {
        let mut user = self
            .store
            .user_by_id(user_id)
            .await?
            .ok_or(DomainError::NotFound)?;

        if user.email_confirmed {
            return Ok(());
        }
        if !user.verification_token_valid(token, Utc::now()) {
            return Err(
                DomainError::validation("invalid or expired verification token").into(),
            );
        }

        user.email_confirmed = true;
        user.email_verification_token = None;
        user.email_verification_token_expiry = None;
        self.store.update_user(&user).await?;
        Ok(())
    }

    /// Re-issue a verification token.
    ///
    /// Succeeds silently for unknown addresses so callers cannot probe for
    /// accounts.
    pub async fn resend_verification(&self, email: &str) -> ServiceResult<()> {
        let Some(mut user) = self.store.user_by_email(email).await? else {
            return Ok(());
        };
        if user.email_confirmed {
            return Err(DomainError::validation("email already verified").into());
        }

        let token = opaque_token();
        user.email_verification_token = Some(token.clone());
        user.email_verification_token_expiry =
            Some(Utc::now() + Duration::hours(EMAIL_TOKEN_TTL_HOURS));
        self.store.update_user(&user).await?;

        self.mailer
            .send_verification_email(&user.email, user.id, &token)
            .await;
        Ok(())
    }

    /// Authenticate and mint an access/refresh pair.
    ///
    /// Rotates the stored refresh token.
    pub async fn login(&self, username: &str, password: &str) -> ServiceResult<IssuedTokens> {
        let user = self
            .store
            .user_by_username(username)
            .await?
            .ok_or_else(ServiceError::unauthorized)?;

        if !user.is_active || !user.email_confirmed {
            return Err(ServiceError::unauthorized());
        }
        if !verify_password(password, &user.password_hash) {
            return Err(ServiceError::unauthorized());
        }

        self.mint_and_store(user).await
    }

    /// Exchange a refresh token for a fresh pair (single-use rotation).
    ///
    /// The previous refresh token is invalidated by the overwrite; a second
    /// presentation of it fails.
    pub async fn refresh(&self, refresh_token: &str) -> ServiceResult<IssuedTokens> {
        if refresh_token.is_empty() {
            return Err(DomainError::validation("refresh token is required").into());
        }

        let user = self
            .store
            .user_by_refresh_token(refresh_token)
            .await?
            .ok_or_else(ServiceError::unauthorized)?;

        if !user.refresh_token_valid(refresh_token, Utc::now()) || !user.email_confirmed {
            return Err(ServiceError::unauthorized());
        }

        self.mint_and_store(user).await
    }

    /// Start the password-reset flow.
    ///
    /// Succeeds silently for unknown addresses.
    pub async fn forgot_password(&self, email: &str) -> ServiceResult<()> {
        let Some(mut user) = self.store.user_by_email(email).await? else {
            return Ok(());
        };

        let token = opaque_token();
        user.password_reset_token = Some(token.clone());
        user.password_reset_token_expiry =
            Some(Utc::now() + Duration::hours(EMAIL_TOKEN_TTL_HOURS));
        self.store.update_user(&user).await?;

        self.mailer
            .send_password_reset_email(&user.email, user.id, &token)
            .await;
        Ok(())
    }

    /// Complete the password-reset flow with the mailed token.
    pub async fn reset_password(
        &self,
        user_id: UserId,
        token: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> ServiceResult<()> {
        if new_password != confirm_password {
            return Err(DomainError::validation("passwords do not match").into());
        }

        let mut user = self
            .store
            .user_by_id(user_id)
            .await?
            .ok_or(DomainError::NotFound)?;

        if !user.reset_token_valid(token, Utc::now()) {
            return Err(DomainError::validation("invalid or expired reset token").into());
        }

        user.password_hash = hash_or_internal(new_password)?;
        user.password_reset_token = None;
        user.password_reset_token_expiry = None;
        self.store.update_user(&user).await?;
        Ok(())
    }

    /// Change the password of an authenticated user.
    pub async fn change_password(
        &self,
        user_id: UserId,
        current_password: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> ServiceResult<()> {
        let mut user = self
            .store
            .user_by_id(user_id)
            .await?
            .ok_or(DomainError::NotFound)?;

        if !verify_password(current_password, &user.password_hash) {
            return Err(DomainError::validation("current password is incorrect").into());
        }
        if new_password != confirm_password {
            return Err(DomainError::validation("new passwords do not match").into());
        }

        user.password_hash = hash_or_internal(new_password)?;
        self.store.update_user(&user).await?;
        Ok(())
    }

    /// Clear the stored refresh token.
    pub async fn revoke_refresh_token(&self, user_id: UserId) -> ServiceResult<()> {
        let mut user = self
            .store
            .user_by_id(user_id)
            .await?
            .ok_or(DomainError::NotFound)?;

        user.refresh_token = None;
        user.refresh_token_expiry = None;
        self.store.update_user(&user).await?;
        Ok(())
    }

    /// Identity summary for the given user.
    pub async fn user_info(&self, user_id: UserId) -> ServiceResult<UserInfo> {
        let user = self
            .store
            .user_by_id(user_id)
            .await?
            .ok_or(DomainError::NotFound)?;
        let roles = self.store.roles_for_user(user_id).await?;

        Ok(UserInfo {
            id: user.id,
            username: user.username,
            email: user.email,
            is_active: user.is_active,
            email_confirmed: user.email_confirmed,
            roles: roles.into_iter().map(|r| r.system_name).collect(),
        })
    }

    async fn mint_and_store(&self, mut user: User) -> ServiceResult<IssuedTokens> {
        let roles = self.store.roles_for_user(user.id).await?;
        let tokens = self.issuer.issue(&user, &roles).map_err(|e| {
            tracing::error!(error = %e, "token signing failed");
            ServiceError::Store(StoreError::backend("token signing failed"))
        })?;

        user.refresh_token = Some(tokens.refresh_token.clone());
        user.refresh_token_expiry = Some(Utc::now() + self.issuer.config().refresh_ttl());
        self.store.update_user(&user).await?;

        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::email::TracingMailer;
    use crate::store::MemoryCredentialStore;
    use warden_auth::TokenConfig;

    fn service() -> (Arc<MemoryCredentialStore>, AccountService) {
        let store = Arc::new(MemoryCredentialStore::with_system_roles());
        let issuer = Arc::new(TokenIssuer::new(TokenConfig::new(
            "test-secret-long-enough-for-hs256",
        )));
        let service = AccountService::new(store.clone(), issuer, Arc::new(TracingMailer));
        (store, service)
    }

    fn registration(username: &str) -> Registration {
        Registration {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password: "correct horse".to_string(),
        }
    }

    async fn register_and_confirm(service: &AccountService, username: &str) -> User {
        let user = service.register(registration(username)).await.unwrap();
        let token = user.email_verification_token.clone().unwrap();
        service.verify_email(user.id, &token).await.unwrap();
        user
    }

    #[tokio::test]
    async fn registration_creates_unconfirmed_user_with_default_role() {
        let (store, service) = service();
        let user = service.register(registration("alice")).await.unwrap();

        assert!(!user.email_confirmed);
        assert!(user.email_verification_token.is_some());
        assert!(user.email_verification_token_expiry.unwrap() > Utc::now());

        let roles = store.roles_for_user(user.id).await.unwrap();
        assert!(roles.iter().any(|r| r.system_name == "Student"));
    }

    #[tokio::test]
    async fn duplicate_username_and_email_are_rejected() {
        let (_store, service) = service();
        service.register(registration("alice")).await.unwrap();

        let err = service.register(registration("alice")).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Domain(DomainError::Validation(_))
        ));

        let err = service
            .register(Registration {
                username: "alice2".to_string(),
                email: "alice@example.com".to_string(),
                password: "pw".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Domain(DomainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn login_requires_confirmed_email_and_rejects_uniformly() {
        let (_store, service) = service();
        service.register(registration("alice")).await.unwrap();

        // Unconfirmed, wrong password, and unknown user all look alike.
        let unconfirmed = service.login("alice", "correct horse").await.unwrap_err();
        let unknown = service.login("nobody", "whatever").await.unwrap_err();
        assert!(matches!(
            unconfirmed,
            ServiceError::Domain(DomainError::Unauthorized)
        ));
        assert!(matches!(
            unknown,
            ServiceError::Domain(DomainError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn login_issues_tokens_and_persists_refresh_token() {
        let (store, service) = service();
        let user = register_and_confirm(&service, "alice").await;

        let tokens = service.login("alice", "correct horse").await.unwrap();
        let stored = store.user_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(stored.refresh_token.as_deref(), Some(tokens.refresh_token.as_str()));
        assert!(stored.refresh_token_expiry.unwrap() > Utc::now());
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let (_store, service) = service();
        register_and_confirm(&service, "alice").await;

        let err = service.login("alice", "wrong horse").await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Domain(DomainError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn refresh_rotation_invalidates_the_previous_token() {
        let (_store, service) = service();
        register_and_confirm(&service, "alice").await;

        let first = service.login("alice", "correct horse").await.unwrap();
        let second = service.refresh(&first.refresh_token).await.unwrap();
        assert_ne!(first.refresh_token, second.refresh_token);

        // The first token was overwritten by the rotation.
        let err = service.refresh(&first.refresh_token).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Domain(DomainError::Unauthorized)
        ));

        // The rotated token still works.
        service.refresh(&second.refresh_token).await.unwrap();
    }

    #[tokio::test]
    async fn revoked_refresh_token_is_rejected() {
        let (_store, service) = service();
        let user = register_and_confirm(&service, "alice").await;

        let tokens = service.login("alice", "correct horse").await.unwrap();
        service.revoke_refresh_token(user.id).await.unwrap();

        let err = service.refresh(&tokens.refresh_token).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Domain(DomainError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn password_reset_flow_round_trips() {
        let (store, service) = service();
        let user = register_and_confirm(&service, "alice").await;

        service.forgot_password("alice@example.com").await.unwrap();
        let token = store
            .user_by_id(user.id)
            .await
            .unwrap()
            .unwrap()
            .password_reset_token
            .unwrap();

        service
            .reset_password(user.id, &token, "new password", "new password")
            .await
            .unwrap();

        service.login("alice", "new password").await.unwrap();
        let err = service.login("alice", "correct horse").await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Domain(DomainError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn mismatched_reset_confirmation_is_rejected_before_mutation() {
        let (store, service) = service();
        let user = register_and_confirm(&service, "alice").await;
        service.forgot_password("alice@example.com").await.unwrap();
        let token = store
            .user_by_id(user.id)
            .await
            .unwrap()
            .unwrap()
            .password_reset_token
            .unwrap();

        let err = service
            .reset_password(user.id, &token, "new password", "different")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Domain(DomainError::Validation(_))
        ));

        // Old password still works: nothing was mutated.
        service.login("alice", "correct horse").await.unwrap();
    }

    #[tokio::test]
    async fn forgot_password_does_not_reveal_unknown_addresses() {
        let (_store, service) = service();
        service.forgot_password("ghost@example.com").await.unwrap();
        service.resend_verification("ghost@example.com").await.unwrap();
    }

    #[tokio::test]
    async fn user_info_reports_roles() {
        let (_store, service) = service();
        let user = register_and_confirm(&service, "alice").await;

        let info = service.user_info(user.id).await.unwrap();
        assert_eq!(info.username, "alice");
        assert!(info.email_confirmed);
        assert_eq!(info.roles, vec!["Student".to_string()]);
    }
}
