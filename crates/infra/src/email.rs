//! Outbound mail port.
//!
//! Delivery is fire-and-forget from the account workflows: a failed send is
//! logged by the adapter and never rolls back the state change that
//! preceded it.

use async_trait::async_trait;

use warden_core::UserId;

/// Mail delivery consumed by the account service.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_verification_email(&self, to: &str, user_id: UserId, token: &str);
    async fn send_password_reset_email(&self, to: &str, user_id: UserId, token: &str);
}

/// Mailer that records sends in the log instead of delivering.
///
/// Default wiring for dev and tests; a real SMTP adapter slots in behind the
/// same trait.
#[derive(Debug, Default)]
pub struct TracingMailer;

#[async_trait]
impl Mailer for TracingMailer {
    async fn send_verification_email(&self, to: &str, user_id: UserId, _token: &str) {
        tracing::info!(%user_id, to, "verification email queued");
    }

    async fn send_password_reset_email(&self, to: &str, user_id: UserId, _token: &str) {
        tracing::info!(%user_id, to, "password reset email queued");
    }
}
