//! User account record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::UserId;

/// A user account.
///
/// Passwords are stored as bcrypt hashes only. The three optional token
/// pairs (email verification, password reset, refresh) are opaque random
/// strings compared by exact equality, each with its own expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_active: bool,

    pub email_confirmed: bool,
    #[serde(skip_serializing)]
    pub email_verification_token: Option<String>,
    pub email_verification_token_expiry: Option<DateTime<Utc>>,

    #[serde(skip_serializing)]
    pub password_reset_token: Option<String>,
    pub password_reset_token_expiry: Option<DateTime<Utc>>,

    #[serde(skip_serializing)]
    pub refresh_token: Option<String>,
    pub refresh_token_expiry: Option<DateTime<Utc>>,
}

impl User {
    /// True when the stored refresh token matches and has not expired.
    pub fn refresh_token_valid(&self, presented: &str, now: DateTime<Utc>) -> bool {
        match (&self.refresh_token, self.refresh_token_expiry) {
            (Some(stored), Some(expiry)) => stored == presented && expiry > now,
            _ => false,
        }
    }

    /// True when the stored verification token matches and has not expired.
    pub fn verification_token_valid(&self, presented: &str, now: DateTime<Utc>) -> bool {
        match (&self.email_verification_token, self.email_verification_token_expiry) {
            (Some(stored), Some(expiry)) => stored == presented && expiry > now,
            _ => false,
        }
    }

    /// True when the stored password-reset token matches and has not expired.
    pub fn reset_token_valid(&self, presented: &str, now: DateTime<Utc>) -> bool {
        match (&self.password_reset_token, self.password_reset_token_expiry) {
            (Some(stored), Some(expiry)) => stored == presented && expiry > now,
            _ => false,
        }
    }
}
