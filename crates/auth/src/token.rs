//! Bearer credential minting and validation.
//!
//! Access tokens are signed JWTs with a short lifetime; refresh tokens are
//! opaque random strings persisted by the caller and compared by equality.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use warden_core::{Role, User};

use crate::claims::AccessClaims;
use crate::names::RoleName;

/// Token signing/validation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    /// Shared secret for HS256 signing.
    #[serde(skip_serializing)]
    pub secret: String,
    /// Token issuer.
    pub issuer: String,
    /// Token audience.
    pub audience: String,
    /// Access token lifetime in seconds.
    pub access_ttl_secs: i64,
    /// Refresh token lifetime in seconds.
    pub refresh_ttl_secs: i64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret: String::new(), // must be set by the caller
            issuer: "warden".to_string(),
            audience: "warden-clients".to_string(),
            access_ttl_secs: 15 * 60,
            refresh_ttl_secs: 7 * 24 * 60 * 60,
        }
    }
}

impl TokenConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = audience.into();
        self
    }

    /// Refresh token lifetime as a chrono duration.
    pub fn refresh_ttl(&self) -> Duration {
        Duration::seconds(self.refresh_ttl_secs)
    }
}

/// Error raised by the token issuer.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Uniform validation failure.
    ///
    /// Bad signature, wrong issuer/audience, expiry, and malformed input all
    /// collapse into this variant so callers cannot distinguish them.
    #[error("invalid token")]
    Invalid,

    /// Signing failed (configuration problem, not caller input).
    #[error("failed to sign token")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// A freshly minted access/refresh pair.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

/// Mints and validates bearer credentials.
///
/// Stateless and cheap to clone behind an `Arc`; issuance and validation
/// share no mutable state.
pub struct TokenIssuer {
    config: TokenConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenIssuer {
    pub fn new(config: TokenConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.issuer]);
        validation.set_audience(&[&config.audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);

        Self {
            config,
            encoding_key,
            decoding_key,
            validation,
        }
    }

    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    /// Mint an access token for the user plus a fresh opaque refresh token.
    ///
    /// Persisting the refresh token (and its expiry) against the user record
    /// is the caller's responsibility.
    pub fn issue(&self, user: &User, roles: &[Role]) -> Result<IssuedTokens, TokenError> {
        let now = Utc::now();
        let expires_at = now + Duration::seconds(self.config.access_ttl_secs);

        let claims = AccessClaims {
            sub: user.id.to_string(),
            name: user.username.clone(),
            email: user.email.clone(),
            roles: roles
                .iter()
                .map(|r| RoleName::new(r.system_name.clone()))
                .collect(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let access_token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(TokenError::Signing)?;

        Ok(IssuedTokens {
            access_token,
            refresh_token: opaque_token(),
            expires_at,
        })
    }

    /// Verify signature, issuer, audience, and expiry.
    ///
    /// Every failure maps to [`TokenError::Invalid`]; the reason is never
    /// exposed to the caller.
    pub fn validate(&self, token: &str) -> Result<AccessClaims, TokenError> {
        decode::<AccessClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| TokenError::Invalid)
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("issuer", &self.config.issuer)
            .field("audience", &self.config.audience)
            .field("access_ttl_secs", &self.config.access_ttl_secs)
            .finish()
    }
}

/// Generate an opaque token: 64 cryptographically random bytes, base64.
///
/// Used for refresh tokens and for the emailed verification/reset tokens.
/// Carries no structure; validated only by equality against the stored value.
pub fn opaque_token() -> String {
    let mut bytes = [0u8; 64];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    BASE64.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;
    use warden_core::{RoleId, UserId};

    fn test_issuer() -> TokenIssuer {
        TokenIssuer::new(TokenConfig::new("test-secret-long-enough-for-hs256"))
    }

    fn test_user() -> User {
        User {
            id: UserId::from_i64(42),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: String::new(),
            is_active: true,
            email_confirmed: true,
            email_verification_token: None,
            email_verification_token_expiry: None,
            password_reset_token: None,
            password_reset_token_expiry: None,
            refresh_token: None,
            refresh_token_expiry: None,
        }
    }

    fn role(id: i64, system_name: &str) -> Role {
        Role {
            id: RoleId::from_i64(id),
            name: system_name.to_string(),
            system_name: system_name.to_string(),
            description: String::new(),
            is_system_role: false,
        }
    }

    #[test]
    fn issue_then_validate_round_trips_claims() {
        let issuer = test_issuer();
        let roles = [role(1, "Administrator"), role(2, "Student")];

        let tokens = issuer.issue(&test_user(), &roles).unwrap();
        let claims = issuer.validate(&tokens.access_token).unwrap();

        assert_eq!(claims.user_id().unwrap(), UserId::from_i64(42));
        assert_eq!(claims.name, "alice");
        assert_eq!(claims.email, "alice@example.com");
        assert!(claims.has_role("Administrator"));
        assert!(claims.has_role("Student"));
        assert!(!claims.has_role("Auditor"));
    }

    #[test]
    fn tampered_signature_fails_uniformly() {
        let issuer = test_issuer();
        let tokens = issuer.issue(&test_user(), &[]).unwrap();

        // Flip a byte in the signature segment.
        let mut parts: Vec<String> = tokens
            .access_token
            .split('.')
            .map(str::to_string)
            .collect();
        let sig = parts.last_mut().unwrap();
        let flipped = if sig.ends_with('A') { 'B' } else { 'A' };
        sig.pop();
        sig.push(flipped);
        let tampered = parts.join(".");

        let err = issuer.validate(&tampered).unwrap_err();
        assert!(matches!(err, TokenError::Invalid));
    }

    #[test]
    fn wrong_secret_fails_uniformly() {
        let a = TokenIssuer::new(TokenConfig::new("secret-one-for-testing-purposes"));
        let b = TokenIssuer::new(TokenConfig::new("secret-two-for-testing-purposes"));

        let tokens = a.issue(&test_user(), &[]).unwrap();
        assert!(matches!(
            b.validate(&tokens.access_token),
            Err(TokenError::Invalid)
        ));
    }

    #[test]
    fn wrong_audience_fails_uniformly() {
        let a = TokenIssuer::new(TokenConfig::new("shared-secret-for-testing-only"));
        let b = TokenIssuer::new(
            TokenConfig::new("shared-secret-for-testing-only").with_audience("someone-else"),
        );

        let tokens = a.issue(&test_user(), &[]).unwrap();
        assert!(matches!(
            b.validate(&tokens.access_token),
            Err(TokenError::Invalid)
        ));
    }

    #[test]
    fn garbage_input_fails_uniformly() {
        let issuer = test_issuer();
        assert!(matches!(
            issuer.validate("not.a.token"),
            Err(TokenError::Invalid)
        ));
        assert!(matches!(issuer.validate(""), Err(TokenError::Invalid)));
    }

    #[test]
    fn opaque_tokens_are_unique_and_decode_to_64_bytes() {
        let a = opaque_token();
        let b = opaque_token();
        assert_ne!(a, b);
        assert_eq!(BASE64.decode(&a).unwrap().len(), 64);
    }
}
