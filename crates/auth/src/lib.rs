//! `warden-auth` — pure authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: it mints and
//! validates bearer credentials, hashes passwords, and parses policy names
//! into permission requirements. Resolving a user's effective permissions
//! against the credential store lives in `warden-infra`.

pub mod claims;
pub mod names;
pub mod password;
pub mod policy;
pub mod token;

pub use claims::AccessClaims;
pub use names::{PermissionName, RoleName};
pub use password::{hash_password, verify_password, PasswordError};
pub use policy::{PermissionRequirement, PERMISSION_POLICY_PREFIX};
pub use token::{opaque_token, IssuedTokens, TokenConfig, TokenError, TokenIssuer};
