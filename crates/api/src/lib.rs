//! `warden-api` — HTTP surface over the RBAC services.

pub mod app;
pub mod authz;
pub mod context;
pub mod middleware;
