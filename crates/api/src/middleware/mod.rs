//! HTTP middleware components.

pub mod auth;
pub mod logging;

pub use auth::{build_verifier, require_auth, TokenVerifier, VerifiedIdentity};
