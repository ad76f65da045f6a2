//! Bearer token authentication.
//!
//! Every `/api` route resolves the caller through a [`TokenVerifier`] before
//! anything else happens. The resolved [`UserId`](wattle_persistence::user::UserId)
//! is the only source of the `users/{userId}` storage prefix.
//!
//! - [`JwtVerifier`] - HS256 tokens, `sub` claim is the user id
//! - [`StaticTokenVerifier`] - fixed token table for development and tests
//! - [`VerifierChain`] - accepts a token if any member accepts it

mod extractor;
mod verifier;

pub use extractor::{AuthenticatedUser, X_REQUEST_ID};
pub use verifier::{
    AuthError, Claims, JwtVerifier, StaticTokenVerifier, TokenVerifier, VerifierChain,
    bearer_token,
};

use std::sync::Arc;

use crate::config::ServerConfig;

/// Builds the verifier described by the configuration.
///
/// A JWT secret and dev tokens may both be set; the JWT verifier is tried
/// first.
pub fn build_verifier(config: &ServerConfig) -> Result<Arc<dyn TokenVerifier>, AuthError> {
    let mut verifiers: Vec<Arc<dyn TokenVerifier>> = Vec::new();

    if let Some(secret) = config.jwt_secret.as_deref() {
        verifiers.push(Arc::new(JwtVerifier::new(secret)?));
    }

    let dev_tokens = config.parse_dev_tokens().map_err(AuthError::Config)?;
    if !dev_tokens.is_empty() {
        tracing::warn!(
            count = dev_tokens.len(),
            "Static development tokens are enabled"
        );
        verifiers.push(Arc::new(StaticTokenVerifier::new(dev_tokens)));
    }

    match verifiers.len() {
        0 => Err(AuthError::Config(
            "no authentication configured".to_string(),
        )),
        1 => Ok(verifiers.remove(0)),
        _ => Ok(Arc::new(VerifierChain::new(verifiers))),
    }
}
