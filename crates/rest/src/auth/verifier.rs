//! Bearer token verification.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use wattle_persistence::user::UserId;

use crate::config::MIN_JWT_SECRET_LEN;

/// Why a token was refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No `Authorization` header was sent.
    #[error("missing bearer token")]
    MissingToken,

    /// The header was present but not `Bearer <token>`.
    #[error("malformed authorization header")]
    MalformedHeader,

    /// The token was rejected by the verifier.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// The token named a user id that cannot address storage.
    #[error("invalid user id in token: {0}")]
    InvalidSubject(String),

    /// The verifier itself is misconfigured.
    #[error("auth configuration error: {0}")]
    Config(String),
}

/// Resolves a bearer token to the user it was issued for.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Returns the user id behind `token`, or why it was refused.
    async fn verify(&self, token: &str) -> Result<UserId, AuthError>;
}

/// Claims carried by Wattle access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User identifier.
    pub sub: String,
    /// Expiration time (Unix timestamp).
    pub exp: u64,
    /// Issued at (Unix timestamp).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<u64>,
}

/// HS256 JWT verifier; the `sub` claim is the user id.
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    /// Creates a verifier for the shared secret.
    ///
    /// Returns an error if the secret is shorter than
    /// [`MIN_JWT_SECRET_LEN`].
    pub fn new(secret: &str) -> Result<Self, AuthError> {
        if secret.len() < MIN_JWT_SECRET_LEN {
            return Err(AuthError::Config(format!(
                "JWT secret must be at least {} characters",
                MIN_JWT_SECRET_LEN
            )));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }
}

#[async_trait]
impl TokenVerifier for JwtVerifier {
    async fn verify(&self, token: &str) -> Result<UserId, AuthError> {
        let data = decode::<Claims>(token, &self.key, &self.validation).map_err(|err| {
            let reason = match err.kind() {
                ErrorKind::ExpiredSignature => "token expired",
                ErrorKind::InvalidSignature => "invalid signature",
                ErrorKind::InvalidToken => "malformed token",
                _ => "token validation failed",
            };
            AuthError::InvalidToken(reason.to_string())
        })?;

        UserId::parse(data.claims.sub).map_err(|e| AuthError::InvalidSubject(e.to_string()))
    }
}

/// Fixed token table for development and tests.
#[derive(Debug, Default)]
pub struct StaticTokenVerifier {
    tokens: HashMap<String, String>,
}

impl StaticTokenVerifier {
    /// Creates a verifier from `(token, userId)` pairs.
    pub fn new<I, T, U>(tokens: I) -> Self
    where
        I: IntoIterator<Item = (T, U)>,
        T: Into<String>,
        U: Into<String>,
    {
        Self {
            tokens: tokens
                .into_iter()
                .map(|(t, u)| (t.into(), u.into()))
                .collect(),
        }
    }

    /// Returns true if no tokens are registered.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[async_trait]
impl TokenVerifier for StaticTokenVerifier {
    async fn verify(&self, token: &str) -> Result<UserId, AuthError> {
        let user = self
            .tokens
            .get(token)
            .ok_or_else(|| AuthError::InvalidToken("unknown token".to_string()))?;
        UserId::parse(user.as_str()).map_err(|e| AuthError::InvalidSubject(e.to_string()))
    }
}

/// Tries each verifier in order and accepts the first success.
pub struct VerifierChain {
    verifiers: Vec<Arc<dyn TokenVerifier>>,
}

impl VerifierChain {
    /// Creates a chain from the given verifiers.
    pub fn new(verifiers: Vec<Arc<dyn TokenVerifier>>) -> Self {
        Self { verifiers }
    }
}

#[async_trait]
impl TokenVerifier for VerifierChain {
    async fn verify(&self, token: &str) -> Result<UserId, AuthError> {
        let mut last = AuthError::InvalidToken("no verifier configured".to_string());
        for verifier in &self.verifiers {
            match verifier.verify(token).await {
                Ok(user) => return Ok(user),
                Err(err) => last = err,
            }
        }
        Err(last)
    }
}

/// Extracts the token from an `Authorization` header value.
///
/// The scheme is matched case-insensitively; surrounding whitespace is
/// ignored.
pub fn bearer_token(header: &str) -> Result<&str, AuthError> {
    let (scheme, token) = header
        .trim()
        .split_once(' ')
        .ok_or(AuthError::MalformedHeader)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::MalformedHeader);
    }
    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::MalformedHeader);
    }
    Ok(token)
}
