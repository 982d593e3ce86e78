//! Bearer-token authentication middleware.
//!
//! Token verification is delegated to the external identity provider; the
//! rest of the API treats a verified identity as a precondition, not
//! something it computes.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::app::AppState;
use crate::config::AuthConfig;
use crate::error::ApiError;

/// Identity established from a validated bearer token.
#[derive(Debug, Clone)]
pub struct VerifiedIdentity {
    pub subject: String,
}

/// Port validating bearer tokens issued by the identity provider.
#[async_trait::async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, ApiError>;
}

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
}

/// RS256 verification against the provider's published public key.
pub struct JwtVerifier {
    key: jsonwebtoken::DecodingKey,
    validation: jsonwebtoken::Validation,
}

impl JwtVerifier {
    pub fn new(config: &AuthConfig) -> Result<Self, jsonwebtoken::errors::Error> {
        let key = jsonwebtoken::DecodingKey::from_rsa_pem(config.jwt_public_key.as_bytes())?;
        let mut validation = jsonwebtoken::Validation::new(jsonwebtoken::Algorithm::RS256);
        if !config.issuer.trim().is_empty() {
            validation.set_issuer(&[config.issuer.trim()]);
        }
        if !config.audience.trim().is_empty() {
            validation.set_audience(&[config.audience.trim()]);
        }
        Ok(Self { key, validation })
    }
}

#[async_trait::async_trait]
impl TokenVerifier for JwtVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, ApiError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.key, &self.validation)
            .map_err(|_| ApiError::Forbidden("Access denied".to_string()))?;
        Ok(VerifiedIdentity {
            subject: data.claims.sub,
        })
    }
}

/// Fixed-token verifier for development and tests.
pub struct StaticTokenVerifier {
    token: String,
}

impl StaticTokenVerifier {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait::async_trait]
impl TokenVerifier for StaticTokenVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, ApiError> {
        if token == self.token {
            Ok(VerifiedIdentity {
                subject: "static".to_string(),
            })
        } else {
            Err(ApiError::Forbidden("Access denied".to_string()))
        }
    }
}

/// Builds the verifier selected by configuration.
pub fn build_verifier(config: &AuthConfig) -> anyhow::Result<Arc<dyn TokenVerifier>> {
    match config.mode.as_str() {
        "static" => Ok(Arc::new(StaticTokenVerifier::new(
            config.static_token.clone(),
        ))),
        _ => Ok(Arc::new(JwtVerifier::new(config)?)),
    }
}

/// The bearer token carried by a request, if any.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Middleware that requires a valid bearer token.
///
/// The verified identity is stored in request extensions for downstream
/// handlers; missing or invalid tokens are rejected outright.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(req.headers()).map(str::to_string) else {
        return ApiError::Forbidden("Access denied".to_string()).into_response();
    };

    match state.verifier.verify(&token).await {
        Ok(identity) => {
            req.extensions_mut().insert(identity);
            next.run(req).await
        }
        Err(err) => err.into_response(),
    }
}
