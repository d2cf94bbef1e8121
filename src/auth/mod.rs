// Token verification against the identity provider.
//
// The rest of the crate only depends on the `TokenVerifier` capability:
// hand it a bearer token, get back the verified claims or an auth error.
// The production implementation validates RS256 signatures against the
// provider's JWKS document and caches decoding keys per `kid`.
use std::collections::HashMap;

use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

use crate::config::AuthConfig;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing Authorization header")]
    MissingHeader,

    #[error("Authorization header must use Bearer token format")]
    MalformedHeader,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Malformed subject claim")]
    MalformedSubject,

    #[error("Unable to fetch signing keys: {0}")]
    KeyFetch(String),
}

/// Claims extracted from a successfully verified token.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifiedClaims {
    pub sub: String,
}

impl VerifiedClaims {
    /// The internal subject identifier. The provider issues `sub` claims of
    /// the form `provider|identifier`; only the identifier part is stored.
    pub fn subject(&self) -> Result<&str, AuthError> {
        match self.sub.split_once('|') {
            Some((_, id)) if !id.is_empty() => Ok(id),
            _ => Err(AuthError::MalformedSubject),
        }
    }
}

#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<VerifiedClaims, AuthError>;
}

/// Extract the bearer token from an `Authorization` header value.
pub fn extract_bearer_token(headers: &axum::http::HeaderMap) -> Result<String, AuthError> {
    let auth_header = headers
        .get("authorization")
        .ok_or(AuthError::MissingHeader)?;

    let auth_str = auth_header.to_str().map_err(|_| AuthError::MalformedHeader)?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.to_string()),
        _ => Err(AuthError::MalformedHeader),
    }
}

/// RS256 verifier backed by the identity provider's JWKS endpoint.
///
/// Decoding keys are cached per `kid`; the document is re-fetched only when
/// a token arrives signed with an unknown key (key rotation).
pub struct JwksVerifier {
    jwks_uri: String,
    issuer: String,
    audience: String,
    client: reqwest::Client,
    keys: RwLock<HashMap<String, DecodingKey>>,
}

impl JwksVerifier {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            jwks_uri: config.jwks_uri(),
            issuer: config.issuer(),
            audience: config.audience.clone(),
            client: reqwest::Client::new(),
            keys: RwLock::new(HashMap::new()),
        }
    }

    async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        {
            let keys = self.keys.read().await;
            if let Some(key) = keys.get(kid) {
                return Ok(key.clone());
            }
        }

        debug!(kid, "signing key not cached, fetching JWKS");
        let jwks: JwkSet = self
            .client
            .get(&self.jwks_uri)
            .send()
            .await
            .map_err(|e| AuthError::KeyFetch(e.to_string()))?
            .json()
            .await
            .map_err(|e| AuthError::KeyFetch(e.to_string()))?;

        let mut keys = self.keys.write().await;
        for jwk in &jwks.keys {
            if let (Some(key_id), Ok(key)) =
                (jwk.common.key_id.clone(), DecodingKey::from_jwk(jwk))
            {
                keys.insert(key_id, key);
            }
        }

        keys.get(kid)
            .cloned()
            .ok_or_else(|| AuthError::InvalidToken(format!("unknown signing key: {}", kid)))
    }
}

#[async_trait]
impl TokenVerifier for JwksVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedClaims, AuthError> {
        let header =
            decode_header(token).map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        let kid = header
            .kid
            .ok_or_else(|| AuthError::InvalidToken("token has no key id".to_string()))?;

        let key = self.decoding_key(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&self.audience]);
        validation.set_issuer(&[&self.issuer]);

        let token_data = decode::<VerifiedClaims>(token, &key, &validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        Ok(token_data.claims)
    }
}
