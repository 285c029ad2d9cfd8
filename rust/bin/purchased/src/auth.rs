//! JWT bearer authentication.
//!
//! Reads `Authorization: Bearer <token>`, validates the HS256 signature and
//! expiry, and turns the claims into an [`Actor`].

use axum::http::HeaderMap;
use jsonwebtoken::{DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use openerp_core::{Actor, Authenticator, ServiceError};

/// JWT claims payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: user id.
    pub sub: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Roles such as `purchase.procurement_officer`.
    #[serde(default)]
    pub roles: Vec<String>,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiration (unix timestamp).
    pub exp: i64,
}

pub struct JwtAuthenticator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtAuthenticator {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::default(),
        }
    }
}

impl Authenticator for JwtAuthenticator {
    fn authenticate(&self, headers: &HeaderMap) -> Result<Actor, ServiceError> {
        let token = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| ServiceError::Unauthorized("missing authorization token".into()))?;

        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| ServiceError::Unauthorized(format!("invalid token: {e}")))?;

        Ok(Actor::new(data.claims.sub, data.claims.roles))
    }
}
