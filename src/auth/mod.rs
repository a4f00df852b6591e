//! Authentication plumbing.
//!
//! The session provider itself is an external collaborator; this module
//! only verifies bearer tokens and resolves the acting user and their
//! enterprise (tenant). A request with no resolvable enterprise never
//! reaches a service.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::errors::ServiceError;

const TOKEN_ISSUER: &str = "gestor-api";

/// Claim structure for access tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,
    /// Tenant the user acts for
    pub enterprise_id: Uuid,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
}

/// The acting user, resolved from a verified token. Carries the tenant id
/// that every service call is scoped to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub enterprise_id: Uuid,
}

/// Signing and verification keys plus token policy.
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    expiration: Duration,
}

impl TokenKeys {
    pub fn new(secret: &str, expiration_secs: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[TOKEN_ISSUER]);

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            expiration: Duration::seconds(expiration_secs as i64),
        }
    }

    /// Issues a signed access token for a user acting on an enterprise.
    pub fn issue_token(
        &self,
        user_id: &str,
        enterprise_id: Uuid,
    ) -> Result<String, ServiceError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            enterprise_id,
            iat: now.timestamp(),
            exp: (now + self.expiration).timestamp(),
            iss: TOKEN_ISSUER.to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| ServiceError::InternalError(format!("failed to sign token: {e}")))
    }

    /// Verifies a bearer token and resolves the acting user.
    pub fn verify(&self, token: &str) -> Result<AuthenticatedUser, ServiceError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|e| ServiceError::Unauthorized(format!("invalid token: {e}")))?;

        Ok(AuthenticatedUser {
            user_id: data.claims.sub,
            enterprise_id: data.claims.enterprise_id,
        })
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let keys = parts
            .extensions
            .get::<Arc<TokenKeys>>()
            .cloned()
            .ok_or_else(|| {
                ServiceError::InternalError("token verification is not configured".to_string())
            })?;

        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                ServiceError::Unauthorized("missing authorization header".to_string())
            })?;

        let token = header_value.strip_prefix("Bearer ").ok_or_else(|| {
            ServiceError::Unauthorized("authorization header is not a bearer token".to_string())
        })?;

        keys.verify(token)
    }
}
