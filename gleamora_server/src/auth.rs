//! Access token handling.
//!
//! The marketplace identity service issues HS256 bearer tokens; this server validates them and
//! turns the claims into an [`Actor`] for the authorization resolver. Tokens travel in the
//! `Authorization: Bearer <token>` header. A suspended account is rejected at validation time,
//! before any role or ownership check runs.
use actix_web::{dev::Payload, FromRequest, HttpMessage, HttpRequest};
use chrono::{Duration, Utc};
use futures::future::{ready, Ready};
use gleamora_engine::{authorization::Actor, db_types::Role};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    config::AuthConfig,
    errors::{AuthError, ServerError},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// The actor id (customer, vendor or admin identifier).
    pub sub: String,
    pub role: Role,
    #[serde(default)]
    pub suspended: bool,
    /// Expiry, as a unix timestamp.
    pub exp: i64,
}

impl JwtClaims {
    pub fn actor(&self) -> Actor {
        Actor::new(self.sub.clone(), self.role)
    }
}

/// Extracts the validated claims that [`JwtAuthMiddleware`](crate::middleware::JwtAuthMiddleware)
/// placed in the request extensions. Handlers that take a `JwtClaims` argument therefore only run
/// behind the authentication layer.
impl FromRequest for JwtClaims {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(req.extensions().get::<JwtClaims>().cloned().ok_or(ServerError::AuthenticationError(AuthError::MissingToken)))
    }
}

/// Validates a bearer token and returns its claims. Expired tokens and bad signatures are both
/// validation failures; a suspended account yields [`AuthError::AccountSuspended`], which the
/// server maps to 401 exactly like a missing token.
pub fn validate_token(token: &str, secret: &str) -> Result<JwtClaims, AuthError> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::new(Algorithm::HS256);
    let data = decode::<JwtClaims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::ValidationError(e.to_string()),
    })?;
    let claims = data.claims;
    if claims.suspended {
        debug!("🔑️ Rejecting token for suspended account {}", claims.sub);
        return Err(AuthError::AccountSuspended);
    }
    Ok(claims)
}

/// Signs access tokens with the shared secret. The identity service issues tokens in production;
/// this signer exists so tests can mint tokens the middleware will accept.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    lifetime: Duration,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.jwt_secret.reveal().as_bytes());
        Self { encoding_key, lifetime: Duration::hours(config.token_lifetime_hours) }
    }

    /// Issue a new access token for the given actor. This method DOES NOT verify that the actor
    /// information is legitimate. That is the identity service's job, prior to calling
    /// `issue_token`.
    pub fn issue_token(&self, sub: impl Into<String>, role: Role, suspended: bool) -> Result<String, AuthError> {
        let claims = JwtClaims {
            sub: sub.into(),
            role,
            suspended,
            exp: (Utc::now() + self.lifetime).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::ValidationError(e.to_string()))
    }
}
