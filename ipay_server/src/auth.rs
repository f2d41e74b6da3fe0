//! Access token issuance and verification.
//!
//! Access tokens are HS256-signed JWTs carrying [`JwtClaims`]. They expire after [`ACCESS_TOKEN_LIFETIME`] and are not
//! refreshed. Clients must log in again to get a new one.
use std::{future::Future, pin::Pin, sync::Arc};

use actix_web::{dev::Payload, FromRequest, HttpMessage, HttpRequest};
use chrono::Duration;
use ipay_engine::db_types::{Identity, Role};
use jwt_compact::{
    alg::{Hs256, Hs256Key},
    AlgorithmExt,
    Claims,
    Header,
    TimeOptions,
    UntrustedToken,
};
use log::*;
use serde::{Deserialize, Serialize};

use crate::{
    config::AuthConfig,
    errors::{AuthError, ServerError},
};

pub const ACCESS_TOKEN_LIFETIME: Duration = Duration::hours(1);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JwtClaims {
    pub user_id: i64,
    pub username: String,
    pub role: Role,
}

impl From<Identity> for JwtClaims {
    fn from(identity: Identity) -> Self {
        Self { user_id: identity.user_id, username: identity.username, role: identity.role }
    }
}

impl From<JwtClaims> for Identity {
    fn from(claims: JwtClaims) -> Self {
        Identity::new(claims.user_id, claims.username, claims.role)
    }
}

/// Handlers behind the JWT middleware can take `JwtClaims` as an argument. The claims are placed in the request
/// extensions once the token has been verified.
impl FromRequest for JwtClaims {
    type Error = ServerError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let claims = req.extensions().get::<JwtClaims>().cloned();
        Box::pin(async move {
            claims.ok_or_else(|| {
                warn!("🔐️ No JWT claims found in request extensions. Is the route behind the JWT middleware?");
                ServerError::AuthenticationError(AuthError::MissingToken)
            })
        })
    }
}

fn signing_key(config: &AuthConfig) -> Hs256Key {
    Hs256Key::new(config.jwt_secret.reveal().as_bytes())
}

//-------------------------------------------------  TokenIssuer  ------------------------------------------------------
pub struct TokenIssuer {
    key: Arc<Hs256Key>,
    lifetime: Duration,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        Self { key: Arc::new(signing_key(config)), lifetime: ACCESS_TOKEN_LIFETIME }
    }

    /// Issue a new access token for the given identity.
    /// This method DOES NOT verify the identity. Only call it after the caller's credentials have been checked.
    pub fn issue_token(&self, identity: Identity) -> Result<String, AuthError> {
        let header = Header::empty().with_token_type("JWT");
        let claims = Claims::new(JwtClaims::from(identity))
            .set_duration_and_issuance(&TimeOptions::default(), self.lifetime);
        let token = Hs256.token(&header, &claims, &self.key).map_err(|e| AuthError::TokenIssueError(e.to_string()))?;
        Ok(token)
    }
}

//-----------------------------------------------  TokenValidator  -----------------------------------------------------
#[derive(Clone)]
pub struct TokenValidator {
    key: Arc<Hs256Key>,
}

impl TokenValidator {
    pub fn new(config: &AuthConfig) -> Self {
        Self { key: Arc::new(signing_key(config)) }
    }

    /// Checks the signature and expiry of an access token and returns its claims. Tokens without an expiry are
    /// rejected, and there is no leeway: a token is invalid from the second it expires.
    pub fn validate(&self, token: &str) -> Result<JwtClaims, AuthError> {
        let untrusted_token = UntrustedToken::new(token).map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        let token = Hs256
            .validator::<JwtClaims>(&self.key)
            .validate(&untrusted_token)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        let claims = token.claims();
        claims
            .validate_expiration(&TimeOptions::from_leeway(Duration::zero()))
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        trace!("🔐️ Access token for user #{} validated", claims.custom.user_id);
        Ok(claims.custom.clone())
    }
}
