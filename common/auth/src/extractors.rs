use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::{header::AUTHORIZATION, request::Parts};

use crate::claims::ClaimSet;
use crate::codec::TokenCodec;
use crate::error::{AuthError, AuthResult};

/// Verified bearer token pulled from the request, signature checked but
/// expiry left to the handler (refresh accepts expired tokens).
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub claims: ClaimSet,
    pub token: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    Arc<TokenCodec>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let codec = Arc::<TokenCodec>::from_ref(state);

        let header_value = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingAuthorization)?;

        let token = parse_bearer(header_value)?;
        let claims = codec.verify(&token)?;

        Ok(Self { claims, token })
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
pub fn parse_bearer(value: &axum::http::HeaderValue) -> AuthResult<String> {
    let raw = value
        .to_str()
        .map_err(|_| AuthError::InvalidAuthorization)?
        .trim();

    let token = raw
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidAuthorization)?
        .trim();

    if token.is_empty() {
        return Err(AuthError::InvalidAuthorization);
    }

    Ok(token.to_owned())
}
