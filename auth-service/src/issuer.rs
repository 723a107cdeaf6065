use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use common_auth::error::ErrorBody;
use common_auth::{ExtraClaims, Role, TokenCodec};
use thiserror::Error;
use tracing::warn;

use crate::store::{hash_secret, CredentialStore, StoreError};

#[derive(Debug, Error)]
pub enum IssuerError {
    #[error("User already registered with this email")]
    Conflict,
    #[error("Invalid role '{0}'. Valid roles: ADMIN, END_USER")]
    InvalidRole(String),
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Token is invalid or expired")]
    Unauthorized,
    #[error("Missing or invalid Authorization header")]
    MalformedRequest,
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for IssuerError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Conflict => IssuerError::Conflict,
            StoreError::Unavailable(detail) => IssuerError::Internal(detail),
        }
    }
}

impl IntoResponse for IssuerError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            IssuerError::Conflict => (StatusCode::CONFLICT, "USER_EXISTS"),
            IssuerError::InvalidRole(_) => (StatusCode::BAD_REQUEST, "INVALID_ROLE"),
            IssuerError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS"),
            IssuerError::Unauthorized => (StatusCode::UNAUTHORIZED, "AUTH_TOKEN"),
            IssuerError::MalformedRequest => (StatusCode::BAD_REQUEST, "AUTH_HEADER"),
            IssuerError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "SERVER_ERROR"),
        };

        // Internal detail stays in the logs, never in the body.
        let message = match &self {
            IssuerError::Internal(detail) => {
                warn!(detail = %detail, "issuer internal error");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        ErrorBody::new(status, code, message).into_response()
    }
}

/// Session minted for a caller: the token plus the identity/role echoed in
/// the response body.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub identity: String,
    pub role: Role,
}

/// Orchestrates the credential store and the token codec for the auth
/// endpoints. Stateless apart from those two immutable collaborators.
pub struct TokenIssuer {
    store: Arc<dyn CredentialStore>,
    codec: Arc<TokenCodec>,
}

impl TokenIssuer {
    pub fn new(store: Arc<dyn CredentialStore>, codec: Arc<TokenCodec>) -> Self {
        Self { store, codec }
    }

    /// Register a new identity and mint its first token.
    ///
    /// The minted token carries only the `role` claim; unlike login it does
    /// not embed `userId`.
    pub async fn register(
        &self,
        identity: &str,
        secret: &str,
        requested_role: Option<&str>,
    ) -> Result<IssuedSession, IssuerError> {
        if self.store.exists(identity).await? {
            return Err(IssuerError::Conflict);
        }

        let role = match requested_role {
            Some(value) if !value.trim().is_empty() => {
                Role::parse(value).ok_or_else(|| IssuerError::InvalidRole(value.to_owned()))?
            }
            _ => Role::EndUser,
        };

        let hashed = hash_secret(secret)
            .map_err(|err| IssuerError::Internal(format!("secret hashing failed: {err}")))?;
        self.store.create(identity, &hashed, role).await?;

        let token = self
            .codec
            .mint(identity, ExtraClaims::role(role), Utc::now())
            .map_err(|err| IssuerError::Internal(err.to_string()))?;

        Ok(IssuedSession {
            token,
            identity: identity.to_owned(),
            role,
        })
    }

    /// Authenticate a credential pair and mint a token with `role` and
    /// `userId` claims. Unknown identity and wrong secret produce the same
    /// error, so callers cannot enumerate accounts.
    pub async fn login(&self, identity: &str, secret: &str) -> Result<IssuedSession, IssuerError> {
        if !self.store.verify_secret(identity, secret).await? {
            return Err(IssuerError::InvalidCredentials);
        }

        let role = self
            .store
            .role_of(identity)
            .await?
            .ok_or(IssuerError::InvalidCredentials)?;
        let user_id = self
            .store
            .user_id_of(identity)
            .await?
            .ok_or(IssuerError::InvalidCredentials)?;

        let token = self
            .codec
            .mint(
                identity,
                ExtraClaims::role_and_user(role, user_id),
                Utc::now(),
            )
            .map_err(|err| IssuerError::Internal(err.to_string()))?;

        Ok(IssuedSession {
            token,
            identity: identity.to_owned(),
            role,
        })
    }

    /// Exchange an authentic token for a fresh one. Expiry is deliberately
    /// not checked: an expired-but-correctly-signed token may still be
    /// refreshed. The role is re-resolved from the store.
    pub async fn refresh(&self, token: &str) -> Result<IssuedSession, IssuerError> {
        let claims = self
            .codec
            .verify(token)
            .map_err(|_| IssuerError::Unauthorized)?;

        let role = self
            .store
            .role_of(&claims.sub)
            .await?
            .ok_or(IssuerError::Unauthorized)?;
        let user_id = self
            .store
            .user_id_of(&claims.sub)
            .await?
            .ok_or(IssuerError::Unauthorized)?;

        let fresh = self
            .codec
            .mint(
                &claims.sub,
                ExtraClaims::role_and_user(role, user_id),
                Utc::now(),
            )
            .map_err(|err| IssuerError::Internal(err.to_string()))?;

        Ok(IssuedSession {
            token: fresh,
            identity: claims.sub,
            role,
        })
    }

    /// Check a token end to end: authentic signature, identity still
    /// present in the store, and not yet expired — in that order.
    pub async fn validate(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<(String, Role), IssuerError> {
        let claims = self
            .codec
            .verify(token)
            .map_err(|_| IssuerError::Unauthorized)?;

        let role = self
            .store
            .role_of(&claims.sub)
            .await?
            .ok_or(IssuerError::Unauthorized)?;

        if claims.is_expired(now) {
            return Err(IssuerError::Unauthorized);
        }

        Ok((claims.sub, role))
    }

    /// Stateless logout: decode the token to echo the identity back. No
    /// server-side invalidation exists, so the token stays usable until
    /// its natural expiry.
    pub fn logout(&self, token: &str) -> Result<String, IssuerError> {
        let claims = self
            .codec
            .verify(token)
            .map_err(|err| IssuerError::Internal(err.to_string()))?;
        Ok(claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryCredentialStore;
    use chrono::Duration;
    use common_auth::TokenConfig;

    fn issuer() -> TokenIssuer {
        let codec = Arc::new(TokenCodec::new(
            TokenConfig::new("issuer-test-secret").with_ttl(3600),
        ));
        TokenIssuer::new(Arc::new(InMemoryCredentialStore::new()), codec)
    }

    #[tokio::test]
    async fn register_defaults_to_end_user() {
        let issuer = issuer();
        let session = issuer
            .register("alice@test.com", "pw", None)
            .await
            .expect("register");
        assert_eq!(session.role, Role::EndUser);

        let empty = issuer
            .register("bob@test.com", "pw", Some("  "))
            .await
            .expect("blank role falls back");
        assert_eq!(empty.role, Role::EndUser);
    }

    #[tokio::test]
    async fn register_rejects_unknown_role() {
        let issuer = issuer();
        let err = issuer
            .register("alice@test.com", "pw", Some("SALES_MANAGER"))
            .await
            .expect_err("historical role names are not members");
        assert!(matches!(err, IssuerError::InvalidRole(_)));
        assert!(!matches!(
            issuer.register("alice@test.com", "pw", Some("admin")).await,
            Err(IssuerError::InvalidRole(_))
        ));
    }

    #[tokio::test]
    async fn register_conflicts_on_existing_identity() {
        let issuer = issuer();
        issuer
            .register("alice@test.com", "pw", None)
            .await
            .expect("first register");
        let err = issuer
            .register("alice@test.com", "other", None)
            .await
            .expect_err("duplicate identity");
        assert!(matches!(err, IssuerError::Conflict));
    }

    #[tokio::test]
    async fn register_token_has_role_but_no_user_id() {
        let codec = Arc::new(TokenCodec::new(TokenConfig::new("issuer-test-secret")));
        let issuer = TokenIssuer::new(Arc::new(InMemoryCredentialStore::new()), codec.clone());

        let session = issuer
            .register("alice@test.com", "pw", Some("ADMIN"))
            .await
            .expect("register");
        let claims = codec.verify(&session.token).expect("verify");
        assert_eq!(claims.role, Some(Role::Admin));
        assert_eq!(claims.user_id, None);
    }

    #[tokio::test]
    async fn login_embeds_role_and_user_id() {
        let codec = Arc::new(TokenCodec::new(TokenConfig::new("issuer-test-secret")));
        let issuer = TokenIssuer::new(Arc::new(InMemoryCredentialStore::new()), codec.clone());
        issuer
            .register("alice@test.com", "pw", None)
            .await
            .expect("register");

        let session = issuer.login("alice@test.com", "pw").await.expect("login");
        let claims = codec.verify(&session.token).expect("verify");
        assert_eq!(claims.sub, "alice@test.com");
        assert_eq!(claims.role, Some(Role::EndUser));
        assert!(claims.user_id.is_some());
    }

    #[tokio::test]
    async fn login_failures_are_indistinguishable() {
        let issuer = issuer();
        issuer
            .register("real@x.com", "correct", None)
            .await
            .expect("register");

        let unknown = issuer
            .login("nobody@x.com", "pw")
            .await
            .expect_err("unknown identity");
        let wrong = issuer
            .login("real@x.com", "wrongpw")
            .await
            .expect_err("wrong secret");

        assert!(matches!(unknown, IssuerError::InvalidCredentials));
        assert!(matches!(wrong, IssuerError::InvalidCredentials));
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[tokio::test]
    async fn refresh_accepts_expired_token() {
        let codec = Arc::new(TokenCodec::new(
            TokenConfig::new("issuer-test-secret").with_ttl(60),
        ));
        let issuer = TokenIssuer::new(Arc::new(InMemoryCredentialStore::new()), codec.clone());
        issuer
            .register("alice@test.com", "pw", None)
            .await
            .expect("register");

        let stale = codec
            .mint(
                "alice@test.com",
                ExtraClaims::role(Role::EndUser),
                Utc::now() - Duration::seconds(7200),
            )
            .expect("mint expired");
        assert!(codec.verify(&stale).unwrap().is_expired(Utc::now()));

        let session = issuer.refresh(&stale).await.expect("refresh expired token");
        let claims = codec.verify(&session.token).expect("verify fresh");
        assert!(!claims.is_expired(Utc::now()));
        assert!(claims.user_id.is_some());
    }

    #[tokio::test]
    async fn refresh_rejects_forged_token() {
        let issuer = issuer();
        let forged = TokenCodec::new(TokenConfig::new("attacker-secret"))
            .mint("alice@test.com", ExtraClaims::default(), Utc::now())
            .expect("mint");

        let err = issuer.refresh(&forged).await.expect_err("forged token");
        assert!(matches!(err, IssuerError::Unauthorized));
    }

    #[tokio::test]
    async fn validate_requires_live_identity_and_unexpired_token() {
        let codec = Arc::new(TokenCodec::new(
            TokenConfig::new("issuer-test-secret").with_ttl(60),
        ));
        let issuer = TokenIssuer::new(Arc::new(InMemoryCredentialStore::new()), codec.clone());
        let session = issuer
            .register("alice@test.com", "pw", None)
            .await
            .expect("register");

        let (email, role) = issuer
            .validate(&session.token, Utc::now())
            .await
            .expect("valid token");
        assert_eq!(email, "alice@test.com");
        assert_eq!(role, Role::EndUser);

        // Same token, evaluated past its expiry instant.
        let later = Utc::now() + Duration::seconds(61);
        let err = issuer
            .validate(&session.token, later)
            .await
            .expect_err("expired");
        assert!(matches!(err, IssuerError::Unauthorized));

        // Authentic token for an identity the store no longer knows.
        let ghost = codec
            .mint("ghost@test.com", ExtraClaims::default(), Utc::now())
            .expect("mint");
        let err = issuer
            .validate(&ghost, Utc::now())
            .await
            .expect_err("unknown identity");
        assert!(matches!(err, IssuerError::Unauthorized));
    }
}
