use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::debug;

use crate::claims::{ClaimSet, ExtraClaims};
use crate::config::TokenConfig;
use crate::error::{AuthError, AuthResult};

/// Signs and verifies compact HS256 tokens. The codec is the only owner of
/// the shared secret; both keys are derived once at construction and the
/// codec is immutable afterwards, so it can be shared freely across tasks.
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_seconds: i64,
}

impl TokenCodec {
    pub fn new(config: TokenConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            ttl_seconds: config.ttl_seconds,
        }
    }

    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    /// Mint a token for `subject` with `iat = now` and `exp = now + ttl`.
    pub fn mint(
        &self,
        subject: &str,
        extra: ExtraClaims,
        now: DateTime<Utc>,
    ) -> AuthResult<String> {
        let claims = ClaimSet {
            sub: subject.to_owned(),
            iat: now.timestamp(),
            exp: now.timestamp() + self.ttl_seconds,
            role: extra.role,
            user_id: extra.user_id,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|err| AuthError::Signing(err.to_string()))?;
        debug!(subject, "minted token");
        Ok(token)
    }

    /// Parse and authenticate a token, recovering its claim set.
    ///
    /// Expiry is NOT checked here: a correctly signed but expired token
    /// decodes successfully, and callers compare `exp` against their own
    /// clock. Refresh relies on this split to accept authentic expired
    /// tokens.
    pub fn verify(&self, token: &str) -> AuthResult<ClaimSet> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;

        let data = decode::<ClaimSet>(token, &self.decoding, &validation).map_err(|err| {
            match err.kind() {
                ErrorKind::InvalidSignature => AuthError::BadSignature,
                _ => AuthError::Malformed(err.to_string()),
            }
        })?;

        Ok(data.claims)
    }
}
