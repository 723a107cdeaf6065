use anyhow::{Context, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct AuthServiceConfig {
    pub jwt_secret: String,
    pub token_ttl_seconds: i64,
    pub host: String,
    pub port: u16,
}

impl AuthServiceConfig {
    pub fn from_env() -> Result<Self> {
        // No default secret: serving with a guessable key is worse than
        // refusing to start.
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET must be set")?;

        let token_ttl_seconds = env::var("TOKEN_TTL_SECONDS")
            .ok()
            .and_then(|value| value.parse::<i64>().ok())
            .unwrap_or(86_400);

        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(8081);

        Ok(Self {
            jwt_secret,
            token_ttl_seconds: token_ttl_seconds.max(1),
            host,
            port,
        })
    }
}
