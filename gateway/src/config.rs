use anyhow::{Context, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub jwt_secret: String,
    pub auth_upstream: String,
    pub product_upstream: String,
    pub host: String,
    pub port: u16,
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self> {
        // The gateway refuses to start without the shared secret; a
        // guessable default would let anyone mint passing tokens.
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET must be set")?;

        let auth_upstream =
            env::var("AUTH_SERVICE_URL").unwrap_or_else(|_| "http://127.0.0.1:8081".to_string());
        let product_upstream = env::var("PRODUCT_SERVICE_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:8082".to_string());

        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(8080);

        Ok(Self {
            jwt_secret,
            auth_upstream,
            product_upstream,
            host,
            port,
        })
    }

    /// Map a request path onto its downstream service.
    pub fn upstream_for(&self, path: &str) -> Option<&str> {
        if path.starts_with("/auth") {
            Some(self.auth_upstream.as_str())
        } else if path.starts_with("/products") {
            Some(self.product_upstream.as_str())
        } else {
            None
        }
    }
}
