/// Runtime configuration for token signing and verification.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Shared HMAC secret. Owned exclusively by the codec; never defaulted.
    pub secret: String,
    /// Token lifetime in seconds from issuance.
    pub ttl_seconds: i64,
}

impl TokenConfig {
    /// Construct config with the default 24 hour lifetime.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ttl_seconds: 86_400,
        }
    }

    /// Adjust the token lifetime.
    pub fn with_ttl(mut self, seconds: i64) -> Self {
        self.ttl_seconds = seconds;
        self
    }
}
