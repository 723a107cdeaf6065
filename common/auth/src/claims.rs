use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Closed set of roles the gateway actually enforces.
///
/// Registration requests naming anything outside this set are rejected
/// rather than mapped onto a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    EndUser,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::EndUser => "END_USER",
        }
    }

    /// Case-insensitive lookup of a role name.
    pub fn parse(value: &str) -> Option<Role> {
        match value.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Some(Role::Admin),
            "END_USER" => Some(Role::EndUser),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional application claims merged into a token at mint time.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtraClaims {
    pub role: Option<Role>,
    pub user_id: Option<Uuid>,
}

impl ExtraClaims {
    pub fn role(role: Role) -> Self {
        Self {
            role: Some(role),
            user_id: None,
        }
    }

    pub fn role_and_user(role: Role, user_id: Uuid) -> Self {
        Self {
            role: Some(role),
            user_id: Some(user_id),
        }
    }
}

/// Payload embedded in every issued token.
///
/// `exp` is always `iat + ttl`. Decoding deliberately does not reject
/// expired claim sets; callers compare [`ClaimSet::is_expired`] against
/// their own clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimSet {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(
        default,
        rename = "userId",
        skip_serializing_if = "Option::is_none"
    )]
    pub user_id: Option<Uuid>,
}

impl ClaimSet {
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.iat, 0).single()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.exp, 0).single()
    }

    /// A claim set is expired once `exp <= now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.exp <= now.timestamp()
    }
}
