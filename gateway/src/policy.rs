use std::sync::Arc;

use axum::http::{header::AUTHORIZATION, HeaderMap, Method};
use chrono::{DateTime, Utc};
use common_auth::{parse_bearer, Role, TokenCodec};
use tracing::debug;

use crate::routes::{Access, RouteTable};

/// Terminal outcome of the per-request decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Reject(RejectReason),
    Forbid(Role),
}

/// Why a request was turned away with 401. Kept distinct so each rejection
/// branch is unit-testable on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    MissingHeader,
    MalformedHeader,
    InvalidToken,
    Expired,
}

impl RejectReason {
    pub fn code(&self) -> &'static str {
        match self {
            RejectReason::MissingHeader | RejectReason::MalformedHeader => "AUTH_HEADER",
            RejectReason::InvalidToken => "AUTH_TOKEN",
            RejectReason::Expired => "AUTH_EXPIRED",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            RejectReason::MissingHeader => "Missing Authorization header",
            RejectReason::MalformedHeader => "Malformed Authorization header",
            RejectReason::InvalidToken => "Token is invalid",
            RejectReason::Expired => "Token has expired",
        }
    }
}

/// Classifies each request against the route table and enforces the result
/// with the token codec. Pure given the request and `now`; safe to share
/// across request tasks.
pub struct PolicyEngine {
    table: RouteTable,
    codec: Arc<TokenCodec>,
}

impl PolicyEngine {
    pub fn new(table: RouteTable, codec: Arc<TokenCodec>) -> Self {
        Self { table, codec }
    }

    /// Decision order is fixed: classify, then header presence, then
    /// signature, then expiry, then role. A missing header never reaches
    /// signature checking, and a Forbid always implies the token passed
    /// every earlier step.
    pub fn authorize(
        &self,
        method: &Method,
        path: &str,
        headers: &HeaderMap,
        now: DateTime<Utc>,
    ) -> Decision {
        let access = self.table.classify(method, path);

        if access == Access::Public {
            return Decision::Allow;
        }

        let Some(header) = headers.get(AUTHORIZATION) else {
            debug!(%method, path, "rejecting request without authorization header");
            return Decision::Reject(RejectReason::MissingHeader);
        };

        let token = match parse_bearer(header) {
            Ok(token) => token,
            Err(_) => return Decision::Reject(RejectReason::MalformedHeader),
        };

        let claims = match self.codec.verify(&token) {
            Ok(claims) => claims,
            Err(err) => {
                debug!(%method, path, error = %err, "rejecting unverifiable token");
                return Decision::Reject(RejectReason::InvalidToken);
            }
        };

        if claims.is_expired(now) {
            return Decision::Reject(RejectReason::Expired);
        }

        match access {
            Access::RoleRestricted(required) => {
                if claims.role == Some(required) {
                    Decision::Allow
                } else {
                    Decision::Forbid(required)
                }
            }
            _ => Decision::Allow,
        }
    }
}
