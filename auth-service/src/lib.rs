pub mod app;
pub mod config;
pub mod handlers;
pub mod issuer;
pub mod store;

pub use crate::app::AppState;
pub use crate::config::AuthServiceConfig;
pub use crate::issuer::{IssuedSession, IssuerError, TokenIssuer};
pub use crate::store::{CredentialStore, InMemoryCredentialStore, StoreError};

use axum::routing::{get, post};
use axum::Router;

async fn health() -> &'static str {
    "ok"
}

/// Build the auth-service router over the given state.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health))
        .route("/auth/register", post(handlers::register))
        .route("/auth/login", post(handlers::login))
        .route("/auth/validate", get(handlers::validate))
        .route("/auth/refresh", post(handlers::refresh))
        .route("/auth/logout", post(handlers::logout))
        .with_state(state)
}
