use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    Method,
};
use common_auth::{TokenCodec, TokenConfig};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use auth_service::{app, AppState, AuthServiceConfig, InMemoryCredentialStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let config = AuthServiceConfig::from_env()?;
    let codec = Arc::new(TokenCodec::new(
        TokenConfig::new(config.jwt_secret.clone()).with_ttl(config.token_ttl_seconds),
    ));
    let state = AppState::new(codec, Arc::new(InMemoryCredentialStore::new()));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([ACCEPT, CONTENT_TYPE, AUTHORIZATION]);

    let router = app(state).layer(cors);

    let ip: std::net::IpAddr = config.host.parse()?;
    let addr = SocketAddr::from((ip, config.port));

    info!(%addr, "starting auth-service");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
