use std::net::SocketAddr;
use std::sync::Arc;

use common_auth::{TokenCodec, TokenConfig};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use gateway::{router, AppState, GatewayConfig, PolicyEngine, RouteTable};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let config = Arc::new(GatewayConfig::from_env()?);
    let codec = Arc::new(TokenCodec::new(TokenConfig::new(config.jwt_secret.clone())));
    let policy = Arc::new(PolicyEngine::new(RouteTable::standard(), codec));
    let state = AppState::new(policy, config.clone());

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let ip: std::net::IpAddr = config.host.parse()?;
    let addr = SocketAddr::from((ip, config.port));

    info!(%addr, auth = %config.auth_upstream, products = %config.product_upstream, "starting gateway");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router(state).layer(cors)).await?;

    Ok(())
}
