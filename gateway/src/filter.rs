use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use chrono::Utc;
use common_auth::error::ErrorBody;
use tracing::debug;

use crate::app_state::AppState;
use crate::policy::Decision;
use crate::proxy::{self, ProxyError};

async fn health() -> &'static str {
    "ok"
}

/// Build the gateway router: health locally, everything else through the
/// authorization filter.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health))
        .fallback(dispatch)
        .with_state(state)
}

/// The single choke point every inbound request passes through. Nothing is
/// forwarded unless the policy engine said Allow, and the request travels
/// upstream unchanged — the Authorization header included.
async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();

    let decision = state
        .policy
        .authorize(&method, &path, request.headers(), Utc::now());

    match decision {
        Decision::Allow => {
            let Some(upstream) = state.config.upstream_for(&path) else {
                return ProxyError::NoUpstream.into_response();
            };
            match proxy::forward(&state.http, upstream, request).await {
                Ok(response) => response,
                Err(err) => err.into_response(),
            }
        }
        Decision::Reject(reason) => {
            debug!(%method, path, ?reason, "request rejected");
            ErrorBody::new(StatusCode::UNAUTHORIZED, reason.code(), reason.message())
                .into_response()
        }
        Decision::Forbid(required) => {
            debug!(%method, path, %required, "request forbidden");
            ErrorBody::new(
                StatusCode::FORBIDDEN,
                "FORBIDDEN_ROLE",
                format!("Requires role {required}"),
            )
            .into_response()
        }
    }
}
